use crate::config::{ConfigError, EmailConfig};
use async_trait::async_trait;
use chrono::Datelike;
use lettre::{
    message::{header::ContentType, Mailbox, MultiPart, SinglePart},
    transport::smtp::{
        authentication::Credentials,
        client::{Tls, TlsParameters},
    },
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use tracing::{error, info, instrument};

#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("SMTP error: {0}")]
    SmtpError(String),

    #[error("Message building error: {0}")]
    MessageError(String),

    #[error("Address error: {0}")]
    AddressError(String),
}

impl From<ConfigError> for EmailError {
    fn from(err: ConfigError) -> Self {
        EmailError::ConfigError(err.to_string())
    }
}

/// Transactional mail the storefront sends.
#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send_otp_email(&self, to: &str, otp: &str) -> Result<(), EmailError>;
    async fn send_order_update_email(
        &self,
        to: &str,
        order_number: &str,
        status: &str,
        user_name: Option<&str>,
    ) -> Result<(), EmailError>;
}

#[derive(Debug, Clone)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub text_body: Option<String>,
    pub html_body: Option<String>,
}

impl EmailMessage {
    pub fn new(to: String, subject: String) -> Self {
        Self { to, subject, text_body: None, html_body: None }
    }

    pub fn with_text_body(mut self, body: String) -> Self {
        self.text_body = Some(body);
        self
    }

    pub fn with_html_body(mut self, body: String) -> Self {
        self.html_body = Some(body);
        self
    }
}

pub const OTP_SUBJECT: &str = "Lume - Verify Your Account";

pub fn order_update_subject(order_number: &str) -> String {
    format!("Lume - Order Update #{}", order_number)
}

/// Shared branded shell around every message body.
pub fn email_layout(content: &str, title: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8">
  <title>{title}</title>
  <style>
    body {{ margin: 0; padding: 0; font-family: 'Helvetica Neue', Helvetica, Arial, sans-serif; background-color: #f9f9f9; color: #333333; }}
    .container {{ max-width: 600px; margin: 0 auto; background-color: #ffffff; border-radius: 8px; overflow: hidden; }}
    .header {{ background-color: #1a1a1a; padding: 40px 20px; text-align: center; }}
    .logo {{ font-size: 24px; font-weight: bold; color: #d4af37; letter-spacing: 2px; }}
    .body {{ padding: 40px 30px; line-height: 1.6; }}
    .footer {{ background-color: #f1f1f1; padding: 20px; text-align: center; font-size: 12px; color: #888888; }}
    .btn {{ display: inline-block; background-color: #d4af37; color: #ffffff; padding: 12px 24px; text-decoration: none; border-radius: 4px; font-weight: bold; margin-top: 20px; }}
    .highlight {{ color: #d4af37; font-weight: bold; }}
    .otp-box {{ background-color: #fdfbf7; border: 1px solid #eaddcf; padding: 15px; font-size: 24px; letter-spacing: 5px; text-align: center; margin: 20px 0; font-family: monospace; }}
    .status-badge {{ display: inline-block; padding: 6px 12px; border-radius: 20px; font-size: 14px; font-weight: bold; text-transform: uppercase; background-color: #eaddcf; color: #5c4033; }}
  </style>
</head>
<body>
  <div class="container">
    <div class="header"><div class="logo">LUME ATELIER</div></div>
    <div class="body">
{content}
    </div>
    <div class="footer">
      &copy; {year} Lume Atelier. All rights reserved.<br>
      Crafting illuminated moments through bespoke artistry.
    </div>
  </div>
</body>
</html>"#,
        title = html_escape::encode_text(title),
        content = content,
        year = chrono::Utc::now().year(),
    )
}

pub fn otp_email_html(otp: &str, valid_minutes: u64) -> String {
    let content = format!(
        r#"      <h1>Verify Your Identity</h1>
      <p>Welcome to Lume. To complete your verification, please use the following One-Time Password (OTP).</p>
      <div class="otp-box">{otp}</div>
      <p>This code is valid for <strong>{valid_minutes} minutes</strong>. Do not share this code with anyone.</p>
      <p>If you didn't request this, please ignore this email.</p>"#,
        otp = html_escape::encode_text(otp),
        valid_minutes = valid_minutes,
    );
    email_layout(&content, "Verify Account")
}

fn order_status_message(status: &str) -> String {
    match status {
        "processing" => "Your order has been processed and is being prepared for dispatch.".to_string(),
        "shipped" => "Good news! Your order is on its way to you.".to_string(),
        "delivered" => "Your order has been delivered. We hope you enjoy your Lume piece.".to_string(),
        "cancelled" => "Your order has been cancelled.".to_string(),
        other => format!(
            "The status of your order has been updated to <strong>{}</strong>.",
            html_escape::encode_text(other)
        ),
    }
}

pub fn order_update_email_html(order_number: &str, status: &str, user_name: Option<&str>, profile_url: &str) -> String {
    let content = format!(
        r#"      <h1>Order Update</h1>
      <p>Dear {name},</p>
      <p>{message}</p>
      <p>Order Number: <span class="highlight">#{order_number}</span></p>
      <div style="text-align: center; margin: 30px 0;"><span class="status-badge">{status}</span></div>
      <p>You can view full details in your account.</p>
      <center><a href="{profile_url}" class="btn">View Order</a></center>"#,
        name = html_escape::encode_text(user_name.unwrap_or("Customer")),
        message = order_status_message(status),
        order_number = html_escape::encode_text(order_number),
        status = html_escape::encode_text(status),
        profile_url = html_escape::encode_double_quoted_attribute(profile_url),
    );
    email_layout(&content, "Order Update")
}

pub struct SmtpEmailService {
    pub config: EmailConfig,
    otp_valid_minutes: u64,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpEmailService {
    #[instrument(skip(config), fields(host = %config.smtp_host, port = config.smtp_port))]
    pub fn new(config: EmailConfig, otp_valid_minutes: u64) -> Result<Self, EmailError> {
        info!("Initializing SMTP email service");

        config.validate().map_err(EmailError::from)?;

        let mut transport_builder = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.smtp_host)
            .port(config.smtp_port)
            .timeout(Some(std::time::Duration::from_secs(config.connection_timeout_secs)));

        if config.use_tls {
            let tls_parameters = TlsParameters::new(config.smtp_host.clone())
                .map_err(|e| EmailError::ConfigError(format!("TLS configuration error: {}", e)))?;
            transport_builder = if config.use_starttls {
                transport_builder.tls(Tls::Required(tls_parameters))
            } else {
                transport_builder.tls(Tls::Wrapper(tls_parameters))
            };
        } else {
            transport_builder = transport_builder.tls(Tls::None);
        }

        if !config.smtp_username.is_empty() && !config.smtp_password.is_empty() {
            let credentials = Credentials::new(config.smtp_username.clone(), config.smtp_password.clone());
            transport_builder = transport_builder.credentials(credentials);
        }

        let transport = transport_builder.build();

        info!("SMTP email service initialized successfully");
        Ok(Self { config, otp_valid_minutes, transport })
    }

    #[instrument(skip(self, message), fields(to = %message.to, subject = %message.subject))]
    pub async fn send_email(&self, message: EmailMessage) -> Result<(), EmailError> {
        validate_email_address(&message.to)?;
        let email_message = self.build_message(message)?;

        self.transport.send(email_message).await.map_err(|e| {
            error!("Failed to send email: {}", e);
            EmailError::SmtpError(format!("Failed to send email: {}", e))
        })?;

        info!("Email sent successfully");
        Ok(())
    }

    fn build_message(&self, email_message: EmailMessage) -> Result<Message, EmailError> {
        let from_mailbox: Mailbox = format!("{} <{}>", self.config.from_name, self.config.from_email)
            .parse()
            .map_err(|e| EmailError::AddressError(format!("Invalid from address: {}", e)))?;

        let to_mailbox: Mailbox = email_message
            .to
            .parse()
            .map_err(|e| EmailError::AddressError(format!("Invalid to address: {}", e)))?;

        let builder = Message::builder().from(from_mailbox).to(to_mailbox).subject(&email_message.subject);

        match (email_message.text_body, email_message.html_body) {
            (Some(text), Some(html)) => builder
                .multipart(
                    MultiPart::alternative()
                        .singlepart(SinglePart::builder().header(ContentType::TEXT_PLAIN).body(text))
                        .singlepart(SinglePart::builder().header(ContentType::TEXT_HTML).body(html)),
                )
                .map_err(|e| EmailError::MessageError(format!("Failed to build multipart message: {}", e))),
            (Some(text), None) => builder
                .body(text)
                .map_err(|e| EmailError::MessageError(format!("Failed to build text message: {}", e))),
            (None, Some(html)) => builder
                .singlepart(SinglePart::builder().header(ContentType::TEXT_HTML).body(html))
                .map_err(|e| EmailError::MessageError(format!("Failed to build HTML message: {}", e))),
            (None, None) => Err(EmailError::MessageError("No message body provided".to_string())),
        }
    }
}

#[async_trait]
impl EmailSender for SmtpEmailService {
    async fn send_otp_email(&self, to: &str, otp: &str) -> Result<(), EmailError> {
        let text = format!(
            "Your Lume verification code is {}. It is valid for {} minutes.",
            otp, self.otp_valid_minutes
        );
        let message = EmailMessage::new(to.to_string(), OTP_SUBJECT.to_string())
            .with_text_body(text)
            .with_html_body(otp_email_html(otp, self.otp_valid_minutes));
        self.send_email(message).await
    }

    async fn send_order_update_email(
        &self,
        to: &str,
        order_number: &str,
        status: &str,
        user_name: Option<&str>,
    ) -> Result<(), EmailError> {
        let html = order_update_email_html(order_number, status, user_name, &self.config.profile_url());
        let message = EmailMessage::new(to.to_string(), order_update_subject(order_number)).with_html_body(html);
        self.send_email(message).await
    }
}

fn validate_email_address(email: &str) -> Result<(), EmailError> {
    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
        return Err(EmailError::AddressError("Invalid email format".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_otp_email_contains_code_and_validity() {
        let html = otp_email_html("482913", 10);
        assert!(html.contains("LUME ATELIER"));
        assert!(html.contains("482913"));
        assert!(html.contains("10 minutes"));
    }

    #[test]
    fn test_order_update_email_escapes_name() {
        let html = order_update_email_html("ORD-0007", "shipped", Some("<b>Ana</b>"), "https://lume.example/profile");
        assert!(html.contains("on its way"));
        assert!(html.contains("#ORD-0007"));
        assert!(html.contains("&lt;b&gt;Ana&lt;/b&gt;"));
        assert!(html.contains("https://lume.example/profile"));
    }

    #[test]
    fn test_order_update_email_defaults() {
        let html = order_update_email_html("ORD-0001", "pending", None, "#/profile");
        assert!(html.contains("Dear Customer"));
        assert!(html.contains("<strong>pending</strong>"));
        assert_eq!(order_update_subject("ORD-0001"), "Lume - Order Update #ORD-0001");
    }

    #[test]
    fn test_validate_email_address() {
        assert!(validate_email_address("a@b.co").is_ok());
        assert!(validate_email_address("nope").is_err());
        assert!(validate_email_address("@b.co").is_err());
    }
}
