use async_trait::async_trait;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

use crate::config::AdminUserConfig;
use crate::dto::auth_dto::{AccessTokenResponse, AuthResponse, AuthUserResponse, RegisterResponse, VerifyOutcome};
use crate::dto::hex_id;
use crate::model::user::{Role, User};
use crate::repository::user_repo::UserRepository;
use crate::util::email::EmailSender;
use crate::util::error::ServiceError;
use crate::util::jwt::JwtTokenUtils;
use crate::util::otp::OtpUtils;
use crate::util::password::{PasswordUtils, PasswordUtilsImpl};
use crate::util::refresh_store::RefreshTokenStore;

#[async_trait]
pub trait AuthService: Send + Sync {
    async fn register(&self, username: String, email: String, password: String) -> Result<RegisterResponse, ServiceError>;
    async fn verify_otp(&self, email: String, otp: String) -> Result<VerifyOutcome, ServiceError>;
    async fn login(&self, email: String, password: String) -> Result<AuthResponse, ServiceError>;
    async fn refresh(&self, refresh_token: String) -> Result<AccessTokenResponse, ServiceError>;
    async fn logout(&self, refresh_token: Option<String>) -> Result<(), ServiceError>;
    async fn forgot_password(&self, email: String) -> Result<(), ServiceError>;
    async fn reset_password(&self, email: String, otp: String, new_password: String) -> Result<(), ServiceError>;
    /// Creates the configured admin unless a user with that email exists. Returns whether one was created.
    async fn bootstrap_admin(&self, admin: &AdminUserConfig) -> Result<bool, ServiceError>;
}

pub struct AuthServiceImpl {
    pub user_repo: Arc<dyn UserRepository>,
    pub jwt_utils: Arc<dyn JwtTokenUtils>,
    pub refresh_store: Arc<dyn RefreshTokenStore>,
    pub email_sender: Arc<dyn EmailSender>,
    pub otp: OtpUtils,
}

impl AuthServiceImpl {
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        jwt_utils: Arc<dyn JwtTokenUtils>,
        refresh_store: Arc<dyn RefreshTokenStore>,
        email_sender: Arc<dyn EmailSender>,
        otp: OtpUtils,
    ) -> Self {
        Self { user_repo, jwt_utils, refresh_store, email_sender, otp }
    }

    fn hash(password: &str) -> Result<String, ServiceError> {
        PasswordUtilsImpl::hash_password(password)
            .map_err(|e| ServiceError::InternalError(format!("Password hash error: {}", e)))
    }

    /// Mints a token pair for `user` and records the refresh half.
    async fn start_session(&self, user: &User, message: String) -> Result<AuthResponse, ServiceError> {
        let user_id = hex_id(&user.id);
        let tokens = self
            .jwt_utils
            .generate_token_pair(&user_id, user.role.as_str())
            .map_err(|e| ServiceError::InternalError(format!("JWT error: {}", e)))?;
        self.refresh_store
            .add(&tokens.refresh_token)
            .await
            .map_err(|e| ServiceError::InternalError(format!("Session store error: {}", e)))?;
        Ok(AuthResponse {
            message,
            user: AuthUserResponse::from(user),
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
        })
    }

    async fn find_user(&self, email: &str) -> Result<Option<User>, ServiceError> {
        let user = self.user_repo.find_by_email(email).await;
        match &user {
            Ok(Some(_)) => info!("User found"),
            Ok(None) => warn!("No user with that email"),
            Err(e) => error!("Failed to fetch user: {e}"),
        }
        Ok(user?)
    }

    async fn save(&self, user: User) -> Result<User, ServiceError> {
        let id = user.id.ok_or_else(|| ServiceError::InternalError("Stored user has no id".to_string()))?;
        let res = self.user_repo.update(id, user).await;
        if let Err(e) = &res {
            error!("Failed to update user: {e}");
        }
        Ok(res?)
    }
}

#[async_trait]
impl AuthService for AuthServiceImpl {
    #[instrument(skip(self, password), fields(email = %email))]
    async fn register(&self, username: String, email: String, password: String) -> Result<RegisterResponse, ServiceError> {
        info!("Registering user");
        let issued = self.otp.generate();

        if let Some(mut existing) = self.find_user(&email).await? {
            if existing.is_verified {
                warn!("Registration attempted for a verified email");
                return Err(ServiceError::InvalidInput("User already exist please login".to_string()));
            }
            existing.username = username;
            existing.password_hash = Self::hash(&password)?;
            existing.set_otp(issued.code.clone(), issued.expires_at);
            self.save(existing).await?;

            let sent = self.email_sender.send_otp_email(&email, &issued.code).await;
            match &sent {
                Ok(_) => info!("Verification code re-sent"),
                Err(e) => error!("Failed to re-send verification code: {e}"),
            }
            sent.map_err(|e| ServiceError::InternalError(format!("Email error: {}", e)))?;

            return Ok(RegisterResponse {
                message: "User exists but not verified. New OTP sent.".to_string(),
                require_otp: true,
                email,
            });
        }

        let mut user = User::new_unverified(username, email.clone(), Self::hash(&password)?);
        user.set_otp(issued.code.clone(), issued.expires_at);
        let inserted = self.user_repo.insert(user).await;
        match &inserted {
            Ok(_) => info!("User inserted successfully"),
            Err(e) => error!("Failed to insert user: {e}"),
        }
        inserted?;

        // The account exists either way; the user can ask for a new code.
        if let Err(e) = self.email_sender.send_otp_email(&email, &issued.code).await {
            error!("Failed to send verification code: {e}");
        }

        Ok(RegisterResponse {
            message: "OTP sent to email. Please verify.".to_string(),
            require_otp: true,
            email,
        })
    }

    #[instrument(skip(self, otp), fields(email = %email))]
    async fn verify_otp(&self, email: String, otp: String) -> Result<VerifyOutcome, ServiceError> {
        let mut user = self
            .find_user(&email)
            .await?
            .ok_or_else(|| ServiceError::InvalidInput("User not found".to_string()))?;

        if user.is_verified {
            info!("Email already verified");
            return Ok(VerifyOutcome::AlreadyVerified);
        }
        if !OtpUtils::verify(user.otp.as_deref(), user.otp_expires_at, &otp, OtpUtils::now_millis()) {
            warn!("Rejected verification code");
            return Err(ServiceError::InvalidInput("Invalid or expired OTP".to_string()));
        }

        user.is_verified = true;
        user.clear_otp();
        let user = self.save(user).await?;
        let session = self.start_session(&user, "Email verified successfully!".to_string()).await?;
        info!("Email verified");
        Ok(VerifyOutcome::Verified(session))
    }

    #[instrument(skip(self, password), fields(email = %email))]
    async fn login(&self, email: String, password: String) -> Result<AuthResponse, ServiceError> {
        info!("User login attempt");
        let user = self
            .find_user(&email)
            .await?
            .ok_or_else(|| ServiceError::InvalidInput("User not found please sign up".to_string()))?;

        if !user.is_verified {
            return Err(ServiceError::InvalidInput("Please verify your email first.".to_string()));
        }
        let valid = PasswordUtilsImpl::verify_password(&password, &user.password_hash)
            .map_err(|e| ServiceError::InternalError(format!("Password verify error: {}", e)))?;
        if !valid {
            error!("Invalid credentials");
            return Err(ServiceError::InvalidInput("Invalid credentials".to_string()));
        }

        let message = format!("Login successfull welcome {}", user.username);
        let session = self.start_session(&user, message).await?;
        info!("User logged in successfully");
        Ok(session)
    }

    #[instrument(skip(self, refresh_token))]
    async fn refresh(&self, refresh_token: String) -> Result<AccessTokenResponse, ServiceError> {
        info!("Refreshing access token");
        let known = self
            .refresh_store
            .contains(&refresh_token)
            .await
            .map_err(|e| ServiceError::InternalError(format!("Session store error: {}", e)))?;
        if !known {
            warn!("Refresh token not in session store");
            return Err(ServiceError::Unauthorized("Invalid refresh token".to_string()));
        }

        let invalid = || ServiceError::Forbidden("Invalid or expired refresh token".to_string());
        let claims = self.jwt_utils.validate_refresh_token(&refresh_token).map_err(|e| {
            error!("Refresh token rejected: {e}");
            invalid()
        })?;
        let user_id = bson::oid::ObjectId::parse_str(&claims.sub).map_err(|_| invalid())?;
        let user = self.user_repo.find_by_id(&user_id).await?.ok_or_else(invalid)?;

        let access_token = self
            .jwt_utils
            .generate_access_token(&claims.sub, user.role.as_str())
            .map_err(|e| ServiceError::InternalError(format!("JWT error: {}", e)))?;
        info!("Access token refreshed");
        Ok(AccessTokenResponse {
            message: "Successfully created access token".to_string(),
            access_token,
        })
    }

    #[instrument(skip(self, refresh_token))]
    async fn logout(&self, refresh_token: Option<String>) -> Result<(), ServiceError> {
        if let Some(token) = refresh_token {
            self.refresh_store
                .remove(&token)
                .await
                .map_err(|e| ServiceError::InternalError(format!("Session store error: {}", e)))?;
        }
        info!("Logged out");
        Ok(())
    }

    #[instrument(skip(self), fields(email = %email))]
    async fn forgot_password(&self, email: String) -> Result<(), ServiceError> {
        let mut user = self
            .find_user(&email)
            .await?
            .ok_or_else(|| ServiceError::NotFound("User not found".to_string()))?;
        let issued = self.otp.generate();
        user.set_otp(issued.code.clone(), issued.expires_at);
        self.save(user).await?;

        let sent = self.email_sender.send_otp_email(&email, &issued.code).await;
        match &sent {
            Ok(_) => info!("Password reset code sent"),
            Err(e) => error!("Failed to send password reset code: {e}"),
        }
        sent.map_err(|e| ServiceError::InternalError(format!("Email error: {}", e)))
    }

    #[instrument(skip(self, otp, new_password), fields(email = %email))]
    async fn reset_password(&self, email: String, otp: String, new_password: String) -> Result<(), ServiceError> {
        let mut user = self
            .find_user(&email)
            .await?
            .ok_or_else(|| ServiceError::NotFound("User not found".to_string()))?;
        if !OtpUtils::verify(user.otp.as_deref(), user.otp_expires_at, &otp, OtpUtils::now_millis()) {
            warn!("Rejected password reset code");
            return Err(ServiceError::InvalidInput("Invalid or expired OTP".to_string()));
        }
        user.password_hash = Self::hash(&new_password)?;
        user.clear_otp();
        self.save(user).await?;
        info!("Password reset");
        Ok(())
    }

    #[instrument(skip(self, admin), fields(email = %admin.email))]
    async fn bootstrap_admin(&self, admin: &AdminUserConfig) -> Result<bool, ServiceError> {
        if self.find_user(&admin.email).await?.is_some() {
            info!("Admin user already exists, skipping creation");
            return Ok(false);
        }
        let mut user = User::new_unverified(admin.username.clone(), admin.email.clone(), Self::hash(&admin.password)?);
        user.role = Role::Admin;
        user.is_verified = true;
        let res = self.user_repo.insert(user).await;
        match &res {
            Ok(_) => info!("First admin user created"),
            Err(e) => error!("Failed to create admin user: {e}"),
        }
        res?;
        Ok(true)
    }
}
