use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderName, Method},
    routing::get,
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    limit::RequestBodyLimitLayer,
    services::ServeDir,
    trace::TraceLayer,
};
use tracing::{error, info, warn};

use crate::config::{AdminUserConfig, AppConfig, ConfigError, EmailConfig, JwtConfig, MongoConfig, OtpConfig, RedisConfig};
use crate::middlewares::auth_middleware::AuthState;
use crate::repository::customization_repo::MongoCustomizationRepository;
use crate::repository::customized_product_repo::MongoCustomizedProductRepository;
use crate::repository::mongo;
use crate::repository::order_repo::MongoOrderRepository;
use crate::repository::product_repo::MongoProductRepository;
use crate::repository::repository_error::RepositoryError;
use crate::repository::user_repo::{UserRepository, UserRepositoryImpl};
use crate::router::{
    auth_router::auth_router, customization_router::customization_router, debug_router::debug_router,
    order_router::order_router, product_router::product_router,
};
use crate::service::auth_service::{AuthService, AuthServiceImpl};
use crate::service::customization_service::{CustomizationService, CustomizationServiceImpl};
use crate::service::order_service::{OrderService, OrderServiceImpl};
use crate::service::product_service::{ProductService, ProductServiceImpl};
use crate::util::email::{EmailError, EmailSender, SmtpEmailService};
use crate::util::jwt::{JwtTokenUtils, JwtTokenUtilsImpl};
use crate::util::otp::OtpUtils;
use crate::util::refresh_store::{InMemoryRefreshTokenStore, RedisRefreshTokenStore, RefreshTokenStore, SessionStoreError};
use crate::util::upload::ImageStore;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Database error: {0}")]
    Database(#[from] mongodb::error::Error),
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
    #[error("Session store error: {0}")]
    Session(#[from] SessionStoreError),
    #[error("Email error: {0}")]
    Email(#[from] EmailError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid listen address: {0}")]
    Address(String),
}

/// Everything the HTTP layer needs, already wired.
#[derive(Clone)]
pub struct AppServices {
    pub auth: Arc<dyn AuthService>,
    pub products: Arc<dyn ProductService>,
    pub customizations: Arc<dyn CustomizationService>,
    pub orders: Arc<dyn OrderService>,
    pub auth_state: Arc<AuthState>,
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-requested-with"),
        ])
}

/// The full route table with its layers; tests drive this directly.
pub fn build_router(services: AppServices, config: &AppConfig) -> Router {
    let api = Router::new()
        .nest("/auth", auth_router(services.auth))
        .nest("/products", product_router(services.products, services.auth_state.clone()))
        .nest(
            "/customizations",
            customization_router(services.customizations, services.auth_state.clone()),
        )
        .nest("/orders", order_router(services.orders, services.auth_state.clone()))
        .nest("/debug", debug_router(services.auth_state));

    Router::new()
        .route("/", get(|| async { "API is running..." }))
        .route("/health", get(|| async { "OK" }))
        .nest("/api", api)
        .nest_service("/uploads", ServeDir::new(&config.uploads_dir))
        .layer(DefaultBodyLimit::max(config.max_body_bytes))
        .layer(RequestBodyLimitLayer::new(config.max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer())
}

pub struct App {
    config: AppConfig,
    router: Router,
}

impl App {
    pub async fn new() -> Result<Self, AppError> {
        let config = AppConfig::from_env();
        let mongo_config = MongoConfig::from_env()?;
        let jwt_config = JwtConfig::from_env()?;
        let email_config = EmailConfig::from_env()?;
        let otp_config = OtpConfig::from_env()?;

        let db = mongo::connect(&mongo_config).await?;
        let user_repo: Arc<dyn UserRepository> = Arc::new(UserRepositoryImpl::new(&db).await?);
        let product_repo = Arc::new(MongoProductRepository::new(&db));
        let customization_repo = Arc::new(MongoCustomizationRepository::new(&db));
        let customized_product_repo = Arc::new(MongoCustomizedProductRepository::new(&db));
        let order_repo = Arc::new(MongoOrderRepository::new(&db).await?);

        let refresh_ttl_secs = (jwt_config.refresh_token_expiration * 60) as u64;
        let refresh_store: Arc<dyn RefreshTokenStore> = match RedisConfig::from_env()? {
            Some(redis_config) => Arc::new(RedisRefreshTokenStore::new(redis_config, refresh_ttl_secs).await?),
            None => {
                warn!("REDIS_HOST not set, keeping refresh tokens in process memory");
                Arc::new(InMemoryRefreshTokenStore::new())
            }
        };

        let otp_minutes = (otp_config.expiration_secs / 60).max(1);
        let email_sender: Arc<dyn EmailSender> = Arc::new(SmtpEmailService::new(email_config, otp_minutes)?);
        let jwt_utils: Arc<dyn JwtTokenUtils> = Arc::new(JwtTokenUtilsImpl::new(jwt_config));

        tokio::fs::create_dir_all(&config.uploads_dir).await?;
        let images = ImageStore::new(&config.uploads_dir);

        let auth = Arc::new(AuthServiceImpl::new(
            user_repo.clone(),
            jwt_utils.clone(),
            refresh_store,
            email_sender.clone(),
            OtpUtils::new(otp_config),
        ));
        Self::create_first_admin_user(auth.as_ref()).await;

        let services = AppServices {
            auth,
            products: Arc::new(ProductServiceImpl::new(product_repo, user_repo.clone(), images)),
            customizations: Arc::new(CustomizationServiceImpl::new(customization_repo, customized_product_repo)),
            orders: Arc::new(OrderServiceImpl::new(order_repo, user_repo.clone(), email_sender)),
            auth_state: Arc::new(AuthState { jwt_utils, user_repo }),
        };
        let router = build_router(services, &config);
        Ok(App { config, router })
    }

    async fn create_first_admin_user(auth: &dyn AuthService) {
        let admin_conf = match AdminUserConfig::from_env() {
            Ok(c) => c,
            Err(e) => {
                warn!("Admin user config not loaded: {e}");
                return;
            }
        };
        if let Err(e) = auth.bootstrap_admin(&admin_conf).await {
            error!("Failed to create admin user: {e}");
        }
    }

    pub async fn start(self) -> Result<(), AppError> {
        let host = self
            .config
            .host
            .parse()
            .map_err(|_| AppError::Address(self.config.host.clone()))?;
        let addr = SocketAddr::new(host, self.config.port);
        let listener = tokio::net::TcpListener::bind(addr).await?;
        info!("Server running at http://{}", addr);
        axum::serve(listener, self.router).await?;
        Ok(())
    }
}
