//! In-memory stand-ins for the Mongo repositories and SMTP, plus a helper that
//! drives the real router with `oneshot`.
#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use bson::oid::ObjectId;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

use lume_backend::app::app::{build_router, AppServices};
use lume_backend::config::{AppConfig, JwtConfig, OtpConfig};
use lume_backend::middlewares::auth_middleware::AuthState;
use lume_backend::model::customization::Customization;
use lume_backend::model::customized_product::CustomizedProduct;
use lume_backend::model::order::{Order, OrderItem, OrderStatus};
use lume_backend::model::product::Product;
use lume_backend::model::timestamp_now;
use lume_backend::model::user::{Role, User};
use lume_backend::repository::customization_repo::CustomizationRepository;
use lume_backend::repository::customized_product_repo::CustomizedProductRepository;
use lume_backend::repository::order_repo::OrderRepository;
use lume_backend::repository::product_repo::ProductRepository;
use lume_backend::repository::repository_error::{RepositoryError, RepositoryResult};
use lume_backend::repository::user_repo::UserRepository;
use lume_backend::service::auth_service::AuthServiceImpl;
use lume_backend::service::customization_service::CustomizationServiceImpl;
use lume_backend::service::order_service::OrderServiceImpl;
use lume_backend::service::product_service::ProductServiceImpl;
use lume_backend::util::email::{EmailError, EmailSender};
use lume_backend::util::jwt::{JwtTokenUtils, JwtTokenUtilsImpl};
use lume_backend::util::otp::OtpUtils;
use lume_backend::util::password::{PasswordUtils, PasswordUtilsImpl};
use lume_backend::util::refresh_store::InMemoryRefreshTokenStore;
use lume_backend::util::upload::ImageStore;

fn stamp(id: &mut Option<ObjectId>, created: &mut Option<String>, updated: &mut Option<String>) {
    *id = Some(ObjectId::new());
    let now = timestamp_now();
    *created = Some(now.clone());
    *updated = Some(now);
}

#[derive(Default)]
pub struct InMemoryUserRepo {
    pub users: Mutex<Vec<User>>,
}

#[async_trait]
impl UserRepository for InMemoryUserRepo {
    async fn insert(&self, mut user: User) -> RepositoryResult<User> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.email == user.email) {
            return Err(RepositoryError::already_exists("User already exists"));
        }
        stamp(&mut user.id, &mut user.created_at, &mut user.updated_at);
        users.push(user.clone());
        Ok(user)
    }

    async fn update(&self, id: ObjectId, mut user: User) -> RepositoryResult<User> {
        let mut users = self.users.lock().unwrap();
        let slot = users
            .iter_mut()
            .find(|u| u.id == Some(id))
            .ok_or_else(|| RepositoryError::not_found("User not found"))?;
        user.id = Some(id);
        user.updated_at = Some(timestamp_now());
        *slot = user.clone();
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>> {
        Ok(self.users.lock().unwrap().iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: &ObjectId) -> RepositoryResult<Option<User>> {
        Ok(self.users.lock().unwrap().iter().find(|u| u.id.as_ref() == Some(id)).cloned())
    }
}

#[derive(Default)]
pub struct InMemoryProductRepo {
    pub products: Mutex<Vec<Product>>,
}

#[async_trait]
impl ProductRepository for InMemoryProductRepo {
    async fn create(&self, mut product: Product) -> RepositoryResult<Product> {
        stamp(&mut product.id, &mut product.created_at, &mut product.updated_at);
        self.products.lock().unwrap().push(product.clone());
        Ok(product)
    }

    async fn get_by_id(&self, id: ObjectId) -> RepositoryResult<Product> {
        self.products
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == Some(id))
            .cloned()
            .ok_or_else(|| RepositoryError::not_found("Product not found"))
    }

    async fn list_in_stock(&self) -> RepositoryResult<Vec<Product>> {
        Ok(self.products.lock().unwrap().iter().rev().filter(|p| p.in_stock).cloned().collect())
    }

    async fn update(&self, id: ObjectId, mut product: Product) -> RepositoryResult<Product> {
        let mut products = self.products.lock().unwrap();
        let slot = products
            .iter_mut()
            .find(|p| p.id == Some(id))
            .ok_or_else(|| RepositoryError::not_found("Product not found"))?;
        product.id = Some(id);
        product.updated_at = Some(timestamp_now());
        *slot = product.clone();
        Ok(product)
    }

    async fn delete(&self, id: ObjectId) -> RepositoryResult<()> {
        let mut products = self.products.lock().unwrap();
        let before = products.len();
        products.retain(|p| p.id != Some(id));
        if products.len() == before {
            return Err(RepositoryError::not_found("Product not found"));
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryCustomizationRepo {
    pub options: Mutex<Vec<Customization>>,
}

#[async_trait]
impl CustomizationRepository for InMemoryCustomizationRepo {
    async fn create(&self, mut customization: Customization) -> RepositoryResult<Customization> {
        stamp(&mut customization.id, &mut customization.created_at, &mut customization.updated_at);
        self.options.lock().unwrap().push(customization.clone());
        Ok(customization)
    }

    async fn get_by_id(&self, id: ObjectId) -> RepositoryResult<Customization> {
        self.options
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.id == Some(id))
            .cloned()
            .ok_or_else(|| RepositoryError::not_found("Customization option not found"))
    }

    async fn list_in_stock(&self) -> RepositoryResult<Vec<Customization>> {
        Ok(self.options.lock().unwrap().iter().filter(|c| c.in_stock).cloned().collect())
    }

    async fn find_by_values(&self, values: &[String]) -> RepositoryResult<Vec<Customization>> {
        Ok(self
            .options
            .lock()
            .unwrap()
            .iter()
            .filter(|c| values.contains(&c.value))
            .cloned()
            .collect())
    }

    async fn update(&self, id: ObjectId, mut customization: Customization) -> RepositoryResult<Customization> {
        let mut options = self.options.lock().unwrap();
        let slot = options
            .iter_mut()
            .find(|c| c.id == Some(id))
            .ok_or_else(|| RepositoryError::not_found("Customization option not found"))?;
        customization.id = Some(id);
        *slot = customization.clone();
        Ok(customization)
    }

    async fn delete(&self, id: ObjectId) -> RepositoryResult<()> {
        let mut options = self.options.lock().unwrap();
        let before = options.len();
        options.retain(|c| c.id != Some(id));
        if options.len() == before {
            return Err(RepositoryError::not_found("Customization option not found"));
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryCustomizedProductRepo {
    pub products: Mutex<Vec<CustomizedProduct>>,
}

#[async_trait]
impl CustomizedProductRepository for InMemoryCustomizedProductRepo {
    async fn create(&self, mut product: CustomizedProduct) -> RepositoryResult<CustomizedProduct> {
        stamp(&mut product.id, &mut product.created_at, &mut product.updated_at);
        self.products.lock().unwrap().push(product.clone());
        Ok(product)
    }
}

#[derive(Default)]
pub struct InMemoryOrderRepo {
    pub orders: Mutex<Vec<Order>>,
    pub items: Mutex<Vec<OrderItem>>,
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepo {
    async fn create_item(&self, mut item: OrderItem) -> RepositoryResult<OrderItem> {
        stamp(&mut item.id, &mut item.created_at, &mut item.updated_at);
        self.items.lock().unwrap().push(item.clone());
        Ok(item)
    }

    async fn find_items(&self, ids: &[ObjectId]) -> RepositoryResult<Vec<OrderItem>> {
        let items = self.items.lock().unwrap();
        Ok(ids
            .iter()
            .filter_map(|id| items.iter().find(|i| i.id.as_ref() == Some(id)).cloned())
            .collect())
    }

    async fn delete_items(&self, ids: &[ObjectId]) -> RepositoryResult<u64> {
        let mut items = self.items.lock().unwrap();
        let before = items.len();
        items.retain(|i| !i.id.map(|id| ids.contains(&id)).unwrap_or(false));
        Ok((before - items.len()) as u64)
    }

    async fn latest_sequence(&self) -> RepositoryResult<u64> {
        Ok(self
            .orders
            .lock()
            .unwrap()
            .last()
            .and_then(|o| Order::parse_sequence(&o.order_number))
            .unwrap_or(0))
    }

    async fn create(&self, mut order: Order) -> RepositoryResult<Order> {
        let mut orders = self.orders.lock().unwrap();
        if orders.iter().any(|o| o.order_number == order.order_number) {
            return Err(RepositoryError::already_exists("Duplicate order number"));
        }
        stamp(&mut order.id, &mut order.created_at, &mut order.updated_at);
        orders.push(order.clone());
        Ok(order)
    }

    async fn get_by_id(&self, id: ObjectId) -> RepositoryResult<Order> {
        self.orders
            .lock()
            .unwrap()
            .iter()
            .find(|o| o.id == Some(id))
            .cloned()
            .ok_or_else(|| RepositoryError::not_found("Order not found"))
    }

    async fn list_by_user(&self, user: ObjectId) -> RepositoryResult<Vec<Order>> {
        Ok(self.orders.lock().unwrap().iter().rev().filter(|o| o.user == user).cloned().collect())
    }

    async fn list_all(&self) -> RepositoryResult<Vec<Order>> {
        Ok(self.orders.lock().unwrap().iter().rev().cloned().collect())
    }

    async fn update_status(&self, id: ObjectId, status: OrderStatus) -> RepositoryResult<Order> {
        let mut orders = self.orders.lock().unwrap();
        let order = orders
            .iter_mut()
            .find(|o| o.id == Some(id))
            .ok_or_else(|| RepositoryError::not_found("Order not found"))?;
        order.status = status;
        order.updated_at = Some(timestamp_now());
        Ok(order.clone())
    }

    async fn delete(&self, id: ObjectId) -> RepositoryResult<()> {
        let mut orders = self.orders.lock().unwrap();
        let before = orders.len();
        orders.retain(|o| o.id != Some(id));
        if orders.len() == before {
            return Err(RepositoryError::not_found("Order not found"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SentEmail {
    Otp { to: String, otp: String },
    OrderUpdate { to: String, order_number: String, status: String },
}

/// Records every message instead of talking to SMTP.
#[derive(Default)]
pub struct RecordingEmailSender {
    pub sent: Mutex<Vec<SentEmail>>,
}

impl RecordingEmailSender {
    pub fn last_otp_for(&self, email: &str) -> Option<String> {
        self.sent.lock().unwrap().iter().rev().find_map(|m| match m {
            SentEmail::Otp { to, otp } if to == email => Some(otp.clone()),
            _ => None,
        })
    }

    pub fn order_updates(&self) -> Vec<SentEmail> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|m| matches!(m, SentEmail::OrderUpdate { .. }))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl EmailSender for RecordingEmailSender {
    async fn send_otp_email(&self, to: &str, otp: &str) -> Result<(), EmailError> {
        self.sent.lock().unwrap().push(SentEmail::Otp { to: to.to_string(), otp: otp.to_string() });
        Ok(())
    }

    async fn send_order_update_email(
        &self,
        to: &str,
        order_number: &str,
        status: &str,
        _user_name: Option<&str>,
    ) -> Result<(), EmailError> {
        self.sent.lock().unwrap().push(SentEmail::OrderUpdate {
            to: to.to_string(),
            order_number: order_number.to_string(),
            status: status.to_string(),
        });
        Ok(())
    }
}

pub struct TestApp {
    pub router: Router,
    pub users: Arc<InMemoryUserRepo>,
    pub customizations: Arc<InMemoryCustomizationRepo>,
    pub orders: Arc<InMemoryOrderRepo>,
    pub email: Arc<RecordingEmailSender>,
    pub jwt: Arc<JwtTokenUtilsImpl>,
    pub sessions: Arc<InMemoryRefreshTokenStore>,
    pub uploads_dir: PathBuf,
}

impl TestApp {
    pub fn new() -> Self {
        let uploads_dir = std::env::temp_dir().join(format!("lume-test-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&uploads_dir).unwrap();

        let users = Arc::new(InMemoryUserRepo::default());
        let products = Arc::new(InMemoryProductRepo::default());
        let customizations = Arc::new(InMemoryCustomizationRepo::default());
        let customized = Arc::new(InMemoryCustomizedProductRepo::default());
        let orders = Arc::new(InMemoryOrderRepo::default());
        let email = Arc::new(RecordingEmailSender::default());
        let jwt = Arc::new(JwtTokenUtilsImpl::new(JwtConfig::default()));
        let sessions = Arc::new(InMemoryRefreshTokenStore::new());

        let services = AppServices {
            auth: Arc::new(AuthServiceImpl::new(
                users.clone(),
                jwt.clone(),
                sessions.clone(),
                email.clone(),
                OtpUtils::new(OtpConfig::default()),
            )),
            products: Arc::new(ProductServiceImpl::new(
                products,
                users.clone(),
                ImageStore::new(uploads_dir.clone()),
            )),
            customizations: Arc::new(CustomizationServiceImpl::new(customizations.clone(), customized)),
            orders: Arc::new(OrderServiceImpl::new(orders.clone(), users.clone(), email.clone())),
            auth_state: Arc::new(AuthState { jwt_utils: jwt.clone(), user_repo: users.clone() }),
        };
        let config = AppConfig { uploads_dir: uploads_dir.to_string_lossy().to_string(), ..AppConfig::default() };
        let router = build_router(services, &config);

        TestApp { router, users, customizations, orders, email, jwt, sessions, uploads_dir }
    }

    /// Inserts a verified user and returns it with a valid access token.
    pub async fn seed_user(&self, username: &str, email: &str, password: &str, role: Role) -> (User, String) {
        let mut user = User::new_unverified(
            username.to_string(),
            email.to_string(),
            PasswordUtilsImpl::hash_password(password).unwrap(),
        );
        user.role = role;
        user.is_verified = true;
        let user = self.users.insert(user).await.unwrap();
        let token = self
            .jwt
            .generate_access_token(&user.id.unwrap().to_hex(), role.as_str())
            .unwrap();
        (user, token)
    }

    pub async fn admin(&self) -> (User, String) {
        self.seed_user("admin", "admin@lume.test", "adminpass", Role::Admin).await
    }

    pub async fn customer(&self, name: &str) -> (User, String) {
        self.seed_user(name, &format!("{}@lume.test", name), "secret123", Role::User).await
    }

    pub async fn send(&self, req: Request<Body>) -> (StatusCode, Value) {
        let resp = self.router.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
        let body = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).to_string()));
        (status, body)
    }

    pub async fn call(&self, method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }
        let req = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.send(req).await
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.uploads_dir);
    }
}
