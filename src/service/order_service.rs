use async_trait::async_trait;
use bson::oid::ObjectId;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

use crate::dto::order_dto::{NewOrder, OrderResponse, OrderUser};
use crate::model::order::{Order, OrderStatus, PaymentStatus};
use crate::repository::order_repo::OrderRepository;
use crate::repository::user_repo::UserRepository;
use crate::util::email::EmailSender;
use crate::util::error::ServiceError;
use crate::util::jwt::Claims;

#[async_trait]
pub trait OrderService: Send + Sync {
    async fn create(&self, user: ObjectId, order: NewOrder) -> Result<OrderResponse, ServiceError>;
    async fn my_orders(&self, user: ObjectId) -> Result<Vec<OrderResponse>, ServiceError>;
    async fn all_orders(&self) -> Result<Vec<OrderResponse>, ServiceError>;
    async fn get(&self, id: ObjectId, requester: &Claims) -> Result<OrderResponse, ServiceError>;
    async fn update_status(&self, id: ObjectId, status: OrderStatus) -> Result<OrderResponse, ServiceError>;
    async fn delete(&self, id: ObjectId, requester: &Claims) -> Result<(), ServiceError>;
}

pub struct OrderServiceImpl {
    pub order_repo: Arc<dyn OrderRepository>,
    pub user_repo: Arc<dyn UserRepository>,
    pub email_sender: Arc<dyn EmailSender>,
}

/// Owners and admins may see or remove an order.
fn may_access(order: &Order, requester: &Claims) -> bool {
    order.user.to_hex() == requester.sub || requester.is_admin()
}

impl OrderServiceImpl {
    pub fn new(
        order_repo: Arc<dyn OrderRepository>,
        user_repo: Arc<dyn UserRepository>,
        email_sender: Arc<dyn EmailSender>,
    ) -> Self {
        Self { order_repo, user_repo, email_sender }
    }

    async fn owner_summary(&self, user: ObjectId) -> Result<OrderUser, ServiceError> {
        Ok(match self.user_repo.find_by_id(&user).await? {
            Some(u) => OrderUser::summary(&u),
            None => OrderUser::Id(user.to_hex()),
        })
    }

    async fn populate(&self, order: Order, with_owner: bool) -> Result<OrderResponse, ServiceError> {
        let items = self.order_repo.find_items(&order.items).await?;
        let user = if with_owner {
            self.owner_summary(order.user).await?
        } else {
            OrderUser::Id(order.user.to_hex())
        };
        Ok(OrderResponse::populated(order, items, user))
    }

    async fn notify_owner(&self, order: &Order) {
        let owner = match self.user_repo.find_by_id(&order.user).await {
            Ok(Some(owner)) => owner,
            Ok(None) => {
                warn!("Order owner no longer exists; skipping status email");
                return;
            }
            Err(e) => {
                error!("Failed to load order owner: {e}");
                return;
            }
        };
        let sent = self
            .email_sender
            .send_order_update_email(&owner.email, &order.order_number, order.status.as_str(), Some(&owner.username))
            .await;
        match sent {
            Ok(_) => info!("Order update email sent"),
            Err(e) => error!("Failed to send order update email: {e}"),
        }
    }
}

#[async_trait]
impl OrderService for OrderServiceImpl {
    #[instrument(skip(self, order), fields(user = %user, items = order.items.len()))]
    async fn create(&self, user: ObjectId, order: NewOrder) -> Result<OrderResponse, ServiceError> {
        info!("Creating order");
        // Continues from the newest stored order, not the document count.
        let sequence = self.order_repo.latest_sequence().await? + 1;
        let mut item_ids = Vec::with_capacity(order.items.len());
        let mut total = 0.0;
        for item in order.items {
            total += item.line_total();
            let stored = self.order_repo.create_item(item).await?;
            item_ids.extend(stored.id);
        }

        let record = Order {
            id: None,
            order_number: Order::format_number(sequence),
            user,
            items: item_ids,
            total,
            status: OrderStatus::Processing,
            shipping_address: order.shipping_address,
            payment_status: PaymentStatus::initial_for(order.payment_method),
            payment_method: order.payment_method,
            created_at: None,
            updated_at: None,
        };
        let res = self.order_repo.create(record).await;
        match &res {
            Ok(o) => info!("Order {} created", o.order_number),
            Err(e) => error!("Failed to create order: {e}"),
        }
        self.populate(res?, true).await
    }

    #[instrument(skip(self))]
    async fn my_orders(&self, user: ObjectId) -> Result<Vec<OrderResponse>, ServiceError> {
        let orders = self.order_repo.list_by_user(user).await?;
        let mut out = Vec::with_capacity(orders.len());
        for order in orders {
            out.push(self.populate(order, false).await?);
        }
        info!("Listed {} orders for user", out.len());
        Ok(out)
    }

    #[instrument(skip(self))]
    async fn all_orders(&self) -> Result<Vec<OrderResponse>, ServiceError> {
        let orders = self.order_repo.list_all().await?;
        let mut out = Vec::with_capacity(orders.len());
        for order in orders {
            out.push(self.populate(order, true).await?);
        }
        info!("Listed {} orders", out.len());
        Ok(out)
    }

    #[instrument(skip(self, requester), fields(requester = %requester.sub))]
    async fn get(&self, id: ObjectId, requester: &Claims) -> Result<OrderResponse, ServiceError> {
        let order = self.order_repo.get_by_id(id).await?;
        if !may_access(&order, requester) {
            warn!("Order access denied");
            return Err(ServiceError::Forbidden("Access denied".to_string()));
        }
        self.populate(order, true).await
    }

    #[instrument(skip(self))]
    async fn update_status(&self, id: ObjectId, status: OrderStatus) -> Result<OrderResponse, ServiceError> {
        let res = self.order_repo.update_status(id, status).await;
        match &res {
            Ok(o) => info!("Order {} is now {}", o.order_number, status.as_str()),
            Err(e) => error!("Failed to update order status: {e}"),
        }
        let order = res?;
        self.notify_owner(&order).await;
        self.populate(order, true).await
    }

    #[instrument(skip(self, requester), fields(requester = %requester.sub))]
    async fn delete(&self, id: ObjectId, requester: &Claims) -> Result<(), ServiceError> {
        let order = self.order_repo.get_by_id(id).await?;
        if !may_access(&order, requester) {
            warn!("Order deletion denied");
            return Err(ServiceError::Forbidden(
                "Access denied. You can only delete your own orders.".to_string(),
            ));
        }
        self.order_repo.delete(id).await?;
        let removed = self.order_repo.delete_items(&order.items).await?;
        info!("Order {} deleted with {} items", order.order_number, removed);
        Ok(())
    }
}
