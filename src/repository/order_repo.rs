use crate::model::order::{Order, OrderItem, OrderStatus};
use crate::model::timestamp_now;
use crate::repository::mongo::{collect, ensure_unique_index};
use crate::repository::repository_error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use bson::{doc, oid::ObjectId};
use mongodb::{
    options::{FindOneOptions, FindOptions},
    Database,
};
use tracing::{error, info};

/// Orders and their line items, kept in two collections.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn create_item(&self, item: OrderItem) -> RepositoryResult<OrderItem>;
    /// Items in the order of `ids`; ids with no stored item are skipped.
    async fn find_items(&self, ids: &[ObjectId]) -> RepositoryResult<Vec<OrderItem>>;
    async fn delete_items(&self, ids: &[ObjectId]) -> RepositoryResult<u64>;
    /// Sequence of the most recently created order, 0 when there are none.
    async fn latest_sequence(&self) -> RepositoryResult<u64>;
    async fn create(&self, order: Order) -> RepositoryResult<Order>;
    async fn get_by_id(&self, id: ObjectId) -> RepositoryResult<Order>;
    async fn list_by_user(&self, user: ObjectId) -> RepositoryResult<Vec<Order>>;
    async fn list_all(&self) -> RepositoryResult<Vec<Order>>;
    async fn update_status(&self, id: ObjectId, status: OrderStatus) -> RepositoryResult<Order>;
    async fn delete(&self, id: ObjectId) -> RepositoryResult<()>;
}

pub struct MongoOrderRepository {
    orders: mongodb::Collection<Order>,
    items: mongodb::Collection<OrderItem>,
}

impl MongoOrderRepository {
    pub async fn new(db: &Database) -> RepositoryResult<Self> {
        let orders = db.collection::<Order>("orders");
        ensure_unique_index(&orders, "order_number").await?;
        Ok(MongoOrderRepository {
            orders,
            items: db.collection::<OrderItem>("order_items"),
        })
    }

    fn newest_first() -> FindOptions {
        FindOptions::builder().sort(doc! { "created_at": -1, "_id": -1 }).build()
    }
}

#[async_trait]
impl OrderRepository for MongoOrderRepository {
    #[tracing::instrument(skip(self, item), fields(name = %item.name, quantity = item.quantity))]
    async fn create_item(&self, mut item: OrderItem) -> RepositoryResult<OrderItem> {
        item.id = Some(ObjectId::new());
        let now = timestamp_now();
        item.created_at = Some(now.clone());
        item.updated_at = Some(now);
        match self.items.insert_one(item.clone(), None).await {
            Ok(_) => Ok(item),
            Err(e) => {
                error!("Failed to create order item: {}", e);
                Err(RepositoryError::from_write("Failed to create order item", e))
            }
        }
    }

    async fn find_items(&self, ids: &[ObjectId]) -> RepositoryResult<Vec<OrderItem>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let filter = doc! { "_id": { "$in": ids.to_vec() } };
        let cursor = self
            .items
            .find(filter, None)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to fetch order items: {}", e)))?;
        let found = collect(cursor, "order item").await?;
        // $in does not preserve order
        Ok(ids
            .iter()
            .filter_map(|id| found.iter().find(|item| item.id.as_ref() == Some(id)).cloned())
            .collect())
    }

    #[tracing::instrument(skip(self))]
    async fn delete_items(&self, ids: &[ObjectId]) -> RepositoryResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }
        match self.items.delete_many(doc! { "_id": { "$in": ids.to_vec() } }, None).await {
            Ok(result) => {
                info!("Deleted {} order items", result.deleted_count);
                Ok(result.deleted_count)
            }
            Err(e) => {
                error!("Failed to delete order items: {}", e);
                Err(RepositoryError::database(format!("Failed to delete order items: {}", e)))
            }
        }
    }

    async fn latest_sequence(&self) -> RepositoryResult<u64> {
        let options = FindOneOptions::builder().sort(doc! { "created_at": -1, "_id": -1 }).build();
        match self.orders.find_one(None, options).await {
            Ok(latest) => Ok(latest
                .and_then(|o| Order::parse_sequence(&o.order_number))
                .unwrap_or(0)),
            Err(e) => {
                error!("Failed to read latest order: {}", e);
                Err(RepositoryError::database(format!("Failed to read latest order: {}", e)))
            }
        }
    }

    #[tracing::instrument(skip(self, order), fields(order_number = %order.order_number))]
    async fn create(&self, mut order: Order) -> RepositoryResult<Order> {
        order.id = Some(ObjectId::new());
        let now = timestamp_now();
        order.created_at = Some(now.clone());
        order.updated_at = Some(now);
        match self.orders.insert_one(order.clone(), None).await {
            Ok(_) => {
                info!("Order created successfully");
                Ok(order)
            }
            Err(e) => {
                error!("Failed to create order: {}", e);
                Err(RepositoryError::from_write("Failed to create order", e))
            }
        }
    }

    #[tracing::instrument(skip(self), fields(id = %id))]
    async fn get_by_id(&self, id: ObjectId) -> RepositoryResult<Order> {
        match self.orders.find_one(doc! { "_id": id }, None).await {
            Ok(Some(order)) => Ok(order),
            Ok(None) => Err(RepositoryError::not_found("Order not found")),
            Err(e) => {
                error!("Failed to fetch order: {}", e);
                Err(RepositoryError::database(format!("Failed to fetch order: {}", e)))
            }
        }
    }

    #[tracing::instrument(skip(self), fields(user = %user))]
    async fn list_by_user(&self, user: ObjectId) -> RepositoryResult<Vec<Order>> {
        match self.orders.find(doc! { "user": user }, Self::newest_first()).await {
            Ok(cursor) => collect(cursor, "order").await,
            Err(e) => {
                error!("Failed to list user orders: {}", e);
                Err(RepositoryError::database(format!("Failed to list user orders: {}", e)))
            }
        }
    }

    #[tracing::instrument(skip(self))]
    async fn list_all(&self) -> RepositoryResult<Vec<Order>> {
        match self.orders.find(None, Self::newest_first()).await {
            Ok(cursor) => collect(cursor, "order").await,
            Err(e) => {
                error!("Failed to list orders: {}", e);
                Err(RepositoryError::database(format!("Failed to list orders: {}", e)))
            }
        }
    }

    #[tracing::instrument(skip(self), fields(id = %id, status = %status.as_str()))]
    async fn update_status(&self, id: ObjectId, status: OrderStatus) -> RepositoryResult<Order> {
        let update = doc! { "$set": { "status": status.as_str(), "updated_at": timestamp_now() } };
        match self.orders.update_one(doc! { "_id": id }, update, None).await {
            Ok(result) if result.matched_count > 0 => {
                info!("Order status updated");
                self.get_by_id(id).await
            }
            Ok(_) => Err(RepositoryError::not_found("Order not found")),
            Err(e) => {
                error!("Failed to update order status: {}", e);
                Err(RepositoryError::database(format!("Failed to update order status: {}", e)))
            }
        }
    }

    #[tracing::instrument(skip(self), fields(id = %id))]
    async fn delete(&self, id: ObjectId) -> RepositoryResult<()> {
        match self.orders.delete_one(doc! { "_id": id }, None).await {
            Ok(result) if result.deleted_count > 0 => Ok(()),
            Ok(_) => Err(RepositoryError::not_found("Order not found")),
            Err(e) => {
                error!("Failed to delete order: {}", e);
                Err(RepositoryError::database(format!("Failed to delete order: {}", e)))
            }
        }
    }
}
