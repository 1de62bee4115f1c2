use crate::model::customized_product::CustomizedProduct;
use crate::model::timestamp_now;
use crate::repository::repository_error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use bson::oid::ObjectId;
use mongodb::Database;
use tracing::{error, info};

#[async_trait]
pub trait CustomizedProductRepository: Send + Sync {
    async fn create(&self, product: CustomizedProduct) -> RepositoryResult<CustomizedProduct>;
}

pub struct MongoCustomizedProductRepository {
    collection: mongodb::Collection<CustomizedProduct>,
}

impl MongoCustomizedProductRepository {
    pub fn new(db: &Database) -> Self {
        MongoCustomizedProductRepository {
            collection: db.collection::<CustomizedProduct>("customized_products"),
        }
    }
}

#[async_trait]
impl CustomizedProductRepository for MongoCustomizedProductRepository {
    #[tracing::instrument(skip(self, product), fields(user = %product.user))]
    async fn create(&self, mut product: CustomizedProduct) -> RepositoryResult<CustomizedProduct> {
        product.id = Some(ObjectId::new());
        let now = timestamp_now();
        product.created_at = Some(now.clone());
        product.updated_at = Some(now);
        match self.collection.insert_one(product.clone(), None).await {
            Ok(_) => {
                info!("Custom candle stored with total {}", product.total_price);
                Ok(product)
            }
            Err(e) => {
                error!("Failed to store custom candle: {}", e);
                Err(RepositoryError::from_write("Failed to store custom candle", e))
            }
        }
    }
}
