use crate::model::product::Product;
use crate::model::timestamp_now;
use crate::repository::mongo::collect;
use crate::repository::repository_error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use bson::{doc, oid::ObjectId};
use mongodb::{options::FindOptions, Database};
use tracing::{error, info};

#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn create(&self, product: Product) -> RepositoryResult<Product>;
    async fn get_by_id(&self, id: ObjectId) -> RepositoryResult<Product>;
    /// In-stock products, newest first
    async fn list_in_stock(&self) -> RepositoryResult<Vec<Product>>;
    async fn update(&self, id: ObjectId, product: Product) -> RepositoryResult<Product>;
    async fn delete(&self, id: ObjectId) -> RepositoryResult<()>;
}

pub struct MongoProductRepository {
    collection: mongodb::Collection<Product>,
}

impl MongoProductRepository {
    pub fn new(db: &Database) -> Self {
        MongoProductRepository {
            collection: db.collection::<Product>("products"),
        }
    }
}

#[async_trait]
impl ProductRepository for MongoProductRepository {
    #[tracing::instrument(skip(self, product), fields(name = %product.name))]
    async fn create(&self, mut product: Product) -> RepositoryResult<Product> {
        info!("Creating new product");
        product.id = Some(ObjectId::new());
        let now = timestamp_now();
        product.created_at = Some(now.clone());
        product.updated_at = Some(now);

        match self.collection.insert_one(product.clone(), None).await {
            Ok(_) => {
                info!("Product created successfully");
                Ok(product)
            }
            Err(e) => {
                error!("Failed to create product: {}", e);
                Err(RepositoryError::from_write("Failed to create product", e))
            }
        }
    }

    #[tracing::instrument(skip(self), fields(id = %id))]
    async fn get_by_id(&self, id: ObjectId) -> RepositoryResult<Product> {
        let filter = doc! { "_id": id };
        match self.collection.find_one(filter, None).await {
            Ok(Some(product)) => Ok(product),
            Ok(None) => {
                error!("Product not found for ID: {}", id);
                Err(RepositoryError::not_found("Product not found"))
            }
            Err(e) => {
                error!("Failed to fetch product by ID: {}", e);
                Err(RepositoryError::database(format!("Failed to fetch product by ID: {}", e)))
            }
        }
    }

    #[tracing::instrument(skip(self))]
    async fn list_in_stock(&self) -> RepositoryResult<Vec<Product>> {
        let options = FindOptions::builder()
            .sort(doc! { "created_at": -1, "_id": -1 })
            .build();
        match self.collection.find(doc! { "in_stock": true }, options).await {
            Ok(cursor) => {
                let products = collect(cursor, "product").await?;
                info!("Fetched {} in-stock products", products.len());
                Ok(products)
            }
            Err(e) => {
                error!("Failed to list products: {}", e);
                Err(RepositoryError::database(format!("Failed to list products: {}", e)))
            }
        }
    }

    #[tracing::instrument(skip(self, product), fields(id = %id))]
    async fn update(&self, id: ObjectId, mut product: Product) -> RepositoryResult<Product> {
        let filter = doc! { "_id": id };
        product.id = Some(id);
        product.updated_at = Some(timestamp_now());
        let mut doc = bson::to_document(&product)
            .map_err(|e| RepositoryError::serialization(format!("Failed to serialize product: {}", e)))?;
        doc.remove("_id");
        let update = doc! { "$set": doc };
        match self.collection.update_one(filter, update, None).await {
            Ok(result) if result.matched_count > 0 => {
                info!("Product updated successfully for ID: {}", id);
                Ok(product)
            }
            Ok(_) => {
                error!("No product found to update for ID: {}", id);
                Err(RepositoryError::not_found("Product not found"))
            }
            Err(e) => {
                error!("Failed to update product: {}", e);
                Err(RepositoryError::from_write("Failed to update product", e))
            }
        }
    }

    #[tracing::instrument(skip(self), fields(id = %id))]
    async fn delete(&self, id: ObjectId) -> RepositoryResult<()> {
        let filter = doc! { "_id": id };
        match self.collection.delete_one(filter, None).await {
            Ok(result) if result.deleted_count > 0 => {
                info!("Product deleted successfully for ID: {}", id);
                Ok(())
            }
            Ok(_) => {
                error!("No product found to delete for ID: {}", id);
                Err(RepositoryError::not_found("Product not found"))
            }
            Err(e) => {
                error!("Failed to delete product: {}", e);
                Err(RepositoryError::database(format!("Failed to delete product: {}", e)))
            }
        }
    }
}
