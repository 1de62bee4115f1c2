use crate::model::customization::Customization;
use crate::model::timestamp_now;
use crate::repository::mongo::collect;
use crate::repository::repository_error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use bson::{doc, oid::ObjectId};
use mongodb::Database;
use tracing::{error, info};

#[async_trait]
pub trait CustomizationRepository: Send + Sync {
    async fn create(&self, customization: Customization) -> RepositoryResult<Customization>;
    async fn get_by_id(&self, id: ObjectId) -> RepositoryResult<Customization>;
    async fn list_in_stock(&self) -> RepositoryResult<Vec<Customization>>;
    /// Every option, in stock or not, whose `value` is one of `values`
    async fn find_by_values(&self, values: &[String]) -> RepositoryResult<Vec<Customization>>;
    async fn update(&self, id: ObjectId, customization: Customization) -> RepositoryResult<Customization>;
    async fn delete(&self, id: ObjectId) -> RepositoryResult<()>;
}

pub struct MongoCustomizationRepository {
    collection: mongodb::Collection<Customization>,
}

impl MongoCustomizationRepository {
    pub fn new(db: &Database) -> Self {
        MongoCustomizationRepository {
            collection: db.collection::<Customization>("customizations"),
        }
    }
}

#[async_trait]
impl CustomizationRepository for MongoCustomizationRepository {
    #[tracing::instrument(skip(self, customization), fields(kind = ?customization.kind, value = %customization.value))]
    async fn create(&self, mut customization: Customization) -> RepositoryResult<Customization> {
        customization.id = Some(ObjectId::new());
        let now = timestamp_now();
        customization.created_at = Some(now.clone());
        customization.updated_at = Some(now);
        match self.collection.insert_one(customization.clone(), None).await {
            Ok(_) => {
                info!("Customization option created");
                Ok(customization)
            }
            Err(e) => {
                error!("Failed to create customization: {}", e);
                Err(RepositoryError::from_write("Failed to create customization", e))
            }
        }
    }

    #[tracing::instrument(skip(self), fields(id = %id))]
    async fn get_by_id(&self, id: ObjectId) -> RepositoryResult<Customization> {
        match self.collection.find_one(doc! { "_id": id }, None).await {
            Ok(Some(c)) => Ok(c),
            Ok(None) => Err(RepositoryError::not_found("Customization option not found")),
            Err(e) => {
                error!("Failed to fetch customization: {}", e);
                Err(RepositoryError::database(format!("Failed to fetch customization: {}", e)))
            }
        }
    }

    #[tracing::instrument(skip(self))]
    async fn list_in_stock(&self) -> RepositoryResult<Vec<Customization>> {
        match self.collection.find(doc! { "in_stock": true }, None).await {
            Ok(cursor) => collect(cursor, "customization").await,
            Err(e) => {
                error!("Failed to list customizations: {}", e);
                Err(RepositoryError::database(format!("Failed to list customizations: {}", e)))
            }
        }
    }

    #[tracing::instrument(skip(self))]
    async fn find_by_values(&self, values: &[String]) -> RepositoryResult<Vec<Customization>> {
        let filter = doc! { "value": { "$in": values.to_vec() } };
        match self.collection.find(filter, None).await {
            Ok(cursor) => collect(cursor, "customization").await,
            Err(e) => {
                error!("Failed to query customizations by value: {}", e);
                Err(RepositoryError::database(format!("Failed to query customizations: {}", e)))
            }
        }
    }

    #[tracing::instrument(skip(self, customization), fields(id = %id))]
    async fn update(&self, id: ObjectId, mut customization: Customization) -> RepositoryResult<Customization> {
        customization.id = Some(id);
        customization.updated_at = Some(timestamp_now());
        let mut doc = bson::to_document(&customization)
            .map_err(|e| RepositoryError::serialization(format!("Failed to serialize customization: {}", e)))?;
        doc.remove("_id");
        match self.collection.update_one(doc! { "_id": id }, doc! { "$set": doc }, None).await {
            Ok(result) if result.matched_count > 0 => Ok(customization),
            Ok(_) => Err(RepositoryError::not_found("Customization option not found")),
            Err(e) => {
                error!("Failed to update customization: {}", e);
                Err(RepositoryError::from_write("Failed to update customization", e))
            }
        }
    }

    #[tracing::instrument(skip(self), fields(id = %id))]
    async fn delete(&self, id: ObjectId) -> RepositoryResult<()> {
        match self.collection.delete_one(doc! { "_id": id }, None).await {
            Ok(result) if result.deleted_count > 0 => {
                info!("Customization option deleted");
                Ok(())
            }
            Ok(_) => Err(RepositoryError::not_found("Customization option not found")),
            Err(e) => {
                error!("Failed to delete customization: {}", e);
                Err(RepositoryError::database(format!("Failed to delete customization: {}", e)))
            }
        }
    }
}
