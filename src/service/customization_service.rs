use async_trait::async_trait;
use bson::oid::ObjectId;
use std::sync::Arc;
use tracing::{error, info, instrument};

use crate::dto::customization_dto::{
    CandleSelection, CreateCustomizationRequest, CustomizationResponse, CustomizedProductResponse,
    GroupedCustomizations, UpdateCustomizationRequest,
};
use crate::model::customization::Customization;
use crate::model::customized_product::{CustomizedProduct, CUSTOM_CANDLE_BASE_PRICE};
use crate::repository::customization_repo::CustomizationRepository;
use crate::repository::customized_product_repo::CustomizedProductRepository;
use crate::util::error::ServiceError;

#[async_trait]
pub trait CustomizationService: Send + Sync {
    async fn list_grouped(&self) -> Result<GroupedCustomizations, ServiceError>;
    async fn create(&self, req: CreateCustomizationRequest) -> Result<CustomizationResponse, ServiceError>;
    async fn update(&self, id: ObjectId, req: UpdateCustomizationRequest) -> Result<CustomizationResponse, ServiceError>;
    async fn delete(&self, id: ObjectId) -> Result<(), ServiceError>;
    async fn create_candle(&self, user: ObjectId, selection: CandleSelection) -> Result<CustomizedProductResponse, ServiceError>;
}

pub struct CustomizationServiceImpl {
    pub customization_repo: Arc<dyn CustomizationRepository>,
    pub customized_product_repo: Arc<dyn CustomizedProductRepository>,
}

impl CustomizationServiceImpl {
    pub fn new(
        customization_repo: Arc<dyn CustomizationRepository>,
        customized_product_repo: Arc<dyn CustomizedProductRepository>,
    ) -> Self {
        Self { customization_repo, customized_product_repo }
    }
}

/// Base price plus the surcharge of every matched option.
pub fn candle_price(options: &[Customization]) -> f64 {
    options.iter().fold(CUSTOM_CANDLE_BASE_PRICE, |total, option| total + option.price)
}

#[async_trait]
impl CustomizationService for CustomizationServiceImpl {
    #[instrument(skip(self))]
    async fn list_grouped(&self) -> Result<GroupedCustomizations, ServiceError> {
        let res = self.customization_repo.list_in_stock().await;
        match &res {
            Ok(options) => info!("Listed {} customization options", options.len()),
            Err(e) => error!("Failed to list customization options: {e}"),
        }
        Ok(res?.into_iter().collect())
    }

    #[instrument(skip(self, req))]
    async fn create(&self, req: CreateCustomizationRequest) -> Result<CustomizationResponse, ServiceError> {
        let draft = req.into_draft().map_err(ServiceError::InvalidInput)?;
        let customization = Customization {
            id: None,
            kind: draft.kind,
            name: draft.name,
            value: draft.value,
            price: draft.price,
            in_stock: true,
            created_at: None,
            updated_at: None,
        };
        let res = self.customization_repo.create(customization).await;
        match &res {
            Ok(c) => info!("Customization option created: {:?}", c.id),
            Err(e) => error!("Failed to create customization option: {e}"),
        }
        Ok(res?.into())
    }

    #[instrument(skip(self, req))]
    async fn update(&self, id: ObjectId, req: UpdateCustomizationRequest) -> Result<CustomizationResponse, ServiceError> {
        let mut customization = self.customization_repo.get_by_id(id).await?;
        req.apply_to(&mut customization);
        let res = self.customization_repo.update(id, customization).await;
        match &res {
            Ok(_) => info!("Customization option updated"),
            Err(e) => error!("Failed to update customization option: {e}"),
        }
        Ok(res?.into())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: ObjectId) -> Result<(), ServiceError> {
        let res = self.customization_repo.delete(id).await;
        match &res {
            Ok(_) => info!("Customization option deleted"),
            Err(e) => error!("Failed to delete customization option: {e}"),
        }
        Ok(res?)
    }

    #[instrument(skip(self, selection), fields(user = %user))]
    async fn create_candle(&self, user: ObjectId, selection: CandleSelection) -> Result<CustomizedProductResponse, ServiceError> {
        let matched = self.customization_repo.find_by_values(&selection.values()).await?;
        let total_price = candle_price(&matched);
        info!("Custom candle priced at {} from {} options", total_price, matched.len());

        let product = CustomizedProduct {
            id: None,
            user,
            base_price: CUSTOM_CANDLE_BASE_PRICE,
            color: selection.color,
            scent: selection.scent,
            size: selection.size,
            shape: selection.shape,
            total_price,
            image: selection.image,
            created_at: None,
            updated_at: None,
        };
        let res = self.customized_product_repo.create(product).await;
        if let Err(e) = &res {
            error!("Failed to save custom candle: {e}");
        }
        Ok(res?.into())
    }
}
