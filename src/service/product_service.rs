use async_trait::async_trait;
use bson::oid::ObjectId;
use std::sync::Arc;
use tracing::{error, info, instrument};

use crate::dto::product_dto::{CreateProductRequest, ProductCreator, ProductResponse, UpdateProductRequest};
use crate::model::product::Product;
use crate::repository::product_repo::ProductRepository;
use crate::repository::user_repo::UserRepository;
use crate::util::error::ServiceError;
use crate::util::upload::{ImageStore, UploadError, UploadedImage};

#[async_trait]
pub trait ProductService: Send + Sync {
    async fn create(
        &self,
        req: CreateProductRequest,
        uploads: Vec<UploadedImage>,
        created_by: ObjectId,
    ) -> Result<ProductResponse, ServiceError>;
    async fn list(&self) -> Result<Vec<ProductResponse>, ServiceError>;
    async fn get(&self, id: ObjectId) -> Result<ProductResponse, ServiceError>;
    async fn update(
        &self,
        id: ObjectId,
        req: UpdateProductRequest,
        uploads: Vec<UploadedImage>,
    ) -> Result<ProductResponse, ServiceError>;
    async fn delete(&self, id: ObjectId) -> Result<(), ServiceError>;
}

pub struct ProductServiceImpl {
    pub product_repo: Arc<dyn ProductRepository>,
    pub user_repo: Arc<dyn UserRepository>,
    pub images: ImageStore,
}

impl ProductServiceImpl {
    pub fn new(product_repo: Arc<dyn ProductRepository>, user_repo: Arc<dyn UserRepository>, images: ImageStore) -> Self {
        Self { product_repo, user_repo, images }
    }

    /// Response with `createdBy` expanded to the creator's summary when the user still exists.
    async fn populate(&self, product: Product) -> Result<ProductResponse, ServiceError> {
        let creator = match self.user_repo.find_by_id(&product.created_by).await? {
            Some(u) => ProductCreator::summary(&u),
            None => ProductCreator::Id(product.created_by.to_hex()),
        };
        let mut response: ProductResponse = product.into();
        response.created_by = creator;
        Ok(response)
    }
}

impl From<UploadError> for ServiceError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::Io(e) => ServiceError::InternalError(format!("Image storage error: {}", e)),
            other => ServiceError::InvalidInput(other.to_string()),
        }
    }
}

#[async_trait]
impl ProductService for ProductServiceImpl {
    #[instrument(skip(self, req, uploads), fields(uploads = uploads.len()))]
    async fn create(
        &self,
        req: CreateProductRequest,
        uploads: Vec<UploadedImage>,
        created_by: ObjectId,
    ) -> Result<ProductResponse, ServiceError> {
        info!("Creating product");
        let (draft, refs) = req.into_draft().map_err(ServiceError::InvalidInput)?;
        let images = self.images.resolve_images(&uploads, &refs).await?;

        let product = Product {
            id: None,
            name: draft.name,
            description: draft.description,
            price: draft.price,
            category: draft.category,
            scent: draft.scent,
            size: draft.size,
            burn_time: draft.burn_time,
            in_stock: draft.in_stock,
            stock_quantity: draft.stock_quantity,
            images,
            created_by,
            created_at: None,
            updated_at: None,
        };
        let res = self.product_repo.create(product).await;
        match &res {
            Ok(p) => info!("Product created: {:?}", p.id),
            Err(e) => error!("Failed to create product: {e}"),
        }
        Ok(res?.into())
    }

    #[instrument(skip(self))]
    async fn list(&self) -> Result<Vec<ProductResponse>, ServiceError> {
        let res = self.product_repo.list_in_stock().await;
        match &res {
            Ok(products) => info!("Listed {} products", products.len()),
            Err(e) => error!("Failed to list products: {e}"),
        }
        let mut products = Vec::new();
        for product in res? {
            products.push(self.populate(product).await?);
        }
        Ok(products)
    }

    #[instrument(skip(self))]
    async fn get(&self, id: ObjectId) -> Result<ProductResponse, ServiceError> {
        let res = self.product_repo.get_by_id(id).await;
        if let Err(e) = &res {
            error!("Failed to fetch product: {e}");
        }
        self.populate(res?).await
    }

    #[instrument(skip(self, req, uploads), fields(uploads = uploads.len()))]
    async fn update(
        &self,
        id: ObjectId,
        req: UpdateProductRequest,
        uploads: Vec<UploadedImage>,
    ) -> Result<ProductResponse, ServiceError> {
        info!("Updating product");
        let mut product = self.product_repo.get_by_id(id).await?;
        req.apply_to(&mut product).map_err(ServiceError::InvalidInput)?;

        if req.images.is_some() || !uploads.is_empty() {
            let refs: Vec<String> = req.images.clone().map(Into::into).unwrap_or_default();
            product.images = self.images.resolve_images(&uploads, &refs).await?;
        }

        let res = self.product_repo.update(id, product).await;
        match &res {
            Ok(_) => info!("Product updated"),
            Err(e) => error!("Failed to update product: {e}"),
        }
        Ok(res?.into())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: ObjectId) -> Result<(), ServiceError> {
        let res = self.product_repo.delete(id).await;
        match &res {
            Ok(_) => info!("Product deleted"),
            Err(e) => error!("Failed to delete product: {e}"),
        }
        Ok(res?)
    }
}
