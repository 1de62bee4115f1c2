pub mod auth_router;
pub mod customization_router;
pub mod debug_router;
pub mod order_router;
pub mod product_router;
