pub mod customization_repo;
pub mod customized_product_repo;
pub mod mongo;
pub mod order_repo;
pub mod product_repo;
pub mod repository_error;
pub mod user_repo;
