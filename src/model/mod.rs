pub mod customization;
pub mod customized_product;
pub mod order;
pub mod product;
pub mod user;

/// Current time as an RFC 3339 UTC string, the format stored in `created_at`/`updated_at`.
pub fn timestamp_now() -> String {
    chrono::Utc::now().to_rfc3339()
}
