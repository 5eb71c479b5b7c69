pub mod health;
pub mod models;
pub mod upload;

pub use health::{health_check, home, metrics_endpoint, readiness_check, test_endpoint};
pub use models::list_models;
pub use upload::upload_image;
