pub mod summary;

pub use summary::{ModelListResponse, StatusResponse, SummaryResponse};
