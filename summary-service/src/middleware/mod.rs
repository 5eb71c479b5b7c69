pub mod auth;

pub use auth::{bearer_token_matches, BearerAuth};
