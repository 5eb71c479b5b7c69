pub mod metrics;
pub mod providers;
pub mod summarizer;

pub use self::metrics::{get_metrics, init_metrics};
pub use summarizer::{clean_text, select_model, Summarizer};
