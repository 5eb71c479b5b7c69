pub mod image;

pub use image::{ImageUpload, UploadError, ALLOWED_EXTENSIONS};
