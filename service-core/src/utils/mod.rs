pub mod secret;

pub use secret::constant_time_eq;
