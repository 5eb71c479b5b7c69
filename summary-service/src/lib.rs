//! Image summary gateway.
//!
//! Accepts an authenticated image upload, asks a vision-capable model to
//! describe it and returns the cleaned text.

pub mod config;
pub mod dtos;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod startup;
