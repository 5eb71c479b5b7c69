use crate::dtos::StatusResponse;
use crate::services::get_metrics;
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

pub const SERVICE_NAME: &str = "AI Summary Service";

pub async fn home() -> &'static str {
    "AI Summary Service is Running!"
}

/// Health check endpoint for Docker/K8s liveness probes.
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "service": SERVICE_NAME,
        "version": env!("CARGO_PKG_VERSION")
    }))
}

pub async fn test_endpoint() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "success".to_string(),
        message: "AI server is working!".to_string(),
    })
}

/// Readiness check endpoint. The gateway holds no connections, so once it
/// is serving it is ready.
pub async fn readiness_check() -> StatusCode {
    StatusCode::OK
}

pub async fn metrics_endpoint() -> impl IntoResponse {
    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        get_metrics(),
    )
}
