//! Liveness endpoint

use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
pub struct LivenessResponse {
    pub success: bool,
    /// Status message
    pub message: String,
    /// Version of the service
    pub version: String,
}

/// Liveness check endpoint
#[utoipa::path(
    get,
    path = "/",
    tag = "health",
    responses(
        (status = 200, description = "Service is up", body = LivenessResponse)
    )
)]
pub async fn liveness() -> Json<LivenessResponse> {
    Json(LivenessResponse {
        success: true,
        message: "Librarium API is running".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
