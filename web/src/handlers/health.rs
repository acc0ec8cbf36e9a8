//! Health check endpoints.

use axum::Json;
use serde::Serialize;

/// Health check response body.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Always "ok" when the process is serving
    status: &'static str,
}

/// Liveness probe. Returns 200 as long as the process serves requests.
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// Readiness probe. The store is in-process, so readiness equals
/// liveness here; the endpoint exists for deployment symmetry.
pub async fn readiness_check() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}
