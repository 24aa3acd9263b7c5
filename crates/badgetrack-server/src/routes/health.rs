use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

/// `GET /health` — liveness check.
///
/// No store round-trip: the store is an external collaborator whose
/// availability is surfaced per-request, not here.
pub async fn health() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}
