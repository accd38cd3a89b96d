use axum::{debug_handler, response::IntoResponse, Json};

#[utoipa::path(
    get,
    path = "/api/v1/health",
    tag = "gatehouse",
    responses(
    (status = 200, description = "Server is up")
    )
)]
#[debug_handler]
pub async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
