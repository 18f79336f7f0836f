use axum::http::StatusCode;

/// GET /health
#[utoipa::path(get, path = "/health", responses((status = 200, description = "Server is up")))]
pub async fn health_check() -> StatusCode {
    StatusCode::OK
}
