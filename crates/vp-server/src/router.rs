//! Axum router construction.
//!
//! Builds the application router with the upload API, static serving of
//! packaged output, and the middleware stack.

use axum::extract::DefaultBodyLimit;
use axum::http::{header, Method};
use axum::middleware;
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use crate::context::AppContext;
use crate::middleware::request_id::request_id_middleware;
use crate::routes;

#[derive(OpenApi)]
#[openapi(
    paths(
        routes::videos::upload_video,
        routes::health::health_check,
        routes::admin::tools,
    ),
    components(schemas(
        routes::videos::UploadResponse,
        routes::videos::UploadTimings,
        routes::admin::ToolStatus,
    ))
)]
pub struct ApiDoc;

/// Build the complete Axum router.
pub fn build_router(ctx: AppContext) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::POST,
            Method::GET,
            Method::OPTIONS,
            Method::PUT,
            Method::DELETE,
        ])
        .allow_headers([header::CONTENT_TYPE]);

    let storage = &ctx.config.storage;
    let max_upload = ctx.config.server.max_upload_bytes;

    let api = Router::new()
        .route(
            "/videos",
            post(routes::videos::upload_video).layer(DefaultBodyLimit::max(max_upload)),
        )
        .route("/admin/tools", get(routes::admin::tools));

    Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/api-docs/openapi.json", get(openapi_json))
        .nest("/api", api)
        .nest_service("/hls", ServeDir::new(storage.hls_dir()))
        .nest_service("/dash", ServeDir::new(storage.dash_dir()))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
