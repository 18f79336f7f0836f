//! Operator-facing route handlers.

use axum::extract::State;
use axum::Json;

use crate::context::AppContext;

/// GET /api/admin/tools
#[utoipa::path(
    get,
    path = "/api/admin/tools",
    responses(
        (status = 200, description = "List external tool availability", body = Vec<ToolStatus>)
    )
)]
pub async fn tools(State(ctx): State<AppContext>) -> Json<Vec<ToolStatus>> {
    let tools = ctx.tools.clone();
    // Version detection spawns ffmpeg synchronously.
    let infos = tokio::task::spawn_blocking(move || tools.check_all())
        .await
        .unwrap_or_default();
    Json(infos.into_iter().map(ToolStatus::from).collect())
}

/// Availability of one external tool.
#[derive(Debug, serde::Serialize, utoipa::ToSchema)]
pub struct ToolStatus {
    pub name: String,
    pub available: bool,
    pub version: Option<String>,
    pub path: Option<String>,
}

impl From<vp_av::ToolInfo> for ToolStatus {
    fn from(info: vp_av::ToolInfo) -> Self {
        Self {
            name: info.name,
            available: info.available,
            version: info.version,
            path: info.path.map(|p| p.to_string_lossy().to_string()),
        }
    }
}
