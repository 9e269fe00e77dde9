//! Front-of-site render payloads, dispatched through the registry.

use axum::Router;
use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::Json;
use serde::Deserialize;

use crate::content::ContentManager;
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Query parameters for render payloads.
#[derive(Debug, Deserialize)]
struct RenderQuery {
    /// Listing page for multi-page content types.
    page: Option<i32>,
}

/// Create the front router.
pub fn router() -> Router<AppState> {
    Router::new().route("/content/{type}", get(render_content))
}

/// Published data for one content type, shaped for the page-assembly layer.
///
/// GET /content/{type}
async fn render_content(
    State(state): State<AppState>,
    Path(type_name): Path<String>,
    Query(query): Query<RenderQuery>,
) -> AppResult<Json<serde_json::Value>> {
    let Some(manager) = state.registry().get(&type_name) else {
        return Err(AppError::NotFound);
    };

    let payload = manager.render_data(query.page).await?;
    Ok(Json(payload))
}
