//! Admin routes for agenda management.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;

use crate::content::ContentManager;
use crate::error::{AppError, AppResult};
use crate::form::AgendaFormData;
use crate::state::AppState;

/// Query parameters for listing agenda items.
#[derive(Debug, Deserialize)]
struct ListQuery {
    /// Comma-separated ids to restrict the listing to.
    ids: Option<String>,

    /// Skip the per-entry relationship lookups.
    #[serde(default)]
    exclude_relationships: bool,
}

/// Create the agenda admin router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin/agenda", get(list_agenda).post(save_agenda))
        .route("/admin/agenda/new", get(new_agenda))
        .route("/admin/agenda/{id}", get(get_agenda))
        .route("/admin/agenda/{id}/delete", post(delete_agenda))
}

/// Parse a comma-separated id list; ignores blanks, rejects junk.
pub(super) fn parse_ids(raw: &str) -> Result<Vec<i32>, AppError> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse()
                .map_err(|_| AppError::BadRequest(format!("\"{part}\" is not a valid id")))
        })
        .collect()
}

/// List agenda items with their relationships.
///
/// GET /admin/agenda
async fn list_agenda(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<serde_json::Value>> {
    let only = query.ids.as_deref().map(parse_ids).transpose()?;
    let items = state
        .agenda()
        .list(only.as_deref(), query.exclude_relationships)
        .await?;

    Ok(Json(serde_json::json!({ "items": items })))
}

/// Form definition for creating an agenda item.
///
/// GET /admin/agenda/new
async fn new_agenda(State(state): State<AppState>) -> AppResult<Json<serde_json::Value>> {
    let form = state.agenda().form_definition().await?;

    Ok(Json(serde_json::json!({
        "form": form,
        "image_upload": state.agenda().upload_profile(),
    })))
}

/// One agenda item plus its edit form.
///
/// GET /admin/agenda/{id}
async fn get_agenda(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<serde_json::Value>> {
    let Some(item) = state.agenda().get(id).await? else {
        return Err(AppError::NotFound);
    };

    let form = state.agenda().form_definition().await?.with_values(&item);

    Ok(Json(serde_json::json!({
        "item": item,
        "form": form,
        "image_upload": state.agenda().upload_profile(),
    })))
}

/// Save an agenda item; creates when no id is posted.
///
/// POST /admin/agenda
async fn save_agenda(
    State(state): State<AppState>,
    Json(form): Json<AgendaFormData>,
) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    let creating = form.id.is_none();
    let submission = form
        .validate(state.agenda().tracks())
        .map_err(AppError::Validation)?;

    let id = state.agenda().save(submission).await?;

    let status = if creating {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(serde_json::json!({ "id": id }))))
}

/// Delete an agenda item.
///
/// POST /admin/agenda/{id}/delete
async fn delete_agenda(State(state): State<AppState>, Path(id): Path<i32>) -> AppResult<StatusCode> {
    if state.agenda().delete(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}
