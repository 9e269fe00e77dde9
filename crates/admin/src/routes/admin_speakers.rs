//! Admin routes for speaker management.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;

use crate::content::ContentManager;
use crate::error::{AppError, AppResult};
use crate::form::SpeakerFormData;
use crate::state::AppState;

/// Query parameters for listing speakers.
#[derive(Debug, Deserialize)]
struct ListQuery {
    /// Listing page, honored in multi-page mode.
    page: Option<i32>,
}

/// Create the speakers admin router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin/speakers", get(list_speakers).post(save_speaker))
        .route("/admin/speakers/new", get(new_speaker))
        .route("/admin/speakers/{id}", get(get_speaker))
        .route("/admin/speakers/{id}/delete", post(delete_speaker))
        .route("/admin/speakers/page/{page}/delete", post(delete_speaker_page))
}

/// List speakers.
///
/// GET /admin/speakers
async fn list_speakers(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<serde_json::Value>> {
    let speakers = state.speakers().list(query.page).await?;

    Ok(Json(serde_json::json!({ "items": speakers })))
}

/// Form definition for creating a speaker.
///
/// GET /admin/speakers/new
async fn new_speaker(State(state): State<AppState>) -> AppResult<Json<serde_json::Value>> {
    let form = state.speakers().form_definition().await?;

    Ok(Json(serde_json::json!({
        "form": form,
        "image_upload": state.speakers().upload_profile(),
    })))
}

/// One speaker plus their edit form.
///
/// GET /admin/speakers/{id}
async fn get_speaker(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<serde_json::Value>> {
    let Some(speaker) = state.speakers().get(id).await? else {
        return Err(AppError::NotFound);
    };

    let form = state
        .speakers()
        .form_definition()
        .await?
        .with_values(&speaker);

    Ok(Json(serde_json::json!({
        "item": speaker,
        "form": form,
        "image_upload": state.speakers().upload_profile(),
    })))
}

/// Save a speaker; creates when no id is posted.
///
/// POST /admin/speakers
async fn save_speaker(
    State(state): State<AppState>,
    Json(form): Json<SpeakerFormData>,
) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    let creating = form.id.is_none();
    let submission = form.validate().map_err(AppError::Validation)?;

    let id = state.speakers().save(submission).await?;

    let status = if creating {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(serde_json::json!({ "id": id }))))
}

/// Delete a speaker.
///
/// POST /admin/speakers/{id}/delete
async fn delete_speaker(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    if state.speakers().delete(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}

/// Delete every speaker on a listing page.
///
/// POST /admin/speakers/page/{page}/delete
async fn delete_speaker_page(
    State(state): State<AppState>,
    Path(page): Path<i32>,
) -> AppResult<Json<serde_json::Value>> {
    let removed = state.speakers().delete_page(page).await?;

    Ok(Json(serde_json::json!({ "removed": removed })))
}
