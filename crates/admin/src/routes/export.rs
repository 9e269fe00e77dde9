//! Attendee CSV export route.

use axum::Router;
use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;

use crate::export::render_csv;
use crate::models::TicketExportRow;
use crate::state::AppState;

/// Create the export router.
pub fn router() -> Router<AppState> {
    Router::new().route("/agenda/{id}/export", get(export_agenda))
}

/// Stream the attendee CSV for one agenda item's ticket orders.
///
/// GET /agenda/{id}/export
///
/// Every failure collapses to a plain-text 500; spreadsheet consumers get
/// no partial bodies.
async fn export_agenda(State(state): State<AppState>, Path(id): Path<i32>) -> Response {
    let ticket_type = format!("agenda-{id}");

    match TicketExportRow::for_ticket_type(state.db(), &ticket_type).await {
        Ok(rows) => {
            let body = render_csv(&rows);
            (
                [
                    (header::CONTENT_TYPE, "text/csv".to_string()),
                    (
                        header::CONTENT_DISPOSITION,
                        format!("attachment; filename={ticket_type}.csv"),
                    ),
                ],
                body,
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!(agenda = id, error = %e, "attendee export failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error.").into_response()
        }
    }
}
