use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{instrument, warn};

use super::dto::AddNoteRequest;
use super::repo_types::{ProgressEntry, ProgressEntryView};
use super::services;
use crate::{
    auth::extractors::{AdminUser, AuthUser},
    error::AppResult,
    reports::Report,
    state::AppState,
};

pub fn progress_routes() -> Router<AppState> {
    Router::new().route("/reports/:id/progress", get(list_progress).post(add_note))
}

/// Standalone timeline, newest first. Unknown reports yield an empty list;
/// non-admins see nothing for reports they do not own.
#[instrument(skip(state))]
pub async fn list_progress(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(report_id): Path<i64>,
) -> AppResult<Json<Vec<ProgressEntryView>>> {
    if !auth.is_admin() {
        let owned = Report::find_by_id(&state.db, report_id)
            .await?
            .map(|r| r.reporter_id == auth.id)
            .unwrap_or(false);
        if !owned {
            return Ok(Json(Vec::new()));
        }
    }

    let entries = ProgressEntry::list_newest_first(&state.db, report_id).await?;
    Ok(Json(entries))
}

#[instrument(skip(state, payload))]
pub async fn add_note(
    State(state): State<AppState>,
    AdminUser(admin_id): AdminUser,
    Path(report_id): Path<i64>,
    Json(payload): Json<AddNoteRequest>,
) -> AppResult<(StatusCode, Json<ProgressEntry>)> {
    let entry = services::add_note(&state.db, report_id, payload.note, admin_id)
        .await
        .map_err(|e| {
            warn!(error = %e, report_id, admin_id, "add note failed");
            e
        })?;
    Ok((StatusCode::CREATED, Json(entry)))
}
