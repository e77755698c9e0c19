use sqlx::PgPool;
use tracing::{info, warn};

use super::repo_types::ProgressEntry;
use crate::error::{AppError, AppResult};
use crate::reports::Report;
use crate::users::User;
use crate::validate::blank_to_none;

/// Append a note to the ledger under the report's current status.
/// The report row itself is left untouched.
pub async fn add_note(
    db: &PgPool,
    report_id: i64,
    note: String,
    admin_id: i64,
) -> AppResult<ProgressEntry> {
    let note = blank_to_none(Some(note)).ok_or_else(|| AppError::validation("Note is required"))?;

    let mut tx = db.begin().await?;

    let admin_ok = User::resolve(&mut *tx, admin_id)
        .await?
        .map(|a| a.is_active_admin())
        .unwrap_or(false);
    if !admin_ok {
        warn!(admin_id, "add note by unknown or inactive admin");
        return Err(AppError::not_found("Report not found"));
    }

    let status = Report::current_status(&mut *tx, report_id)
        .await?
        .ok_or_else(|| AppError::not_found("Report not found"))?;

    let entry = ProgressEntry::append(&mut *tx, report_id, Some(admin_id), status, Some(&note)).await?;
    tx.commit().await?;

    info!(report_id, admin_id, status = %status, "progress note added");
    Ok(entry)
}
