use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;

use crate::reports::ReportStatus;

/// One ledger row. `admin_id` is `None` for system-generated entries.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ProgressEntry {
    pub id: i64,
    pub report_id: i64,
    pub admin_id: Option<i64>,
    pub status: ReportStatus,
    pub note: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Ledger row with the acting admin's display name.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ProgressEntryView {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub entry: ProgressEntry,
    pub admin_name: Option<String>,
}
