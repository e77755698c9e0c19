use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::{Date, OffsetDateTime};

/// Report workflow state, stored as the `report_status` Postgres enum.
///
/// Transitions are unrestricted: an admin may set any state from any other,
/// including reopening a finished report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "report_status")]
pub enum ReportStatus {
    #[sqlx(rename = "baru")]
    #[serde(rename = "baru", alias = "new")]
    New,
    #[sqlx(rename = "proses")]
    #[serde(rename = "proses", alias = "in_progress")]
    InProgress,
    #[sqlx(rename = "selesai")]
    #[serde(rename = "selesai", alias = "done")]
    Done,
}

impl ReportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "baru",
            Self::InProgress => "proses",
            Self::Done => "selesai",
        }
    }

    /// Only fresh reports may still be edited or withdrawn by their reporter.
    pub fn editable_by_reporter(&self) -> bool {
        *self == Self::New
    }
}

impl std::fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Report record in the database.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Report {
    pub id: i64,
    pub npsn: String,
    pub school_name: String,
    pub category_id: i64,
    pub issue_description: String,
    pub nisn: Option<String>,
    pub status: ReportStatus,
    pub reporter_id: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Report joined with its category and reporter names.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ReportListItem {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub report: Report,
    pub category_name: String,
    pub reporter_name: String,
}

/// Validated input for a new report.
#[derive(Debug, Clone)]
pub struct NewReport {
    pub npsn: String,
    pub school_name: String,
    pub category_id: i64,
    pub issue_description: String,
    pub nisn: Option<String>,
}

/// Validated partial update. `None` leaves a column untouched; `nisn: Some(None)` clears it.
#[derive(Debug, Clone, Default)]
pub struct ReportChanges {
    pub npsn: Option<String>,
    pub school_name: Option<String>,
    pub category_id: Option<i64>,
    pub issue_description: Option<String>,
    pub nisn: Option<Option<String>>,
}

/// Conjunctive filters over reports; `search` is a disjunction over
/// school name, npsn and issue description.
#[derive(Debug, Clone, Default)]
pub struct ReportFilter {
    pub status: Option<ReportStatus>,
    pub category_id: Option<i64>,
    pub reporter_id: Option<i64>,
    pub npsn: Option<String>,
    pub search: Option<String>,
    pub date_from: Option<Date>,
    pub date_to: Option<Date>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_wire_values_and_aliases() {
        assert_eq!(serde_json::to_string(&ReportStatus::InProgress).unwrap(), r#""proses""#);
        let s: ReportStatus = serde_json::from_str(r#""in_progress""#).unwrap();
        assert_eq!(s, ReportStatus::InProgress);
        let s: ReportStatus = serde_json::from_str(r#""selesai""#).unwrap();
        assert_eq!(s, ReportStatus::Done);
        let s: ReportStatus = serde_json::from_str(r#""new""#).unwrap();
        assert_eq!(s, ReportStatus::New);
        assert!(serde_json::from_str::<ReportStatus>(r#""closed""#).is_err());
    }

    #[test]
    fn only_new_is_editable() {
        assert!(ReportStatus::New.editable_by_reporter());
        assert!(!ReportStatus::InProgress.editable_by_reporter());
        assert!(!ReportStatus::Done.editable_by_reporter());
    }
}
