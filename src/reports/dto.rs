use serde::{Deserialize, Serialize};
use time::{macros::format_description, Date};

use super::repo_types::{ReportFilter, ReportListItem, ReportStatus};
use crate::error::AppError;
use crate::progress::ProgressEntryView;
use crate::validate::blank_to_none;

#[derive(Debug, Deserialize)]
pub struct CreateReportRequest {
    pub npsn: String,
    pub school_name: String,
    pub category_id: i64,
    pub issue_description: String,
    pub nisn: Option<String>,
}

/// Partial update. Omitted fields are left unchanged; `"nisn": null` clears the NISN.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateReportRequest {
    pub npsn: Option<String>,
    pub school_name: Option<String>,
    pub category_id: Option<i64>,
    pub issue_description: Option<String>,
    #[serde(default, deserialize_with = "crate::nullable::deserialize")]
    pub nisn: Option<Option<String>>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: ReportStatus,
    pub note: Option<String>,
}

/// Query-string filters shared by the list, "mine" and export endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct ReportListQuery {
    pub status: Option<ReportStatus>,
    pub category_id: Option<i64>,
    pub reporter_id: Option<i64>,
    pub npsn: Option<String>,
    pub search: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
}

fn parse_date(field: &str, value: Option<String>) -> Result<Option<Date>, AppError> {
    let Some(value) = blank_to_none(value) else {
        return Ok(None);
    };
    Date::parse(&value, format_description!("[year]-[month]-[day]"))
        .map(Some)
        .map_err(|_| AppError::validation(format!("{} must be a date in YYYY-MM-DD format", field)))
}

impl TryFrom<ReportListQuery> for ReportFilter {
    type Error = AppError;

    fn try_from(q: ReportListQuery) -> Result<Self, Self::Error> {
        Ok(ReportFilter {
            status: q.status,
            category_id: q.category_id,
            reporter_id: q.reporter_id,
            npsn: blank_to_none(q.npsn),
            search: blank_to_none(q.search),
            date_from: parse_date("date_from", q.date_from)?,
            date_to: parse_date("date_to", q.date_to)?,
        })
    }
}

/// Single report with its full timeline, oldest entry first.
#[derive(Debug, Serialize)]
pub struct ReportDetail {
    #[serde(flatten)]
    pub report: ReportListItem,
    pub progress: Vec<ProgressEntryView>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn query_converts_to_filter() {
        let q = ReportListQuery {
            status: Some(ReportStatus::Done),
            search: Some("   ".into()),
            npsn: Some("12345678".into()),
            date_from: Some("2024-03-01".into()),
            date_to: Some("".into()),
            ..ReportListQuery::default()
        };
        let f = ReportFilter::try_from(q).unwrap();
        assert_eq!(f.status, Some(ReportStatus::Done));
        assert_eq!(f.search, None);
        assert_eq!(f.npsn.as_deref(), Some("12345678"));
        assert_eq!(f.date_from, Some(date!(2024 - 03 - 01)));
        assert_eq!(f.date_to, None);
    }

    #[test]
    fn bad_date_is_a_validation_error() {
        let q = ReportListQuery {
            date_to: Some("31/01/2024".into()),
            ..ReportListQuery::default()
        };
        let err = ReportFilter::try_from(q).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(err.to_string().contains("date_to"));
    }

    #[test]
    fn update_request_tracks_nisn_presence() {
        let omitted: UpdateReportRequest =
            serde_json::from_str(r#"{"school_name":"SDN 3"}"#).unwrap();
        assert!(omitted.nisn.is_none());

        let cleared: UpdateReportRequest = serde_json::from_str(r#"{"nisn":null}"#).unwrap();
        assert_eq!(cleared.nisn, Some(None));
    }

    #[test]
    fn status_request_accepts_aliases() {
        let req: UpdateStatusRequest =
            serde_json::from_str(r#"{"status":"in_progress","note":"reviewing"}"#).unwrap();
        assert_eq!(req.status, ReportStatus::InProgress);
        assert_eq!(req.note.as_deref(), Some("reviewing"));
    }
}
