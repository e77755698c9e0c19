//! Report lifecycle: who may change a report, and when.
//!
//! Every mutation that touches more than one row runs in a single transaction so the
//! report and its progress ledger never diverge.

use sqlx::PgPool;
use tracing::{info, warn};

use super::dto::{CreateReportRequest, ReportDetail, UpdateReportRequest};
use super::query;
use super::repo_types::{NewReport, Report, ReportChanges, ReportStatus};
use crate::categories::Category;
use crate::error::{AppError, AppResult};
use crate::progress::{repo::CREATED_NOTE, ProgressEntry};
use crate::users::User;
use crate::validate::{self, blank_to_none};

const NOT_FOUND: &str = "Report not found";

fn validate_nisn(nisn: Option<String>) -> AppResult<Option<String>> {
    let nisn = blank_to_none(nisn);
    if let Some(n) = &nisn {
        validate::nisn(n)?;
    }
    Ok(nisn)
}

pub fn validate_new(req: CreateReportRequest) -> AppResult<NewReport> {
    let npsn = req.npsn.trim().to_string();
    let school_name = req.school_name.trim().to_string();
    let issue_description = req.issue_description.trim().to_string();

    validate::npsn(&npsn)?;
    validate::required_text("School name", &school_name)?;
    validate::issue_description(&issue_description)?;
    let nisn = validate_nisn(req.nisn)?;

    Ok(NewReport {
        npsn,
        school_name,
        category_id: req.category_id,
        issue_description,
        nisn,
    })
}

pub fn validate_changes(req: UpdateReportRequest) -> AppResult<ReportChanges> {
    let mut changes = ReportChanges {
        category_id: req.category_id,
        ..ReportChanges::default()
    };
    if let Some(npsn) = req.npsn {
        let npsn = npsn.trim().to_string();
        validate::npsn(&npsn)?;
        changes.npsn = Some(npsn);
    }
    if let Some(school_name) = req.school_name {
        let school_name = school_name.trim().to_string();
        validate::required_text("School name", &school_name)?;
        changes.school_name = Some(school_name);
    }
    if let Some(description) = req.issue_description {
        let description = description.trim().to_string();
        validate::issue_description(&description)?;
        changes.issue_description = Some(description);
    }
    if let Some(nisn) = req.nisn {
        changes.nisn = Some(validate_nisn(nisn)?);
    }
    Ok(changes)
}

async fn ensure_active_category<'e, E>(db: E, category_id: i64) -> AppResult<()>
where
    E: sqlx::PgExecutor<'e>,
{
    match Category::resolve(db, category_id).await? {
        Some(true) => Ok(()),
        _ => {
            warn!(category_id, "category missing or inactive");
            Err(AppError::not_found("Category not found"))
        }
    }
}

/// The report if it exists and belongs to `reporter_id`; missing and foreign look the same.
fn owned_by(report: Option<Report>, reporter_id: i64) -> AppResult<Report> {
    report
        .filter(|r| r.reporter_id == reporter_id)
        .ok_or_else(|| AppError::NotFoundOrForbidden(NOT_FOUND.into()))
}

fn ensure_editable(report: &Report) -> AppResult<()> {
    if report.status.editable_by_reporter() {
        Ok(())
    } else {
        Err(AppError::InvalidState(format!(
            "Only reports with status '{}' can be changed",
            ReportStatus::New
        )))
    }
}

/// Error for a guarded reporter write that matched no row: the report was removed,
/// or left `baru`, after it was first read.
fn stale_write(current: Option<Report>, reporter_id: i64) -> AppError {
    match owned_by(current, reporter_id).and_then(|r| ensure_editable(&r)) {
        Err(e) => e,
        Ok(()) => AppError::InvalidState("Report changed concurrently, try again".into()),
    }
}

/// File a new report and its initial ledger entry.
pub async fn create_report(
    db: &PgPool,
    reporter_id: i64,
    req: CreateReportRequest,
) -> AppResult<Report> {
    let input = validate_new(req)?;

    let mut tx = db.begin().await?;

    ensure_active_category(&mut *tx, input.category_id).await?;

    let reporter_ok = User::resolve(&mut *tx, reporter_id)
        .await?
        .map(|u| u.is_active)
        .unwrap_or(false);
    if !reporter_ok {
        warn!(reporter_id, "reporter missing or inactive");
        return Err(AppError::not_found("Reporter not found"));
    }

    let report = Report::insert(&mut *tx, reporter_id, &input).await?;
    ProgressEntry::append(&mut *tx, report.id, None, ReportStatus::New, Some(CREATED_NOTE))
        .await?;

    tx.commit().await?;

    info!(report_id = report.id, reporter_id, npsn = %report.npsn, "report created");
    Ok(report)
}

/// Reporter edit of their own report while it is still `baru`. Ledger untouched.
pub async fn update_by_reporter(
    db: &PgPool,
    report_id: i64,
    req: UpdateReportRequest,
    reporter_id: i64,
) -> AppResult<Report> {
    let changes = validate_changes(req)?;

    let mut tx = db.begin().await?;

    let report = owned_by(Report::find_by_id(&mut *tx, report_id).await?, reporter_id)?;
    ensure_editable(&report)?;

    if let Some(category_id) = changes.category_id {
        ensure_active_category(&mut *tx, category_id).await?;
    }

    let Some(updated) =
        Report::update_if_editable(&mut *tx, report_id, reporter_id, &changes).await?
    else {
        let current = Report::find_by_id(&mut *tx, report_id).await?;
        warn!(report_id, reporter_id, "report left editable state during update");
        return Err(stale_write(current, reporter_id));
    };
    tx.commit().await?;

    info!(report_id, reporter_id, "report updated by reporter");
    Ok(updated)
}

/// Reporter withdrawal of their own report while it is still `baru`.
pub async fn delete_by_reporter(db: &PgPool, report_id: i64, reporter_id: i64) -> AppResult<()> {
    let mut tx = db.begin().await?;

    let report = owned_by(Report::find_by_id(&mut *tx, report_id).await?, reporter_id)?;
    ensure_editable(&report)?;

    // Rolled back with the ledger rows if the guarded delete below matches nothing
    let entries = ProgressEntry::delete_by_report(&mut *tx, report_id).await?;
    if !Report::delete_if_editable(&mut *tx, report_id, reporter_id).await? {
        let current = Report::find_by_id(&mut *tx, report_id).await?;
        warn!(report_id, reporter_id, "report left editable state during delete");
        return Err(stale_write(current, reporter_id));
    }
    tx.commit().await?;

    info!(report_id, reporter_id, entries, "report deleted by reporter");
    Ok(())
}

/// Admin status change. Any status may follow any other; each call adds one ledger entry.
pub async fn update_status(
    db: &PgPool,
    report_id: i64,
    status: ReportStatus,
    note: Option<String>,
    admin_id: i64,
) -> AppResult<Report> {
    let note = blank_to_none(note);

    let mut tx = db.begin().await?;

    // Reported as a missing report so non-admins learn nothing about report ids
    let admin_ok = User::resolve(&mut *tx, admin_id)
        .await?
        .map(|a| a.is_active_admin())
        .unwrap_or(false);
    if !admin_ok {
        warn!(admin_id, "status update by unknown or inactive admin");
        return Err(AppError::not_found(NOT_FOUND));
    }

    let previous = Report::current_status(&mut *tx, report_id)
        .await?
        .ok_or_else(|| AppError::not_found(NOT_FOUND))?;

    let report = Report::set_status(&mut *tx, report_id, status)
        .await?
        .ok_or_else(|| AppError::not_found(NOT_FOUND))?;
    ProgressEntry::append(&mut *tx, report_id, Some(admin_id), status, note.as_deref()).await?;

    tx.commit().await?;

    info!(report_id, admin_id, from = %previous, to = %status, "report status updated");
    Ok(report)
}

/// Report with names and its oldest-first timeline, or `None` if absent.
pub async fn get_detail(db: &PgPool, report_id: i64) -> AppResult<Option<ReportDetail>> {
    let Some(report) = query::find_item(db, report_id).await? else {
        return Ok(None);
    };
    let progress = ProgressEntry::list_oldest_first(db, report_id).await?;
    Ok(Some(ReportDetail { report, progress }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_req() -> CreateReportRequest {
        CreateReportRequest {
            npsn: " 12345678 ".into(),
            school_name: "SDN 1 Sukamaju".into(),
            category_id: 1,
            issue_description: "Data siswa tidak muncul di Dapodik".into(),
            nisn: Some("".into()),
        }
    }

    #[test]
    fn validate_new_trims_and_drops_blank_nisn() {
        let new = validate_new(create_req()).unwrap();
        assert_eq!(new.npsn, "12345678");
        assert_eq!(new.nisn, None);
    }

    #[test]
    fn validate_new_rejects_bad_identifiers() {
        let mut req = create_req();
        req.npsn = "1234".into();
        assert!(matches!(validate_new(req), Err(AppError::Validation(_))));

        let mut req = create_req();
        req.nisn = Some("123".into());
        let err = validate_new(req).unwrap_err();
        assert!(err.to_string().contains("NISN"));

        let mut req = create_req();
        req.issue_description = "rusak".into();
        assert!(matches!(validate_new(req), Err(AppError::Validation(_))));
    }

    #[test]
    fn validate_changes_keeps_omitted_fields_absent() {
        let changes = validate_changes(UpdateReportRequest {
            school_name: Some("  SMPN 4  ".into()),
            ..UpdateReportRequest::default()
        })
        .unwrap();
        assert_eq!(changes.school_name.as_deref(), Some("SMPN 4"));
        assert!(changes.npsn.is_none());
        assert!(changes.nisn.is_none());
        assert!(changes.category_id.is_none());
        assert!(changes.issue_description.is_none());
    }

    #[test]
    fn validate_changes_can_clear_nisn() {
        let changes = validate_changes(UpdateReportRequest {
            nisn: Some(None),
            ..UpdateReportRequest::default()
        })
        .unwrap();
        assert_eq!(changes.nisn, Some(None));

        let bad = validate_changes(UpdateReportRequest {
            nisn: Some(Some("12".into())),
            ..UpdateReportRequest::default()
        });
        assert!(bad.is_err());
    }

    fn report(status: ReportStatus, reporter_id: i64) -> Report {
        let now = time::OffsetDateTime::now_utc();
        Report {
            id: 10,
            npsn: "12345678".into(),
            school_name: "SDN 1".into(),
            category_id: 1,
            issue_description: "Data siswa tidak muncul".into(),
            nisn: None,
            status,
            reporter_id,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn ownership_folds_missing_and_foreign() {
        assert!(owned_by(Some(report(ReportStatus::New, 5)), 5).is_ok());

        let foreign = owned_by(Some(report(ReportStatus::New, 5)), 6).unwrap_err();
        let missing = owned_by(None, 6).unwrap_err();
        assert!(matches!(foreign, AppError::NotFoundOrForbidden(_)));
        assert_eq!(foreign.to_string(), missing.to_string());
    }

    #[test]
    fn stale_write_reports_why_the_row_no_longer_matched() {
        let moved_on = stale_write(Some(report(ReportStatus::InProgress, 5)), 5);
        assert!(matches!(moved_on, AppError::InvalidState(_)));

        let gone = stale_write(None, 5);
        assert!(matches!(gone, AppError::NotFoundOrForbidden(_)));

        let still_new = stale_write(Some(report(ReportStatus::New, 5)), 5);
        assert!(matches!(still_new, AppError::InvalidState(_)));
    }

    #[test]
    fn only_new_reports_are_editable() {
        assert!(ensure_editable(&report(ReportStatus::New, 1)).is_ok());
        for status in [ReportStatus::InProgress, ReportStatus::Done] {
            let err = ensure_editable(&report(status, 1)).unwrap_err();
            assert!(matches!(err, AppError::InvalidState(_)));
            assert!(err.to_string().contains("baru"));
        }
    }
}
