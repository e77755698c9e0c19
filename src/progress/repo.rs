use sqlx::{PgExecutor, PgPool};

use super::repo_types::{ProgressEntry, ProgressEntryView};
use crate::reports::ReportStatus;

/// Note attached to the entry written when a report is filed.
pub const CREATED_NOTE: &str = "report created";

const VIEW_SELECT: &str = r#"
    SELECT p.id, p.report_id, p.admin_id, p.status, p.note, p.created_at,
           u.name AS admin_name
      FROM report_progress p
      LEFT JOIN users u ON u.id = p.admin_id
     WHERE p.report_id = $1"#;

impl ProgressEntry {
    /// Insert a ledger row. Callers run this inside the transaction that changes the report.
    pub async fn append<'e, E>(
        db: E,
        report_id: i64,
        admin_id: Option<i64>,
        status: ReportStatus,
        note: Option<&str>,
    ) -> Result<ProgressEntry, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, ProgressEntry>(
            r#"
            INSERT INTO report_progress (report_id, admin_id, status, note)
            VALUES ($1, $2, $3, $4)
            RETURNING id, report_id, admin_id, status, note, created_at
            "#,
        )
        .bind(report_id)
        .bind(admin_id)
        .bind(status)
        .bind(note)
        .fetch_one(db)
        .await
    }

    /// Standalone timeline: newest entry first.
    pub async fn list_newest_first(
        db: &PgPool,
        report_id: i64,
    ) -> Result<Vec<ProgressEntryView>, sqlx::Error> {
        let sql = format!("{} ORDER BY p.created_at DESC, p.id DESC", VIEW_SELECT);
        sqlx::query_as::<_, ProgressEntryView>(&sql)
            .bind(report_id)
            .fetch_all(db)
            .await
    }

    /// Timeline as embedded in a report detail: oldest entry first.
    pub async fn list_oldest_first(
        db: &PgPool,
        report_id: i64,
    ) -> Result<Vec<ProgressEntryView>, sqlx::Error> {
        let sql = format!("{} ORDER BY p.created_at ASC, p.id ASC", VIEW_SELECT);
        sqlx::query_as::<_, ProgressEntryView>(&sql)
            .bind(report_id)
            .fetch_all(db)
            .await
    }

    pub async fn delete_by_report<'e, E>(db: E, report_id: i64) -> Result<u64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let res = sqlx::query("DELETE FROM report_progress WHERE report_id = $1")
            .bind(report_id)
            .execute(db)
            .await?;
        Ok(res.rows_affected())
    }

    pub async fn count_by_report(db: &PgPool, report_id: i64) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM report_progress WHERE report_id = $1")
            .bind(report_id)
            .fetch_one(db)
            .await
    }
}
