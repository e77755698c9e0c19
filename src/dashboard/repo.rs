use sqlx::PgPool;

use super::dto::{CategoryCount, MonthCount, StatusCounts};
use crate::reports::ReportStatus;

/// Report counts per status, for one reporter or across all reports.
pub async fn status_counts(
    db: &PgPool,
    reporter_id: Option<i64>,
) -> Result<StatusCounts, sqlx::Error> {
    let rows = sqlx::query_as::<_, (ReportStatus, i64)>(
        r#"
        SELECT status, COUNT(*)
          FROM reports
         WHERE $1::BIGINT IS NULL OR reporter_id = $1
         GROUP BY status
        "#,
    )
    .bind(reporter_id)
    .fetch_all(db)
    .await?;
    Ok(StatusCounts::from_rows(rows))
}

pub async fn counts_by_category(db: &PgPool) -> Result<Vec<CategoryCount>, sqlx::Error> {
    sqlx::query_as::<_, CategoryCount>(
        r#"
        SELECT c.name AS category_name, COUNT(r.id) AS count
          FROM reports r
          JOIN categories c ON c.id = r.category_id
         GROUP BY c.id, c.name
         ORDER BY count DESC, c.name ASC
        "#,
    )
    .fetch_all(db)
    .await
}

/// Counts per creation month over the current month and the eleven before it.
pub async fn counts_by_month(db: &PgPool) -> Result<Vec<MonthCount>, sqlx::Error> {
    sqlx::query_as::<_, MonthCount>(
        r#"
        SELECT to_char(date_trunc('month', created_at), 'YYYY-MM') AS month,
               COUNT(*) AS count
          FROM reports
         WHERE created_at >= date_trunc('month', now()) - INTERVAL '11 months'
         GROUP BY 1
         ORDER BY 1 ASC
        "#,
    )
    .fetch_all(db)
    .await
}
