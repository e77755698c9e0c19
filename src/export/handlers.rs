use axum::{
    extract::{Query, State},
    http::header,
    response::IntoResponse,
    routing::get,
    Router,
};
use bytes::Bytes;
use time::{macros::format_description, OffsetDateTime};
use tracing::{info, instrument};

use super::writer::reports_to_csv;
use crate::{
    auth::extractors::ActiveAdmin,
    error::AppResult,
    reports::{dto::ReportListQuery, query, repo_types::ReportFilter},
    state::AppState,
};

pub fn export_routes() -> Router<AppState> {
    Router::new().route("/export/reports", get(export_reports))
}

fn export_filename(now: OffsetDateTime) -> String {
    let day = now
        .date()
        .format(format_description!("[year]-[month]-[day]"))
        .unwrap_or_else(|_| "export".into());
    format!("laporan-{}.csv", day)
}

#[instrument(skip(state))]
pub async fn export_reports(
    State(state): State<AppState>,
    ActiveAdmin(admin_id): ActiveAdmin,
    Query(q): Query<ReportListQuery>,
) -> AppResult<impl IntoResponse> {
    let filter = ReportFilter::try_from(q)?;
    let rows = query::list_all(&state.db, &filter).await?;
    let body = reports_to_csv(&rows)?;

    info!(admin_id, rows = rows.len(), "reports exported");

    let disposition = format!(
        "attachment; filename=\"{}\"",
        export_filename(OffsetDateTime::now_utc())
    );
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        Bytes::from(body),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn filename_carries_the_date() {
        assert_eq!(
            export_filename(datetime!(2024-07-09 23:59:00 UTC)),
            "laporan-2024-07-09.csv"
        );
    }
}
