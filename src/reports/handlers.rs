use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch},
    Json, Router,
};
use tracing::{instrument, warn};

use super::dto::{
    CreateReportRequest, ReportDetail, ReportListQuery, UpdateReportRequest, UpdateStatusRequest,
};
use super::repo_types::{Report, ReportFilter, ReportListItem};
use super::{query, services};
use crate::{
    auth::extractors::{ActiveAdmin, AdminUser, AuthUser},
    error::{AppError, AppResult},
    pagination::{Paginated, Pagination},
    state::AppState,
    users::dto::SuccessResponse,
};

pub fn report_routes() -> Router<AppState> {
    Router::new()
        .route("/reports", get(list_reports).post(create_report))
        .route("/reports/mine", get(list_my_reports))
        .route(
            "/reports/:id",
            get(get_report).patch(update_report).delete(delete_report),
        )
        .route("/reports/:id/status", patch(update_status))
}

#[instrument(skip(state, payload))]
pub async fn create_report(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreateReportRequest>,
) -> AppResult<(StatusCode, Json<Report>)> {
    let report = services::create_report(&state.db, auth.id, payload)
        .await
        .map_err(|e| {
            warn!(error = %e, reporter_id = auth.id, "create report failed");
            e
        })?;
    Ok((StatusCode::CREATED, Json(report)))
}

#[instrument(skip(state))]
pub async fn list_reports(
    State(state): State<AppState>,
    ActiveAdmin(_admin_id): ActiveAdmin,
    Query(q): Query<ReportListQuery>,
    Query(p): Query<Pagination>,
) -> AppResult<Json<Paginated<ReportListItem>>> {
    let filter = ReportFilter::try_from(q)?;
    let page = query::list(&state.db, &filter, p.normalized()).await?;
    Ok(Json(page))
}

#[instrument(skip(state))]
pub async fn list_my_reports(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(q): Query<ReportListQuery>,
    Query(p): Query<Pagination>,
) -> AppResult<Json<Paginated<ReportListItem>>> {
    let filter = ReportFilter::try_from(q)?;
    let page = query::list_by_user(&state.db, auth.id, filter, p.normalized()).await?;
    Ok(Json(page))
}

#[instrument(skip(state))]
pub async fn get_report(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i64>,
) -> AppResult<Json<ReportDetail>> {
    let detail = services::get_detail(&state.db, id)
        .await?
        .filter(|d| auth.is_admin() || d.report.report.reporter_id == auth.id)
        .ok_or_else(|| {
            warn!(report_id = id, user_id = auth.id, "report not visible");
            AppError::NotFoundOrForbidden("Report not found".into())
        })?;
    Ok(Json(detail))
}

#[instrument(skip(state, payload))]
pub async fn update_report(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateReportRequest>,
) -> AppResult<Json<Report>> {
    let report = services::update_by_reporter(&state.db, id, payload, auth.id)
        .await
        .map_err(|e| {
            warn!(error = %e, report_id = id, reporter_id = auth.id, "update report failed");
            e
        })?;
    Ok(Json(report))
}

#[instrument(skip(state))]
pub async fn delete_report(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i64>,
) -> AppResult<Json<SuccessResponse>> {
    services::delete_by_reporter(&state.db, id, auth.id)
        .await
        .map_err(|e| {
            warn!(error = %e, report_id = id, reporter_id = auth.id, "delete report failed");
            e
        })?;
    Ok(Json(SuccessResponse { success: true }))
}

#[instrument(skip(state, payload))]
pub async fn update_status(
    State(state): State<AppState>,
    AdminUser(admin_id): AdminUser,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateStatusRequest>,
) -> AppResult<Json<Report>> {
    let report = services::update_status(&state.db, id, payload.status, payload.note, admin_id)
        .await
        .map_err(|e| {
            warn!(error = %e, report_id = id, admin_id, "update status failed");
            e
        })?;
    Ok(Json(report))
}
