use axum::{extract::State, routing::get, Json, Router};
use tracing::instrument;

use super::dto::{AdminDashboard, UserDashboard};
use super::repo;
use crate::{
    auth::extractors::{ActiveAdmin, AuthUser},
    error::AppResult,
    reports::query,
    state::AppState,
};

const RECENT_LIMIT: i64 = 5;

pub fn dashboard_routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard/user", get(user_dashboard))
        .route("/dashboard/admin", get(admin_dashboard))
}

#[instrument(skip(state))]
pub async fn user_dashboard(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<UserDashboard>> {
    let counts = repo::status_counts(&state.db, Some(auth.id)).await?;
    let recent = query::recent(&state.db, Some(auth.id), RECENT_LIMIT).await?;
    Ok(Json(UserDashboard { counts, recent }))
}

#[instrument(skip(state))]
pub async fn admin_dashboard(
    State(state): State<AppState>,
    ActiveAdmin(_admin_id): ActiveAdmin,
) -> AppResult<Json<AdminDashboard>> {
    let (counts, by_category, by_month, recent) = tokio::try_join!(
        repo::status_counts(&state.db, None),
        repo::counts_by_category(&state.db),
        repo::counts_by_month(&state.db),
        query::recent(&state.db, None, RECENT_LIMIT),
    )?;
    Ok(Json(AdminDashboard {
        counts,
        by_category,
        by_month,
        recent,
    }))
}
