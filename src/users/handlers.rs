use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument, warn};

use super::dto::{
    CreateUserRequest, PublicUser, SuccessResponse, UpdateUserRequest, UserListQuery,
};
use super::repo_types::{User, UserFilter};
use super::services;
use crate::{
    auth::extractors::ActiveAdmin,
    error::{AppError, AppResult},
    pagination::{Paginated, Pagination},
    state::AppState,
    validate::blank_to_none,
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route(
            "/users/:id",
            get(get_user).patch(update_user).delete(deactivate_user),
        )
}

#[instrument(skip(state))]
pub async fn list_users(
    State(state): State<AppState>,
    ActiveAdmin(_admin_id): ActiveAdmin,
    Query(q): Query<UserListQuery>,
    Query(p): Query<Pagination>,
) -> AppResult<Json<Paginated<PublicUser>>> {
    let filter = UserFilter {
        role: q.role,
        is_active: q.is_active,
        search: blank_to_none(q.search),
    };
    let page = p.normalized();
    let (rows, total) = User::list(&state.db, &filter, page).await?;
    let data = rows.into_iter().map(PublicUser::from).collect();
    Ok(Json(Paginated::new(data, total, page)))
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    ActiveAdmin(_admin_id): ActiveAdmin,
    Path(id): Path<i64>,
) -> AppResult<Json<PublicUser>> {
    let user = User::find_by_id(&state.db, id).await?.ok_or_else(|| {
        warn!(user_id = id, "user not found");
        AppError::not_found("User not found")
    })?;
    Ok(Json(user.into()))
}

#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    ActiveAdmin(admin_id): ActiveAdmin,
    Json(payload): Json<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<PublicUser>)> {
    let user = services::create_user(&state.db, payload)
        .await
        .map_err(|e| {
            warn!(error = %e, admin_id, "create user failed");
            e
        })?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

#[instrument(skip(state, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    ActiveAdmin(admin_id): ActiveAdmin,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateUserRequest>,
) -> AppResult<Json<PublicUser>> {
    let user = services::update_user(&state.db, id, payload)
        .await
        .map_err(|e| {
            warn!(error = %e, admin_id, user_id = id, "update user failed");
            e
        })?;
    Ok(Json(user.into()))
}

/// Soft delete. A missing id is a no-op and reports `success: false`.
#[instrument(skip(state))]
pub async fn deactivate_user(
    State(state): State<AppState>,
    ActiveAdmin(admin_id): ActiveAdmin,
    Path(id): Path<i64>,
) -> AppResult<Json<SuccessResponse>> {
    let success = User::deactivate(&state.db, id).await?;
    if success {
        info!(admin_id, user_id = id, "user deactivated");
    } else {
        warn!(admin_id, user_id = id, "deactivate: user not found");
    }
    Ok(Json(SuccessResponse { success }))
}
