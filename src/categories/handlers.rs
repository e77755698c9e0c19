use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{instrument, warn};

use super::dto::{CategoryListQuery, CreateCategoryRequest, UpdateCategoryRequest};
use super::repo_types::Category;
use super::services;
use crate::{
    auth::extractors::{ActiveAdmin, AuthUser},
    error::{AppError, AppResult},
    state::AppState,
    users::dto::SuccessResponse,
};

pub fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/categories", get(list_categories).post(create_category))
        .route(
            "/categories/:id",
            get(get_category)
                .patch(update_category)
                .delete(delete_category),
        )
}

#[instrument(skip(state))]
pub async fn list_categories(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(q): Query<CategoryListQuery>,
) -> AppResult<Json<Vec<Category>>> {
    // Reporters only ever see categories they can file under
    let include_inactive = q.include_inactive && auth.is_admin();
    let rows = Category::list(&state.db, include_inactive).await?;
    Ok(Json(rows))
}

#[instrument(skip(state))]
pub async fn get_category(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<i64>,
) -> AppResult<Json<Category>> {
    let category = Category::find_by_id(&state.db, id).await?.ok_or_else(|| {
        warn!(category_id = id, "category not found");
        AppError::not_found("Category not found")
    })?;
    Ok(Json(category))
}

#[instrument(skip(state, payload))]
pub async fn create_category(
    State(state): State<AppState>,
    ActiveAdmin(admin_id): ActiveAdmin,
    Json(payload): Json<CreateCategoryRequest>,
) -> AppResult<(StatusCode, Json<Category>)> {
    let category = services::create_category(&state.db, payload)
        .await
        .map_err(|e| {
            warn!(error = %e, admin_id, "create category failed");
            e
        })?;
    Ok((StatusCode::CREATED, Json(category)))
}

#[instrument(skip(state, payload))]
pub async fn update_category(
    State(state): State<AppState>,
    ActiveAdmin(admin_id): ActiveAdmin,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateCategoryRequest>,
) -> AppResult<Json<Category>> {
    let category = services::update_category(&state.db, id, payload)
        .await
        .map_err(|e| {
            warn!(error = %e, admin_id, category_id = id, "update category failed");
            e
        })?;
    Ok(Json(category))
}

#[instrument(skip(state))]
pub async fn delete_category(
    State(state): State<AppState>,
    ActiveAdmin(admin_id): ActiveAdmin,
    Path(id): Path<i64>,
) -> AppResult<Json<SuccessResponse>> {
    services::delete_category(&state.db, id).await.map_err(|e| {
        warn!(error = %e, admin_id, category_id = id, "delete category failed");
        e
    })?;
    Ok(Json(SuccessResponse { success: true }))
}
