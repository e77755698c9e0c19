use sqlx::PgPool;
use tracing::{info, warn};

use super::dto::{CreateCategoryRequest, UpdateCategoryRequest};
use super::repo_types::{Category, CategoryChanges};
use crate::error::{AppError, AppResult};
use crate::validate::{self, blank_to_none};

pub async fn create_category(db: &PgPool, req: CreateCategoryRequest) -> AppResult<Category> {
    let name = req.name.trim().to_string();
    validate::required_text("Category name", &name)?;
    let description = blank_to_none(req.description);

    let category = Category::create(db, &name, description.as_deref()).await?;
    info!(category_id = category.id, name = %category.name, "category created");
    Ok(category)
}

pub async fn update_category(
    db: &PgPool,
    id: i64,
    req: UpdateCategoryRequest,
) -> AppResult<Category> {
    let mut changes = CategoryChanges {
        is_active: req.is_active,
        description: req.description.map(blank_to_none),
        ..CategoryChanges::default()
    };
    if let Some(name) = req.name {
        let name = name.trim().to_string();
        validate::required_text("Category name", &name)?;
        changes.name = Some(name);
    }

    let category = Category::update(db, id, &changes)
        .await?
        .ok_or_else(|| AppError::not_found("Category not found"))?;
    info!(category_id = id, "category updated");
    Ok(category)
}

/// Soft delete, refused while any report references the category.
pub async fn delete_category(db: &PgPool, id: i64) -> AppResult<()> {
    let mut tx = db.begin().await?;

    if Category::resolve(&mut *tx, id).await?.is_none() {
        return Err(AppError::not_found("Category not found"));
    }

    let used_by = Category::count_reports(&mut *tx, id).await?;
    if used_by > 0 {
        warn!(category_id = id, used_by, "category still referenced by reports");
        return Err(AppError::Conflict(format!(
            "Category is used by {} report(s) and cannot be deleted",
            used_by
        )));
    }

    Category::deactivate(&mut *tx, id).await?;
    tx.commit().await?;

    info!(category_id = id, "category deactivated");
    Ok(())
}
