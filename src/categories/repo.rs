use sqlx::{PgExecutor, PgPool, Postgres, QueryBuilder};

use super::repo_types::{Category, CategoryChanges};

const CATEGORY_COLUMNS: &str = "id, name, description, is_active, created_at, updated_at";

impl Category {
    pub async fn list(db: &PgPool, include_inactive: bool) -> Result<Vec<Category>, sqlx::Error> {
        let sql = format!(
            "SELECT {} FROM categories WHERE is_active OR $1 ORDER BY name ASC",
            CATEGORY_COLUMNS
        );
        sqlx::query_as::<_, Category>(&sql)
            .bind(include_inactive)
            .fetch_all(db)
            .await
    }

    pub async fn find_by_id(db: &PgPool, id: i64) -> Result<Option<Category>, sqlx::Error> {
        let sql = format!("SELECT {} FROM categories WHERE id = $1", CATEGORY_COLUMNS);
        sqlx::query_as::<_, Category>(&sql)
            .bind(id)
            .fetch_optional(db)
            .await
    }

    /// Active flag for `id`, or `None` when the category does not exist.
    pub async fn resolve<'e, E>(db: E, id: i64) -> Result<Option<bool>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_scalar::<_, bool>("SELECT is_active FROM categories WHERE id = $1")
            .bind(id)
            .fetch_optional(db)
            .await
    }

    pub async fn create(
        db: &PgPool,
        name: &str,
        description: Option<&str>,
    ) -> Result<Category, sqlx::Error> {
        let sql = format!(
            "INSERT INTO categories (name, description) VALUES ($1, $2) RETURNING {}",
            CATEGORY_COLUMNS
        );
        sqlx::query_as::<_, Category>(&sql)
            .bind(name)
            .bind(description)
            .fetch_one(db)
            .await
    }

    pub async fn update(
        db: &PgPool,
        id: i64,
        changes: &CategoryChanges,
    ) -> Result<Option<Category>, sqlx::Error> {
        let mut qb = QueryBuilder::<Postgres>::new("UPDATE categories SET ");
        let mut set = qb.separated(", ");
        if let Some(name) = &changes.name {
            set.push("name = ").push_bind_unseparated(name.clone());
        }
        if let Some(description) = &changes.description {
            set.push("description = ")
                .push_bind_unseparated(description.clone());
        }
        if let Some(active) = changes.is_active {
            set.push("is_active = ").push_bind_unseparated(active);
        }
        set.push("updated_at = now()");

        qb.push(" WHERE id = ")
            .push_bind(id)
            .push(" RETURNING ")
            .push(CATEGORY_COLUMNS);

        qb.build_query_as::<Category>().fetch_optional(db).await
    }

    pub async fn count_reports<'e, E>(db: E, id: i64) -> Result<i64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM reports WHERE category_id = $1")
            .bind(id)
            .fetch_one(db)
            .await
    }

    pub async fn deactivate<'e, E>(db: E, id: i64) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let res = sqlx::query(
            "UPDATE categories SET is_active = FALSE, updated_at = now() WHERE id = $1",
        )
        .bind(id)
        .execute(db)
        .await?;
        Ok(res.rows_affected() > 0)
    }
}
