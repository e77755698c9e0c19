use sqlx::{PgExecutor, PgPool, Postgres, QueryBuilder};

use super::repo_types::{NewUser, ResolvedUser, User, UserChanges, UserFilter};
use crate::pagination::Pagination;
use crate::reports::query::like_pattern;

const USER_COLUMNS: &str =
    "id, username, email, name, password_hash, role, is_active, created_at, updated_at";

impl User {
    pub async fn find_by_id<'e, E>(db: E, id: i64) -> Result<Option<User>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(db)
            .await
    }

    /// Find a user by username, or by email (case-insensitive).
    pub async fn find_by_login(db: &PgPool, login: &str) -> Result<Option<User>, sqlx::Error> {
        let sql = format!(
            "SELECT {} FROM users WHERE username = $1 OR lower(email) = lower($1) LIMIT 1",
            USER_COLUMNS
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(login)
            .fetch_optional(db)
            .await
    }

    pub async fn find_by_username(
        db: &PgPool,
        username: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        let sql = format!("SELECT {} FROM users WHERE username = $1", USER_COLUMNS);
        sqlx::query_as::<_, User>(&sql)
            .bind(username)
            .fetch_optional(db)
            .await
    }

    /// Role and active flag for `id`, or `None` when no such account exists.
    pub async fn resolve<'e, E>(db: E, id: i64) -> Result<Option<ResolvedUser>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, ResolvedUser>("SELECT role, is_active FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(db)
            .await
    }

    pub async fn create(db: &PgPool, new: &NewUser) -> Result<User, sqlx::Error> {
        let sql = format!(
            r#"
            INSERT INTO users (username, email, name, password_hash, role)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            USER_COLUMNS
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(&new.username)
            .bind(&new.email)
            .bind(&new.name)
            .bind(&new.password_hash)
            .bind(new.role)
            .fetch_one(db)
            .await
    }

    /// Apply the present fields and bump `updated_at`. `None` if the user does not exist.
    pub async fn update(
        db: &PgPool,
        id: i64,
        changes: &UserChanges,
    ) -> Result<Option<User>, sqlx::Error> {
        let mut qb = QueryBuilder::<Postgres>::new("UPDATE users SET ");
        let mut set = qb.separated(", ");
        if let Some(username) = &changes.username {
            set.push("username = ").push_bind_unseparated(username.clone());
        }
        if let Some(email) = &changes.email {
            set.push("email = ").push_bind_unseparated(email.clone());
        }
        if let Some(name) = &changes.name {
            set.push("name = ").push_bind_unseparated(name.clone());
        }
        if let Some(hash) = &changes.password_hash {
            set.push("password_hash = ").push_bind_unseparated(hash.clone());
        }
        if let Some(role) = changes.role {
            set.push("role = ").push_bind_unseparated(role);
        }
        if let Some(active) = changes.is_active {
            set.push("is_active = ").push_bind_unseparated(active);
        }
        set.push("updated_at = now()");

        qb.push(" WHERE id = ")
            .push_bind(id)
            .push(" RETURNING ")
            .push(USER_COLUMNS);

        qb.build_query_as::<User>().fetch_optional(db).await
    }

    /// Flip the active flag off. Returns whether a row matched.
    pub async fn deactivate(db: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        let res = sqlx::query("UPDATE users SET is_active = FALSE, updated_at = now() WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    pub async fn list(
        db: &PgPool,
        filter: &UserFilter,
        page: Pagination,
    ) -> Result<(Vec<User>, i64), sqlx::Error> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM users");
        push_filters(&mut count, filter);
        let total: i64 = count.build_query_scalar().fetch_one(db).await?;

        let mut qb = QueryBuilder::<Postgres>::new(format!("SELECT {} FROM users", USER_COLUMNS));
        push_filters(&mut qb, filter);
        qb.push(" ORDER BY created_at DESC, id DESC LIMIT ")
            .push_bind(page.limit)
            .push(" OFFSET ")
            .push_bind(page.offset());
        let rows = qb.build_query_as::<User>().fetch_all(db).await?;

        Ok((rows, total))
    }
}

fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &UserFilter) {
    qb.push(" WHERE 1=1");
    if let Some(role) = filter.role {
        qb.push(" AND role = ").push_bind(role);
    }
    if let Some(active) = filter.is_active {
        qb.push(" AND is_active = ").push_bind(active);
    }
    if let Some(term) = &filter.search {
        let pattern = like_pattern(term);
        qb.push(" AND (username ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR email ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR name ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}
