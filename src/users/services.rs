use tracing::{info, warn};

use super::dto::{CreateUserRequest, UpdateUserRequest};
use super::repo_types::{NewUser, Role, User, UserChanges};
use crate::auth::password::hash_password;
use crate::config::SeedAdmin;
use crate::error::{AppError, AppResult};
use crate::validate;

pub async fn create_user(db: &sqlx::PgPool, req: CreateUserRequest) -> AppResult<User> {
    let username = req.username.trim().to_string();
    let email = req.email.trim().to_lowercase();
    let name = req.name.trim().to_string();

    validate::username(&username)?;
    validate::email(&email)?;
    validate::required_text("Name", &name)?;
    validate::password(&req.password)?;

    let password_hash = hash_password(&req.password)?;
    let user = User::create(
        db,
        &NewUser {
            username,
            email,
            name,
            password_hash,
            role: req.role,
        },
    )
    .await?;

    info!(user_id = user.id, username = %user.username, role = ?user.role, "user created");
    Ok(user)
}

pub async fn update_user(
    db: &sqlx::PgPool,
    id: i64,
    req: UpdateUserRequest,
) -> AppResult<User> {
    let mut changes = UserChanges {
        role: req.role,
        is_active: req.is_active,
        ..UserChanges::default()
    };

    if let Some(username) = req.username {
        let username = username.trim().to_string();
        validate::username(&username)?;
        changes.username = Some(username);
    }
    if let Some(email) = req.email {
        let email = email.trim().to_lowercase();
        validate::email(&email)?;
        changes.email = Some(email);
    }
    if let Some(name) = req.name {
        let name = name.trim().to_string();
        validate::required_text("Name", &name)?;
        changes.name = Some(name);
    }
    if let Some(password) = req.password {
        validate::password(&password)?;
        changes.password_hash = Some(hash_password(&password)?);
    }

    let user = User::update(db, id, &changes)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    info!(user_id = user.id, "user updated");
    Ok(user)
}

/// Creates the configured bootstrap admin unless the username is already taken.
pub async fn ensure_seed_admin(db: &sqlx::PgPool, seed: &SeedAdmin) -> AppResult<()> {
    if User::find_by_username(db, &seed.username).await?.is_some() {
        return Ok(());
    }

    let user = create_user(
        db,
        CreateUserRequest {
            username: seed.username.clone(),
            email: seed.email.clone(),
            name: seed.name.clone(),
            password: seed.password.clone(),
            role: Role::Admin,
        },
    )
    .await
    .map_err(|e| {
        warn!(error = %e, username = %seed.username, "seed admin not created");
        e
    })?;

    info!(user_id = user.id, "seed admin created");
    Ok(())
}
