use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use sqlx::PgPool;
use tracing::warn;

use super::claims::TokenKind;
use super::jwt::JwtKeys;
use crate::{
    error::AppError,
    users::{Role, User},
};

/// Caller identified by a valid access token.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub id: i64,
    pub role: Role,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Caller holding an admin access token; yields the admin's user ID.
#[derive(Debug, Clone, Copy)]
pub struct AdminUser(pub i64);

/// Like [`AdminUser`], but the account is looked up on every request, so a deactivated
/// or demoted admin is refused even while their token is still valid.
#[derive(Debug, Clone, Copy)]
pub struct ActiveAdmin(pub i64);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = JwtKeys::from_ref(state);

        // Read Authorization header
        let auth_header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized("Missing Authorization header".into()))?;

        // Expect "Bearer <token>"
        let token = auth_header
            .strip_prefix("Bearer ")
            .or_else(|| auth_header.strip_prefix("bearer "))
            .ok_or_else(|| AppError::Unauthorized("Invalid Authorization header".into()))?;

        let claims = keys.verify(token).map_err(|_| {
            warn!("invalid or expired token");
            AppError::Unauthorized("Invalid or expired token".into())
        })?;

        if claims.kind != TokenKind::Access {
            return Err(AppError::Unauthorized("Access token required".into()));
        }

        Ok(AuthUser {
            id: claims.sub,
            role: claims.role,
        })
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !user.is_admin() {
            warn!(user_id = user.id, "admin route called by non-admin");
            return Err(AppError::Forbidden("Admin access required".into()));
        }
        Ok(AdminUser(user.id))
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for ActiveAdmin
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
    PgPool: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AdminUser(admin_id) = AdminUser::from_request_parts(parts, state).await?;

        let db = PgPool::from_ref(state);
        let active = User::resolve(&db, admin_id)
            .await?
            .map(|u| u.is_active_admin())
            .unwrap_or(false);
        if !active {
            warn!(user_id = admin_id, "admin token for inactive or demoted account");
            return Err(AppError::Forbidden("Admin access required".into()));
        }
        Ok(ActiveAdmin(admin_id))
    }
}
