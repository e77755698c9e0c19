use axum::{
    extract::{FromRef, State},
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use super::{
    dto::{AuthResponse, ChangePasswordRequest, LoginRequest, RefreshRequest},
    extractors::AuthUser,
    jwt::JwtKeys,
    password::{hash_password, verify_against_dummy, verify_password},
};
use crate::{
    error::{AppError, AppResult},
    state::AppState,
    users::{
        dto::{PublicUser, SuccessResponse},
        repo_types::UserChanges,
        User,
    },
    validate,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
        .route("/auth/password", post(change_password))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/me", get(get_me))
}

fn issue_tokens(state: &AppState, user: User) -> AppResult<AuthResponse> {
    let keys = JwtKeys::from_ref(state);
    let access_token = keys.sign_access(user.id, user.role)?;
    let refresh_token = keys.sign_refresh(user.id, user.role)?;
    Ok(AuthResponse {
        access_token,
        refresh_token,
        user: user.into(),
    })
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let login = payload.username.trim();
    if login.is_empty() || payload.password.is_empty() {
        warn!("login with empty credentials");
        return Err(AppError::validation("Username and password are required"));
    }

    let user = match User::find_by_login(&state.db, login).await? {
        Some(u) => u,
        None => {
            verify_against_dummy(&payload.password);
            warn!(login = %login, "login unknown user");
            return Err(AppError::Unauthorized("Invalid credentials".into()));
        }
    };

    if !verify_password(&payload.password, &user.password_hash) {
        warn!(user_id = user.id, "login invalid password");
        return Err(AppError::Unauthorized("Invalid credentials".into()));
    }

    if !user.is_active {
        warn!(user_id = user.id, "login on inactive account");
        return Err(AppError::Forbidden("Account is inactive".into()));
    }

    info!(user_id = user.id, username = %user.username, "user logged in");
    Ok(Json(issue_tokens(&state, user)?))
}

#[instrument(skip(state, payload))]
pub async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> AppResult<Json<AuthResponse>> {
    let keys = JwtKeys::from_ref(&state);
    let claims = keys.verify_refresh(&payload.refresh_token).map_err(|e| {
        warn!(error = %e, "refresh token rejected");
        AppError::Unauthorized("Invalid or expired refresh token".into())
    })?;

    // Role and active flag may have changed since the token was issued
    let user = User::find_by_id(&state.db, claims.sub)
        .await?
        .filter(|u| u.is_active)
        .ok_or_else(|| {
            warn!(user_id = claims.sub, "refresh for missing or inactive user");
            AppError::Unauthorized("User not found".into())
        })?;

    Ok(Json(issue_tokens(&state, user)?))
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<PublicUser>> {
    let user = User::find_by_id(&state.db, auth.id).await?.ok_or_else(|| {
        warn!(user_id = auth.id, "user not found");
        AppError::Unauthorized("User not found".into())
    })?;

    Ok(Json(user.into()))
}

#[instrument(skip(state, payload))]
pub async fn change_password(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<ChangePasswordRequest>,
) -> AppResult<Json<SuccessResponse>> {
    validate::password(&payload.new_password)?;

    let user = User::find_by_id(&state.db, auth.id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User not found".into()))?;

    if !verify_password(&payload.current_password, &user.password_hash) {
        warn!(user_id = user.id, "change password with wrong current password");
        return Err(AppError::validation("Current password is incorrect"));
    }

    let changes = UserChanges {
        password_hash: Some(hash_password(&payload.new_password)?),
        ..UserChanges::default()
    };
    User::update(&state.db, user.id, &changes).await?;

    info!(user_id = user.id, "password changed");
    Ok(Json(SuccessResponse { success: true }))
}
