use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::auth::dto::{CurrentUser, LoginUser, RegisterUser, UpdateUser, UserBody};
use crate::auth::extractors::AuthUser;
use crate::auth::jwt::JwtKeys;
use crate::auth::repo_types::User;
use crate::auth::services;
use crate::error::ApiError;
use crate::profiles;
use crate::state::AppState;

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/users", post(register))
        .route("/users/login", post(login))
}

pub fn user_routes() -> Router<AppState> {
    Router::new().route(
        "/user",
        get(current_user)
            .put(update_current_user)
            .delete(deactivate_current_user),
    )
}

async fn user_body(
    state: &AppState,
    user: &User,
    token: String,
) -> Result<Json<UserBody<CurrentUser>>, ApiError> {
    let profile = profiles::repo::find_by_user_id(&state.db, user.id)
        .await?
        .ok_or(ApiError::NotFound("profile"))?;
    Ok(Json(UserBody {
        user: CurrentUser {
            email: user.email.clone(),
            username: user.username.clone(),
            token,
            bio: profile.bio,
            image: profile.image,
        },
    }))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<UserBody<RegisterUser>>,
) -> Result<(StatusCode, Json<UserBody<CurrentUser>>), ApiError> {
    let RegisterUser {
        username,
        email,
        password,
    } = payload.user;

    let user = services::create_user(
        &state.db,
        username.as_deref(),
        email.as_deref(),
        password.as_deref(),
    )
    .await?;

    let keys = JwtKeys::from_ref(&state);
    let token = keys.issue(user.id)?;

    let body = user_body(&state, &user, token).await?;
    Ok((StatusCode::CREATED, body))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<UserBody<LoginUser>>,
) -> Result<Json<UserBody<CurrentUser>>, ApiError> {
    let email = payload.user.email.ok_or_else(|| {
        ApiError::validation("email", "An email address is required to log in")
    })?;
    let password = payload
        .user
        .password
        .ok_or_else(|| ApiError::validation("password", "A password is required to log in"))?;

    let Some(user) = services::authenticate(&state.db, &email, &password).await? else {
        warn!("login failed");
        return Err(ApiError::validation(
            "error",
            "A user with this email and password was not found",
        ));
    };

    if !user.is_active {
        warn!(user_id = %user.id, "login attempt for deactivated user");
        return Err(ApiError::validation("error", "This user has been deactivated"));
    }

    let keys = JwtKeys::from_ref(&state);
    let token = keys.issue(user.id)?;

    info!(user_id = %user.id, "user logged in");
    user_body(&state, &user, token).await
}

#[instrument(skip(state, auth))]
pub async fn current_user(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<UserBody<CurrentUser>>, ApiError> {
    user_body(&state, &auth.user, auth.token).await
}

#[instrument(skip(state, auth, payload))]
pub async fn update_current_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<UserBody<UpdateUser>>,
) -> Result<Json<UserBody<CurrentUser>>, ApiError> {
    let UpdateUser {
        username,
        email,
        password,
        bio,
        image,
    } = payload.user;

    let user = services::update_user(
        &state.db,
        auth.user,
        username.as_deref(),
        email.as_deref(),
        password.as_deref(),
    )
    .await?;

    if bio.is_some() || image.is_some() {
        profiles::repo::update(&state.db, user.id, bio.as_deref(), image.as_deref()).await?;
    }

    user_body(&state, &user, auth.token).await
}

/// Accounts are never deleted: deactivation clears `is_active`, which in
/// turn makes every previously issued token fail the auth gate.
#[instrument(skip(state, auth))]
pub async fn deactivate_current_user(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<StatusCode, ApiError> {
    let user = User::deactivate(&state.db, auth.user.id).await?;
    info!(user_id = %user.id, "user deactivated");
    Ok(StatusCode::NO_CONTENT)
}
