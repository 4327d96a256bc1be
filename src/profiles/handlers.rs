use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument};

use crate::auth::extractors::{AuthUser, MaybeUser};
use crate::error::ApiError;
use crate::profiles::dto::{ProfileBody, ProfileView};
use crate::profiles::repo;
use crate::profiles::repo_types::Profile;
use crate::state::AppState;

pub fn profile_routes() -> Router<AppState> {
    Router::new()
        .route("/profiles/:username", get(get_profile))
        .route(
            "/profiles/:username/follow",
            post(follow_profile).delete(unfollow_profile),
        )
}

async fn lookup(db: &sqlx::PgPool, username: &str) -> Result<Profile, ApiError> {
    repo::find_by_username(db, username)
        .await?
        .ok_or(ApiError::NotFound("profile"))
}

#[instrument(skip(state, viewer))]
pub async fn get_profile(
    State(state): State<AppState>,
    MaybeUser(viewer): MaybeUser,
    Path(username): Path<String>,
) -> Result<Json<ProfileBody>, ApiError> {
    let profile = lookup(&state.db, &username).await?;
    let view = ProfileView::for_viewer(&state.db, &profile, viewer.map(|u| u.id)).await?;
    Ok(Json(ProfileBody { profile: view }))
}

#[instrument(skip(state, auth))]
pub async fn follow_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(username): Path<String>,
) -> Result<Json<ProfileBody>, ApiError> {
    let profile = lookup(&state.db, &username).await?;
    repo::follow(&state.db, auth.user.id, profile.user_id).await?;
    info!(follower = %auth.user.id, followee = %profile.user_id, "follow");
    let view = ProfileView::for_viewer(&state.db, &profile, Some(auth.user.id)).await?;
    Ok(Json(ProfileBody { profile: view }))
}

#[instrument(skip(state, auth))]
pub async fn unfollow_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(username): Path<String>,
) -> Result<Json<ProfileBody>, ApiError> {
    let profile = lookup(&state.db, &username).await?;
    repo::unfollow(&state.db, auth.user.id, profile.user_id).await?;
    info!(follower = %auth.user.id, followee = %profile.user_id, "unfollow");
    let view = ProfileView::for_viewer(&state.db, &profile, Some(auth.user.id)).await?;
    Ok(Json(ProfileBody { profile: view }))
}
