use crate::state::AppState;
use axum::Router;

mod dto;
pub mod handlers;
pub mod repo;
pub mod repo_types;
mod slug;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(handlers::article_routes())
        .merge(handlers::comment_routes())
}
