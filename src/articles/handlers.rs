use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument};

use crate::articles::dto::{
    ArticleBody, ArticleResponse, ArticlesResponse, ArticleView, CommentBody, CommentResponse,
    CommentsResponse, CommentView, CreateArticle, CreateComment, Pagination,
};
use crate::articles::repo;
use crate::articles::repo_types::Article;
use crate::articles::slug::slugify;
use crate::auth::extractors::{AuthUser, MaybeUser};
use crate::error::ApiError;
use crate::state::AppState;

pub fn article_routes() -> Router<AppState> {
    Router::new()
        .route("/articles", get(list_articles).post(create_article))
        .route("/articles/:slug", get(get_article))
        .route(
            "/articles/:slug/favorite",
            post(favorite_article).delete(unfavorite_article),
        )
}

pub fn comment_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/articles/:slug/comments",
            get(list_comments).post(create_comment),
        )
        .route("/articles/:slug/comments/:id", axum::routing::delete(delete_comment))
}

async fn lookup(db: &sqlx::PgPool, slug: &str) -> Result<Article, ApiError> {
    repo::find_by_slug(db, slug)
        .await?
        .ok_or(ApiError::NotFound("article"))
}

#[instrument(skip(state, viewer))]
pub async fn list_articles(
    State(state): State<AppState>,
    MaybeUser(viewer): MaybeUser,
    Query(p): Query<Pagination>,
) -> Result<Json<ArticlesResponse>, ApiError> {
    let viewer_id = viewer.map(|u| u.id);
    let rows = repo::list_articles(&state.db, p.limit.clamp(1, 100), p.offset.max(0)).await?;
    let articles_count = repo::count_articles(&state.db).await?;

    let mut articles = Vec::with_capacity(rows.len());
    for article in &rows {
        articles.push(ArticleView::for_viewer(&state.db, article, viewer_id).await?);
    }

    Ok(Json(ArticlesResponse {
        articles,
        articles_count,
    }))
}

#[instrument(skip(state, auth, payload))]
pub async fn create_article(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<ArticleBody<CreateArticle>>,
) -> Result<(StatusCode, Json<ArticleResponse>), ApiError> {
    let CreateArticle {
        title,
        description,
        body,
    } = payload.article;

    let title = title.trim().to_string();
    if title.is_empty() {
        return Err(ApiError::validation("title", "This field may not be blank."));
    }

    let slug = slugify(&title);
    let article =
        repo::insert_article(&state.db, auth.user.id, &slug, &title, &description, &body).await?;

    info!(article_id = %article.id, slug = %article.slug, "article created");
    let view = ArticleView::for_viewer(&state.db, &article, Some(auth.user.id)).await?;
    Ok((StatusCode::CREATED, Json(ArticleResponse { article: view })))
}

#[instrument(skip(state, viewer))]
pub async fn get_article(
    State(state): State<AppState>,
    MaybeUser(viewer): MaybeUser,
    Path(slug): Path<String>,
) -> Result<Json<ArticleResponse>, ApiError> {
    let article = lookup(&state.db, &slug).await?;
    let view = ArticleView::for_viewer(&state.db, &article, viewer.map(|u| u.id)).await?;
    Ok(Json(ArticleResponse { article: view }))
}

#[instrument(skip(state, auth))]
pub async fn favorite_article(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(slug): Path<String>,
) -> Result<Json<ArticleResponse>, ApiError> {
    let article = lookup(&state.db, &slug).await?;
    repo::favorite(&state.db, auth.user.id, article.id).await?;
    info!(profile = %auth.user.id, article_id = %article.id, "favorite");
    let view = ArticleView::for_viewer(&state.db, &article, Some(auth.user.id)).await?;
    Ok(Json(ArticleResponse { article: view }))
}

#[instrument(skip(state, auth))]
pub async fn unfavorite_article(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(slug): Path<String>,
) -> Result<Json<ArticleResponse>, ApiError> {
    let article = lookup(&state.db, &slug).await?;
    repo::unfavorite(&state.db, auth.user.id, article.id).await?;
    info!(profile = %auth.user.id, article_id = %article.id, "unfavorite");
    let view = ArticleView::for_viewer(&state.db, &article, Some(auth.user.id)).await?;
    Ok(Json(ArticleResponse { article: view }))
}

#[instrument(skip(state, viewer))]
pub async fn list_comments(
    State(state): State<AppState>,
    MaybeUser(viewer): MaybeUser,
    Path(slug): Path<String>,
) -> Result<Json<CommentsResponse>, ApiError> {
    let viewer_id = viewer.map(|u| u.id);
    let article = lookup(&state.db, &slug).await?;
    let rows = repo::list_comments(&state.db, article.id).await?;

    let mut comments = Vec::with_capacity(rows.len());
    for comment in &rows {
        comments.push(CommentView::for_viewer(&state.db, comment, viewer_id).await?);
    }

    Ok(Json(CommentsResponse { comments }))
}

#[instrument(skip(state, auth, payload))]
pub async fn create_comment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(slug): Path<String>,
    Json(payload): Json<CommentBody<CreateComment>>,
) -> Result<(StatusCode, Json<CommentResponse>), ApiError> {
    let body = payload.comment.body.trim().to_string();
    if body.is_empty() {
        return Err(ApiError::validation("body", "This field may not be blank."));
    }

    let article = lookup(&state.db, &slug).await?;
    let comment = repo::insert_comment(&state.db, article.id, auth.user.id, &body).await?;

    info!(comment_id = %comment.id, article_id = %article.id, "comment created");
    let view = CommentView::for_viewer(&state.db, &comment, Some(auth.user.id)).await?;
    Ok((StatusCode::CREATED, Json(CommentResponse { comment: view })))
}

#[instrument(skip(state, auth))]
pub async fn delete_comment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((slug, id)): Path<(String, i64)>,
) -> Result<StatusCode, ApiError> {
    let article = lookup(&state.db, &slug).await?;
    let comment = repo::find_comment(&state.db, id)
        .await?
        .filter(|c| c.article_id == article.id)
        .ok_or(ApiError::NotFound("comment"))?;

    if comment.author_id != auth.user.id {
        return Err(ApiError::Forbidden(
            "You do not have permission to delete this comment".into(),
        ));
    }

    repo::delete_comment(&state.db, comment.id).await?;
    info!(comment_id = %comment.id, "comment deleted");
    Ok(StatusCode::NO_CONTENT)
}
