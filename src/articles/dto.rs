use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use time::OffsetDateTime;

use crate::articles::repo;
use crate::articles::repo_types::{Article, Comment};
use crate::profiles::{self, ProfileView};

#[derive(Debug, Deserialize)]
pub struct ArticleBody<T> {
    pub article: T,
}

#[derive(Debug, Deserialize)]
pub struct CreateArticle {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub body: String,
}

#[derive(Debug, Serialize)]
pub struct ArticleResponse {
    pub article: ArticleView,
}

#[derive(Debug, Serialize)]
pub struct ArticlesResponse {
    pub articles: Vec<ArticleView>,
    #[serde(rename = "articlesCount")]
    pub articles_count: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleView {
    pub slug: String,
    pub title: String,
    pub description: String,
    pub body: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    pub favorited: bool,
    pub favorites_count: i64,
    pub author: ProfileView,
}

impl ArticleView {
    pub async fn for_viewer(
        db: &PgPool,
        article: &Article,
        viewer_id: Option<i64>,
    ) -> anyhow::Result<Self> {
        let author = profiles::repo::find_by_user_id(db, article.author_id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("article {} has no author profile", article.id))?;
        let author = ProfileView::for_viewer(db, &author, viewer_id).await?;

        let favorited = match viewer_id {
            Some(viewer_id) => repo::has_favorited(db, viewer_id, article.id).await?,
            None => false,
        };
        let favorites_count = repo::favorites_count(db, article.id).await?;

        Ok(Self {
            slug: article.slug.clone(),
            title: article.title.clone(),
            description: article.description.clone(),
            body: article.body.clone(),
            created_at: article.created_at,
            updated_at: article.updated_at,
            favorited,
            favorites_count,
            author,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct CommentBody<T> {
    pub comment: T,
}

#[derive(Debug, Deserialize)]
pub struct CreateComment {
    pub body: String,
}

#[derive(Debug, Serialize)]
pub struct CommentResponse {
    pub comment: CommentView,
}

#[derive(Debug, Serialize)]
pub struct CommentsResponse {
    pub comments: Vec<CommentView>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    pub id: i64,
    pub body: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    pub author: ProfileView,
}

impl CommentView {
    pub async fn for_viewer(
        db: &PgPool,
        comment: &Comment,
        viewer_id: Option<i64>,
    ) -> anyhow::Result<Self> {
        let author = profiles::repo::find_by_user_id(db, comment.author_id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("comment {} has no author profile", comment.id))?;
        let author = ProfileView::for_viewer(db, &author, viewer_id).await?;

        Ok(Self {
            id: comment.id,
            body: comment.body.clone(),
            created_at: comment.created_at,
            updated_at: comment.updated_at,
            author,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct Pagination {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    20
}
