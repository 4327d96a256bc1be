use sqlx::PgPool;

use crate::articles::repo_types::{Article, Comment};

pub async fn insert_article(
    db: &PgPool,
    author_id: i64,
    slug: &str,
    title: &str,
    description: &str,
    body: &str,
) -> anyhow::Result<Article> {
    let article = sqlx::query_as::<_, Article>(
        r#"
        INSERT INTO articles (author_id, slug, title, description, body)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, author_id, slug, title, description, body, created_at, updated_at
        "#,
    )
    .bind(author_id)
    .bind(slug)
    .bind(title)
    .bind(description)
    .bind(body)
    .fetch_one(db)
    .await?;
    Ok(article)
}

pub async fn find_by_slug(db: &PgPool, slug: &str) -> anyhow::Result<Option<Article>> {
    let article = sqlx::query_as::<_, Article>(
        r#"
        SELECT id, author_id, slug, title, description, body, created_at, updated_at
        FROM articles
        WHERE slug = $1
        "#,
    )
    .bind(slug)
    .fetch_optional(db)
    .await?;
    Ok(article)
}

/// Reverse-chronological listing.
pub async fn list_articles(db: &PgPool, limit: i64, offset: i64) -> anyhow::Result<Vec<Article>> {
    let rows = sqlx::query_as::<_, Article>(
        r#"
        SELECT id, author_id, slug, title, description, body, created_at, updated_at
        FROM articles
        ORDER BY created_at DESC
        LIMIT $1 OFFSET $2
        "#,
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn count_articles(db: &PgPool) -> anyhow::Result<i64> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM articles")
        .fetch_one(db)
        .await?;
    Ok(count)
}

/// Favoriting an already favorited article is a no-op, not an error.
pub async fn favorite(db: &PgPool, profile_id: i64, article_id: i64) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO favorites (profile_id, article_id)
        VALUES ($1, $2)
        ON CONFLICT DO NOTHING
        "#,
    )
    .bind(profile_id)
    .bind(article_id)
    .execute(db)
    .await?;
    Ok(())
}

/// Unfavoriting an article that was never favorited is likewise a no-op.
pub async fn unfavorite(db: &PgPool, profile_id: i64, article_id: i64) -> anyhow::Result<()> {
    sqlx::query("DELETE FROM favorites WHERE profile_id = $1 AND article_id = $2")
        .bind(profile_id)
        .bind(article_id)
        .execute(db)
        .await?;
    Ok(())
}

pub async fn has_favorited(db: &PgPool, profile_id: i64, article_id: i64) -> anyhow::Result<bool> {
    let (exists,): (bool,) = sqlx::query_as(
        "SELECT EXISTS(SELECT 1 FROM favorites WHERE profile_id = $1 AND article_id = $2)",
    )
    .bind(profile_id)
    .bind(article_id)
    .fetch_one(db)
    .await?;
    Ok(exists)
}

pub async fn favorites_count(db: &PgPool, article_id: i64) -> anyhow::Result<i64> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM favorites WHERE article_id = $1")
        .bind(article_id)
        .fetch_one(db)
        .await?;
    Ok(count)
}

pub async fn insert_comment(
    db: &PgPool,
    article_id: i64,
    author_id: i64,
    body: &str,
) -> anyhow::Result<Comment> {
    let comment = sqlx::query_as::<_, Comment>(
        r#"
        INSERT INTO comments (article_id, author_id, body)
        VALUES ($1, $2, $3)
        RETURNING id, article_id, author_id, body, created_at, updated_at
        "#,
    )
    .bind(article_id)
    .bind(author_id)
    .bind(body)
    .fetch_one(db)
    .await?;
    Ok(comment)
}

pub async fn list_comments(db: &PgPool, article_id: i64) -> anyhow::Result<Vec<Comment>> {
    let rows = sqlx::query_as::<_, Comment>(
        r#"
        SELECT id, article_id, author_id, body, created_at, updated_at
        FROM comments
        WHERE article_id = $1
        ORDER BY created_at DESC
        "#,
    )
    .bind(article_id)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn find_comment(db: &PgPool, id: i64) -> anyhow::Result<Option<Comment>> {
    let comment = sqlx::query_as::<_, Comment>(
        r#"
        SELECT id, article_id, author_id, body, created_at, updated_at
        FROM comments
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await?;
    Ok(comment)
}

pub async fn delete_comment(db: &PgPool, id: i64) -> anyhow::Result<()> {
    sqlx::query("DELETE FROM comments WHERE id = $1")
        .bind(id)
        .execute(db)
        .await?;
    Ok(())
}
