use sqlx::{PgPool, Postgres, Transaction};

use crate::profiles::repo_types::Profile;

/// Create the empty profile row for a freshly registered user, inside the
/// registration transaction.
pub async fn create(tx: &mut Transaction<'_, Postgres>, user_id: i64) -> anyhow::Result<()> {
    sqlx::query("INSERT INTO profiles (user_id) VALUES ($1)")
        .bind(user_id)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

pub async fn find_by_user_id(db: &PgPool, user_id: i64) -> anyhow::Result<Option<Profile>> {
    let profile = sqlx::query_as::<_, Profile>(
        r#"
        SELECT p.user_id, u.username, p.bio, p.image, p.created_at, p.updated_at
        FROM profiles p
        JOIN users u ON u.id = p.user_id
        WHERE p.user_id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(db)
    .await?;
    Ok(profile)
}

pub async fn find_by_username(db: &PgPool, username: &str) -> anyhow::Result<Option<Profile>> {
    let profile = sqlx::query_as::<_, Profile>(
        r#"
        SELECT p.user_id, u.username, p.bio, p.image, p.created_at, p.updated_at
        FROM profiles p
        JOIN users u ON u.id = p.user_id
        WHERE u.username = $1
        "#,
    )
    .bind(username)
    .fetch_optional(db)
    .await?;
    Ok(profile)
}

/// Partial merge of bio/image; absent fields keep their stored values.
pub async fn update(
    db: &PgPool,
    user_id: i64,
    bio: Option<&str>,
    image: Option<&str>,
) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        UPDATE profiles
        SET bio = COALESCE($2, bio), image = COALESCE($3, image), updated_at = now()
        WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .bind(bio)
    .bind(image)
    .execute(db)
    .await?;
    Ok(())
}

/// Add the directed edge follower -> followee. Following someone already
/// followed is a no-op, not an error.
pub async fn follow(db: &PgPool, follower_id: i64, followee_id: i64) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO follows (follower_id, followee_id)
        VALUES ($1, $2)
        ON CONFLICT DO NOTHING
        "#,
    )
    .bind(follower_id)
    .bind(followee_id)
    .execute(db)
    .await?;
    Ok(())
}

/// Remove the edge if present; removing an absent edge is a no-op.
pub async fn unfollow(db: &PgPool, follower_id: i64, followee_id: i64) -> anyhow::Result<()> {
    sqlx::query("DELETE FROM follows WHERE follower_id = $1 AND followee_id = $2")
        .bind(follower_id)
        .bind(followee_id)
        .execute(db)
        .await?;
    Ok(())
}

pub async fn is_following(db: &PgPool, follower_id: i64, followee_id: i64) -> anyhow::Result<bool> {
    let (exists,): (bool,) = sqlx::query_as(
        "SELECT EXISTS(SELECT 1 FROM follows WHERE follower_id = $1 AND followee_id = $2)",
    )
    .bind(follower_id)
    .bind(followee_id)
    .fetch_one(db)
    .await?;
    Ok(exists)
}

/// Derived from the reverse edge: "is A followed by B" is "does B follow A".
pub async fn is_followed_by(db: &PgPool, profile_id: i64, other_id: i64) -> anyhow::Result<bool> {
    is_following(db, other_id, profile_id).await
}
