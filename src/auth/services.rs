use lazy_static::lazy_static;
use regex::Regex;
use sqlx::PgPool;
use tracing::info;

use crate::auth::password::{hash_password, verify_password};
use crate::auth::repo_types::User;
use crate::error::ApiError;
use crate::profiles;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Case-fold the domain part only; the local part is case-sensitive per
/// the mail RFCs. Registration and login both go through this, so lookups
/// stay consistent.
pub(crate) fn normalize_email(email: &str) -> String {
    let email = email.trim();
    match email.rsplit_once('@') {
        Some((local, domain)) => format!("{}@{}", local, domain.to_lowercase()),
        None => email.to_string(),
    }
}

/// Register a new user. Missing fields are typed validation errors, not
/// deserialization failures. Hashes the password, normalizes the email and
/// creates the one-to-one profile row in the same transaction. Defaults:
/// active, not staff.
pub async fn create_user(
    db: &PgPool,
    username: Option<&str>,
    email: Option<&str>,
    password: Option<&str>,
) -> Result<User, ApiError> {
    let username = username.unwrap_or_default().trim();
    if username.is_empty() {
        return Err(ApiError::validation("username", "Users must have a username."));
    }

    let email = normalize_email(email.unwrap_or_default());
    if email.is_empty() {
        return Err(ApiError::validation(
            "email",
            "Users must provide an email address.",
        ));
    }
    if !is_valid_email(&email) {
        return Err(ApiError::validation("email", "Enter a valid email address."));
    }

    let Some(password) = password else {
        return Err(ApiError::validation("password", "A password is required."));
    };
    if password.len() < 8 || password.len() > 128 {
        return Err(ApiError::validation(
            "password",
            "Password must be between 8 and 128 characters.",
        ));
    }

    if User::find_by_username(db, username).await?.is_some() {
        return Err(ApiError::validation(
            "username",
            "A user with that username already exists.",
        ));
    }
    if User::find_by_email(db, &email).await?.is_some() {
        return Err(ApiError::validation(
            "email",
            "A user with that email already exists.",
        ));
    }

    let hash = hash_password(password)?;

    let mut tx = db.begin().await?;
    let user = User::insert(&mut tx, username, &email, &hash).await?;
    profiles::repo::create(&mut tx, user.id).await?;
    tx.commit().await?;

    info!(user_id = %user.id, username = %user.username, "user registered");
    Ok(user)
}

/// Create a user with admin permissions. Unlike `create_user` callers this
/// path must always supply a password.
pub async fn create_superuser(
    db: &PgPool,
    username: &str,
    email: &str,
    password: &str,
) -> Result<User, ApiError> {
    if password.is_empty() {
        return Err(ApiError::validation(
            "password",
            "Superusers must have a password.",
        ));
    }
    let user = create_user(db, Some(username), Some(email), Some(password)).await?;
    let user = User::promote(db, user.id).await?;
    info!(user_id = %user.id, "superuser created");
    Ok(user)
}

/// Look up by email and check the password against the stored hash.
/// Returns `None` for unknown email, wrong password and unparsable hash
/// alike, so callers cannot be used to enumerate accounts.
pub async fn authenticate(
    db: &PgPool,
    email: &str,
    password: &str,
) -> anyhow::Result<Option<User>> {
    let email = normalize_email(email);
    let Some(user) = User::find_by_email(db, &email).await? else {
        return Ok(None);
    };
    let ok = verify_password(password, &user.password_hash).unwrap_or(false);
    Ok(ok.then_some(user))
}

/// Partial-merge update. A supplied password is re-hashed, never stored
/// verbatim.
pub async fn update_user(
    db: &PgPool,
    mut user: User,
    username: Option<&str>,
    email: Option<&str>,
    password: Option<&str>,
) -> Result<User, ApiError> {
    if let Some(username) = username {
        let username = username.trim();
        if username.is_empty() {
            return Err(ApiError::validation("username", "Users must have a username."));
        }
        if username != user.username && User::find_by_username(db, username).await?.is_some() {
            return Err(ApiError::validation(
                "username",
                "A user with that username already exists.",
            ));
        }
        user.username = username.to_string();
    }

    if let Some(email) = email {
        let email = normalize_email(email);
        if !is_valid_email(&email) {
            return Err(ApiError::validation("email", "Enter a valid email address."));
        }
        if email != user.email && User::find_by_email(db, &email).await?.is_some() {
            return Err(ApiError::validation(
                "email",
                "A user with that email already exists.",
            ));
        }
        user.email = email;
    }

    if let Some(password) = password {
        if password.len() < 8 || password.len() > 128 {
            return Err(ApiError::validation(
                "password",
                "Password must be between 8 and 128 characters.",
            ));
        }
        user.password_hash = hash_password(password)?;
    }

    let user = user.update(db).await?;
    info!(user_id = %user.id, "user updated");
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_domain_is_case_folded() {
        assert_eq!(normalize_email("Jake@EXAMPLE.Com"), "Jake@example.com");
    }

    #[test]
    fn email_local_part_is_untouched() {
        assert_eq!(normalize_email("  MixedCase@site.org "), "MixedCase@site.org");
    }

    #[test]
    fn email_without_at_passes_through() {
        assert_eq!(normalize_email("not-an-email"), "not-an-email");
    }

    #[test]
    fn email_shape_check() {
        assert!(is_valid_email("jake@example.com"));
        assert!(!is_valid_email("jake@example"));
        assert!(!is_valid_email("jake example@site.com"));
        assert!(!is_valid_email(""));
    }

    // The missing-field checks all return before any query runs, so the
    // fake state's lazy pool is never connected.

    fn validation_field(err: ApiError) -> String {
        match err {
            ApiError::Validation(fields) => {
                fields.keys().next().expect("one field").to_string()
            }
            other => panic!("expected a validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn register_without_username_is_a_validation_error() {
        let state = crate::state::AppState::fake();
        let err = create_user(&state.db, None, Some("jake@example.com"), Some("password123"))
            .await
            .unwrap_err();
        assert_eq!(validation_field(err), "username");
    }

    #[tokio::test]
    async fn register_with_blank_username_is_a_validation_error() {
        let state = crate::state::AppState::fake();
        let err = create_user(&state.db, Some("   "), Some("jake@example.com"), Some("password123"))
            .await
            .unwrap_err();
        assert_eq!(validation_field(err), "username");
    }

    #[tokio::test]
    async fn register_without_email_is_a_validation_error() {
        let state = crate::state::AppState::fake();
        let err = create_user(&state.db, Some("jake"), None, Some("password123"))
            .await
            .unwrap_err();
        assert_eq!(validation_field(err), "email");
    }

    #[tokio::test]
    async fn register_without_password_is_a_validation_error() {
        let state = crate::state::AppState::fake();
        let err = create_user(&state.db, Some("jake"), Some("jake@example.com"), None)
            .await
            .unwrap_err();
        assert_eq!(validation_field(err), "password");
    }

    #[tokio::test]
    async fn register_with_short_password_is_a_validation_error() {
        let state = crate::state::AppState::fake();
        let err = create_user(&state.db, Some("jake"), Some("jake@example.com"), Some("short"))
            .await
            .unwrap_err();
        assert_eq!(validation_field(err), "password");
    }
}
