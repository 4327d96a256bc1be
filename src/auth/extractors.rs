use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tracing::warn;

use crate::auth::jwt::JwtKeys;
use crate::auth::repo_types::User;
use crate::error::ApiError;
use crate::state::AppState;

/// What an Authorization header value amounts to before any cryptography
/// happens. The boundary is deliberately lenient: only a value that splits
/// into exactly two whitespace-separated fields with the expected scheme
/// counts as a credential attempt. One field, three or more fields, or a
/// different scheme are all treated as anonymous rather than rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credential {
    Anonymous,
    Attempt(String),
}

pub fn classify_header(scheme: &str, header: Option<&str>) -> Credential {
    let Some(value) = header else {
        return Credential::Anonymous;
    };
    let parts: Vec<&str> = value.split_whitespace().collect();
    if parts.len() != 2 {
        return Credential::Anonymous;
    }
    if !parts[0].eq_ignore_ascii_case(scheme) {
        return Credential::Anonymous;
    }
    Credential::Attempt(parts[1].to_string())
}

/// Resolve a credential attempt to an active user. Every failure mode maps
/// to a structured `AuthenticationFailed`; no decode error escapes raw.
async fn authenticate_credentials(
    state: &AppState,
    token: &str,
) -> Result<(User, String), ApiError> {
    let keys = JwtKeys::from_ref(state);

    let claims = match keys.verify(token) {
        Ok(c) => c,
        Err(e) => {
            warn!(error = %e, "token decode failed");
            return Err(ApiError::AuthenticationFailed(
                "Invalid authentication. Could not decode token".into(),
            ));
        }
    };

    let user = match User::find_by_id(&state.db, claims.id).await? {
        Some(u) => u,
        None => {
            return Err(ApiError::AuthenticationFailed(
                "No user matching this token was found".into(),
            ));
        }
    };

    if !user.is_active {
        return Err(ApiError::AuthenticationFailed(
            "This user has been deactivated".into(),
        ));
    }

    Ok((user, token.to_string()))
}

/// Required authentication: the user/token pair for endpoints that demand
/// an identity. An anonymous request is rejected outright.
pub struct AuthUser {
    pub user: User,
    pub token: String,
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok());

        match classify_header(&state.config.jwt.scheme, header) {
            Credential::Anonymous => Err(ApiError::Unauthenticated),
            Credential::Attempt(token) => {
                let (user, token) = authenticate_credentials(state, &token).await?;
                Ok(AuthUser { user, token })
            }
        }
    }
}

/// Optional authentication for endpoints that serve anonymous readers too.
/// An absent or malformed header yields no identity; a real credential
/// attempt that fails is still an error.
pub struct MaybeUser(pub Option<User>);

#[async_trait]
impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok());

        match classify_header(&state.config.jwt.scheme, header) {
            Credential::Anonymous => Ok(MaybeUser(None)),
            Credential::Attempt(token) => {
                let (user, _) = authenticate_credentials(state, &token).await?;
                Ok(MaybeUser(Some(user)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_header_is_anonymous() {
        assert_eq!(classify_header("Token", None), Credential::Anonymous);
    }

    #[test]
    fn scheme_alone_is_anonymous() {
        assert_eq!(classify_header("Token", Some("Token")), Credential::Anonymous);
    }

    #[test]
    fn three_fields_are_anonymous() {
        assert_eq!(
            classify_header("Token", Some("Token a b")),
            Credential::Anonymous
        );
    }

    #[test]
    fn wrong_scheme_is_anonymous() {
        assert_eq!(
            classify_header("Token", Some("Bearer abc")),
            Credential::Anonymous
        );
    }

    #[test]
    fn scheme_match_is_case_insensitive() {
        assert_eq!(
            classify_header("Token", Some("tOkEn abc")),
            Credential::Attempt("abc".into())
        );
    }

    #[test]
    fn two_fields_with_scheme_are_an_attempt() {
        assert_eq!(
            classify_header("Token", Some("Token abc")),
            Credential::Attempt("abc".into())
        );
    }

    #[test]
    fn extra_internal_whitespace_still_splits_to_two() {
        // split_whitespace collapses runs, so this is still an attempt
        assert_eq!(
            classify_header("Token", Some("Token    abc")),
            Credential::Attempt("abc".into())
        );
    }

    #[test]
    fn empty_header_is_anonymous() {
        assert_eq!(classify_header("Token", Some("")), Credential::Anonymous);
    }

    // Decode failure is decided before any user lookup, so the fake
    // state's lazy pool is never connected.
    #[tokio::test]
    async fn undecodable_token_is_an_authentication_failure() {
        let state = AppState::fake();
        let err = authenticate_credentials(&state, "garbage")
            .await
            .unwrap_err();
        match err {
            ApiError::AuthenticationFailed(msg) => {
                assert_eq!(msg, "Invalid authentication. Could not decode token");
            }
            other => panic!("expected AuthenticationFailed, got {other:?}"),
        }
    }
}
