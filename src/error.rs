use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Map, Value};
use tracing::error;

/// API error taxonomy. Everything a handler or extractor can fail with is
/// one of these, and every variant renders as `{"errors": {...}}`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Missing or invalid input at creation/update time, keyed by field.
    #[error("validation failed")]
    Validation(Map<String, Value>),

    /// A credential was presented but could not be resolved to a user.
    #[error("{0}")]
    AuthenticationFailed(String),

    /// The endpoint requires authentication and none was attempted.
    #[error("Authentication credentials were not provided.")]
    Unauthenticated,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Forbidden(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    /// Single-field validation error.
    pub fn validation(field: &str, message: &str) -> Self {
        let mut errors = Map::new();
        errors.insert(field.to_string(), json!([message]));
        Self::Validation(errors)
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        Self::Internal(e.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, errors) = match self {
            Self::Validation(fields) => (StatusCode::UNPROCESSABLE_ENTITY, Value::Object(fields)),
            Self::AuthenticationFailed(msg) => {
                (StatusCode::UNAUTHORIZED, json!({ "detail": [msg] }))
            }
            Self::Unauthenticated => (
                StatusCode::UNAUTHORIZED,
                json!({ "detail": ["Authentication credentials were not provided."] }),
            ),
            Self::NotFound(what) => (
                StatusCode::NOT_FOUND,
                json!({ "detail": [format!("{what} not found")] }),
            ),
            Self::Forbidden(msg) => (StatusCode::FORBIDDEN, json!({ "detail": [msg] })),
            Self::Internal(e) => {
                error!(error = %e, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "detail": ["internal server error"] }),
                )
            }
        };
        (status, Json(json!({ "errors": errors }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_wraps_field_messages() {
        let err = ApiError::validation("email", "An email address is required to log in");
        match err {
            ApiError::Validation(fields) => {
                assert_eq!(
                    fields["email"],
                    json!(["An email address is required to log in"])
                );
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn authentication_failed_keeps_message() {
        let err = ApiError::AuthenticationFailed("This user has been deactivated".into());
        assert_eq!(err.to_string(), "This user has been deactivated");
    }
}
