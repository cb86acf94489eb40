use crate::auth::permissions::Permission;
use http::StatusCode;
use thiserror::Error;

/// Errors raised while authenticating and authorizing a request.
///
/// Each variant carries the description returned to the caller.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("{0}")]
    AuthHeaderMissing(String),
    #[error("{0}")]
    AuthHeaderMalformed(String),
    #[error("{0}")]
    SigningKeyNotFound(String),
    #[error("{0}")]
    InvalidSignature(String),
    #[error("{0}")]
    TokenExpired(String),
    #[error("{0}")]
    InvalidClaims(String),
    #[error("Permission not found.")]
    InsufficientScope(Permission),
}

impl AuthError {
    pub fn header_missing() -> Self {
        Self::AuthHeaderMissing("Authorization header is expected.".to_string())
    }

    pub fn header_malformed<S: ToString>(description: S) -> Self {
        Self::AuthHeaderMalformed(description.to_string())
    }

    pub fn key_not_found() -> Self {
        Self::SigningKeyNotFound("Unable to find the appropriate key.".to_string())
    }

    pub fn invalid_signature() -> Self {
        Self::InvalidSignature("Unable to parse authentication token.".to_string())
    }

    pub fn expired() -> Self {
        Self::TokenExpired("Token expired.".to_string())
    }

    pub fn invalid_claims() -> Self {
        Self::InvalidClaims("Incorrect claims. Please, check the audience and issuer.".to_string())
    }

    /// Stable machine-readable code, used in logs
    pub fn code(&self) -> &'static str {
        match self {
            Self::AuthHeaderMissing(_) => "authorization_header_missing",
            Self::AuthHeaderMalformed(_)
            | Self::SigningKeyNotFound(_)
            | Self::InvalidSignature(_) => "invalid_header",
            Self::TokenExpired(_) => "token_expired",
            Self::InvalidClaims(_) => "invalid_claims",
            Self::InsufficientScope(_) => "unauthorized",
        }
    }

    /// 401 for authentication failures, 403 for a missing permission
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InsufficientScope(_) => StatusCode::FORBIDDEN,
            _ => StatusCode::UNAUTHORIZED,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AuthError::header_missing().status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(AuthError::expired().status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            AuthError::key_not_found().status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthError::InsufficientScope(Permission::DeleteMovies).status_code(),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn test_descriptions_and_codes() {
        let err = AuthError::header_malformed("Token not found.");
        assert_eq!(err.to_string(), "Token not found.");
        assert_eq!(err.code(), "invalid_header");

        let err = AuthError::InsufficientScope(Permission::PostActors);
        assert_eq!(err.to_string(), "Permission not found.");
        assert_eq!(err.code(), "unauthorized");

        assert_eq!(AuthError::invalid_claims().code(), "invalid_claims");
        assert_eq!(AuthError::expired().to_string(), "Token expired.");
    }
}
