use crate::auth::error::AuthError;
use crate::auth::jwks::{KeySetStatus, KeyStore};
use crate::config::AuthConfig;
use http::HeaderValue;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, decode_header, Algorithm, Validation};
use log::debug;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

/// Decoded payload of a validated access token
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Claims {
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default)]
    pub iss: Option<String>,
    /// Either a single audience or a list of them
    #[serde(default)]
    pub aud: Option<Value>,
    #[serde(default)]
    pub exp: Option<i64>,
    #[serde(default)]
    pub iat: Option<i64>,
    #[serde(default)]
    pub permissions: Option<Vec<String>>,
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

impl Claims {
    /// Subject used in audit logs
    pub fn subject(&self) -> &str {
        self.sub.as_deref().unwrap_or("<anonymous>")
    }
}

/// Extracts the raw token from an `Authorization: Bearer <token>` header value
pub fn bearer_token(header: Option<&HeaderValue>) -> Result<&str, AuthError> {
    let header = header.ok_or_else(AuthError::header_missing)?;
    let value = header.to_str().map_err(|_| {
        AuthError::header_malformed("Authorization header must be bearer token.")
    })?;

    let parts: Vec<&str> = value.split_whitespace().collect();
    match parts.as_slice() {
        [scheme, ..] if !scheme.eq_ignore_ascii_case("bearer") => Err(
            AuthError::header_malformed("Authorization header must start with \"Bearer\"."),
        ),
        [] => Err(AuthError::header_malformed(
            "Authorization header must start with \"Bearer\".",
        )),
        [_] => Err(AuthError::header_malformed("Token not found.")),
        [_, token] => Ok(*token),
        _ => Err(AuthError::header_malformed(
            "Authorization header must be bearer token.",
        )),
    }
}

/// Verifies bearer tokens against the identity provider's signing keys
pub struct TokenValidator {
    keys: KeyStore,
    audience: String,
    issuer: String,
    algorithms: Vec<Algorithm>,
}

impl TokenValidator {
    pub fn new(config: &AuthConfig) -> Result<Self, String> {
        let algorithms = config.get_algorithms()?;
        let keys = KeyStore::new(config).map_err(|e| e.to_string())?;
        Ok(Self {
            keys,
            audience: config.audience.clone(),
            issuer: config.get_issuer(),
            algorithms,
        })
    }

    /// Validates the `Authorization` header value and returns the token's claims
    pub async fn validate(&self, header: Option<&HeaderValue>) -> Result<Claims, AuthError> {
        let token = bearer_token(header)?;

        let token_header = decode_header(token)
            .map_err(|_| AuthError::header_malformed("Unable to parse authentication token."))?;
        let kid = token_header
            .kid
            .ok_or_else(|| AuthError::header_malformed("Authorization malformed."))?;

        if !self.algorithms.contains(&token_header.alg) {
            debug!("Rejected token signed with {:?}", token_header.alg);
            return Err(AuthError::invalid_signature());
        }

        let key = self
            .keys
            .get(&kid)
            .await
            .ok_or_else(AuthError::key_not_found)?;

        let mut validation = Validation::new(token_header.alg);
        validation.set_audience(&[&self.audience]);
        validation.set_issuer(&[&self.issuer]);
        validation.set_required_spec_claims(&["exp", "aud", "iss"]);

        decode::<Claims>(token, &key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::expired(),
                ErrorKind::InvalidAudience
                | ErrorKind::InvalidIssuer
                | ErrorKind::MissingRequiredClaim(_)
                | ErrorKind::ImmatureSignature => AuthError::invalid_claims(),
                _ => {
                    debug!("Token verification failed: {e}");
                    AuthError::invalid_signature()
                }
            })
    }

    /// Status of the signing key cache, for readiness reporting
    pub fn key_status(&self) -> KeySetStatus {
        self.keys.status()
    }
}
