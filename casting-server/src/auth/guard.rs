use crate::auth::error::AuthError;
use crate::auth::permissions::{permissions, Permission};
use crate::auth::token::{Claims, TokenValidator};
use crate::errors::ApiError;
use axum::{
    body::Body,
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use http::HeaderMap;
use log::warn;
use std::sync::Arc;

/// Validates the request's bearer token and checks it grants `required`
pub async fn authorize(
    validator: &TokenValidator,
    required: Permission,
    headers: &HeaderMap,
) -> Result<Claims, AuthError> {
    let claims = validator
        .validate(headers.get(http::header::AUTHORIZATION))
        .await?;

    if !permissions(&claims).contains(required.as_str()) {
        return Err(AuthError::InsufficientScope(required));
    }
    Ok(claims)
}

/// Middleware state naming the permission a route requires
#[derive(Clone)]
pub struct PermissionGuard {
    pub validator: Arc<TokenValidator>,
    pub permission: Permission,
}

impl PermissionGuard {
    pub fn new(validator: Arc<TokenValidator>, permission: Permission) -> Self {
        Self {
            validator,
            permission,
        }
    }
}

/// Rejects the request unless its token carries the guarded permission.
///
/// The validated claims are handed to the handler through request extensions.
pub async fn require_permission(
    State(guard): State<PermissionGuard>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    match authorize(&guard.validator, guard.permission, request.headers()).await {
        Ok(claims) => {
            request.extensions_mut().insert(claims);
            next.run(request).await
        }
        Err(err) => {
            warn!(
                "Rejected {} {} requiring {}: {} ({})",
                request.method(),
                request.uri().path(),
                guard.permission,
                err.code(),
                err
            );
            ApiError::from(err).into_response()
        }
    }
}
