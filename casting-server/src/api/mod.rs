pub(crate) mod actors;
pub(crate) mod greeting;
pub(crate) mod health;
pub(crate) mod movies;

use crate::auth::{require_permission, Permission};
use crate::errors::ApiError;
use crate::state::AppState;
use axum::body::Bytes;
use axum::routing::MethodRouter;
use axum::{middleware, Router};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Combines all API routes into a single router
pub(super) fn router(state: &AppState) -> Router<AppState> {
    Router::new()
        .merge(greeting::router())
        .merge(health::router())
        .merge(actors::router(state))
        .merge(movies::router(state))
}

/// Wraps a method router so it only runs for tokens granting `permission`.
///
/// `route_layer` keeps the guard off the 405 fallback, so a wrong method is
/// reported without authenticating.
fn guarded(
    method_router: MethodRouter<AppState>,
    state: &AppState,
    permission: Permission,
) -> MethodRouter<AppState> {
    method_router.route_layer(middleware::from_fn_with_state(
        state.guard(permission),
        require_permission,
    ))
}

/// Parses an identity path segment; anything but plain decimal digits is an unknown route
fn parse_id(raw: &str) -> Result<i32, ApiError> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ApiError::not_found());
    }
    raw.parse().map_err(|_| ApiError::not_found())
}

/// Parses a request body that must be a JSON object.
///
/// A missing, malformed or non-object body is a bad request. An object whose
/// fields have the wrong types is unprocessable.
fn parse_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, ApiError> {
    let value: Value = serde_json::from_slice(body).map_err(|_| ApiError::bad_request())?;
    if !value.is_object() {
        return Err(ApiError::bad_request());
    }
    serde_json::from_value(value).map_err(|_| ApiError::unprocessable())
}

/// Fallback for unknown routes
pub(crate) async fn not_found() -> ApiError {
    ApiError::not_found()
}

/// Fallback for known routes called with an unsupported method
pub(crate) async fn method_not_allowed() -> ApiError {
    ApiError::method_not_allowed()
}
