use crate::openapi::SERVICE_TAG;
use crate::state::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;

/// Basic health check response
#[derive(Debug, Serialize, ToSchema)]
pub struct Health {
    status: &'static str,
    details: Option<Value>,
    #[serde(skip)]
    status_code: StatusCode,
}

impl IntoResponse for Health {
    fn into_response(self) -> Response {
        let mut body = serde_json::json!({
            "status": self.status
        });

        if let Some(Value::Object(obj)) = self.details {
            for (key, value) in obj {
                body[key] = value;
            }
        }

        (self.status_code, Json(body)).into_response()
    }
}

/// Liveness check handler
#[utoipa::path(
    get,
    path = "/health",
    tag = SERVICE_TAG,
    responses(
        (status = 200, description = "Service is alive", body = Health)
    )
)]
pub(crate) async fn health_check() -> impl IntoResponse {
    Health {
        status: "ok",
        details: None,
        status_code: StatusCode::OK,
    }
}

/// Readiness check handler
#[utoipa::path(
    get,
    path = "/ready",
    tag = SERVICE_TAG,
    responses(
        (status = 200, description = "Service is ready", body = Health),
        (status = 503, description = "Record store is unreachable", body = Health)
    )
)]
pub(crate) async fn ready_check(State(state): State<AppState>) -> impl IntoResponse {
    let keys = state.validator.key_status();
    let signing_keys = serde_json::json!({
        "cached": keys.cached_keys,
        "last_fetched": keys.last_fetched.map(|at| at.to_rfc3339()),
    });

    if state.health_check().await {
        Health {
            status: "ok",
            details: Some(serde_json::json!({
                "store_status": "healthy",
                "signing_keys": signing_keys,
            })),
            status_code: StatusCode::OK,
        }
    } else {
        Health {
            status: "error",
            details: Some(serde_json::json!({
                "store_status": "unhealthy",
                "signing_keys": signing_keys,
            })),
            status_code: StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

pub(super) fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/ready", get(ready_check))
}

#[cfg(test)]
mod test {
    use crate::state::AppState;
    use crate::store::{RecordStore, StoreError, Stores};
    use crate::test_utils::{Role, TestFixture};
    use crate::models::{Actor, ActorPatch, NewActor};
    use async_trait::async_trait;
    use http::{Method, StatusCode};
    use serde_json::json;
    use std::sync::Arc;

    /// Actor store whose backend is unreachable
    struct UnreachableStore;

    #[async_trait]
    impl RecordStore<Actor> for UnreachableStore {
        async fn insert(&self, _new: NewActor) -> Result<Actor, StoreError> {
            Err(StoreError::Backend("connection refused".to_string()))
        }

        async fn get(&self, _id: i32) -> Result<Actor, StoreError> {
            Err(StoreError::Backend("connection refused".to_string()))
        }

        async fn list(&self) -> Result<Vec<Actor>, StoreError> {
            Err(StoreError::Backend("connection refused".to_string()))
        }

        async fn update(&self, _id: i32, _patch: ActorPatch) -> Result<Actor, StoreError> {
            Err(StoreError::Backend("connection refused".to_string()))
        }

        async fn delete(&self, _id: i32) -> Result<(), StoreError> {
            Err(StoreError::Backend("connection refused".to_string()))
        }

        async fn health_check(&self) -> Result<(), String> {
            Err("connection refused".to_string())
        }
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let fixture = TestFixture::new().await;
        let response = fixture.send_raw(Method::GET, "/health", None, "").await;
        response.assert_ok();
        assert_eq!(response.json, json!({"status": "ok"}));
    }

    #[tokio::test]
    async fn test_ready_endpoint() {
        let fixture = TestFixture::new().await;
        let response = fixture.send_raw(Method::GET, "/ready", None, "").await;
        response.assert_ok();
        assert_eq!(
            response.json,
            json!({
                "status": "ok",
                "store_status": "healthy",
                "signing_keys": {"cached": 0, "last_fetched": null},
            })
        );

        // Validating a token populates the key cache
        fixture.get(Role::Assistant, "/actors").await;
        let response = fixture.send_raw(Method::GET, "/ready", None, "").await;
        assert!(response.json["signing_keys"]["last_fetched"].is_string());
    }

    #[tokio::test]
    async fn test_ready_with_unreachable_store() {
        let fixture = TestFixture::with_state(|settings| {
            let mut state = AppState::for_testing(settings);
            state.stores = Stores {
                actors: Arc::new(UnreachableStore),
                movies: state.stores.movies.clone(),
            };
            state
        })
        .await;

        let response = fixture.send_raw(Method::GET, "/ready", None, "").await;
        response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(response.json["status"], "error");
        assert_eq!(response.json["store_status"], "unhealthy");

        // Backend failures surface as unprocessable, never as a crash
        fixture
            .get(Role::Assistant, "/actors")
            .await
            .assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    }
}
