use crate::config::Settings;
use crate::create_app;
use crate::state::AppState;
use axum::body::Body;
use axum::response::Response;
use axum::Router;
use http::{Method, Request, StatusCode};
use http_body_util::BodyExt;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use log::LevelFilter;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers;
use wiremock::Mock;
use wiremock::MockServer;
use wiremock::ResponseTemplate;

/// Key id the mocked identity provider publishes the test key under
pub const TEST_KID: &str = "test-key";
/// Private half of the published test key
pub const SIGNING_KEY_PEM: &str = include_str!("../testdata/signing_key.pem");
/// A key the identity provider never published
pub const FOREIGN_KEY_PEM: &str = include_str!("../testdata/foreign_key.pem");

const TEST_KEY_MODULUS: &str = "zmQAJzer_FU4nucGR4tT5gyjLnzrgERGgAhqdpeFc0Otqc9dipGX3y-mmz0LGHkoTiTDr-OA5TMk41nAijT7swNtOQLYr2QXdSKcQwwPBD5bAJbHvXp7akI_zfE94M46v0CVh7ARvMiAYBrl66wqvhr16pamGgx-pw8XvS2a8mwnmQb4Trt_n0zKnf1OIwkh5CI3-7El2iAIg4f7vIC7AOcyk4bUWCOiFECsGdagwBTHqKgegpp6nBdildmY6E3HSIwjC4-OB8xBkrCPhftBboKaZnhcLjDjL-Zg47XRMrP9tTnnoP1cNWyCZtYJrMEhxKCDi0czUy9_zj8v0N5jvw";

/// JWKS document publishing the test key
pub fn jwks_body() -> Value {
    json!({
        "keys": [{
            "kty": "RSA",
            "use": "sig",
            "alg": "RS256",
            "kid": TEST_KID,
            "n": TEST_KEY_MODULUS,
            "e": "AQAB",
        }]
    })
}

/// Serves the test JWKS from the mock identity provider
pub async fn mount_jwks(server: &MockServer) {
    Mock::given(matchers::method("GET"))
        .and(matchers::path("/.well-known/jwks.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(jwks_body()))
        .mount(server)
        .await;
}

/// Claims accepted by the test settings, granting `permissions`
pub fn claims_with(permissions: &[&str]) -> Value {
    let now = chrono::Utc::now().timestamp();
    json!({
        "iss": "https://casting.test/",
        "sub": "auth0|casting-test",
        "aud": "casting-api",
        "iat": now,
        "exp": now + 3600,
        "permissions": permissions,
    })
}

/// Signs `claims` with the published test key
pub fn sign(claims: &Value) -> String {
    let mut header = Header::new(Algorithm::RS256);
    header.kid = Some(TEST_KID.to_string());
    sign_with(SIGNING_KEY_PEM, header, claims)
}

/// Signs `claims` with an arbitrary RSA key and header
pub fn sign_with(key_pem: &str, header: Header, claims: &Value) -> String {
    let key = EncodingKey::from_rsa_pem(key_pem.as_bytes()).expect("Invalid test key");
    encode(&header, claims, &key).expect("Failed to sign test token")
}

/// The casting agency roles, as configured in the identity provider
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Role {
    /// Can view actors and movies
    Assistant,
    /// Assistant permissions, plus add or delete actors and modify actors or movies
    Director,
    /// All permissions
    Producer,
}

impl Role {
    pub fn permissions(&self) -> &'static [&'static str] {
        match self {
            Role::Assistant => &["get:actors", "get:movies"],
            Role::Director => &[
                "get:actors",
                "get:movies",
                "post:actors",
                "delete:actors",
                "patch:actors",
                "patch:movies",
            ],
            Role::Producer => &[
                "get:actors",
                "get:movies",
                "post:actors",
                "delete:actors",
                "patch:actors",
                "patch:movies",
                "post:movies",
                "delete:movies",
            ],
        }
    }

    /// A fresh token for this role
    pub fn token(&self) -> String {
        sign(&claims_with(self.permissions()))
    }
}

/// Test fixture for setting up a complete test environment with a mocked identity provider.
///
/// The fixture starts a mock server publishing the test signing key, configures
/// the application against it with an in-memory record store, and provides
/// helpers that send requests as one of the casting agency roles.
///
/// # Examples
///
/// ```rust
/// #[tokio::test]
/// async fn test_endpoint() {
///     let fixture = TestFixture::new().await;
///     fixture.seed().await;
///
///     let response = fixture.get(Role::Assistant, "/actors").await;
///     let body = response.assert_ok().json_as::<ActorsResponse>();
///     assert_eq!(body.actors.len(), 2);
/// }
/// ```
pub struct TestFixture {
    /// The application router
    pub app: Router,
    /// Configuration settings
    pub settings: Settings,
    /// Application state shared with the router, for inspecting the stores
    pub state: AppState,
    /// Mock identity provider serving the JWKS
    pub jwks_mock: MockServer,
}

impl TestFixture {
    /// Creates a new test fixture with default test settings
    pub async fn new() -> Self {
        Self::with_state(AppState::for_testing).await
    }

    /// Creates a test fixture after adjusting the test settings
    pub async fn with_settings(customize: impl FnOnce(&mut Settings)) -> Self {
        Self::build(customize, AppState::for_testing).await
    }

    /// Creates a test fixture whose state is built by `make_state`,
    /// e.g. to swap in a failing record store
    pub async fn with_state(make_state: impl FnOnce(&Settings) -> AppState) -> Self {
        Self::build(|_| {}, make_state).await
    }

    async fn build(
        customize: impl FnOnce(&mut Settings),
        make_state: impl FnOnce(&Settings) -> AppState,
    ) -> Self {
        Self::setup_logger(LevelFilter::Debug);

        let jwks_mock = MockServer::start().await;
        mount_jwks(&jwks_mock).await;

        let mut settings = Settings::for_test_with_mocks(&jwks_mock);
        customize(&mut settings);

        let state = make_state(&settings);
        let app = create_app(state.clone()).await;

        Self {
            app,
            settings,
            state,
            jwks_mock,
        }
    }

    /// Initializes the test logger with customized settings.
    ///
    /// This is automatically called by the constructors with `Debug` level.
    pub fn setup_logger(level: LevelFilter) {
        let _ = env_logger::builder()
            .filter_level(level)
            .is_test(true)
            .try_init();
    }

    /// Inserts the demo actors and movies
    pub async fn seed(&self) {
        self.state
            .stores
            .seed_demo_data()
            .await
            .expect("Failed to seed demo data");
    }

    /// Creates a request builder with a JSON content type and, when a role
    /// is given, a bearer token for it
    pub fn request_builder(
        &self,
        method: Method,
        uri: impl AsRef<str>,
        role: Option<Role>,
    ) -> http::request::Builder {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri.as_ref())
            .header("Content-Type", "application/json");

        if let Some(role) = role {
            builder = builder.header("Authorization", format!("Bearer {}", role.token()));
        }
        builder
    }

    /// Sends a GET request as `role`
    pub async fn get(&self, role: Role, uri: impl AsRef<str>) -> TestResponse {
        self.send_raw(Method::GET, uri, Some(role), "").await
    }

    /// Sends a POST request with a JSON body as `role`
    pub async fn post<T: Serialize>(&self, role: Role, uri: impl AsRef<str>, body: &T) -> TestResponse {
        let json_body = serde_json::to_string(body).expect("Failed to serialize body to JSON");
        self.send_raw(Method::POST, uri, Some(role), json_body).await
    }

    /// Sends a PATCH request with a JSON body as `role`
    pub async fn patch<T: Serialize>(&self, role: Role, uri: impl AsRef<str>, body: &T) -> TestResponse {
        let json_body = serde_json::to_string(body).expect("Failed to serialize body to JSON");
        self.send_raw(Method::PATCH, uri, Some(role), json_body).await
    }

    /// Sends a DELETE request as `role`
    pub async fn delete(&self, role: Role, uri: impl AsRef<str>) -> TestResponse {
        self.send_raw(Method::DELETE, uri, Some(role), "").await
    }

    /// Sends a request with a raw body, optionally without any credentials
    pub async fn send_raw(
        &self,
        method: Method,
        uri: impl AsRef<str>,
        role: Option<Role>,
        body: impl Into<String>,
    ) -> TestResponse {
        let request = self
            .request_builder(method, uri, role)
            .body(Body::from(body.into()))
            .expect("Failed to build request");

        self.send(request).await
    }

    /// Sends a request and returns the unprocessed response, e.g. to inspect headers
    pub async fn send_request(&self, request: Request<Body>) -> Response {
        self.app
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request")
    }

    /// Sends a request and returns a TestResponse.
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.send_request(request).await;

        let status = response.status();
        let body = response
            .into_body()
            .collect()
            .await
            .expect("Failed to read response body")
            .to_bytes();

        let text = String::from_utf8_lossy(&body).into_owned();
        // Try to parse as JSON, defaulting to empty object if parsing fails or empty body
        let json = if !body.is_empty() {
            serde_json::from_slice(&body).unwrap_or_else(|_| json!({}))
        } else {
            json!({})
        };

        TestResponse { status, json, text }
    }
}

/// Response from a test request that provides convenient access to status and body.
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Response body as JSON (if present and valid JSON)
    pub json: Value,
    /// Response body as text
    pub text: String,
}

impl TestResponse {
    /// Asserts that the response has the expected status code.
    ///
    /// # Panics
    ///
    /// Panics if the status code doesn't match the expected value.
    pub fn assert_status(&self, expected: StatusCode) -> &Self {
        assert_eq!(
            self.status,
            expected,
            "Expected status {} but got {} with body: {}",
            expected,
            self.status,
            self.text
        );
        self
    }

    /// Asserts that the response status is OK (200).
    pub fn assert_ok(&self) -> &Self {
        self.assert_status(StatusCode::OK)
    }

    /// Converts the response body to the specified type.
    ///
    /// # Panics
    ///
    /// Panics if the body cannot be deserialized into `T`.
    pub fn json_as<T: DeserializeOwned>(&self) -> T {
        serde_json::from_value(self.json.clone()).unwrap_or_else(|e| {
            panic!(
                "Failed to deserialize response: {}, body: {}",
                e, self.text
            )
        })
    }
}
