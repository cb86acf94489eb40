use crate::openapi::SERVICE_TAG;
use crate::state::AppState;
use axum::{extract::State, routing::get, Router};

/// Public greeting, louder when the server runs excited
#[utoipa::path(
    get,
    path = "/",
    tag = SERVICE_TAG,
    responses(
        (status = 200, description = "Greeting text", body = String, content_type = "text/plain")
    )
)]
pub(crate) async fn greeting(State(state): State<AppState>) -> String {
    let mut greeting = String::from("Heyyoo!");
    if state.settings.excited {
        greeting.push_str("! Hi, Hey, Hello; Welcome to the Casting!");
    }
    greeting
}

pub(super) fn router() -> Router<AppState> {
    Router::new().route("/", get(greeting))
}
