use super::{guarded, parse_body, parse_id};
use crate::auth::{Claims, Permission};
use crate::errors::ApiError;
use crate::models::{ActorPatch, ActorsResponse, DeletedResponse, NewActor};
use crate::openapi::ACTORS_TAG;
use crate::state::AppState;
use axum::body::Bytes;
use axum::extract::{Json, Path, State};
use axum::routing::{delete, get, patch, post};
use axum::{Extension, Router};
use log::debug;

#[utoipa::path(
    get,
    path = "/actors",
    tag = ACTORS_TAG,
    params(
        ("Authorization" = String, Header, description = "Bearer token granting get:actors"),
    ),
    responses(
        (status = 200, description = "All actors in identity order", body = ActorsResponse),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Token lacks get:actors"),
        (status = 404, description = "No actors stored")
    )
)]
pub(crate) async fn list_actors(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<ActorsResponse>, ApiError> {
    let actors = state.stores.actors.list().await?;
    if actors.is_empty() {
        return Err(ApiError::not_found());
    }
    debug!("{} listed {} actor(s)", claims.subject(), actors.len());
    Ok(Json(ActorsResponse::new(actors)))
}

#[utoipa::path(
    post,
    path = "/actors",
    tag = ACTORS_TAG,
    request_body = NewActor,
    params(
        ("Authorization" = String, Header, description = "Bearer token granting post:actors"),
    ),
    responses(
        (status = 200, description = "Actor created", body = ActorsResponse),
        (status = 400, description = "Body missing or not a JSON object"),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Token lacks post:actors"),
        (status = 422, description = "Missing or invalid column values")
    )
)]
pub(crate) async fn create_actor(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    body: Bytes,
) -> Result<Json<ActorsResponse>, ApiError> {
    let new: NewActor = parse_body(&body)?;
    let actor = state.stores.actors.insert(new).await?;
    debug!("{} created actor {}", claims.subject(), actor.id);
    Ok(Json(ActorsResponse::new(vec![actor])))
}

#[utoipa::path(
    patch,
    path = "/actors/{id}",
    tag = ACTORS_TAG,
    request_body = ActorPatch,
    params(
        ("id" = i32, Path, description = "Actor identity"),
        ("Authorization" = String, Header, description = "Bearer token granting patch:actors"),
    ),
    responses(
        (status = 200, description = "Actor updated", body = ActorsResponse),
        (status = 400, description = "Body missing or not a JSON object"),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Token lacks patch:actors"),
        (status = 404, description = "Actor not found"),
        (status = 422, description = "Invalid column values")
    )
)]
pub(crate) async fn update_actor(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<ActorsResponse>, ApiError> {
    let id = parse_id(&id)?;
    state.stores.actors.get(id).await?;

    let patch: ActorPatch = parse_body(&body)?;
    let actor = state.stores.actors.update(id, patch).await?;
    debug!("{} updated actor {id}", claims.subject());
    Ok(Json(ActorsResponse::new(vec![actor])))
}

#[utoipa::path(
    delete,
    path = "/actors/{id}",
    tag = ACTORS_TAG,
    params(
        ("id" = i32, Path, description = "Actor identity"),
        ("Authorization" = String, Header, description = "Bearer token granting delete:actors"),
    ),
    responses(
        (status = 200, description = "Actor deleted", body = DeletedResponse),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Token lacks delete:actors"),
        (status = 404, description = "Actor not found")
    )
)]
pub(crate) async fn delete_actor(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<Json<DeletedResponse>, ApiError> {
    let id = parse_id(&id)?;
    state.stores.actors.delete(id).await?;
    debug!("{} deleted actor {id}", claims.subject());
    Ok(Json(DeletedResponse::new(id)))
}

pub(super) fn router(state: &AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/actors",
            guarded(get(list_actors), state, Permission::GetActors).merge(guarded(
                post(create_actor),
                state,
                Permission::PostActors,
            )),
        )
        .route(
            "/actors/{id}",
            guarded(patch(update_actor), state, Permission::PatchActors).merge(guarded(
                delete(delete_actor),
                state,
                Permission::DeleteActors,
            )),
        )
}
