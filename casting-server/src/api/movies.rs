use super::{guarded, parse_body, parse_id};
use crate::auth::{Claims, Permission};
use crate::errors::ApiError;
use crate::models::{DeletedResponse, MoviePatch, MoviesResponse, NewMovie};
use crate::openapi::MOVIES_TAG;
use crate::state::AppState;
use axum::body::Bytes;
use axum::extract::{Json, Path, State};
use axum::routing::{delete, get, patch, post};
use axum::{Extension, Router};
use log::debug;

#[utoipa::path(
    get,
    path = "/movies",
    tag = MOVIES_TAG,
    params(
        ("Authorization" = String, Header, description = "Bearer token granting get:movies"),
    ),
    responses(
        (status = 200, description = "All movies in identity order", body = MoviesResponse),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Token lacks get:movies"),
        (status = 404, description = "No movies stored")
    )
)]
pub(crate) async fn list_movies(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<MoviesResponse>, ApiError> {
    let movies = state.stores.movies.list().await?;
    if movies.is_empty() {
        return Err(ApiError::not_found());
    }
    debug!("{} listed {} movie(s)", claims.subject(), movies.len());
    Ok(Json(MoviesResponse::new(movies)))
}

#[utoipa::path(
    post,
    path = "/movies",
    tag = MOVIES_TAG,
    request_body = NewMovie,
    params(
        ("Authorization" = String, Header, description = "Bearer token granting post:movies"),
    ),
    responses(
        (status = 200, description = "Movie created", body = MoviesResponse),
        (status = 400, description = "Body missing or not a JSON object"),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Token lacks post:movies"),
        (status = 422, description = "Missing or invalid column values")
    )
)]
pub(crate) async fn create_movie(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    body: Bytes,
) -> Result<Json<MoviesResponse>, ApiError> {
    let new: NewMovie = parse_body(&body)?;
    let movie = state.stores.movies.insert(new).await?;
    debug!("{} created movie {}", claims.subject(), movie.id);
    Ok(Json(MoviesResponse::new(vec![movie])))
}

#[utoipa::path(
    patch,
    path = "/movies/{id}",
    tag = MOVIES_TAG,
    request_body = MoviePatch,
    params(
        ("id" = i32, Path, description = "Movie identity"),
        ("Authorization" = String, Header, description = "Bearer token granting patch:movies"),
    ),
    responses(
        (status = 200, description = "Movie updated", body = MoviesResponse),
        (status = 400, description = "Body missing or not a JSON object"),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Token lacks patch:movies"),
        (status = 404, description = "Movie not found"),
        (status = 422, description = "Invalid column values")
    )
)]
pub(crate) async fn update_movie(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<MoviesResponse>, ApiError> {
    let id = parse_id(&id)?;
    state.stores.movies.get(id).await?;

    let patch: MoviePatch = parse_body(&body)?;
    let movie = state.stores.movies.update(id, patch).await?;
    debug!("{} updated movie {id}", claims.subject());
    Ok(Json(MoviesResponse::new(vec![movie])))
}

#[utoipa::path(
    delete,
    path = "/movies/{id}",
    tag = MOVIES_TAG,
    params(
        ("id" = i32, Path, description = "Movie identity"),
        ("Authorization" = String, Header, description = "Bearer token granting delete:movies"),
    ),
    responses(
        (status = 200, description = "Movie deleted", body = DeletedResponse),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Token lacks delete:movies"),
        (status = 404, description = "Movie not found")
    )
)]
pub(crate) async fn delete_movie(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<Json<DeletedResponse>, ApiError> {
    let id = parse_id(&id)?;
    state.stores.movies.delete(id).await?;
    debug!("{} deleted movie {id}", claims.subject());
    Ok(Json(DeletedResponse::new(id)))
}

pub(super) fn router(state: &AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/movies",
            guarded(get(list_movies), state, Permission::GetMovies).merge(guarded(
                post(create_movie),
                state,
                Permission::PostMovies,
            )),
        )
        .route(
            "/movies/{id}",
            guarded(patch(update_movie), state, Permission::PatchMovies).merge(guarded(
                delete(delete_movie),
                state,
                Permission::DeleteMovies,
            )),
        )
}
