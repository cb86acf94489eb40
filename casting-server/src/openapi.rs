use crate::api::{actors, greeting, health, movies};
use utoipa::OpenApi;

pub(crate) const SERVICE_TAG: &str = "Service API";
pub(crate) const ACTORS_TAG: &str = "Actors API";
pub(crate) const MOVIES_TAG: &str = "Movies API";

#[derive(OpenApi)]
#[openapi(
    paths(
        greeting::greeting,
        health::health_check,
        health::ready_check,
        actors::list_actors,
        actors::create_actor,
        actors::update_actor,
        actors::delete_actor,
        movies::list_movies,
        movies::create_movie,
        movies::update_movie,
        movies::delete_movie,
    ),
    tags(
        (name = SERVICE_TAG, description = "Greeting and health check endpoints"),
        (name = ACTORS_TAG, description = "Actor records, guarded by the *:actors permissions"),
        (name = MOVIES_TAG, description = "Movie records, guarded by the *:movies permissions"),
    ),
    info(
        title = "Casting Agency API",
        description = "Actors and movies of a casting agency behind role-scoped bearer tokens",
        version = "1.0.0"
    )
)]
pub(crate) struct ApiDoc;
