use crate::store::{Record, StoreError};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

/// Maps a present JSON field to `Some(value)`, so that an explicit `null`
/// becomes `Some(None)` while an absent field stays `None` through `#[serde(default)]`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Resolves a patch field against the current value
fn patch_field<T>(column: &str, current: &mut T, patch: Option<Option<T>>) -> Result<(), StoreError> {
    match patch {
        None => Ok(()),
        Some(None) => Err(StoreError::Constraint(format!("{column} cannot be null"))),
        Some(Some(value)) => {
            *current = value;
            Ok(())
        }
    }
}

fn required<T>(column: &str, value: Option<T>) -> Result<T, StoreError> {
    value.ok_or_else(|| StoreError::Constraint(format!("{column} is required")))
}

/// Widths of the bounded text columns, in characters
pub const NAME_MAX_CHARS: usize = 256;
pub const TITLE_MAX_CHARS: usize = 256;
pub const RELEASE_DATE_MAX_CHARS: usize = 20;

fn bounded(column: &str, value: String, max: usize) -> Result<String, StoreError> {
    if value.chars().count() > max {
        return Err(StoreError::Constraint(format!(
            "{column} exceeds {max} characters"
        )));
    }
    Ok(value)
}

fn bounded_patch(
    column: &str,
    patch: Option<Option<String>>,
    max: usize,
) -> Result<Option<Option<String>>, StoreError> {
    match patch {
        Some(Some(value)) => bounded(column, value, max).map(|value| Some(Some(value))),
        absent_or_null => Ok(absent_or_null),
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq)]
pub struct Actor {
    /// Store-assigned identity
    pub id: i32,
    /// Actor's full name
    pub name: String,
    /// Actor's age in years
    pub age: i32,
    /// Actor's gender
    pub gender: String,
}

/// Payload for creating an actor
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, Default, PartialEq)]
pub struct NewActor {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub age: Option<i32>,
    #[serde(default)]
    pub gender: Option<String>,
}

/// Partial update of an actor, only present fields are applied
#[derive(Debug, Deserialize, ToSchema, Clone, Default, PartialEq)]
pub struct ActorPatch {
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<String>)]
    pub name: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<i32>)]
    pub age: Option<Option<i32>>,
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<String>)]
    pub gender: Option<Option<String>>,
}

impl Record for Actor {
    type New = NewActor;
    type Patch = ActorPatch;

    const KIND: &'static str = "actor";

    fn id(&self) -> i32 {
        self.id
    }

    fn create(id: i32, new: NewActor) -> Result<Self, StoreError> {
        Ok(Self {
            id,
            name: bounded("name", required("name", new.name)?, NAME_MAX_CHARS)?,
            age: required("age", new.age)?,
            gender: required("gender", new.gender)?,
        })
    }

    fn apply(&mut self, patch: ActorPatch) -> Result<(), StoreError> {
        let mut next = self.clone();
        let name = bounded_patch("name", patch.name, NAME_MAX_CHARS)?;
        patch_field("name", &mut next.name, name)?;
        patch_field("age", &mut next.age, patch.age)?;
        patch_field("gender", &mut next.gender, patch.gender)?;
        *self = next;
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq)]
pub struct Movie {
    /// Store-assigned identity
    pub id: i32,
    /// Movie title
    pub title: String,
    /// Release date in a caller-defined format, e.g. "11/21/2021"
    pub release_date: String,
}

/// Payload for creating a movie
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, Default, PartialEq)]
pub struct NewMovie {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
}

/// Partial update of a movie, only present fields are applied
#[derive(Debug, Deserialize, ToSchema, Clone, Default, PartialEq)]
pub struct MoviePatch {
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<String>)]
    pub title: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<String>)]
    pub release_date: Option<Option<String>>,
}

impl Record for Movie {
    type New = NewMovie;
    type Patch = MoviePatch;

    const KIND: &'static str = "movie";

    fn id(&self) -> i32 {
        self.id
    }

    fn create(id: i32, new: NewMovie) -> Result<Self, StoreError> {
        Ok(Self {
            id,
            title: bounded("title", required("title", new.title)?, TITLE_MAX_CHARS)?,
            release_date: bounded(
                "release_date",
                required("release_date", new.release_date)?,
                RELEASE_DATE_MAX_CHARS,
            )?,
        })
    }

    fn apply(&mut self, patch: MoviePatch) -> Result<(), StoreError> {
        let mut next = self.clone();
        let title = bounded_patch("title", patch.title, TITLE_MAX_CHARS)?;
        let release_date = bounded_patch("release_date", patch.release_date, RELEASE_DATE_MAX_CHARS)?;
        patch_field("title", &mut next.title, title)?;
        patch_field("release_date", &mut next.release_date, release_date)?;
        *self = next;
        Ok(())
    }
}

/// Envelope for actor list, create and update responses
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ActorsResponse {
    pub success: bool,
    pub actors: Vec<Actor>,
}

impl ActorsResponse {
    pub fn new(actors: Vec<Actor>) -> Self {
        Self {
            success: true,
            actors,
        }
    }
}

/// Envelope for movie list, create and update responses
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MoviesResponse {
    pub success: bool,
    pub movies: Vec<Movie>,
}

impl MoviesResponse {
    pub fn new(movies: Vec<Movie>) -> Self {
        Self {
            success: true,
            movies,
        }
    }
}

/// Envelope for delete responses
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeletedResponse {
    pub success: bool,
    pub deleted_id: i32,
}

impl DeletedResponse {
    pub fn new(deleted_id: i32) -> Self {
        Self {
            success: true,
            deleted_id,
        }
    }
}
