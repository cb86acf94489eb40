//! PostgreSQL record store

use super::{Record, RecordStore, StoreError};
use crate::models::{Actor, ActorPatch, Movie, MoviePatch, NewActor, NewMovie};
use async_trait::async_trait;
use log::error;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;
use std::time::Duration;

const SCHEMA: [&str; 2] = [
    r#"
    CREATE TABLE IF NOT EXISTS actors (
        id SERIAL PRIMARY KEY,
        name VARCHAR(256) NOT NULL,
        age INTEGER NOT NULL,
        gender VARCHAR NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS movies (
        id SERIAL PRIMARY KEY,
        title VARCHAR(256) NOT NULL,
        release_date VARCHAR(20) NOT NULL
    )
    "#,
];

/// Maps driver errors, treating constraint and data errors as unprocessable input
fn map_error(context: &str, err: sqlx::Error) -> StoreError {
    match &err {
        // SQLSTATE class 22 is data exception, 23 is integrity constraint violation
        sqlx::Error::Database(db)
            if db
                .code()
                .is_some_and(|c| c.starts_with("22") || c.starts_with("23")) =>
        {
            StoreError::Constraint(format!("{context}: {db}"))
        }
        _ => {
            error!("{context}: {err}");
            StoreError::Backend(format!("{context}: {err}"))
        }
    }
}

fn actor_from_row(row: &PgRow) -> Result<Actor, sqlx::Error> {
    Ok(Actor {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        age: row.try_get("age")?,
        gender: row.try_get("gender")?,
    })
}

fn movie_from_row(row: &PgRow) -> Result<Movie, sqlx::Error> {
    Ok(Movie {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        release_date: row.try_get("release_date")?,
    })
}

/// Record store backed by a PostgreSQL connection pool, serving both tables
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Connect to the database
    ///
    /// # Arguments
    /// * `database_url` - PostgreSQL connection string
    /// * `max_connections` - Upper bound of the connection pool
    pub async fn new(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .idle_timeout(Duration::from_secs(600))
            .connect(database_url)
            .await
            .map_err(|e| StoreError::Config(format!("Failed to connect to database: {e}")))?;

        Ok(Self { pool })
    }

    /// Creates the `actors` and `movies` tables when they do not exist yet
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| map_error("Failed to create table", e))?;
        }
        Ok(())
    }

    async fn delete_row(&self, table: &str, id: i32) -> Result<(), StoreError> {
        let statement = format!("DELETE FROM {table} WHERE id = $1");
        let result = sqlx::query(&statement)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| map_error("Failed to delete record", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }

    async fn ping(&self) -> Result<(), String> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(|e| format!("PostgreSQL health check failed: {e}"))
    }
}

#[async_trait]
impl RecordStore<Actor> for PostgresStore {
    async fn insert(&self, new: NewActor) -> Result<Actor, StoreError> {
        let mut actor = Actor::create(0, new)?;
        let row = sqlx::query("INSERT INTO actors (name, age, gender) VALUES ($1, $2, $3) RETURNING id")
            .bind(&actor.name)
            .bind(actor.age)
            .bind(&actor.gender)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_error("Failed to insert actor", e))?;
        actor.id = row
            .try_get("id")
            .map_err(|e| map_error("Failed to read actor id", e))?;
        Ok(actor)
    }

    async fn get(&self, id: i32) -> Result<Actor, StoreError> {
        let row = sqlx::query("SELECT id, name, age, gender FROM actors WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_error("Failed to get actor", e))?
            .ok_or(StoreError::NotFound(id))?;
        actor_from_row(&row).map_err(|e| map_error("Failed to read actor", e))
    }

    async fn list(&self) -> Result<Vec<Actor>, StoreError> {
        let rows = sqlx::query("SELECT id, name, age, gender FROM actors ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_error("Failed to list actors", e))?;
        rows.iter()
            .map(actor_from_row)
            .collect::<Result<_, _>>()
            .map_err(|e| map_error("Failed to read actor", e))
    }

    async fn update(&self, id: i32, patch: ActorPatch) -> Result<Actor, StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_error("Failed to begin transaction", e))?;

        let row = sqlx::query("SELECT id, name, age, gender FROM actors WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| map_error("Failed to lock actor", e))?
            .ok_or(StoreError::NotFound(id))?;
        let mut actor = actor_from_row(&row).map_err(|e| map_error("Failed to read actor", e))?;
        actor.apply(patch)?;

        sqlx::query("UPDATE actors SET name = $1, age = $2, gender = $3 WHERE id = $4")
            .bind(&actor.name)
            .bind(actor.age)
            .bind(&actor.gender)
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_error("Failed to update actor", e))?;

        tx.commit()
            .await
            .map_err(|e| map_error("Failed to commit actor update", e))?;
        Ok(actor)
    }

    async fn delete(&self, id: i32) -> Result<(), StoreError> {
        self.delete_row("actors", id).await
    }

    async fn health_check(&self) -> Result<(), String> {
        self.ping().await
    }
}

#[async_trait]
impl RecordStore<Movie> for PostgresStore {
    async fn insert(&self, new: NewMovie) -> Result<Movie, StoreError> {
        let mut movie = Movie::create(0, new)?;
        let row = sqlx::query("INSERT INTO movies (title, release_date) VALUES ($1, $2) RETURNING id")
            .bind(&movie.title)
            .bind(&movie.release_date)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_error("Failed to insert movie", e))?;
        movie.id = row
            .try_get("id")
            .map_err(|e| map_error("Failed to read movie id", e))?;
        Ok(movie)
    }

    async fn get(&self, id: i32) -> Result<Movie, StoreError> {
        let row = sqlx::query("SELECT id, title, release_date FROM movies WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_error("Failed to get movie", e))?
            .ok_or(StoreError::NotFound(id))?;
        movie_from_row(&row).map_err(|e| map_error("Failed to read movie", e))
    }

    async fn list(&self) -> Result<Vec<Movie>, StoreError> {
        let rows = sqlx::query("SELECT id, title, release_date FROM movies ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_error("Failed to list movies", e))?;
        rows.iter()
            .map(movie_from_row)
            .collect::<Result<_, _>>()
            .map_err(|e| map_error("Failed to read movie", e))
    }

    async fn update(&self, id: i32, patch: MoviePatch) -> Result<Movie, StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_error("Failed to begin transaction", e))?;

        let row = sqlx::query("SELECT id, title, release_date FROM movies WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| map_error("Failed to lock movie", e))?
            .ok_or(StoreError::NotFound(id))?;
        let mut movie = movie_from_row(&row).map_err(|e| map_error("Failed to read movie", e))?;
        movie.apply(patch)?;

        sqlx::query("UPDATE movies SET title = $1, release_date = $2 WHERE id = $3")
            .bind(&movie.title)
            .bind(&movie.release_date)
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_error("Failed to update movie", e))?;

        tx.commit()
            .await
            .map_err(|e| map_error("Failed to commit movie update", e))?;
        Ok(movie)
    }

    async fn delete(&self, id: i32) -> Result<(), StoreError> {
        self.delete_row("movies", id).await
    }

    async fn health_check(&self) -> Result<(), String> {
        self.ping().await
    }
}
