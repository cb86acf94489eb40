use crate::config::{StoreBackend, StoreConfig};
use crate::models::{Actor, Movie, NewActor, NewMovie};
use log::info;
use std::sync::Arc;
use thiserror::Error;

pub mod memory;
#[cfg(feature = "postgres")]
pub mod postgres;

/// Errors that can occur during record store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Record {0} not found")]
    NotFound(i32),
    #[error("Constraint violation: {0}")]
    Constraint(String),
    #[error("Store backend error: {0}")]
    Backend(String),
    #[error("Configuration error: {0}")]
    Config(String),
}

/// A persisted entity with a store-assigned integer identity.
///
/// `New` is the creation payload and `Patch` the partial update payload.
/// Column constraints (non-null columns and text widths) live here so that every
/// backend enforces them the same way.
pub trait Record: Clone + Send + Sync + 'static {
    type New: Send + 'static;
    type Patch: Send + 'static;

    /// Singular name used in logs
    const KIND: &'static str;

    fn id(&self) -> i32;

    /// Builds a record from a creation payload, failing on missing or oversized columns
    fn create(id: i32, new: Self::New) -> Result<Self, StoreError>;

    /// Overwrites the fields present in the patch. On error `self` is unchanged.
    fn apply(&mut self, patch: Self::Patch) -> Result<(), StoreError>;
}

/// Record store trait defining the persistence contract for one entity type.
///
/// Each operation is its own atomic unit: a failed update or delete leaves
/// the stored record untouched.
#[async_trait::async_trait]
pub trait RecordStore<R: Record>: Send + Sync {
    /// Insert a new record and return it with its assigned identity
    async fn insert(&self, new: R::New) -> Result<R, StoreError>;

    /// Retrieve a record by identity
    async fn get(&self, id: i32) -> Result<R, StoreError>;

    /// List all records in ascending identity order
    async fn list(&self) -> Result<Vec<R>, StoreError>;

    /// Apply a partial update and return the updated record
    async fn update(&self, id: i32, patch: R::Patch) -> Result<R, StoreError>;

    /// Delete a record by identity
    async fn delete(&self, id: i32) -> Result<(), StoreError>;

    /// Checks connectivity to the backend
    async fn health_check(&self) -> Result<(), String>;
}

/// Handles to the per-entity stores, shared by all handlers
#[derive(Clone)]
pub struct Stores {
    pub actors: Arc<dyn RecordStore<Actor>>,
    pub movies: Arc<dyn RecordStore<Movie>>,
}

impl Stores {
    /// Fresh, empty in-memory stores
    pub fn in_memory() -> Self {
        Self {
            actors: Arc::new(memory::InMemoryStore::<Actor>::new()),
            movies: Arc::new(memory::InMemoryStore::<Movie>::new()),
        }
    }

    /// Inserts the demo rows into tables that are still empty
    pub async fn seed_demo_data(&self) -> Result<(), StoreError> {
        if self.actors.list().await?.is_empty() {
            for (name, age, gender) in [("Penny Hall", 21, "Female"), ("Henry Hall", 26, "Male")] {
                self.actors
                    .insert(NewActor {
                        name: Some(name.to_string()),
                        age: Some(age),
                        gender: Some(gender.to_string()),
                    })
                    .await?;
            }
            info!("Seeded demo actors");
        }

        if self.movies.list().await?.is_empty() {
            for title in ["Cats Revenge", "Dogs Gone Wild"] {
                self.movies
                    .insert(NewMovie {
                        title: Some(title.to_string()),
                        release_date: Some("11/21/2021".to_string()),
                    })
                    .await?;
            }
            info!("Seeded demo movies");
        }

        Ok(())
    }
}

/// Creates the record stores selected by the configuration
pub async fn create_stores(config: &StoreConfig) -> Result<Stores, StoreError> {
    let backend = config.get_backend().map_err(StoreError::Config)?;
    let stores = match backend {
        StoreBackend::Memory => {
            info!("Using in-memory record store");
            Stores::in_memory()
        }
        StoreBackend::Postgres => create_postgres_stores(config).await?,
    };

    if config.seed_demo_data {
        stores.seed_demo_data().await?;
    }
    Ok(stores)
}

#[cfg(feature = "postgres")]
async fn create_postgres_stores(config: &StoreConfig) -> Result<Stores, StoreError> {
    let url = config.database_url.as_deref().unwrap_or_default();
    if url.is_empty() {
        return Err(StoreError::Config(
            "DATABASE_URL is required for the postgres store".to_string(),
        ));
    }
    let store = Arc::new(postgres::PostgresStore::new(url, config.max_connections).await?);
    store.ensure_schema().await?;
    info!("Using PostgreSQL record store");
    Ok(Stores {
        actors: store.clone(),
        movies: store,
    })
}

#[cfg(not(feature = "postgres"))]
async fn create_postgres_stores(_config: &StoreConfig) -> Result<Stores, StoreError> {
    Err(StoreError::Config(
        "the postgres store requires the `postgres` feature".to_string(),
    ))
}
