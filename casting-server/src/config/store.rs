use confique::Config;
use std::str::FromStr;

/// Specifies which record store implementation to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreBackend {
    #[default]
    Memory,
    Postgres,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "memory" | "in-memory" => Ok(Self::Memory),
            "postgres" | "postgresql" => Ok(Self::Postgres),
            other => Err(format!(
                "Unknown store backend '{other}', expected 'memory' or 'postgres'"
            )),
        }
    }
}

/// Configuration for the record store
#[derive(Debug, Config, Clone)]
pub struct StoreConfig {
    /// Store backend: "memory" or "postgres" (default: memory)
    #[config(env = "CASTING_STORE_BACKEND", default = "memory")]
    pub backend: String,

    /// PostgreSQL connection string, required by the postgres backend
    #[config(env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Maximum number of pooled database connections (default: 5)
    #[config(env = "CASTING_STORE_MAX_CONNECTIONS", default = 5)]
    pub max_connections: u32,

    /// Seed two actors and two movies into empty tables at startup (default: false)
    #[config(env = "CASTING_STORE_SEED_DEMO_DATA", default = false)]
    pub seed_demo_data: bool,
}

impl StoreConfig {
    /// Get the configured backend
    pub fn get_backend(&self) -> Result<StoreBackend, String> {
        self.backend.parse()
    }
}
