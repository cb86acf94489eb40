pub(crate) use crate::config::auth::AuthConfig;
pub(crate) use crate::config::store::{StoreBackend, StoreConfig};
use confique::Config;

pub mod auth;
pub mod store;

/// Main configuration structure for the casting server
#[derive(Debug, Config, Clone)]
pub struct Settings {
    /// The port the server will listen to (default: 8080)
    #[config(env = "CASTING_PORT", default = 8080)]
    pub port: u16,

    /// Extends the greeting served on `/` (default: false)
    #[config(env = "CASTING_EXCITED", default = false)]
    pub excited: bool,

    /// Identity provider and token validation configuration
    #[config(nested)]
    pub auth: AuthConfig,

    /// Record store configuration
    #[config(nested)]
    pub store: StoreConfig,
}

impl Settings {
    /// Creates a new Settings instance from environment variables
    pub fn new() -> Result<Self, String> {
        Self::builder().env().load().map_err(|e| e.to_string())
    }

    #[cfg(test)]
    pub fn for_test_with_mocks(jwks_mock: &wiremock::MockServer) -> Self {
        Self {
            port: 0, // Let the OS choose a port
            excited: false,
            auth: AuthConfig {
                domain: "casting.test".to_string(),
                audience: "casting-api".to_string(),
                issuer: None,
                jwks_url: Some(format!("{}/.well-known/jwks.json", jwks_mock.uri())),
                algorithms: "RS256".to_string(),
                jwks_cache_ttl: 3600,
                jwks_refresh_interval: 30,
                jwks_fetch_timeout: 1,
            },
            store: StoreConfig {
                backend: "memory".to_string(),
                database_url: None,
                max_connections: 1,
                seed_demo_data: false,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_from_env() {
        // Clear any existing environment variables
        for (name, _value) in std::env::vars() {
            if name.starts_with("CASTING_") {
                std::env::remove_var(name);
            }
        }
        std::env::remove_var("DATABASE_URL");

        // Required settings missing
        assert!(Settings::new().is_err());

        std::env::set_var("CASTING_AUTH_DOMAIN", "agency.eu.auth0.com");
        std::env::set_var("CASTING_AUTH_AUDIENCE", "casting");

        let settings = Settings::new().unwrap();
        assert_eq!(settings.port, 8080);
        assert!(!settings.excited);
        assert_eq!(settings.auth.domain, "agency.eu.auth0.com");
        assert_eq!(settings.auth.audience, "casting");
        assert_eq!(settings.auth.issuer, None);
        assert_eq!(settings.auth.jwks_url, None);
        assert_eq!(settings.auth.algorithms, "RS256");
        assert_eq!(settings.auth.jwks_cache_ttl, 3600);
        assert_eq!(settings.auth.jwks_refresh_interval, 30);
        assert_eq!(settings.auth.jwks_fetch_timeout, 5);
        assert_eq!(settings.store.get_backend(), Ok(StoreBackend::Memory));
        assert_eq!(settings.store.database_url, None);
        assert_eq!(settings.store.max_connections, 5);
        assert!(!settings.store.seed_demo_data);

        std::env::set_var("CASTING_PORT", "9090");
        std::env::set_var("CASTING_EXCITED", "true");
        std::env::set_var("CASTING_STORE_BACKEND", "postgres");
        std::env::set_var("DATABASE_URL", "postgres://casting@localhost/casting");

        let settings = Settings::new().unwrap();
        assert_eq!(settings.port, 9090);
        assert!(settings.excited);
        assert_eq!(settings.store.get_backend(), Ok(StoreBackend::Postgres));
        assert_eq!(
            settings.store.database_url.as_deref(),
            Some("postgres://casting@localhost/casting")
        );

        // Clean up
        for name in [
            "CASTING_AUTH_DOMAIN",
            "CASTING_AUTH_AUDIENCE",
            "CASTING_PORT",
            "CASTING_EXCITED",
            "CASTING_STORE_BACKEND",
            "DATABASE_URL",
        ] {
            std::env::remove_var(name);
        }
    }
}
