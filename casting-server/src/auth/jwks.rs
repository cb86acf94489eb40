//! Signing key set of the identity provider, cached per key id

use crate::config::AuthConfig;
use chrono::{DateTime, Utc};
use jsonwebtoken::jwk::Jwk;
use jsonwebtoken::DecodingKey;
use log::{debug, error, info, warn};
use moka::future::Cache as MokaCache;
use reqwest::Client;
use serde::Deserialize;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::Mutex as AsyncMutex;
use url::Url;

/// Errors that can occur while fetching the key set
#[derive(Debug, Error)]
pub enum KeySetError {
    #[error("Failed to fetch signing keys: {0}")]
    Fetch(#[from] reqwest::Error),
    #[error("Identity provider returned HTTP {0}")]
    Status(reqwest::StatusCode),
    #[error("Invalid key set URL: {0}")]
    Config(String),
}

/// Loosely typed key set, so one unsupported key does not reject the others
#[derive(Debug, Deserialize)]
struct RawKeySet {
    #[serde(default)]
    keys: Vec<serde_json::Value>,
}

/// Snapshot of the cache for readiness reporting
#[derive(Debug, Clone, PartialEq)]
pub struct KeySetStatus {
    pub cached_keys: u64,
    pub last_fetched: Option<DateTime<Utc>>,
}

/// Caches the identity provider's public keys by key id.
///
/// Keys expire after the configured TTL. A lookup miss re-fetches the whole
/// set. Only one fetch runs at a time, and lookups that miss while it is in
/// flight wait for it and then read the cache again. A kid that is still
/// unknown after the latest fetch triggers another one at most once per
/// refresh interval.
pub struct KeyStore {
    client: Client,
    jwks_url: Url,
    keys: MokaCache<String, DecodingKey>,
    refresh_interval: Duration,
    /// Start of the latest fetch; held for the whole fetch
    last_attempt: AsyncMutex<Option<Instant>>,
    last_success: Mutex<Option<DateTime<Utc>>>,
}

impl KeyStore {
    fn create_client(timeout: u64) -> Result<Client, KeySetError> {
        Client::builder()
            .timeout(Duration::from_secs(timeout))
            .connect_timeout(Duration::from_secs(timeout.min(2)))
            .pool_max_idle_per_host(2)
            .pool_idle_timeout(Some(Duration::from_secs(90)))
            .build()
            .map_err(KeySetError::Fetch)
    }

    pub fn new(config: &AuthConfig) -> Result<Self, KeySetError> {
        let jwks_url = config.get_jwks_url().map_err(KeySetError::Config)?;
        Ok(Self {
            client: Self::create_client(config.jwks_fetch_timeout)?,
            jwks_url,
            keys: MokaCache::builder()
                .time_to_live(Duration::from_secs(config.jwks_cache_ttl))
                .max_capacity(256)
                .build(),
            refresh_interval: Duration::from_secs(config.jwks_refresh_interval),
            last_attempt: AsyncMutex::new(None),
            last_success: Mutex::new(None),
        })
    }

    /// Returns the decoding key for `kid`, fetching the key set on a miss
    pub async fn get(&self, kid: &str) -> Option<DecodingKey> {
        if let Some(key) = self.keys.get(kid).await {
            return Some(key);
        }

        let mut last_attempt = self.last_attempt.lock().await;
        // A fetch that finished while we waited may have brought the key
        if let Some(key) = self.keys.get(kid).await {
            return Some(key);
        }

        let now = Instant::now();
        if let Some(last) = *last_attempt {
            if now.duration_since(last) < self.refresh_interval {
                debug!("Signing key '{kid}' unknown, key set was fetched recently");
                return None;
            }
        }
        *last_attempt = Some(now);

        match self.refresh().await {
            Ok(count) => info!("Fetched {count} signing key(s) from {}", self.jwks_url),
            Err(e) => {
                error!("Failed to refresh signing keys: {e}");
                return None;
            }
        }
        self.keys.get(kid).await
    }

    /// Fetches the key set and caches every usable key, returning how many were cached
    async fn refresh(&self) -> Result<usize, KeySetError> {
        let response = self.client.get(self.jwks_url.clone()).send().await?;
        if !response.status().is_success() {
            return Err(KeySetError::Status(response.status()));
        }
        let key_set: RawKeySet = response.json().await?;

        let mut cached = 0;
        for value in key_set.keys {
            let jwk: Jwk = match serde_json::from_value(value) {
                Ok(jwk) => jwk,
                Err(e) => {
                    warn!("Skipping unsupported signing key: {e}");
                    continue;
                }
            };
            let Some(kid) = jwk.common.key_id.clone() else {
                warn!("Skipping signing key without a key id");
                continue;
            };
            match DecodingKey::from_jwk(&jwk) {
                Ok(key) => {
                    self.keys.insert(kid, key).await;
                    cached += 1;
                }
                Err(e) => warn!("Skipping signing key '{kid}': {e}"),
            }
        }

        let mut last_success = match self.last_success.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *last_success = Some(Utc::now());
        Ok(cached)
    }

    /// Reports the number of cached keys and the time of the last successful fetch
    pub fn status(&self) -> KeySetStatus {
        let last_fetched = match self.last_success.lock() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        };
        KeySetStatus {
            cached_keys: self.keys.entry_count(),
            last_fetched,
        }
    }
}
