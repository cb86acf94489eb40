//! Identity provider configuration

use confique::Config;
use jsonwebtoken::Algorithm;
use std::str::FromStr;
use url::Url;

/// Identity provider and token validation configuration
#[derive(Debug, Config, Clone)]
pub struct AuthConfig {
    /// Identity provider domain, e.g. "agency.eu.auth0.com"
    #[config(env = "CASTING_AUTH_DOMAIN")]
    pub domain: String,

    /// Expected `aud` claim of access tokens
    #[config(env = "CASTING_AUTH_AUDIENCE")]
    pub audience: String,

    /// Expected `iss` claim (default: https://{domain}/)
    #[config(env = "CASTING_AUTH_ISSUER")]
    pub issuer: Option<String>,

    /// Signing key set location (default: https://{domain}/.well-known/jwks.json)
    #[config(env = "CASTING_AUTH_JWKS_URL")]
    pub jwks_url: Option<String>,

    /// Accepted signing algorithms, comma-separated (default: "RS256")
    #[config(env = "CASTING_AUTH_ALGORITHMS", default = "RS256")]
    pub algorithms: String,

    /// Lifetime of a cached signing key in seconds (default: 3600)
    #[config(env = "CASTING_AUTH_JWKS_CACHE_TTL", default = 3600)]
    pub jwks_cache_ttl: u64,

    /// Minimum seconds between two key set fetches triggered by unknown key ids (default: 30)
    #[config(env = "CASTING_AUTH_JWKS_REFRESH_INTERVAL", default = 30)]
    pub jwks_refresh_interval: u64,

    /// Timeout for fetching the key set in seconds (default: 5)
    #[config(env = "CASTING_AUTH_JWKS_FETCH_TIMEOUT", default = 5)]
    pub jwks_fetch_timeout: u64,
}

impl AuthConfig {
    /// Returns the configured issuer or the one derived from the domain
    pub fn get_issuer(&self) -> String {
        self.issuer
            .clone()
            .unwrap_or_else(|| format!("https://{}/", self.domain.trim_end_matches('/')))
    }

    /// Returns the key set URL, derived from the domain unless configured
    pub fn get_jwks_url(&self) -> Result<Url, String> {
        match &self.jwks_url {
            Some(url) => Url::parse(url).map_err(|e| format!("Invalid JWKS URL '{url}': {e}")),
            None => Url::parse(&self.get_issuer())
                .and_then(|base| base.join(".well-known/jwks.json"))
                .map_err(|e| format!("Invalid identity provider domain '{}': {e}", self.domain)),
        }
    }

    /// Get accepted algorithms as a vector
    pub fn get_algorithms(&self) -> Result<Vec<Algorithm>, String> {
        let algorithms = self
            .algorithms
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| Algorithm::from_str(s).map_err(|_| format!("Unsupported algorithm '{s}'")))
            .collect::<Result<Vec<_>, _>>()?;

        if algorithms.is_empty() {
            return Err("At least one signing algorithm is required".to_string());
        }
        Ok(algorithms)
    }
}
