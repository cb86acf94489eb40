use crate::auth::{Permission, PermissionGuard, TokenValidator};
use crate::config::Settings;
use crate::store::{create_stores, Stores};
use log::error;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub stores: Stores,
    pub validator: Arc<TokenValidator>,
}

impl AppState {
    pub async fn new(settings: Settings) -> Result<Self, std::io::Error> {
        let validator = TokenValidator::new(&settings.auth).map_err(|e| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("Invalid auth configuration: {e}"),
            )
        })?;
        let stores = create_stores(&settings.store).await.map_err(|e| {
            std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("Failed to create record store: {e}"),
            )
        })?;

        Ok(Self::with_stores(settings, stores, validator))
    }

    pub fn with_stores(settings: Settings, stores: Stores, validator: TokenValidator) -> Self {
        Self {
            settings: Arc::new(settings),
            stores,
            validator: Arc::new(validator),
        }
    }

    /// Guard state for a route requiring `permission`
    pub fn guard(&self, permission: Permission) -> PermissionGuard {
        PermissionGuard::new(self.validator.clone(), permission)
    }

    /// Checks that both record stores can be reached
    pub async fn health_check(&self) -> bool {
        let mut healthy = true;
        if let Err(e) = self.stores.actors.health_check().await {
            error!("Actor store health check failed: {e}");
            healthy = false;
        }
        if let Err(e) = self.stores.movies.health_check().await {
            error!("Movie store health check failed: {e}");
            healthy = false;
        }
        healthy
    }

    #[cfg(test)]
    pub fn for_testing(settings: &Settings) -> Self {
        let validator =
            TokenValidator::new(&settings.auth).expect("Failed to create token validator");
        Self::with_stores(settings.clone(), Stores::in_memory(), validator)
    }
}
