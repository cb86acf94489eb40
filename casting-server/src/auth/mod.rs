//! Bearer token authentication and per-route permission checks

pub mod error;
pub mod guard;
pub mod jwks;
pub mod permissions;
pub mod token;

pub use error::AuthError;
pub use guard::{require_permission, PermissionGuard};
pub use permissions::Permission;
pub use token::{Claims, TokenValidator};
