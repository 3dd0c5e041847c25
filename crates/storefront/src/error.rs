//! Unified error handling for the storefront client.
//!
//! Provides a unified `StorefrontError` type aggregating the per-layer
//! errors. Fallible client operations return `Result<T, StorefrontError>`.

use thiserror::Error;

use copperleaf_core::ProductId;

use crate::api::ApiError;
use crate::config::ConfigError;
use crate::persist::PersistenceError;

/// Client-level error type for the storefront.
#[derive(Debug, Error)]
pub enum StorefrontError {
    /// Backend API call failed.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Configuration loading failed.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Opening the storage backend failed.
    #[error("Storage error: {0}")]
    Persistence(#[from] PersistenceError),

    /// The current session lacks the role an operation requires.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// A product id was not found in the catalog.
    #[error("Unknown product: {0}")]
    UnknownProduct(ProductId),
}

/// Result type alias for `StorefrontError`.
pub type Result<T> = std::result::Result<T, StorefrontError>;
