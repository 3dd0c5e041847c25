//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional; defaults target a local backend.
//!
//! - `COPPERLEAF_API_BASE_URL` - Backend API base URL
//!   (default: `http://localhost:8080/api`)
//! - `COPPERLEAF_STORAGE_PATH` - Path of the JSON storage file. Set to the
//!   empty string for a non-durable in-memory session
//!   (default: `copperleaf-storage.json`)
//! - `COPPERLEAF_CLEAR_CART_ON_LOGOUT` - Whether logout also empties the
//!   cart (`true`/`false`, default: `true`)
//! - `COPPERLEAF_REQUEST_TIMEOUT_SECS` - Per-request timeout in seconds
//!   (default: 30)

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Default backend API base, matching a local development server.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080/api";

/// Default storage file, relative to the working directory.
pub const DEFAULT_STORAGE_PATH: &str = "copperleaf-storage.json";

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend API base URL; endpoint paths are joined onto it.
    pub api_base_url: Url,
    /// Storage file location; `None` keeps all state in memory.
    pub storage_path: Option<PathBuf>,
    /// Policy flag: whether `logout` also empties the cart. This is a
    /// product choice, not an invariant of the session model.
    pub clear_cart_on_logout: bool,
    /// Per-request timeout.
    pub request_timeout: Duration,
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a set variable fails to parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_base_url = get_env_or_default("COPPERLEAF_API_BASE_URL", DEFAULT_API_BASE_URL);
        let api_base_url = Url::parse(&api_base_url).map_err(|e| {
            ConfigError::InvalidEnvVar("COPPERLEAF_API_BASE_URL".to_string(), e.to_string())
        })?;

        let storage_path = match std::env::var("COPPERLEAF_STORAGE_PATH") {
            Ok(value) if value.is_empty() => None,
            Ok(value) => Some(PathBuf::from(value)),
            Err(_) => Some(PathBuf::from(DEFAULT_STORAGE_PATH)),
        };

        let clear_cart_on_logout = parse_bool(
            "COPPERLEAF_CLEAR_CART_ON_LOGOUT",
            &get_env_or_default("COPPERLEAF_CLEAR_CART_ON_LOGOUT", "true"),
        )?;

        let request_timeout_secs = get_env_or_default(
            "COPPERLEAF_REQUEST_TIMEOUT_SECS",
            &DEFAULT_REQUEST_TIMEOUT_SECS.to_string(),
        );
        let request_timeout_secs = request_timeout_secs.parse::<u64>().map_err(|e| {
            ConfigError::InvalidEnvVar("COPPERLEAF_REQUEST_TIMEOUT_SECS".to_string(), e.to_string())
        })?;

        Ok(Self {
            api_base_url,
            storage_path,
            clear_cart_on_logout,
            request_timeout: Duration::from_secs(request_timeout_secs),
        })
    }

    /// A configuration for tests: local defaults, in-memory storage.
    ///
    /// # Panics
    ///
    /// Never panics; the default URL is a valid constant.
    #[must_use]
    pub fn for_tests() -> Self {
        Self {
            api_base_url: Url::parse(DEFAULT_API_BASE_URL)
                .unwrap_or_else(|_| unreachable!("default URL is valid")),
            storage_path: None,
            clear_cart_on_logout: true,
            request_timeout: Duration::from_secs(5),
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse a boolean flag, accepting the usual spellings.
fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("expected a boolean, got {other:?}"),
        )),
    }
}
