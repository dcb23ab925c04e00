//! Client configuration
//!
//! Loads credentials and connection settings from environment variables or
//! files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If incomplete, falls back to loading from file
//! 3. Probes standard paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `ADFLUX_CLIENT_ID`: OAuth client ID (required)
//! - `ADFLUX_CLIENT_SECRET`: OAuth client secret (required)
//! - `ADFLUX_REFRESH_TOKEN`: OAuth refresh token (required)
//! - `ADFLUX_APPLICATION_NAME`: Identifies the integration in requests
//!   (required)
//! - `ADFLUX_DEVELOPER_TOKEN`: Developer token header (optional)
//! - `ADFLUX_NETWORK_CODE`: Default network/account scope (optional)
//! - `ADFLUX_TOKEN_URL`: OAuth token endpoint override (optional)
//! - `ADFLUX_ENDPOINT`: API endpoint override (optional)
//! - `ADFLUX_API_VERSION`: API version override (optional)
//! - `ADFLUX_PAGE_SIZE`: Default page size for pagers (optional)
//! - `ADFLUX_MAX_RETRY_ATTEMPTS`: Attempt budget for retryable calls
//!   (optional)
//! - `ADFLUX_MUTATE_CHUNK_SIZE`: Operations per mutate request (optional)
//! - `ADFLUX_REQUEST_TIMEOUT_SECS`: Per-call deadline in seconds (optional)
//!
//! ## File Locations
//! The loader probes `./adflux.{json,toml}` and `./config.{json,toml}` in the
//! working directory, then the same names one directory up.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{ClientError, ClientResult};

/// Default API endpoint
pub const DEFAULT_ENDPOINT: &str = "https://ads.adflux.example.com";

/// Default OAuth token endpoint
pub const DEFAULT_TOKEN_URL: &str = "https://auth.adflux.example.com/oauth2/token";

/// API version used when none is configured
pub const DEFAULT_API_VERSION: &str = "v202408";

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_token_url() -> String {
    DEFAULT_TOKEN_URL.to_string()
}

fn default_api_version() -> String {
    DEFAULT_API_VERSION.to_string()
}

fn default_page_size() -> u32 {
    500
}

fn default_max_retry_attempts() -> u32 {
    3
}

fn default_mutate_chunk_size() -> usize {
    500
}

fn default_request_timeout_secs() -> u64 {
    60
}

/// Configuration for the API client
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    /// OAuth client ID
    pub client_id: String,

    /// OAuth client secret
    pub client_secret: String,

    /// Long-lived OAuth refresh token
    pub refresh_token: String,

    /// Identifies this integration in the User-Agent header
    pub application_name: String,

    /// Developer token header, required by some products
    #[serde(default)]
    pub developer_token: Option<String>,

    /// Default network/account code calls are scoped to
    #[serde(default)]
    pub network_code: Option<String>,

    /// OAuth token endpoint
    #[serde(default = "default_token_url")]
    pub token_url: String,

    /// API endpoint base URL
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// API version segment in request paths
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Page size pagers request per round trip
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Attempt budget for retryable calls (initial attempt included)
    #[serde(default = "default_max_retry_attempts")]
    pub max_retry_attempts: u32,

    /// Maximum operations per mutate request
    #[serde(default = "default_mutate_chunk_size")]
    pub mutate_chunk_size: usize,

    /// Per-call deadline in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl ClientConfig {
    /// Load configuration with automatic fallback strategy
    ///
    /// First attempts to load from environment variables. If required
    /// variables are missing, falls back to loading from a config file.
    ///
    /// # Errors
    /// Returns `ClientError::Config` if configuration cannot be loaded from
    /// either source or fails validation.
    pub fn load() -> ClientResult<Self> {
        match Self::load_from_env() {
            Ok(config) => {
                tracing::info!("Configuration loaded from environment variables");
                Ok(config)
            }
            Err(e) => {
                tracing::debug!(error = ?e, "Failed to load from environment, trying file");
                Self::load_from_file(None)
            }
        }
    }

    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns `ClientError::Config` if required variables are missing or
    /// have invalid values.
    pub fn load_from_env() -> ClientResult<Self> {
        let config = Self {
            client_id: env_var("ADFLUX_CLIENT_ID")?,
            client_secret: env_var("ADFLUX_CLIENT_SECRET")?,
            refresh_token: env_var("ADFLUX_REFRESH_TOKEN")?,
            application_name: env_var("ADFLUX_APPLICATION_NAME")?,
            developer_token: std::env::var("ADFLUX_DEVELOPER_TOKEN").ok(),
            network_code: std::env::var("ADFLUX_NETWORK_CODE").ok(),
            token_url: std::env::var("ADFLUX_TOKEN_URL").unwrap_or_else(|_| default_token_url()),
            endpoint: std::env::var("ADFLUX_ENDPOINT").unwrap_or_else(|_| default_endpoint()),
            api_version: std::env::var("ADFLUX_API_VERSION")
                .unwrap_or_else(|_| default_api_version()),
            page_size: env_parse("ADFLUX_PAGE_SIZE", default_page_size())?,
            max_retry_attempts: env_parse(
                "ADFLUX_MAX_RETRY_ATTEMPTS",
                default_max_retry_attempts(),
            )?,
            mutate_chunk_size: env_parse("ADFLUX_MUTATE_CHUNK_SIZE", default_mutate_chunk_size())?,
            request_timeout_secs: env_parse(
                "ADFLUX_REQUEST_TIMEOUT_SECS",
                default_request_timeout_secs(),
            )?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file
    ///
    /// If `path` is `None`, probes standard locations. Supports JSON and
    /// TOML, detected by file extension.
    ///
    /// # Errors
    /// Returns `ClientError::Config` if no file is found, the format is
    /// invalid, or validation fails.
    pub fn load_from_file(path: Option<PathBuf>) -> ClientResult<Self> {
        let config_path = match path {
            Some(p) => {
                if !p.exists() {
                    return Err(ClientError::Config(format!(
                        "Config file not found: {}",
                        p.display()
                    )));
                }
                p
            }
            None => probe_config_paths().ok_or_else(|| {
                ClientError::Config(
                    "No config file found in any of the standard locations".to_string(),
                )
            })?,
        };

        tracing::info!(path = %config_path.display(), "Loading configuration from file");

        let contents = std::fs::read_to_string(&config_path)
            .map_err(|e| ClientError::Config(format!("Failed to read config file: {e}")))?;

        let config = parse_config(&contents, &config_path)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate field values beyond mere presence
    ///
    /// # Errors
    /// Returns `ClientError::Config` naming the offending field.
    pub fn validate(&self) -> ClientResult<()> {
        if self.client_id.is_empty() {
            return Err(ClientError::Config("client_id must not be empty".to_string()));
        }
        if self.refresh_token.is_empty() {
            return Err(ClientError::Config("refresh_token must not be empty".to_string()));
        }
        if self.application_name.is_empty() {
            return Err(ClientError::Config("application_name must not be empty".to_string()));
        }
        if self.page_size == 0 {
            return Err(ClientError::Config("page_size must be greater than 0".to_string()));
        }
        if self.max_retry_attempts == 0 {
            return Err(ClientError::Config(
                "max_retry_attempts must be greater than 0".to_string(),
            ));
        }
        if self.mutate_chunk_size == 0 {
            return Err(ClientError::Config(
                "mutate_chunk_size must be greater than 0".to_string(),
            ));
        }
        url::Url::parse(&self.endpoint)
            .map_err(|e| ClientError::Config(format!("Invalid endpoint URL: {e}")))?;
        url::Url::parse(&self.token_url)
            .map_err(|e| ClientError::Config(format!("Invalid token URL: {e}")))?;
        Ok(())
    }
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> ClientResult<ClientConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| ClientError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| ClientError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(ClientError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Probe standard paths for configuration files
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        candidates.extend(vec![
            cwd.join("adflux.json"),
            cwd.join("adflux.toml"),
            cwd.join("config.json"),
            cwd.join("config.toml"),
            cwd.join("../adflux.json"),
            cwd.join("../adflux.toml"),
            cwd.join("../config.json"),
            cwd.join("../config.toml"),
        ]);
    }

    candidates.into_iter().find(|path| path.exists())
}

/// Get required environment variable
fn env_var(key: &str) -> ClientResult<String> {
    std::env::var(key)
        .map_err(|_| ClientError::Config(format!("Missing required environment variable: {key}")))
}

/// Parse an optional numeric environment variable, falling back to a default
fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> ClientResult<T>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|e| ClientError::Config(format!("Invalid value for {key}: {e}"))),
        Err(_) => Ok(default),
    }
}
