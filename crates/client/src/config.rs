//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `GREENGROCER_API_URL` - Base URL of the cart backend
//!   (default: `http://localhost:8080`)
//! - `GREENGROCER_CREDENTIALS_PATH` - Durable credential slot location
//!   (default: `.greengrocer/credentials.json`)

use std::path::PathBuf;

use thiserror::Error;
use url::Url;

const DEFAULT_API_URL: &str = "http://localhost:8080";
const DEFAULT_CREDENTIALS_PATH: &str = ".greengrocer/credentials.json";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the cart backend.
    pub api_url: Url,
    /// Path of the durable credential slot.
    pub credentials_path: PathBuf,
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `GREENGROCER_API_URL` is not an absolute
    /// `http`/`https` URL.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_url = parse_api_url(&get_env_or_default("GREENGROCER_API_URL", DEFAULT_API_URL))?;
        let credentials_path = PathBuf::from(get_env_or_default(
            "GREENGROCER_CREDENTIALS_PATH",
            DEFAULT_CREDENTIALS_PATH,
        ));

        Ok(Self {
            api_url,
            credentials_path,
        })
    }
}

fn parse_api_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw)
        .map_err(|e| ConfigError::InvalidEnvVar("GREENGROCER_API_URL".to_owned(), e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            "GREENGROCER_API_URL".to_owned(),
            format!("unsupported scheme: {}", url.scheme()),
        ));
    }

    Ok(url)
}

fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_api_url_accepts_http_and_https() {
        assert!(parse_api_url("http://localhost:8080").is_ok());
        assert!(parse_api_url("https://cart.example.com").is_ok());
    }

    #[test]
    fn test_parse_api_url_rejects_other_schemes() {
        assert!(parse_api_url("ftp://cart.example.com").is_err());
        assert!(parse_api_url("not a url").is_err());
    }

    #[test]
    fn test_defaults() {
        // Defaults are applied when the variables are unset; exercise the
        // parsing path with the literal defaults rather than mutating the
        // process environment.
        let url = parse_api_url(DEFAULT_API_URL).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/");
        assert_eq!(DEFAULT_CREDENTIALS_PATH, ".greengrocer/credentials.json");
    }
}
