//! Client configuration.
//!
//! Supports reading the backend address and bearer credential from
//! `~/.config/sonda/secret.json`, with environment variables as fallback.

use serde::Deserialize;
use sonda_core::error::{Result, SondaError};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

const DEFAULT_API_URL: &str = "http://localhost:8000";

/// On-disk shape of secret.json.
#[derive(Debug, Clone, Deserialize)]
struct SecretFile {
    #[serde(default)]
    api_url: Option<String>,
    #[serde(default)]
    api_token: Option<String>,
}

/// Resolved configuration for [`HttpChatApi`](crate::HttpChatApi).
///
/// Resolution order per field: secret.json, then environment
/// (`SONDA_API_URL`, `SONDA_API_TOKEN`), then the built-in default URL.
/// The token is optional; requests go out unauthenticated without it and
/// the backend decides whether that is acceptable.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the backend, without a trailing slash
    pub api_url: String,
    /// Bearer credential attached to every request
    pub api_token: Option<String>,
}

impl ClientConfig {
    /// Loads configuration from the default path, tolerating a missing file.
    pub fn load() -> Result<Self> {
        let path = default_path()?;
        if path.exists() {
            Self::from_path(&path)
        } else {
            Ok(Self::from_file(None))
        }
    }

    /// Loads configuration from an explicit secret.json path (for testing).
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            SondaError::config(format!(
                "Failed to read configuration file at {}: {}",
                path.display(),
                e
            ))
        })?;

        let file: SecretFile = serde_json::from_str(&content).map_err(|e| {
            SondaError::config(format!(
                "Failed to parse configuration file at {}: {}",
                path.display(),
                e
            ))
        })?;

        Ok(Self::from_file(Some(file)))
    }

    fn from_file(file: Option<SecretFile>) -> Self {
        let file = file.unwrap_or(SecretFile {
            api_url: None,
            api_token: None,
        });

        let api_url = file
            .api_url
            .or_else(|| env::var("SONDA_API_URL").ok())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let api_token = file.api_token.or_else(|| env::var("SONDA_API_TOKEN").ok());

        Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            api_token,
        }
    }
}

/// Returns the path to the configuration file: ~/.config/sonda/secret.json
fn default_path() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| SondaError::config("Could not determine home directory"))?;
    Ok(home.join(".config").join("sonda").join("secret.json"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_url_and_token_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"api_url": "https://backend.example.com/", "api_token": "tok-123"}}"#
        )
        .unwrap();

        let config = ClientConfig::from_path(file.path()).unwrap();
        assert_eq!(config.api_url, "https://backend.example.com");
        assert_eq!(config.api_token.as_deref(), Some("tok-123"));
    }

    #[test]
    fn invalid_json_is_a_config_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let err = ClientConfig::from_path(file.path()).unwrap_err();
        assert!(matches!(err, SondaError::Config(_)));
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{}}").unwrap();

        let config = ClientConfig::from_path(file.path()).unwrap();
        assert_eq!(config.api_url, DEFAULT_API_URL);
    }
}
