use std::path::PathBuf;

use secrecy::SecretString;
use serde::Deserialize;

use crate::sources::oauth2::Credentials;

pub const DEFAULT_TOKEN_FILE: &str = "token.json";

/// ================================
/// Connection and credential settings
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub base_url: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<SecretString>,
    pub group_name: Option<String>,
    #[serde(default = "default_token_file")]
    pub token_file: PathBuf,
    pub logging: Option<LoggingConfig>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: None,
            client_id: None,
            client_secret: None,
            group_name: None,
            token_file: default_token_file(),
            logging: None,
        }
    }
}

impl Settings {
    /// Base URL with surrounding whitespace removed, if set.
    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref().map(str::trim).filter(|url| !url.is_empty())
    }

    pub fn group_name(&self) -> Option<&str> {
        self.group_name.as_deref().filter(|group| !group.trim().is_empty())
    }

    pub fn credentials(&self) -> Credentials {
        Credentials::new(self.client_id.clone(), self.client_secret.clone())
    }
}

/// ================================
/// Logging
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String, // allowed: trace, debug, info, warn, error
    #[serde(default)]
    pub format: LogFormat,
}

impl LoggingConfig {
    pub fn new(level: String, format: LogFormat) -> Self {
        Self { level, format }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self::new(default_log_level(), LogFormat::Compact)
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    #[default]
    Compact,
}

fn default_token_file() -> PathBuf {
    PathBuf::from(DEFAULT_TOKEN_FILE)
}

fn default_log_level() -> String {
    "info".to_owned()
}
