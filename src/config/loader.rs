use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;
use secrecy::SecretString;
use tracing::debug;

use crate::config::args::Args;
use crate::config::settings::Settings;
use crate::error::{DriftError, DriftResult};

/// Settings from the optional YAML file, overridden by command line and environment.
pub fn run(args: &Args) -> DriftResult<Settings> {
    let settings = match &args.config {
        Some(path) => file_to_settings(path)?,
        None => Settings::default(),
    };
    Ok(apply_args(settings, args))
}

/// Fill the process environment from `.env` in the working directory or a parent.
/// Variables that are already set win. `Ok(None)` when there is no such file.
pub fn load_dotenv() -> DriftResult<Option<PathBuf>> {
    match dotenvy::dotenv() {
        Ok(path) => Ok(Some(path)),
        Err(e) if e.not_found() => Ok(None),
        Err(e) => Err(DriftError::configuration(format!("invalid .env file: {}", e))),
    }
}

/// Same as [`load_dotenv`] for an explicit file.
pub fn load_dotenv_from(path: &Path) -> DriftResult<bool> {
    match dotenvy::from_path(path) {
        Ok(()) => Ok(true),
        Err(e) if e.not_found() => Ok(false),
        Err(e) => Err(DriftError::configuration(format!(
            "invalid env file '{}': {}",
            path.display(),
            e
        ))),
    }
}

/// Load settings from a YAML file, expanding `${VAR}` and `${VAR:default}`.
pub fn file_to_settings(path: &Path) -> DriftResult<Settings> {
    let content = fs::read_to_string(path).map_err(|e| DriftError::io(path.display().to_string(), e))?;
    parse_settings(&content)
        .map_err(|e| DriftError::configuration(format!("invalid settings file '{}': {}", path.display(), e)))
}

pub fn parse_settings(content: &str) -> DriftResult<Settings> {
    let expanded = expand_env_vars(content)?;
    let settings: Settings =
        serde_yaml::from_str(&expanded).map_err(|e| DriftError::configuration(e.to_string()))?;
    debug!("settings file parsed");
    Ok(settings)
}

fn apply_args(mut settings: Settings, args: &Args) -> Settings {
    if let Some(url) = &args.base_url {
        settings.base_url = Some(url.to_owned());
    }
    if let Some(id) = &args.client_id {
        settings.client_id = Some(id.to_owned());
    }
    if let Some(secret) = &args.client_secret {
        settings.client_secret = Some(SecretString::new(secret.to_owned()));
    }
    if let Some(group) = &args.group_name {
        settings.group_name = Some(group.to_owned());
    }
    if let Some(path) = &args.token_file {
        settings.token_file = path.to_owned();
    }
    settings
}

fn expand_env_vars(input: &str) -> DriftResult<String> {
    let re = Regex::new(r"\$\{(\w+)(?::([^\}]+))?\}").map_err(|e| DriftError::configuration(e.to_string()))?;
    Ok(re
        .replace_all(input, |caps: &regex::Captures| {
            let var = &caps[1];
            let default = caps.get(2).map(|m| m.as_str()).unwrap_or("");
            std::env::var(var).unwrap_or_else(|_| default.to_string())
        })
        .to_string())
}
