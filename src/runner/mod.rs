//! One drift check: load the reference, obtain a token, fetch the live
//! configuration, filter both sides, save and compare.

use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use reqwest::Client;
use serde_json::Value;
use tracing::{error, info, warn};

use crate::cache::token_store::FileTokenStore;
use crate::config::args::Args;
use crate::config::settings::Settings;
use crate::diff::canonical::to_canonical_json;
use crate::diff::compare::DEFAULT_TO_LABEL;
use crate::diff::ConfigDiffer;
use crate::error::DriftError;
use crate::exemptions::{apply_to_envelope, ExemptionRuleSet};
use crate::helpers::fs::write_atomic;
use crate::report::{self, Palette};
use crate::sources::central::CentralClient;
use crate::sources::oauth2::TokenManager;
use crate::sources::transport::HttpTransport;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    /// No difference, or nothing to compare.
    Clean,
    /// Operational error.
    Failure,
    MissingBaseUrl,
    /// Configurations differ.
    Drift,
}

impl ExitStatus {
    pub fn code(self) -> u8 {
        match self {
            ExitStatus::Clean => 0,
            ExitStatus::Failure => 1,
            ExitStatus::MissingBaseUrl => 2,
            ExitStatus::Drift => 3,
        }
    }
}

/// Runs the check and folds every error into [`ExitStatus::Failure`].
pub async fn run<W: Write>(args: &Args, settings: &Settings, out: &mut W) -> ExitStatus {
    match execute(args, settings, out).await {
        Ok(status) => status,
        Err(e) => {
            error!("{:#}", e);
            ExitStatus::Failure
        }
    }
}

pub async fn execute<W: Write>(args: &Args, settings: &Settings, out: &mut W) -> Result<ExitStatus> {
    let Some(base_url) = settings.base_url() else {
        error!("missing base URL, set ARUBA_BASE_URL or --base-url");
        return Ok(ExitStatus::MissingBaseUrl);
    };

    let (mut reference, from_label) = load_reference(args)?;
    if settings.group_name().is_none() {
        warn!("no group name specified, the configuration fetch will fail");
    }

    let transport = HttpTransport::new(Client::builder().build()?, base_url);
    let manager = TokenManager::new(
        FileTokenStore::new(&settings.token_file),
        &transport,
        settings.credentials(),
    );
    let token = manager.usable_token().await.context("no valid access token")?;

    let central = CentralClient::new(&transport, token);
    let group = settings.group_name().unwrap_or_default();
    let mut live = match &args.mac_address {
        Some(mac) => central.device_override_config(group, mac).await,
        None => central.group_config(group).await,
    }
    .context("failed to fetch the live configuration")?;

    if let Some(path) = &args.exemptions {
        let rules = ExemptionRuleSet::load(path)
            .with_context(|| format!("error loading exemption file '{}'", path.display()))?;
        info!("applying {} exemption rules from '{}'", rules.len(), path.display());
        if let Some(reference) = reference.as_mut() {
            apply_to_envelope(reference, &rules);
        }
        apply_to_envelope(&mut live, &rules);
    }

    if let Some(path) = &args.save_config {
        write_atomic(path, to_canonical_json(&live).as_bytes())
            .map_err(|e| DriftError::io(path.display().to_string(), e))
            .context("could not save live configuration")?;
        writeln!(out, "Successfully saved live configuration to '{}'", path.display())?;
    }

    let Some(reference) = reference else {
        writeln!(out, "No template or previous config to compare against. Exiting.")?;
        return Ok(ExitStatus::Clean);
    };

    let comparison = ConfigDiffer::new(from_label, DEFAULT_TO_LABEL).compare(&reference, &live);
    report::render(&comparison, args.simplified, &Palette::new(!args.no_color), out)?;

    Ok(if comparison.equal {
        ExitStatus::Clean
    } else {
        ExitStatus::Drift
    })
}

/// Reference document and its label. A previous snapshot wins over the template.
/// When saving a snapshot the template is optional and only used if present.
fn load_reference(args: &Args) -> Result<(Option<Value>, String)> {
    if let Some(path) = &args.previous_config {
        let reference = load_json(path).context("error loading previous config")?;
        info!("loaded previous configuration from '{}'", path.display());
        return Ok((Some(reference), label(path)));
    }

    let template = &args.template;
    if args.save_config.is_some() && !template.exists() {
        return Ok((None, label(template)));
    }
    let reference = load_json(template).context("error loading template")?;
    Ok((Some(reference), label(template)))
}

fn load_json(path: &Path) -> Result<Value, DriftError> {
    let content = fs::read_to_string(path).map_err(|e| DriftError::io(path.display().to_string(), e))?;
    serde_json::from_str(&content).map_err(|e| DriftError::parse(format!("'{}': {}", path.display(), e)))
}

fn label(path: &Path) -> String {
    path.display().to_string()
}
