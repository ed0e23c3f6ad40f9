use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde_json::Value;
use tracing::{debug, info};

use crate::error::{DriftError, DriftResult};
use crate::sources::transport::Transport;

pub const GROUP_CONFIG_PATH: &str = "/caasapi/v1/showcommand/object/effective";
pub const DEVICE_CONFIG_PATH: &str = "/caasapi/v1/showcommand/object/committed";

// unreserved characters plus '/', left as-is in the group name
const GROUP_NAME: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'_')
    .remove(b'.')
    .remove(b'-')
    .remove(b'~')
    .remove(b'/');

/// Authenticated reader of group and device configuration envelopes.
pub struct CentralClient<T> {
    transport: T,
    access_token: String,
}

impl<T: Transport> CentralClient<T> {
    pub fn new(transport: T, access_token: String) -> Self {
        Self { transport, access_token }
    }

    /// Effective configuration of a whole group.
    pub async fn group_config(&self, group: &str) -> DriftResult<Value> {
        info!("fetching group configuration for '{}'", group);
        self.fetch(group_config_endpoint(group)?).await
    }

    /// Local override committed for a single device of the group.
    pub async fn device_override_config(&self, group: &str, mac: &str) -> DriftResult<Value> {
        info!("fetching device override for '{}' in group '{}'", mac, group);
        self.fetch(device_config_endpoint(group, mac)?).await
    }

    async fn fetch(&self, endpoint: String) -> DriftResult<Value> {
        debug!("calling {}", endpoint);
        Ok(self.transport.get_json(&endpoint, &self.access_token).await?)
    }
}

pub fn group_config_endpoint(group: &str) -> DriftResult<String> {
    Ok(format!("{}?group_name={}", GROUP_CONFIG_PATH, encode_group(group)?))
}

pub fn device_config_endpoint(group: &str, mac: &str) -> DriftResult<String> {
    Ok(format!("{}?group_name={}/{}", DEVICE_CONFIG_PATH, encode_group(group)?, mac))
}

fn encode_group(group: &str) -> DriftResult<String> {
    if group.trim().is_empty() {
        return Err(DriftError::configuration("a group name is required to fetch configuration"));
    }
    Ok(utf8_percent_encode(group, GROUP_NAME).to_string())
}
