use std::path::PathBuf;

use clap::Parser;
use regex::Regex;

use crate::utils::logging::LogLevel;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "central-drift",
    author,
    version,
    about = "Compare a live group or device configuration against a template or a previous snapshot.",
    long_about = None
)]
pub struct Args {
    /// Master template to compare against
    #[arg(long, default_value = "template.json")]
    pub template: PathBuf,

    /// Previously saved configuration to compare against; overrides --template
    #[arg(long)]
    pub previous_config: Option<PathBuf>,

    /// Save the fetched live configuration to this path
    #[arg(long)]
    pub save_config: Option<PathBuf>,

    /// JSON file with exemption rules
    #[arg(long)]
    pub exemptions: Option<PathBuf>,

    /// Check the local override of a single device
    #[arg(long, value_parser = parse_mac_address)]
    pub mac_address: Option<String>,

    /// Only report whether there is a difference
    #[arg(long)]
    pub simplified: bool,

    #[arg(long)]
    pub no_color: bool,

    #[arg(long, env = "ARUBA_GROUP_NAME")]
    pub group_name: Option<String>,

    #[arg(long, env = "ARUBA_BASE_URL")]
    pub base_url: Option<String>,

    #[arg(long, env = "ARUBA_CLIENT_ID")]
    pub client_id: Option<String>,

    #[arg(long, env = "ARUBA_CLIENT_SECRET", hide_env_values = true)]
    pub client_secret: Option<String>,

    /// Where the credential record is cached
    #[arg(long, env = "ARUBA_TOKEN_FILE")]
    pub token_file: Option<PathBuf>,

    /// Optional YAML settings file
    #[arg(short, long, env = "CENTRAL_DRIFT_CONFIG")]
    pub config: Option<PathBuf>,

    #[arg(long, env = "LOG_LEVEL", value_enum)]
    pub log_level: Option<LogLevel>,
}

/// Six hex octets separated by `:` or `-` (or not at all), or twelve bare hex digits.
pub fn parse_mac_address(value: &str) -> Result<String, String> {
    let re = Regex::new(r"^([0-9a-fA-F]{2}([:\-]?)){5}[0-9a-fA-F]{2}$|^[0-9a-fA-F]{12}$")
        .map_err(|e| e.to_string())?;
    if re.is_match(value) {
        Ok(value.to_owned())
    } else {
        Err(format!("'{}' is not a valid MAC address format", value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_common_mac_formats() {
        for mac in ["aa:bb:cc:dd:ee:ff", "AA-BB-CC-DD-EE-FF", "aabbccddeeff", "00:1A:2b:3C:4d:5E"] {
            assert!(parse_mac_address(mac).is_ok(), "{mac}");
        }
    }

    #[test]
    fn rejects_malformed_macs() {
        for mac in ["aa:bb:cc:dd:ee", "aa:bb:cc:dd:ee:fg", "aabb.ccdd.eeff", ""] {
            assert!(parse_mac_address(mac).is_err(), "{mac}");
        }
    }

    #[test]
    fn parses_flags() {
        let args = Args::parse_from([
            "central-drift",
            "--previous-config",
            "prev.json",
            "--mac-address",
            "aa:bb:cc:dd:ee:ff",
            "--simplified",
            "--no-color",
        ]);
        assert_eq!(args.template, PathBuf::from("template.json"));
        assert_eq!(args.previous_config, Some(PathBuf::from("prev.json")));
        assert_eq!(args.mac_address.as_deref(), Some("aa:bb:cc:dd:ee:ff"));
        assert!(args.simplified && args.no_color);
        assert!(Args::try_parse_from(["central-drift", "--mac-address", "nope"]).is_err());
    }
}
