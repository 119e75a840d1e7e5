use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{Error, Result};

/// OpenFlow datapath identifier of a network element
///
/// Only the non-negative half of the 64-bit range is valid, matching the
/// signed representation used by most controllers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DatapathId(u64);

impl DatapathId {
    /// Largest accepted datapath id (2^63 - 1)
    pub const MAX: u64 = i64::MAX as u64;

    /// Creates a datapath id, rejecting values outside [0, 2^63 - 1]
    pub fn new(value: u64) -> Result<Self> {
        if value > Self::MAX {
            return Err(Error::datapath_id_range(format!(
                "{value} is out of boundary (valid between 0 and 2^63-1)"
            )));
        }
        Ok(DatapathId(value))
    }

    /// Parses a decimal datapath id as written in the id mapping file
    pub fn parse(text: &str) -> Result<Self> {
        let text = text.trim();
        let digits = text.strip_prefix('-').unwrap_or(text);
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::file_parse(format!("invalid DPID [{text}]")));
        }
        if text.starts_with('-') {
            // "-0" is still zero
            if digits.bytes().all(|b| b == b'0') {
                return Ok(DatapathId(0));
            }
            return Err(Error::datapath_id_range(format!(
                "{text} is out of boundary (valid between 0 and 2^63-1)"
            )));
        }
        match digits.parse::<u64>() {
            Ok(value) => Self::new(value),
            Err(_) => Err(Error::datapath_id_range(format!(
                "{text} is out of boundary (valid between 0 and 2^63-1)"
            ))),
        }
    }

    /// Returns the raw value
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for DatapathId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Runtime configuration of the node
///
/// Resolved once at startup and handed to every component by value.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Controller host name or address
    pub controller_host: String,
    /// Controller TCP port
    pub controller_port: u16,
    /// How long a freshly installed cross-connect stays highlighted
    #[serde(serialize_with = "super::serde::serialize_secs")]
    #[serde(deserialize_with = "super::serde::deserialize_highlight_secs")]
    pub highlight_expiry: Duration,
    /// Timeout for establishing the controller connection
    #[serde(serialize_with = "super::serde::serialize_secs")]
    #[serde(deserialize_with = "super::serde::deserialize_secs")]
    pub connect_timeout: Duration,
    /// Interval between liveness echo requests
    #[serde(serialize_with = "super::serde::serialize_secs")]
    #[serde(deserialize_with = "super::serde::deserialize_secs")]
    pub echo_interval: Duration,
    /// Directory holding the four descriptor files
    pub data_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            controller_host: "127.0.0.1".to_string(),
            controller_port: super::DEFAULT_CONTROLLER_PORT,
            highlight_expiry: super::DEFAULT_HIGHLIGHT_EXPIRY,
            connect_timeout: Duration::from_secs(10),
            echo_interval: Duration::from_secs(10),
            data_dir: PathBuf::from("data"),
        }
    }
}

impl Config {
    /// Loads configuration from a JSON file; absent keys keep their defaults
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| Error::config(format!("cannot read {}: {}", path.display(), e)))?;
        Self::from_json(&raw)
    }

    /// Parses configuration from JSON text
    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(|e| Error::config(format!("invalid configuration: {e}")))
    }

    /// Returns the controller address as a `host:port` string
    pub fn controller_addr(&self) -> String {
        format!("{}:{}", self.controller_host, self.controller_port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_datapath_id_bounds() {
        assert_eq!(DatapathId::parse("0").unwrap().value(), 0);
        assert_eq!(
            DatapathId::parse("9223372036854775807").unwrap().value(),
            i64::MAX as u64
        );
        assert!(matches!(
            DatapathId::parse("-1"),
            Err(Error::DatapathIdRange(_))
        ));
        assert!(matches!(
            DatapathId::parse("9223372036854775808"),
            Err(Error::DatapathIdRange(_))
        ));
        assert!(matches!(
            DatapathId::parse("99999999999999999999999"),
            Err(Error::DatapathIdRange(_))
        ));
    }

    #[test]
    fn test_datapath_id_garbage() {
        assert!(matches!(DatapathId::parse("0x10"), Err(Error::FileParse(_))));
        assert!(matches!(DatapathId::parse(""), Err(Error::FileParse(_))));
    }

    #[test]
    fn test_config_defaults() {
        let config = Config::from_json("{}").unwrap();
        assert_eq!(config.controller_port, 6653);
        assert_eq!(config.highlight_expiry, Duration::from_secs(10));
        assert_eq!(config.echo_interval, Duration::from_secs(10));
        assert_eq!(config.controller_addr(), "127.0.0.1:6653");
    }

    #[test]
    fn test_config_invalid_highlight_uses_default() {
        let config = Config::from_json(r#"{"highlight_expiry":"soon"}"#).unwrap();
        assert_eq!(config.highlight_expiry, Duration::from_secs(10));
    }

    #[test]
    fn test_config_bad_port_is_config_error() {
        let err = Config::from_json(r#"{"controller_port":"six"}"#).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        let err = Config::from_json(r#"{"controller_port":70000}"#).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
