//! Core types shared by every layer of the node
//!
//! Errors, configuration and the datapath identifier live here.

pub mod error;
pub mod types;
pub mod serde;

use std::time::Duration;

pub use self::error::{Error, Result};
pub use self::types::{Config, DatapathId};

/// OpenFlow protocol version spoken by the node (1.3)
pub const OPENFLOW_VERSION: u8 = 0x04;

/// IANA port for OpenFlow controllers
pub const DEFAULT_CONTROLLER_PORT: u16 = 6653;

/// Highlight expiry used when the configured value is absent or invalid
pub const DEFAULT_HIGHLIGHT_EXPIRY: Duration = Duration::from_secs(10);

/// Marker shown in place of an unbound southbound port number
pub const PORT_NOT_FOUND: &str = "-";

/// Flow-mod status text before the node is connected
pub const STATUS_TEXT_DEFAULT: &str = "";

/// Flow-mod status text while waiting for the controller
pub const STATUS_TEXT_WAITING: &str = "Waiting for Flowmod...";
