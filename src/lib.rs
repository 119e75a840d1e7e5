//! Dummy optical node: emulated optical network elements for an SDN controller
//!
//! This library loads a multi-layer optical topology from descriptor files
//! and lets each network element speak OpenFlow 1.3 with OTN extensions to a
//! controller, highlighting the cross-connects the controller installs.
pub mod core;
pub mod highlight;
pub mod network;
pub mod protocol;
pub mod status;
pub mod topology;
pub mod util;

// Re-export commonly used items
pub use crate::core::{Config, Error, Result};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
