//! OpenFlow 1.3 protocol module
//!
//! This module defines the subset of OpenFlow messages the node speaks,
//! their framing, the flow-mod summary and the per-connection handler.

pub mod codec;
pub mod message;
pub mod state;
pub mod summary;

pub use self::codec::OfCodec;
pub use self::message::{FlowMod, FlowModCommand, Message};
pub use self::state::{ProtocolHandler, SessionState};
pub use self::summary::FlowModSummary;
