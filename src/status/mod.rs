//! Status events for the presentation layer
//!
//! The protocol side never touches a renderer. It publishes events on a
//! channel and whoever draws the NE consumes them.

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;

use crate::core::{DatapathId, STATUS_TEXT_DEFAULT, STATUS_TEXT_WAITING};

/// Something the presentation layer may want to show
#[derive(Debug, Clone, PartialEq)]
pub enum StatusEvent {
    /// Connection attempt started
    Connecting { ne: String, addr: String },
    /// Connection established
    Connected { ne: String },
    /// Connection attempt failed
    ConnectFailed { ne: String, reason: String },
    /// Connection lost or closed
    Disconnected { ne: String, reason: Option<String> },
    /// A flow-mod ADD was interpreted
    FlowMod {
        ne: String,
        dpid: DatapathId,
        summary: String,
        at: DateTime<Utc>,
    },
    /// No highlight timer is pending any more
    Waiting { ne: String },
    /// Highlight state changed; redraw
    Refresh { ne: String },
}

impl StatusEvent {
    /// NE the event belongs to
    pub fn ne(&self) -> &str {
        match self {
            StatusEvent::Connecting { ne, .. }
            | StatusEvent::Connected { ne }
            | StatusEvent::ConnectFailed { ne, .. }
            | StatusEvent::Disconnected { ne, .. }
            | StatusEvent::FlowMod { ne, .. }
            | StatusEvent::Waiting { ne }
            | StatusEvent::Refresh { ne } => ne,
        }
    }

    /// New flow-mod status text implied by the event, if it changes it
    pub fn status_text(&self) -> Option<&str> {
        match self {
            StatusEvent::Connected { .. } | StatusEvent::Waiting { .. } => Some(STATUS_TEXT_WAITING),
            StatusEvent::Disconnected { .. } | StatusEvent::ConnectFailed { .. } => {
                Some(STATUS_TEXT_DEFAULT)
            }
            StatusEvent::FlowMod { summary, .. } => Some(summary.as_str()),
            StatusEvent::Connecting { .. } | StatusEvent::Refresh { .. } => None,
        }
    }
}

/// Receiving end of the status channel
pub type StatusReceiver = mpsc::UnboundedReceiver<StatusEvent>;

/// Cloneable sending end of the status channel
#[derive(Debug, Clone)]
pub struct StatusSender {
    tx: mpsc::UnboundedSender<StatusEvent>,
}

impl StatusSender {
    /// Publishes an event; a closed presentation side is not an error
    pub fn publish(&self, event: StatusEvent) {
        if self.tx.send(event).is_err() {
            tracing::debug!("status receiver dropped, event discarded");
        }
    }
}

/// Creates a status channel
pub fn channel() -> (StatusSender, StatusReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (StatusSender { tx }, rx)
}
