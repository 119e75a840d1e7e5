use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use chrono::Utc;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::message::{FlowMod, FlowModCommand, Message, SwitchFeatures, OFPMP_PORT_DESC};
use super::summary::FlowModSummary;
use crate::core::{Config, DatapathId, Error, Result};
use crate::highlight::{ExpiryScheduler, HighlightState};
use crate::status::{StatusEvent, StatusSender};
use crate::util::XidGenerator;

/// Where a controller session stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No transport yet
    Disconnected,
    /// Transport up and hello sent
    HelloSent,
    /// At least one recognized message arrived
    Operational,
    /// Terminal
    Closed,
}

/// Per-connection OpenFlow handler of one NE
///
/// Every inbound message is answered synchronously; nothing here waits on
/// the network or on a timer.
pub struct ProtocolHandler {
    ne: String,
    dpid: DatapathId,
    highlight_expiry: Duration,
    highlights: Arc<HighlightState>,
    scheduler: ExpiryScheduler,
    events: StatusSender,
    xids: Arc<XidGenerator>,
    state: SessionState,
}

impl ProtocolHandler {
    /// Creates a handler for `ne` answering with datapath id `dpid`
    pub fn new(
        ne: impl Into<String>,
        dpid: DatapathId,
        config: &Config,
        highlights: Arc<HighlightState>,
        scheduler: ExpiryScheduler,
        events: StatusSender,
        xids: Arc<XidGenerator>,
    ) -> Self {
        ProtocolHandler {
            ne: ne.into(),
            dpid,
            highlight_expiry: config.highlight_expiry,
            highlights,
            scheduler,
            events,
            xids,
            state: SessionState::Disconnected,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Transport is up; returns the hello to send
    pub fn on_connected(&mut self) -> Message {
        self.state = SessionState::HelloSent;
        info!("{} (DPID={}) connected, sending Hello", self.ne, self.dpid);
        Message::Hello {
            xid: self.xids.next(),
            body: Bytes::new(),
        }
    }

    /// Transport is gone
    pub fn on_closed(&mut self) {
        if self.state != SessionState::Closed {
            info!("{} session closed", self.ne);
        }
        self.state = SessionState::Closed;
    }

    /// Handles one inbound message, returning the reply to send if any
    pub fn handle_message(&mut self, message: Message) -> Result<Option<Message>> {
        if self.state == SessionState::Closed {
            return Err(Error::protocol(format!(
                "{} received {} after close",
                self.ne,
                message.type_name()
            )));
        }
        if self.state == SessionState::HelloSent && !matches!(message, Message::Unknown { .. }) {
            self.state = SessionState::Operational;
        }

        debug!("{} received {} xid={}", self.ne, message.type_name(), message.xid());

        match message {
            Message::Hello { .. } => {
                info!("{} received Hello", self.ne);
                Ok(None)
            }
            Message::EchoRequest { xid, data } => Ok(Some(Message::EchoReply { xid, data })),
            Message::FeaturesRequest { xid } => {
                info!("{} received Features Request", self.ne);
                Ok(Some(Message::FeaturesReply {
                    xid,
                    features: SwitchFeatures::for_datapath(self.dpid),
                }))
            }
            Message::MultipartRequest { xid, kind, .. } => {
                // every stats request gets the port description
                info!("{} received Multipart Request (type {})", self.ne, kind);
                Ok(Some(Message::MultipartReply {
                    xid,
                    kind: OFPMP_PORT_DESC,
                    flags: 0,
                    body: Bytes::new(),
                }))
            }
            Message::FlowMod { flow_mod, .. } => {
                self.handle_flow_mod(&flow_mod)?;
                Ok(None)
            }
            Message::Unknown {
                version, msg_type, ..
            } => {
                warn!(
                    "{} ignored message type {} (version {:#04x})",
                    self.ne, msg_type, version
                );
                Ok(None)
            }
            other => {
                debug!("{} ignored {}", self.ne, other.type_name());
                Ok(None)
            }
        }
    }

    fn handle_flow_mod(&self, flow_mod: &FlowMod) -> Result<()> {
        match flow_mod.command {
            FlowModCommand::Add => {}
            command => {
                info!("{} received Flowmod {:?}, ignored", self.ne, command);
                return Ok(());
            }
        }

        let summary = FlowModSummary::from_flow_mod(flow_mod);
        let text = summary.to_string();
        info!("\nDPID={}\n{}", self.dpid, text);
        self.events.publish(StatusEvent::FlowMod {
            ne: self.ne.clone(),
            dpid: self.dpid,
            summary: text,
            at: Utc::now(),
        });

        let pair = summary.highlight_pair();
        if let Some(pair) = pair {
            self.highlights
                .insert(pair, Instant::now() + self.highlight_expiry);
            self.events.publish(StatusEvent::Refresh {
                ne: self.ne.clone(),
            });
        }
        self.scheduler.schedule(pair, self.highlight_expiry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::highlight::LinkPair;
    use crate::protocol::message::{Action, Instruction, OxmField};
    use crate::status::{self, StatusReceiver};

    fn handler() -> (ProtocolHandler, Arc<HighlightState>, StatusReceiver) {
        let highlights = Arc::new(HighlightState::new());
        let (events, rx) = status::channel();
        let scheduler = ExpiryScheduler::spawn("OPT1", highlights.clone(), events.clone());
        let handler = ProtocolHandler::new(
            "OPT1",
            DatapathId::new(7).unwrap(),
            &Config::default(),
            highlights.clone(),
            scheduler,
            events,
            Arc::new(XidGenerator::starting_at(100)),
        );
        (handler, highlights, rx)
    }

    fn add_flow(in_port: u32, output: u32) -> Message {
        let mut flow_mod = FlowMod::new(FlowModCommand::Add);
        flow_mod.matches = vec![OxmField::InPort(in_port)];
        flow_mod.instructions = vec![Instruction::WriteActions(vec![Action::Output {
            port: output,
            max_len: 0,
        }])];
        Message::FlowMod { xid: 1, flow_mod }
    }

    #[tokio::test]
    async fn test_state_transitions() {
        let (mut handler, _, _rx) = handler();
        assert_eq!(handler.state(), SessionState::Disconnected);

        let hello = handler.on_connected();
        assert!(matches!(hello, Message::Hello { xid: 100, .. }));
        assert_eq!(handler.state(), SessionState::HelloSent);

        handler
            .handle_message(Message::Hello {
                xid: 1,
                body: Bytes::new(),
            })
            .unwrap();
        assert_eq!(handler.state(), SessionState::Operational);

        handler.on_closed();
        assert_eq!(handler.state(), SessionState::Closed);
        assert!(handler
            .handle_message(Message::FeaturesRequest { xid: 2 })
            .is_err());
    }

    #[tokio::test]
    async fn test_replies() {
        let (mut handler, _, _rx) = handler();
        handler.on_connected();

        let data = Bytes::from_static(b"ping");
        assert_eq!(
            handler
                .handle_message(Message::EchoRequest {
                    xid: 5,
                    data: data.clone(),
                })
                .unwrap(),
            Some(Message::EchoReply { xid: 5, data })
        );

        match handler.handle_message(Message::FeaturesRequest { xid: 6 }).unwrap() {
            Some(Message::FeaturesReply { xid, features }) => {
                assert_eq!(xid, 6);
                assert_eq!(features.datapath_id, 7);
            }
            other => panic!("unexpected reply {other:?}"),
        }

        match handler
            .handle_message(Message::MultipartRequest {
                xid: 8,
                kind: OFPMP_PORT_DESC,
                flags: 0,
                body: Bytes::new(),
            })
            .unwrap()
        {
            Some(Message::MultipartReply { xid, kind, body, .. }) => {
                assert_eq!(xid, 8);
                assert_eq!(kind, OFPMP_PORT_DESC);
                assert!(body.is_empty());
            }
            other => panic!("unexpected reply {other:?}"),
        }

        let unknown = Message::Unknown {
            version: 4,
            msg_type: 99,
            xid: 9,
            body: Bytes::new(),
        };
        assert_eq!(handler.handle_message(unknown).unwrap(), None);
    }

    #[tokio::test]
    async fn test_desc_request_gets_port_desc_reply() {
        let (mut handler, _, _rx) = handler();
        handler.on_connected();

        let reply = handler
            .handle_message(Message::MultipartRequest {
                xid: 4,
                kind: 0,
                flags: 0,
                body: Bytes::new(),
            })
            .unwrap();
        assert_eq!(
            reply,
            Some(Message::MultipartReply {
                xid: 4,
                kind: OFPMP_PORT_DESC,
                flags: 0,
                body: Bytes::new(),
            })
        );
    }

    #[tokio::test]
    async fn test_flow_mod_add_highlights() {
        let (mut handler, highlights, mut rx) = handler();
        handler.on_connected();
        handler.handle_message(add_flow(5, 9)).unwrap();

        assert!(highlights.is_new(LinkPair::new(5, 9)));
        match rx.recv().await {
            Some(StatusEvent::FlowMod { summary, dpid, .. }) => {
                assert_eq!(summary, "[match] in_port=5\n[actions] output=9");
                assert_eq!(dpid.value(), 7);
            }
            other => panic!("unexpected event {other:?}"),
        }
        assert!(matches!(rx.recv().await, Some(StatusEvent::Refresh { .. })));
    }

    #[tokio::test]
    async fn test_flow_mod_delete_ignored() {
        let (mut handler, highlights, mut rx) = handler();
        handler.on_connected();
        let mut delete = FlowMod::new(FlowModCommand::Delete);
        delete.matches = vec![OxmField::InPort(5)];
        handler
            .handle_message(Message::FlowMod {
                xid: 3,
                flow_mod: delete,
            })
            .unwrap();

        assert_eq!(highlights.snapshot(), Default::default());
        assert!(rx.try_recv().is_err());
    }
}
