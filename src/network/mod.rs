//! Controller connection management module
//!
//! This module opens the TCP connection of each NE to the controller, keeps
//! it alive with echo requests and drives the protocol handler.

mod connection;

pub use self::connection::{connect, liveness, ConnectionHandle, MessageSink, MessageStream};

use std::sync::Arc;

use futures::StreamExt;
use tracing::{error, info, warn};

use crate::core::{Config, DatapathId, Error, Result};
use crate::highlight::{ExpiryScheduler, HighlightState};
use crate::protocol::ProtocolHandler;
use crate::status::{StatusEvent, StatusSender};
use crate::topology::TopologyModel;
use crate::util::XidGenerator;

/// One NE's session with the controller
pub struct NeSession {
    ne: String,
    dpid: DatapathId,
    config: Config,
    events: StatusSender,
    highlights: Arc<HighlightState>,
}

impl NeSession {
    /// Prepares a session; fails when the NE has no datapath id
    pub fn new(
        model: &TopologyModel,
        ne: &str,
        config: Config,
        events: StatusSender,
    ) -> Result<Self> {
        let dpid = model.require_datapath_id(ne)?;
        Ok(NeSession {
            ne: ne.to_string(),
            dpid,
            config,
            events,
            highlights: Arc::new(HighlightState::new()),
        })
    }

    pub fn ne(&self) -> &str {
        &self.ne
    }

    pub fn dpid(&self) -> DatapathId {
        self.dpid
    }

    /// Highlight state fed by this session, for renderers
    pub fn highlights(&self) -> Arc<HighlightState> {
        self.highlights.clone()
    }

    /// Connects and serves the controller until the connection ends
    ///
    /// Returns `Ok` when the controller closed the connection, otherwise the
    /// error that ended it. Status returns to its default either way.
    pub async fn run(&self) -> Result<()> {
        let addr = self.config.controller_addr();
        self.events.publish(StatusEvent::Connecting {
            ne: self.ne.clone(),
            addr: addr.clone(),
        });
        info!("{} connecting to controller {}", self.ne, addr);

        let handle = match connect(
            &self.config.controller_host,
            self.config.controller_port,
            self.config.connect_timeout,
        )
        .await
        {
            Ok(handle) => handle,
            Err(e) => {
                error!("{} failed to connect: {}", self.ne, e);
                self.events.publish(StatusEvent::ConnectFailed {
                    ne: self.ne.clone(),
                    reason: e.to_string(),
                });
                return Err(e);
            }
        };

        self.attach(handle).await
    }

    /// Serves an already established connection until it ends
    pub async fn attach(&self, handle: ConnectionHandle) -> Result<()> {
        info!("{} connected to {}", self.ne, handle.peer());
        self.events.publish(StatusEvent::Connected {
            ne: self.ne.clone(),
        });

        let xids = Arc::new(XidGenerator::random());
        let scheduler =
            ExpiryScheduler::spawn(self.ne.as_str(), self.highlights.clone(), self.events.clone());
        let mut handler = ProtocolHandler::new(
            self.ne.as_str(),
            self.dpid,
            &self.config,
            self.highlights.clone(),
            scheduler,
            self.events.clone(),
            xids.clone(),
        );

        let (sink, stream) = handle.into_parts();
        let outcome = self.serve(&mut handler, &sink, stream, xids).await;

        sink.close().await;
        handler.on_closed();
        match &outcome {
            Ok(()) => info!("{} disconnected by controller", self.ne),
            Err(e) => warn!("{} disconnected: {}", self.ne, e),
        }
        self.events.publish(StatusEvent::Disconnected {
            ne: self.ne.clone(),
            reason: outcome.as_ref().err().map(ToString::to_string),
        });
        outcome
    }

    async fn serve(
        &self,
        handler: &mut ProtocolHandler,
        sink: &MessageSink,
        mut stream: MessageStream,
        xids: Arc<XidGenerator>,
    ) -> Result<()> {
        sink.send(handler.on_connected()).await?;

        let mut live = tokio::spawn(liveness(sink.clone(), self.config.echo_interval, xids));

        let result = loop {
            tokio::select! {
                frame = stream.next() => match frame {
                    Some(Ok(message)) => match handler.handle_message(message) {
                        Ok(Some(reply)) => {
                            if let Err(e) = sink.send(reply).await {
                                break Err(e);
                            }
                        }
                        Ok(None) => {}
                        Err(e) => break Err(e),
                    },
                    Some(Err(e)) => {
                        error!("{} received a malformed frame: {}", self.ne, e);
                        break Err(e);
                    }
                    None => break Ok(()),
                },
                checked = &mut live => {
                    break match checked {
                        Ok(result) => result,
                        Err(e) => Err(Error::liveness(format!("liveness task ended: {e}"))),
                    };
                }
            }
        };

        live.abort();
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::highlight::LinkPair;
    use crate::protocol::message::{Action, Instruction, OxmField, OFPMP_PORT_DESC};
    use crate::protocol::{FlowMod, FlowModCommand, Message, OfCodec};
    use crate::status;
    use crate::topology::DescriptorPaths;
    use bytes::Bytes;
    use futures::SinkExt;
    use std::time::Duration;
    use tokio::io::AsyncWriteExt;
    use tokio::net::TcpListener;
    use tokio_util::codec::{FramedRead, FramedWrite};

    async fn next_disconnect(rx: &mut status::StatusReceiver) -> StatusEvent {
        loop {
            match rx.recv().await.unwrap() {
                event @ StatusEvent::Disconnected { .. } => return event,
                _ => continue,
            }
        }
    }

    fn model() -> TopologyModel {
        let dir = concat!(env!("CARGO_MANIFEST_DIR"), "/data");
        TopologyModel::load(&DescriptorPaths::in_dir(dir)).unwrap()
    }

    fn config(port: u16) -> Config {
        Config {
            controller_port: port,
            connect_timeout: Duration::from_secs(1),
            ..Config::default()
        }
    }

    #[test]
    fn test_unknown_ne_has_no_session() {
        let (events, _rx) = status::channel();
        let result = NeSession::new(&model(), "NOPE", Config::default(), events);
        assert!(matches!(result, Err(Error::Topology(_))));
    }

    #[tokio::test]
    async fn test_connect_failure_reported() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let (events, mut rx) = status::channel();
        let session = NeSession::new(&model(), "OPT1", config(port), events).unwrap();
        assert!(session.run().await.is_err());

        assert!(matches!(rx.recv().await, Some(StatusEvent::Connecting { .. })));
        assert!(matches!(rx.recv().await, Some(StatusEvent::ConnectFailed { .. })));
    }

    #[tokio::test]
    async fn test_session_with_controller() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let (events, mut rx) = status::channel();
        let session = NeSession::new(&model(), "OPT1", config(port), events).unwrap();
        assert_eq!(session.dpid().value(), 1);
        let highlights = session.highlights();
        let task = tokio::spawn(async move { session.run().await });

        let (socket, _) = listener.accept().await.unwrap();
        let (reader, writer) = socket.into_split();
        let mut inbound = FramedRead::new(reader, OfCodec::new());
        let mut outbound = FramedWrite::new(writer, OfCodec::new());

        let hello = inbound.next().await.unwrap().unwrap();
        assert!(matches!(hello, Message::Hello { .. }));
        outbound
            .send(Message::Hello {
                xid: 1,
                body: Bytes::new(),
            })
            .await
            .unwrap();

        outbound.send(Message::FeaturesRequest { xid: 10 }).await.unwrap();
        match inbound.next().await.unwrap().unwrap() {
            Message::FeaturesReply { xid, features } => {
                assert_eq!(xid, 10);
                assert_eq!(features.datapath_id, 1);
            }
            other => panic!("unexpected message {other:?}"),
        }

        let data = Bytes::from_static(b"alive?");
        outbound
            .send(Message::EchoRequest {
                xid: 11,
                data: data.clone(),
            })
            .await
            .unwrap();
        assert_eq!(
            inbound.next().await.unwrap().unwrap(),
            Message::EchoReply { xid: 11, data }
        );

        outbound
            .send(Message::MultipartRequest {
                xid: 12,
                kind: OFPMP_PORT_DESC,
                flags: 0,
                body: Bytes::new(),
            })
            .await
            .unwrap();
        assert!(matches!(
            inbound.next().await.unwrap().unwrap(),
            Message::MultipartReply { xid: 12, .. }
        ));

        let mut flow_mod = FlowMod::new(FlowModCommand::Add);
        flow_mod.matches = vec![OxmField::InPort(5)];
        flow_mod.instructions = vec![Instruction::WriteActions(vec![Action::Output {
            port: 9,
            max_len: 0,
        }])];
        outbound
            .send(Message::FlowMod { xid: 13, flow_mod })
            .await
            .unwrap();

        let summary = loop {
            match rx.recv().await.unwrap() {
                StatusEvent::FlowMod { summary, .. } => break summary,
                _ => continue,
            }
        };
        assert_eq!(summary, "[match] in_port=5\n[actions] output=9");
        assert!(highlights.is_new(LinkPair::new(9, 5)));

        drop(outbound);
        drop(inbound);
        assert!(task.await.unwrap().is_ok());

        let disconnected = next_disconnect(&mut rx).await;
        assert_eq!(
            disconnected,
            StatusEvent::Disconnected {
                ne: "OPT1".into(),
                reason: None
            }
        );
    }

    #[tokio::test]
    async fn test_malformed_frame_closes_session() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let (events, mut rx) = status::channel();
        let session = NeSession::new(&model(), "OPT1", config(port), events).unwrap();
        let task = tokio::spawn(async move { session.run().await });

        let (socket, _) = listener.accept().await.unwrap();
        let (reader, mut writer) = socket.into_split();
        let mut inbound = FramedRead::new(reader, OfCodec::new());
        assert!(matches!(
            inbound.next().await.unwrap().unwrap(),
            Message::Hello { .. }
        ));

        // flow-mod header announcing a 4 byte body
        writer
            .write_all(&[4, 14, 0, 12, 0, 0, 0, 1, 0, 0, 0, 0])
            .await
            .unwrap();

        let result = task.await.unwrap();
        assert!(matches!(result, Err(Error::ProtocolDecode(_))));
        assert!(matches!(
            next_disconnect(&mut rx).await,
            StatusEvent::Disconnected {
                reason: Some(_),
                ..
            }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_liveness_failure_ends_session() {
        let (events, mut rx) = status::channel();
        let session = NeSession::new(&model(), "OPT1", config(6653), events).unwrap();

        // the node reads from one pipe and writes to another
        let (node_reader, controller_writer) = tokio::io::duplex(1024);
        let (controller_reader, node_writer) = tokio::io::duplex(1024);
        let handle = ConnectionHandle::new("controller", node_reader, node_writer);
        let task = tokio::spawn(async move { session.attach(handle).await });

        let mut inbound = FramedRead::new(controller_reader, OfCodec::new());
        assert!(matches!(
            inbound.next().await.unwrap().unwrap(),
            Message::Hello { .. }
        ));

        // the controller stops reading but keeps its side of the inbound pipe open
        drop(inbound);

        let result = task.await.unwrap();
        assert!(matches!(result, Err(Error::Liveness(_))));
        assert!(matches!(
            next_disconnect(&mut rx).await,
            StatusEvent::Disconnected {
                reason: Some(_),
                ..
            }
        ));
        drop(controller_writer);
    }
}
