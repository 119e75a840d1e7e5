use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use futures::SinkExt;
use socket2::SockRef;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::codec::{FramedRead, FramedWrite};
use tracing::{debug, warn};

use crate::core::{Error, Result};
use crate::protocol::{Message, OfCodec};
use crate::util::XidGenerator;

type BoxedReader = Pin<Box<dyn AsyncRead + Send>>;
type BoxedWriter = Pin<Box<dyn AsyncWrite + Send>>;

/// Inbound half of a controller connection
pub type MessageStream = FramedRead<BoxedReader, OfCodec>;

/// Shared outbound half of a controller connection
///
/// The dispatch loop and the liveness task both write through clones of the
/// same sink, one frame at a time.
#[derive(Clone)]
pub struct MessageSink {
    writer: Arc<Mutex<FramedWrite<BoxedWriter, OfCodec>>>,
    open: Arc<AtomicBool>,
}

impl MessageSink {
    fn new(writer: BoxedWriter) -> Self {
        MessageSink {
            writer: Arc::new(Mutex::new(FramedWrite::new(writer, OfCodec::new()))),
            open: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Writes and flushes one message
    pub async fn send(&self, message: Message) -> Result<()> {
        if !self.is_writable() {
            return Err(Error::connection("connection is not writable"));
        }
        let mut writer = self.writer.lock().await;
        if let Err(e) = writer.send(message).await {
            self.open.store(false, Ordering::SeqCst);
            return Err(e);
        }
        Ok(())
    }

    /// Whether the connection still accepts writes
    pub fn is_writable(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    /// Shuts the write side down; later calls do nothing
    pub async fn close(&self) {
        if self.open.swap(false, Ordering::SeqCst) {
            let mut writer = self.writer.lock().await;
            if let Err(e) = writer.close().await {
                debug!("Error while closing connection: {}", e);
            }
        }
    }
}

/// An established controller connection
pub struct ConnectionHandle {
    peer: String,
    sink: MessageSink,
    stream: MessageStream,
}

impl ConnectionHandle {
    /// Wraps the two byte halves of a connection to `peer`
    pub fn new<R, W>(peer: impl Into<String>, reader: R, writer: W) -> Self
    where
        R: AsyncRead + Send + 'static,
        W: AsyncWrite + Send + 'static,
    {
        ConnectionHandle {
            peer: peer.into(),
            sink: MessageSink::new(Box::pin(writer)),
            stream: FramedRead::new(Box::pin(reader), OfCodec::new()),
        }
    }

    /// Address of the controller
    pub fn peer(&self) -> &str {
        &self.peer
    }

    /// Splits the handle into its outbound and inbound halves
    pub fn into_parts(self) -> (MessageSink, MessageStream) {
        (self.sink, self.stream)
    }
}

/// Opens a TCP connection to the controller
///
/// No-delay and keep-alive are enabled on the socket. A failure within
/// `timeout` is reported with its cause; nothing stays open.
pub async fn connect(host: &str, port: u16, timeout: Duration) -> Result<ConnectionHandle> {
    let stream = match tokio::time::timeout(timeout, TcpStream::connect((host, port))).await {
        Ok(Ok(stream)) => stream,
        Ok(Err(e)) => {
            return Err(Error::connection(format!(
                "Failed to connect to {host}:{port}: {e}"
            )))
        }
        Err(_) => {
            return Err(Error::connection(format!(
                "Connecting to {host}:{port} timed out after {}s",
                timeout.as_secs()
            )))
        }
    };

    stream
        .set_nodelay(true)
        .map_err(|e| Error::connection(format!("Failed to set TCP_NODELAY: {e}")))?;
    SockRef::from(&stream)
        .set_keepalive(true)
        .map_err(|e| Error::connection(format!("Failed to set SO_KEEPALIVE: {e}")))?;
    let peer = stream
        .peer_addr()
        .map_err(|e| Error::connection(format!("Failed to get peer address: {e}")))?;

    debug!("Connected to {}", peer);
    let (reader, writer) = stream.into_split();
    Ok(ConnectionHandle::new(peer.to_string(), reader, writer))
}

/// Sends an echo request every `interval` until the connection fails
///
/// Returns only with an error; the sink is closed by then.
pub async fn liveness(
    sink: MessageSink,
    interval: Duration,
    xids: Arc<XidGenerator>,
) -> Result<()> {
    let mut ticker = interval_at(Instant::now() + interval, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;

        if !sink.is_writable() {
            warn!("Connection is not writable, stopping liveness check");
            sink.close().await;
            return Err(Error::liveness("Living confirmation is failed."));
        }

        let echo = Message::EchoRequest {
            xid: xids.next(),
            data: Bytes::new(),
        };
        if let Err(e) = sink.send(echo).await {
            warn!("Failed to send Echo Request: {}", e);
            sink.close().await;
            return Err(Error::liveness("Living confirmation is failed."));
        }
    }
}
