use std::io;
use thiserror::Error;

/// Custom error types for the dummy optical node
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("File parse error: {0}")]
    FileParse(String),

    #[error("Datapath ID error: {0}")]
    DatapathIdRange(String),

    #[error("Topology error: {0}")]
    Topology(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Liveness error: {0}")]
    Liveness(String),

    #[error("Protocol decode error: {0}")]
    ProtocolDecode(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias using our custom Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Creates a new descriptor file parse error
    pub fn file_parse(msg: impl Into<String>) -> Self {
        Error::FileParse(msg.into())
    }

    /// Creates a new datapath id range error
    pub fn datapath_id_range(msg: impl Into<String>) -> Self {
        Error::DatapathIdRange(msg.into())
    }

    /// Creates a new topology error
    pub fn topology(msg: impl Into<String>) -> Self {
        Error::Topology(msg.into())
    }

    /// Creates a new connection error
    pub fn connection(msg: impl Into<String>) -> Self {
        Error::Connection(msg.into())
    }

    /// Creates a new liveness error
    pub fn liveness(msg: impl Into<String>) -> Self {
        Error::Liveness(msg.into())
    }

    /// Creates a new protocol decode error
    pub fn protocol_decode(msg: impl Into<String>) -> Self {
        Error::ProtocolDecode(msg.into())
    }

    /// Creates a new protocol error
    pub fn protocol(msg: impl Into<String>) -> Self {
        Error::Protocol(msg.into())
    }

    /// Creates a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }
}
