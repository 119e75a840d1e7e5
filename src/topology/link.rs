use std::fmt;

use super::port::PortId;

/// Intra-NE link between two ports of the same network element
///
/// Endpoints are kept in the order they were declared, but equality ignores
/// that order.
#[derive(Debug, Clone, Eq)]
pub struct Link {
    a: PortId,
    b: PortId,
}

impl Link {
    /// Creates a link between two ports
    pub fn new(a: PortId, b: PortId) -> Self {
        Link { a, b }
    }

    /// Both endpoints in declaration order
    pub fn ends(&self) -> (&PortId, &PortId) {
        (&self.a, &self.b)
    }

    /// Whether the link touches the port
    pub fn contains(&self, port: &PortId) -> bool {
        self.a == *port || self.b == *port
    }

    /// The endpoint opposite to `port`, if the link touches it
    pub fn other_end(&self, port: &PortId) -> Option<&PortId> {
        if self.a == *port {
            Some(&self.b)
        } else if self.b == *port {
            Some(&self.a)
        } else {
            None
        }
    }

    /// Whether both endpoints share layer and port role
    pub fn is_same_class(&self) -> bool {
        self.a.same_class(&self.b)
    }
}

impl PartialEq for Link {
    fn eq(&self, other: &Self) -> bool {
        (self.a == other.a && self.b == other.b) || (self.a == other.b && self.b == other.a)
    }
}

impl fmt::Display for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[\"{}\", \"{}\"]", self.a, self.b)
    }
}

/// Optical multiplex section between OCh CTPs of two different NEs
///
/// Stored once per direction; `local` always belongs to the NE the entry is
/// filed under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OmsConnection {
    pub local: PortId,
    pub remote: PortId,
}

impl OmsConnection {
    /// Creates a connection seen from `local`'s NE
    pub fn new(local: PortId, remote: PortId) -> Self {
        OmsConnection { local, remote }
    }

    /// The same connection seen from the other NE
    pub fn reversed(&self) -> Self {
        OmsConnection {
            local: self.remote.clone(),
            remote: self.local.clone(),
        }
    }
}

impl fmt::Display for OmsConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[\"{}\" -> \"{}\"]", self.local, self.remote)
    }
}
