use std::collections::HashMap;

use super::port::PortId;
use crate::core::PORT_NOT_FOUND;

/// Result of asserting a southbound port number
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    /// First assertion for the port
    Bound,
    /// Same value asserted again
    Unchanged,
    /// A different value was already bound; the existing one is kept
    Conflict { existing: u32 },
}

/// Side table from port identity to OpenFlow port number
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SouthboundBindings {
    ports: HashMap<PortId, u32>,
}

impl SouthboundBindings {
    /// Creates an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `number` to `port` unless a value is already present
    pub fn bind(&mut self, port: PortId, number: u32) -> Binding {
        match self.ports.get(&port) {
            None => {
                self.ports.insert(port, number);
                Binding::Bound
            }
            Some(existing) if *existing == number => Binding::Unchanged,
            Some(existing) => Binding::Conflict {
                existing: *existing,
            },
        }
    }

    /// Bound number of the port, if any
    pub fn get(&self, port: &PortId) -> Option<u32> {
        self.ports.get(port).copied()
    }

    /// Bound number as display text, or the not-found marker
    pub fn label(&self, port: &PortId) -> String {
        self.get(port)
            .map(|n| n.to_string())
            .unwrap_or_else(|| PORT_NOT_FOUND.to_string())
    }
}
