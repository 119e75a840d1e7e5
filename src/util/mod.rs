//! Utility module
//!
//! Small helpers shared by the protocol and network layers.

use std::sync::atomic::{AtomicU32, Ordering};

use rand::Rng;

/// Source of OpenFlow transaction ids
///
/// Starts at a random value so a reconnecting node does not replay the ids
/// of its previous session.
#[derive(Debug)]
pub struct XidGenerator {
    next: AtomicU32,
}

impl XidGenerator {
    /// Starts at a random id
    pub fn random() -> Self {
        Self::starting_at(rand::thread_rng().gen())
    }

    /// Starts at a fixed id
    pub fn starting_at(first: u32) -> Self {
        XidGenerator {
            next: AtomicU32::new(first),
        }
    }

    /// Returns the next id, wrapping on overflow
    pub fn next(&self) -> u32 {
        self.next.fetch_add(1, Ordering::Relaxed)
    }
}
