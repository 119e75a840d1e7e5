//! Highlight state of recently installed cross-connects
//!
//! A flow-mod ADD marks the pair of southbound ports it joins as "new". When
//! its timer expires the pair moves to the "old" set, which only grows.

mod scheduler;

pub use self::scheduler::ExpiryScheduler;

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::{Mutex, PoisonError, RwLock};

use tokio::time::Instant;

/// Unordered pair of southbound port numbers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LinkPair(u32, u32);

impl LinkPair {
    /// Creates a pair; `(a, b)` and `(b, a)` are the same pair
    pub fn new(a: u32, b: u32) -> Self {
        LinkPair(a.min(b), a.max(b))
    }

    /// Lower and higher port number
    pub fn ends(&self) -> (u32, u32) {
        (self.0, self.1)
    }
}

impl fmt::Display for LinkPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.0, self.1)
    }
}

/// Point-in-time copy of the highlight sets
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HighlightSnapshot {
    /// Pairs still within their highlight window, sorted
    pub new: Vec<LinkPair>,
    /// Pairs whose highlight expired, sorted
    pub old: Vec<LinkPair>,
}

/// New and old highlight sets shared by the handler, the expiry scheduler and
/// the presentation layer
///
/// Every access to the new set goes through one mutex. The old set is
/// append-only and sits behind a read-mostly lock.
#[derive(Debug, Default)]
pub struct HighlightState {
    fresh: Mutex<HashMap<LinkPair, Instant>>,
    old: RwLock<BTreeSet<LinkPair>>,
}

impl HighlightState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a pair as new until `deadline`
    ///
    /// Registering a pair that is already new pushes its deadline out.
    pub fn insert(&self, pair: LinkPair, deadline: Instant) {
        let mut fresh = self.fresh.lock().unwrap_or_else(PoisonError::into_inner);
        let entry = fresh.entry(pair).or_insert(deadline);
        if *entry < deadline {
            *entry = deadline;
        }
    }

    /// Ages a pair whose timer, due at `due`, fired
    ///
    /// The pair leaves the new set unless a later registration extended it,
    /// and joins the old set. Returns whether the pair left the new set.
    pub fn expire(&self, pair: LinkPair, due: Instant) -> bool {
        let removed = {
            let mut fresh = self.fresh.lock().unwrap_or_else(PoisonError::into_inner);
            match fresh.get(&pair) {
                Some(deadline) if *deadline <= due => {
                    fresh.remove(&pair);
                    true
                }
                _ => false,
            }
        };
        self.old
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(pair);
        removed
    }

    /// Whether the pair is currently highlighted as new
    pub fn is_new(&self, pair: LinkPair) -> bool {
        self.fresh
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&pair)
    }

    /// Whether the pair has been aged at least once
    pub fn is_old(&self, pair: LinkPair) -> bool {
        self.old
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&pair)
    }

    /// Copies both sets for rendering
    pub fn snapshot(&self) -> HighlightSnapshot {
        let mut new: Vec<LinkPair> = self
            .fresh
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .copied()
            .collect();
        new.sort();
        let old = self
            .old
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .copied()
            .collect();
        HighlightSnapshot { new, old }
    }
}
