use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};
use tracing::debug;

use super::{HighlightState, LinkPair};
use crate::core::{Error, Result};
use crate::status::{StatusEvent, StatusSender};

/// A timer waiting to fire
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Expiry {
    due: Instant,
    seq: u64,
    pair: Option<LinkPair>,
}

/// Handle to the task that ages highlight entries
///
/// One task per session keeps every pending timer in a due-time heap, so a
/// burst of flow-mods costs heap entries rather than tasks. Pending timers
/// still fire after the last handle is dropped.
#[derive(Debug, Clone)]
pub struct ExpiryScheduler {
    tx: mpsc::UnboundedSender<(Instant, Option<LinkPair>)>,
}

impl ExpiryScheduler {
    /// Spawns the scheduler task on the current runtime
    pub fn spawn(ne: impl Into<String>, state: Arc<HighlightState>, events: StatusSender) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run(ne.into(), rx, state, events));
        ExpiryScheduler { tx }
    }

    /// Fires after `delay`: ages `pair` if given, then resets the status to
    /// waiting if nothing else is pending
    pub fn schedule(&self, pair: Option<LinkPair>, delay: Duration) -> Result<()> {
        self.schedule_at(pair, Instant::now() + delay)
    }

    fn schedule_at(&self, pair: Option<LinkPair>, due: Instant) -> Result<()> {
        self.tx
            .send((due, pair))
            .map_err(|_| Error::protocol("highlight scheduler has stopped"))
    }
}

async fn run(
    ne: String,
    mut rx: mpsc::UnboundedReceiver<(Instant, Option<LinkPair>)>,
    state: Arc<HighlightState>,
    events: StatusSender,
) {
    let mut pending: BinaryHeap<Reverse<Expiry>> = BinaryHeap::new();
    let mut seq = 0u64;
    let mut open = true;

    loop {
        if !open && pending.is_empty() {
            break;
        }
        let next_due = pending.peek().map(|Reverse(expiry)| expiry.due);

        tokio::select! {
            received = rx.recv(), if open => match received {
                Some((due, pair)) => {
                    pending.push(Reverse(Expiry { due, seq, pair }));
                    seq += 1;
                }
                None => open = false,
            },
            _ = sleep_until(next_due.unwrap_or_else(Instant::now)), if next_due.is_some() => {
                let now = Instant::now();
                while let Some(Reverse(expiry)) = pending.peek().copied() {
                    if expiry.due > now {
                        break;
                    }
                    pending.pop();
                    fire(&ne, &state, &events, expiry, pending.is_empty());
                }
            }
        }
    }

    debug!("highlight scheduler for {} stopped", ne);
}

fn fire(ne: &str, state: &HighlightState, events: &StatusSender, expiry: Expiry, last: bool) {
    if let Some(pair) = expiry.pair {
        state.expire(pair, expiry.due);
        debug!("highlight of {} on {} expired", pair, ne);
    }
    if last {
        events.publish(StatusEvent::Waiting { ne: ne.to_string() });
    }
    events.publish(StatusEvent::Refresh { ne: ne.to_string() });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::{self, StatusReceiver};
    use tokio::time::sleep;

    fn drain(rx: &mut StatusReceiver) -> Vec<StatusEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[tokio::test(start_paused = true)]
    async fn test_pair_ages_after_expiry() {
        let state = Arc::new(HighlightState::new());
        let (tx, mut rx) = status::channel();
        let scheduler = ExpiryScheduler::spawn("OPT1", state.clone(), tx);
        let pair = LinkPair::new(5, 9);

        let expiry = Duration::from_secs(10);
        state.insert(pair, Instant::now() + expiry);
        scheduler.schedule(Some(pair), expiry).unwrap();

        sleep(Duration::from_secs(9)).await;
        assert!(state.is_new(pair));
        assert!(!state.is_old(pair));

        sleep(Duration::from_secs(2)).await;
        assert!(!state.is_new(pair));
        assert!(state.is_old(pair));

        let events = drain(&mut rx);
        assert!(matches!(events[0], StatusEvent::Waiting { .. }));
        assert!(matches!(events[1], StatusEvent::Refresh { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_independent_timers() {
        let state = Arc::new(HighlightState::new());
        let (tx, mut rx) = status::channel();
        let scheduler = ExpiryScheduler::spawn("OPT1", state.clone(), tx);
        let first = LinkPair::new(5, 9);
        let second = LinkPair::new(1, 2);
        let expiry = Duration::from_secs(10);

        state.insert(first, Instant::now() + expiry);
        scheduler.schedule(Some(first), expiry).unwrap();

        sleep(Duration::from_secs(5)).await;
        state.insert(second, Instant::now() + expiry);
        scheduler.schedule(Some(second), expiry).unwrap();

        sleep(Duration::from_secs(6)).await;
        assert!(state.is_old(first));
        assert!(!state.is_new(first));
        assert!(state.is_new(second));
        // the second timer is still pending, so no reset yet
        assert!(drain(&mut rx)
            .iter()
            .all(|e| !matches!(e, StatusEvent::Waiting { .. })));

        sleep(Duration::from_secs(5)).await;
        assert!(state.is_old(second));
        assert!(drain(&mut rx)
            .iter()
            .any(|e| matches!(e, StatusEvent::Waiting { .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn test_status_reset_without_pair() {
        let state = Arc::new(HighlightState::new());
        let (tx, mut rx) = status::channel();
        let scheduler = ExpiryScheduler::spawn("OPT1", state.clone(), tx);

        scheduler.schedule(None, Duration::from_secs(10)).unwrap();
        sleep(Duration::from_secs(11)).await;

        let events = drain(&mut rx);
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], StatusEvent::Waiting { .. }));
        assert_eq!(state.snapshot(), Default::default());
    }

    #[tokio::test(start_paused = true)]
    async fn test_pending_timers_survive_handle_drop() {
        let state = Arc::new(HighlightState::new());
        let (tx, _rx) = status::channel();
        let scheduler = ExpiryScheduler::spawn("OPT1", state.clone(), tx);
        let pair = LinkPair::new(3, 4);

        state.insert(pair, Instant::now() + Duration::from_secs(1));
        scheduler.schedule(Some(pair), Duration::from_secs(1)).unwrap();
        drop(scheduler);

        sleep(Duration::from_secs(2)).await;
        assert!(state.is_old(pair));
    }
}
