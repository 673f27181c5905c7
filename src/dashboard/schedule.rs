//! Periodic refresh timers.
//!
//! The scheduler does not run anything itself. Each mounted widget holds a
//! [`RefreshSubscription`]; the composer asks it every frame whether the
//! widget is due and asks the scheduler for the earliest deadline so it can
//! request a repaint at that moment. Dropping a subscription cancels it.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

#[derive(Default)]
struct Timers {
    next_id: u64,
    deadlines: HashMap<u64, Instant>,
}

#[derive(Clone, Default)]
pub struct RefreshScheduler {
    timers: Arc<Mutex<Timers>>,
}

impl RefreshScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a timer whose first tick is one `interval` after `now`.
    pub fn subscribe(&self, interval: Duration, now: Instant) -> RefreshSubscription {
        let interval = interval.max(Duration::from_millis(100));
        let id = match self.timers.lock() {
            Ok(mut timers) => {
                timers.next_id += 1;
                let id = timers.next_id;
                timers.deadlines.insert(id, now + interval);
                id
            }
            Err(_) => {
                tracing::warn!("refresh scheduler lock poisoned");
                0
            }
        };
        RefreshSubscription {
            id,
            interval,
            timers: Arc::clone(&self.timers),
        }
    }

    pub fn active(&self) -> usize {
        self.timers.lock().map(|t| t.deadlines.len()).unwrap_or(0)
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers
            .lock()
            .ok()
            .and_then(|t| t.deadlines.values().min().copied())
    }
}

/// A live periodic timer owned by one widget.
pub struct RefreshSubscription {
    id: u64,
    interval: Duration,
    timers: Arc<Mutex<Timers>>,
}

impl RefreshSubscription {
    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_due(&self, now: Instant) -> bool {
        self.timers
            .lock()
            .ok()
            .and_then(|t| t.deadlines.get(&self.id).copied())
            .map(|deadline| now >= deadline)
            .unwrap_or(false)
    }

    /// Push the next tick one interval past `now`. Called after both timed
    /// and manual refreshes.
    pub fn mark_refreshed(&self, now: Instant) {
        if let Ok(mut timers) = self.timers.lock() {
            if let Some(deadline) = timers.deadlines.get_mut(&self.id) {
                *deadline = now + self.interval;
            }
        }
    }
}

impl Drop for RefreshSubscription {
    fn drop(&mut self) {
        if let Ok(mut timers) = self.timers.lock() {
            timers.deadlines.remove(&self.id);
        }
    }
}
