use std::sync::Mutex;

use tokio::time::Instant;

/// A consistent, atomically-read triple of traffic timestamps.
///
/// `None` stands in for the "never happened" zero timestamp: there's no
/// `Instant` that can represent "before the process/clock started", so
/// absence is modelled with `Option` instead of a sentinel value.
#[derive(Debug, Clone, Copy)]
pub struct TrafficSnapshot {
    pub last_sent: Option<Instant>,
    pub last_received: Option<Instant>,
    pub last_ping_resp: Option<Instant>,
}

#[derive(Debug, Default)]
struct Inner {
    last_sent: Option<Instant>,
    last_received: Option<Instant>,
    last_ping_resp: Option<Instant>,
    /// Guards against two concurrent `run` activities on the same `Pinger`.
    /// Lives behind the same mutex as the traffic timestamps.
    running: bool,
}

/// Thread-safe record of last-sent / last-received / last-PINGRESP
/// timestamps, plus the single-instance `running` flag.
///
/// All operations are O(1) and take a short, non-blocking critical section,
/// so a plain `std::sync::Mutex` is used rather than an async one. There's
/// nothing here worth yielding the executor over.
#[derive(Debug, Default)]
pub struct TrafficMonitor {
    inner: Mutex<Inner>,
}

impl TrafficMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that a packet (of any kind) was sent, right now.
    pub fn record_sent(&self, now: Instant) {
        let mut inner = self.inner.lock().unwrap();
        inner.last_sent = Some(now);
    }

    /// Records that a packet (of any kind) was received, right now.
    pub fn record_received(&self, now: Instant) {
        let mut inner = self.inner.lock().unwrap();
        inner.last_received = Some(now);
    }

    /// Records that a PINGRESP was received, right now.
    pub fn record_ping_resp(&self, now: Instant) {
        let mut inner = self.inner.lock().unwrap();
        inner.last_ping_resp = Some(now);
    }

    /// Atomically reads last-sent, last-received and last-PINGRESP as a
    /// single consistent triple. No torn reads across the three fields.
    pub fn snapshot(&self) -> TrafficSnapshot {
        let inner = self.inner.lock().unwrap();
        TrafficSnapshot {
            last_sent: inner.last_sent,
            last_received: inner.last_received,
            last_ping_resp: inner.last_ping_resp,
        }
    }

    /// Tries to acquire the `RunningFlag`. Returns `true` on success (flag
    /// was false and is now true), `false` if a run is already active.
    pub(crate) fn try_acquire_running(&self) -> bool {
        let mut inner = self.inner.lock().unwrap();
        if inner.running {
            false
        } else {
            inner.running = true;
            true
        }
    }

    /// Releases the `RunningFlag`. Called exactly once on every `run` exit
    /// path, including error paths, via an RAII guard. See `pinger.rs`.
    pub(crate) fn release_running(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.running = false;
    }
}
