use std::sync::Mutex as StdMutex;
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;

use crate::emitter::{self, SharedTransport};
use crate::error::PingerError;
use crate::scheduler::{self, Decision};
use crate::sink::{DebugSink, LogSink};
use crate::traffic::TrafficMonitor;

/// Releases the `Pinger`'s `RunningFlag` on every exit path from `run`,
/// including early returns on error and unwinding panics.
struct RunningGuard<'a> {
    monitor: &'a TrafficMonitor,
}

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.monitor.release_running();
    }
}

/// MQTT v5 keepalive pinger: emits PINGREQ at the negotiated cadence and
/// detects a silently dead connection via PINGRESP timeout.
///
/// A `Pinger` is created once and `run` may be invoked serially any number
/// of times; the long-lived traffic timestamps are inherited across runs,
/// while each `run` tracks its own "last ping sent" / timeout state.
/// Construct a fresh `Pinger` if a caller needs to discard inherited
/// traffic state (e.g. after reconnecting to a different broker).
pub struct Pinger {
    monitor: TrafficMonitor,
    sink: StdMutex<Box<dyn DebugSink>>,
}

impl Pinger {
    /// Creates a new, never-run pinger with an empty traffic history and
    /// the default (`log`-forwarding) debug sink.
    pub fn new() -> Self {
        Pinger {
            monitor: TrafficMonitor::new(),
            sink: StdMutex::new(Box::new(LogSink)),
        }
    }

    /// Records that a packet (of any kind) was just sent.
    pub fn notify_packet_sent(&self) {
        self.monitor.record_sent(Instant::now());
    }

    /// Records that a packet (of any kind) was just received.
    pub fn notify_packet_received(&self) {
        self.monitor.record_received(Instant::now());
    }

    /// Records that a PINGRESP was just received.
    pub fn notify_ping_response(&self) {
        self.monitor.record_ping_resp(Instant::now());
    }

    /// Installs a debug sink. Must be called before `run`; mutating the
    /// sink while a run is active is not supported.
    pub fn set_debug_sink<S: DebugSink + 'static>(&self, sink: S) {
        *self.sink.lock().unwrap() = Box::new(sink);
    }

    fn log(&self, message: impl AsRef<str>) {
        self.sink.lock().unwrap().log(message.as_ref());
    }

    /// Runs the keepalive loop against `transport` until cancellation,
    /// a PINGRESP timeout, or a PINGREQ write failure.
    ///
    /// Returns `Ok(())` immediately, performing no I/O, if `keepalive` is
    /// `0` (keepalive disabled) or `cancel` is already cancelled. Returns
    /// [`PingerError::InvalidTransport`] if `transport` is `None`, or
    /// [`PingerError::ConcurrentRun`] if another `run` on this instance is
    /// already active. In neither case is the running activity disturbed
    /// or the `RunningFlag` touched.
    pub async fn run<T>(
        &self,
        cancel: CancellationToken,
        transport: Option<SharedTransport<T>>,
        keepalive: u16,
    ) -> Result<(), PingerError>
    where
        T: tokio::io::AsyncWrite + Unpin + Send + 'static,
    {
        if keepalive == 0 {
            return Ok(());
        }

        let transport = transport.ok_or(PingerError::InvalidTransport)?;

        if !self.monitor.try_acquire_running() {
            return Err(PingerError::ConcurrentRun);
        }
        let _guard = RunningGuard {
            monitor: &self.monitor,
        };

        let keepalive = Duration::from_secs(u64::from(keepalive));
        let mut last_ping_sent: Option<Instant> = None;
        let mut pending_emitter: Option<oneshot::Receiver<std::io::Error>> = None;

        // Arm the timer for an immediate first fire (Starting -> Running).
        let timer = time::sleep(Duration::from_secs(0));
        tokio::pin!(timer);

        loop {
            tokio::select! {
                biased;

                () = cancel.cancelled() => {
                    self.log("run cancelled");
                    return Ok(());
                }

                write_result = async {
                    match pending_emitter.as_mut() {
                        Some(rx) => rx.await,
                        None => std::future::pending().await,
                    }
                }, if pending_emitter.is_some() => {
                    pending_emitter = None;
                    if let Ok(err) = write_result {
                        self.log(format!("PINGREQ write failed: {err}"));
                        return Err(PingerError::WriteFailure(err));
                    }
                    // Err(_) here means the sender was dropped without sending:
                    // the write succeeded, nothing to report.
                }

                () = &mut timer => {
                    let now = Instant::now();
                    let snapshot = self.monitor.snapshot();
                    match scheduler::decide(now, last_ping_sent, snapshot, keepalive) {
                        Decision::TimedOut => {
                            self.log("PINGRESP timeout: no response to the previous PINGREQ");
                            return Err(PingerError::PingRespTimeout);
                        }
                        Decision::AwaitDue(due_at) => {
                            timer.as_mut().reset(due_at);
                        }
                        Decision::Dispatch => {
                            last_ping_sent = Some(now);
                            let (tx, rx) = oneshot::channel();
                            emitter::dispatch(transport.clone(), tx);
                            pending_emitter = Some(rx);
                            self.log("PINGREQ dispatched");
                            timer.as_mut().reset(now + keepalive);
                        }
                    }
                }
            }
        }
    }
}

impl Default for Pinger {
    fn default() -> Self {
        Self::new()
    }
}
