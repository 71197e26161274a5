/// Pluggable sink for human-readable pinger diagnostics: timer rearms,
/// write failures, timeout declarations.
///
/// Set via [`crate::Pinger::set_debug_sink`] before calling `run`; intended
/// to be configured once up front rather than swapped mid-run.
pub trait DebugSink: Send + Sync {
    fn log(&self, message: &str);
}

/// No-op sink, for callers that want the pinger completely silent (e.g.
/// unit tests asserting on write counts, not log output).
#[derive(Debug, Default)]
pub struct NoopSink;

impl DebugSink for NoopSink {
    fn log(&self, _message: &str) {}
}

/// Forwards diagnostics to the `log` crate at debug level, the way the
/// rest of this crate's lineage (`rumqttc`, `rumqttlog`) surfaces its own
/// internal chatter. This is the default sink.
#[derive(Debug, Default)]
pub struct LogSink;

impl DebugSink for LogSink {
    fn log(&self, message: &str) {
        log::debug!("{}", message);
    }
}
