use std::io;

/// Error returned by [`crate::Pinger::run`].
///
/// A disabled keepalive is not an error and isn't a variant here: `run`
/// just returns `Ok(())` immediately when `keepalive == 0`.
#[derive(Debug, thiserror::Error)]
pub enum PingerError {
    /// `run` was called without a transport.
    #[error("pinger run called without a transport")]
    InvalidTransport,
    /// Another `run` call is already active on this `Pinger`.
    #[error("a pinger run is already in progress on this instance")]
    ConcurrentRun,
    /// A PINGREQ was dispatched but no PINGRESP arrived before the next
    /// scheduling decision.
    #[error("no PINGRESP received before the next keepalive deadline")]
    PingRespTimeout,
    /// The PINGREQ write to the transport failed.
    #[error("failed to write PINGREQ to transport")]
    WriteFailure(#[source] io::Error),
}
