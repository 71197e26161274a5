//! Keepalive pinger for an MQTT v5 client connection.
//!
//! This crate implements the part of an MQTT client that keeps a live
//! transport connection alive: emitting PINGREQ at the negotiated
//! keepalive cadence, and detecting a silently broken connection via
//! PINGRESP timeout. It does not parse packet bodies beyond the fixed
//! 2-byte PINGREQ encoding, does not reconnect, and does not own the
//! transport's lifetime. See [`Pinger::run`].
//!
//! ```no_run
//! use std::sync::Arc;
//! use tokio::sync::Mutex;
//! use tokio_util::sync::CancellationToken;
//! use rumqttping::Pinger;
//!
//! # async fn example(transport: impl tokio::io::AsyncWrite + Unpin + Send + 'static) {
//! let pinger = Pinger::new();
//! let cancel = CancellationToken::new();
//! let transport = Arc::new(Mutex::new(transport));
//!
//! // elsewhere, as packets flow over the same transport:
//! // pinger.notify_packet_sent();
//! // pinger.notify_packet_received();
//! // pinger.notify_ping_response();
//!
//! let result = pinger.run(cancel, Some(transport), 30).await;
//! # }
//! ```

mod emitter;
mod error;
mod pinger;
mod scheduler;
mod sink;
mod traffic;

pub use emitter::SharedTransport;
pub use error::PingerError;
pub use pinger::Pinger;
pub use sink::{DebugSink, LogSink, NoopSink};
pub use traffic::TrafficSnapshot;
