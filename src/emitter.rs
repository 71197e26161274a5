use std::io;
use std::sync::Arc;

use tokio::io::AsyncWriteExt;
use tokio::sync::{oneshot, Mutex};

/// Wire form of a PINGREQ: packet type 12 in the high nibble, zero flags,
/// zero remaining length. No payload, no variable header.
pub(crate) const PINGREQ: [u8; 2] = [0xC0, 0x00];

/// Shared handle to the transport the pinger writes PINGREQs to.
///
/// An `Arc<Mutex<..>>` rather than a bare `&mut T` because the transport is
/// also written to by the rest of the MQTT client concurrently: the pinger
/// doesn't serialize writes itself, it composes with the client's
/// write-mutex. This is that composition made concrete, the simplest
/// handle that can be cloned into a spawned emitter task while the
/// controller keeps writing application packets through the same lock.
pub type SharedTransport<T> = Arc<Mutex<T>>;

/// Dispatches a single PINGREQ write on its own task so a slow or blocked
/// write can't stall the controller's PINGRESP-timeout detection.
///
/// On write failure, sends the error on `result`. On success, `result` is
/// simply dropped without sending, from the controller's perspective a
/// dropped sender and "the write succeeded" are indistinguishable, and
/// both just mean "stop waiting on this emitter". `result` is a `oneshot`
/// channel, which is always single-slot, so a late-arriving error after
/// `run` has already exited never blocks the emitter task on send.
///
/// When the transport is closed out from under a blocked write (by the
/// containing client on shutdown), the write unblocks with an error, this
/// task completes, and the send above does not block, so no emitter
/// task is ever orphaned past its transport's lifetime.
pub(crate) fn dispatch<T>(transport: SharedTransport<T>, result: oneshot::Sender<io::Error>)
where
    T: tokio::io::AsyncWrite + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut guard = transport.lock().await;
        if let Err(e) = guard.write_all(&PINGREQ).await {
            let _ = result.send(e);
        }
    });
}
