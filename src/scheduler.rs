use std::time::Duration;

use tokio::time::Instant;

use crate::traffic::TrafficSnapshot;

/// What the controller should do on a timer fire. Pure data, the caller
/// (the controller loop) performs the actual rearming, dispatch and
/// mutation.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Decision {
    /// Not due yet; rearm the timer to fire at this instant.
    AwaitDue(Instant),
    /// Due now; record `lastPingSent = now`, dispatch the emitter, and
    /// rearm the timer for `now + keepalive`.
    Dispatch,
    /// A previously dispatched PINGREQ was never answered.
    TimedOut,
}

/// `pingDueAt = min(lastSent, lastReceived) + keepalive`.
///
/// MQTT-3.1.2-20 only requires a PINGREQ when nothing has been *sent*
/// within the keepalive window; this scheduler deliberately also requires
/// recent *received* traffic, closing the half-open-connection gap that
/// minimum leaves open. Whichever side is staler anchors the deadline.
///
/// If either side has no recorded traffic at all, a brand new `Pinger`
/// mid-`run` before anything has happened, or a connection that only ever
/// sends (or only ever receives), that side is the staler of the two by
/// definition and the connection is considered immediately due. Only once
/// both sides have seen at least one packet does their recency actually
/// get compared.
fn ping_due_at(now: Instant, snapshot: TrafficSnapshot, keepalive: Duration) -> Instant {
    match (snapshot.last_sent, snapshot.last_received) {
        (Some(sent), Some(received)) => sent.min(received) + keepalive,
        _ => now,
    }
}

/// Scheduling decision for a single timer fire.
///
/// `last_ping_sent` is the controller's own local bookkeeping (reset at
/// the start of every `run`, not part of the shared `TrafficMonitor`); a
/// previously dispatched ping is considered unanswered if no PINGRESP has
/// arrived since it was sent.
pub(crate) fn decide(
    now: Instant,
    last_ping_sent: Option<Instant>,
    snapshot: TrafficSnapshot,
    keepalive: Duration,
) -> Decision {
    if let Some(sent) = last_ping_sent {
        let answered = matches!(snapshot.last_ping_resp, Some(resp) if resp >= sent);
        if !answered {
            return Decision::TimedOut;
        }
    }

    let due_at = ping_due_at(now, snapshot, keepalive);
    if now < due_at {
        Decision::AwaitDue(due_at)
    } else {
        Decision::Dispatch
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    fn snapshot(
        last_sent: Option<u64>,
        last_received: Option<u64>,
        last_ping_resp: Option<u64>,
        base: Instant,
    ) -> TrafficSnapshot {
        TrafficSnapshot {
            last_sent: last_sent.map(|s| base + Duration::from_secs(s)),
            last_received: last_received.map(|s| base + Duration::from_secs(s)),
            last_ping_resp: last_ping_resp.map(|s| base + Duration::from_secs(s)),
        }
    }

    #[tokio::test]
    async fn fresh_connection_is_immediately_due() {
        let now = Instant::now();
        let snap = snapshot(None, None, None, now);
        let decision = decide(now, None, snap, Duration::from_secs(10));
        assert_eq!(decision, Decision::Dispatch);
    }

    #[tokio::test]
    async fn staler_side_anchors_the_deadline() {
        let base = Instant::now();
        // sent recently, received a while ago: received anchors due_at.
        let snap = snapshot(Some(5), Some(0), None, base);
        let keepalive = Duration::from_secs(10);
        let now = base + Duration::from_secs(9);
        assert_eq!(
            decide(now, None, snap, keepalive),
            Decision::AwaitDue(base + Duration::from_secs(10))
        );
        let now = base + Duration::from_secs(10);
        assert_eq!(decide(now, None, snap, keepalive), Decision::Dispatch);
    }

    #[tokio::test]
    async fn a_side_with_no_traffic_at_all_is_always_due() {
        let base = Instant::now();
        // last_sent is recent, but nothing has ever been received: the
        // receive side is infinitely stale and must not be masked by the
        // send side's recency.
        let snap = snapshot(Some(9), None, None, base);
        let now = base + Duration::from_secs(9);
        assert_eq!(
            decide(now, None, snap, Duration::from_secs(10)),
            Decision::Dispatch
        );
    }

    #[tokio::test]
    async fn unanswered_ping_times_out_on_next_decision() {
        let base = Instant::now();
        let snap = snapshot(Some(0), Some(0), None, base);
        let last_ping_sent = Some(base);
        let decision = decide(
            base + Duration::from_secs(1),
            last_ping_sent,
            snap,
            Duration::from_secs(5),
        );
        assert_eq!(decision, Decision::TimedOut);
    }

    #[tokio::test]
    async fn ping_resp_at_or_after_send_clears_timeout() {
        let base = Instant::now();
        let last_ping_sent = Some(base);
        let snap = snapshot(Some(0), Some(0), Some(0), base);
        let decision = decide(
            base + Duration::from_secs(1),
            last_ping_sent,
            snap,
            Duration::from_secs(5),
        );
        assert_eq!(decision, Decision::AwaitDue(base + Duration::from_secs(5)));
    }
}
