//! Acknowledgment tracking
//!
//! Commands sent with "wait for ack" park a oneshot sender here, keyed by
//! sequence. The notification pump feeds every buffer the device notifies
//! into [`AckTracker::handle_notification`], which records the reported
//! strengths and wakes the matching waiter. The handler never awaits, so a
//! frame is fully applied before the next one is looked at.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::oneshot;
use tracing::{debug, trace, warn};

use coyote_core::{Ack, Ignored, Sequence, Session};
use coyote_transport::Notifications;

/// Pending-acknowledgment table shared with the notification pump
#[derive(Debug, Clone)]
pub struct AckTracker {
    session: Session,
    pending: Arc<Mutex<HashMap<Sequence, oneshot::Sender<Ack>>>>,
}

impl AckTracker {
    pub fn new(session: Session) -> Self {
        Self {
            session,
            pending: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Park a waiter for `sequence`
    ///
    /// A waiter already parked on the same sequence is dropped; it observes
    /// a closed channel.
    pub fn register(&self, sequence: Sequence) -> oneshot::Receiver<Ack> {
        let (tx, rx) = oneshot::channel();
        if self.pending.lock().insert(sequence, tx).is_some() {
            warn!("Replaced stale waiter for {}", sequence);
        }
        rx
    }

    /// Forget the waiter for `sequence`, if any
    pub fn cancel(&self, sequence: Sequence) {
        self.pending.lock().remove(&sequence);
    }

    /// Forget every waiter
    pub fn clear(&self) {
        self.pending.lock().clear();
    }

    pub fn is_pending(&self, sequence: Sequence) -> bool {
        self.pending.lock().contains_key(&sequence)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.lock().len()
    }

    /// Apply one notification buffer
    ///
    /// Frames that do not decode are returned as [`Ignored`] and change
    /// nothing.
    pub fn handle_notification(&self, data: &[u8]) -> Result<Ack, Ignored> {
        let ack = Ack::decode(data)?;

        self.session.record_ack(&ack);

        let waiter = self.pending.lock().remove(&ack.sequence);
        if let Some(waiter) = waiter {
            // The waiter may have timed out in the meantime
            let _ = waiter.send(ack);
        }

        Ok(ack)
    }
}

/// Drain the notify stream until the link goes down
pub(crate) async fn pump(mut notifications: Notifications, tracker: AckTracker) {
    while let Some(data) = notifications.recv().await {
        match tracker.handle_notification(&data) {
            Ok(ack) => trace!(
                sequence = ack.sequence.value(),
                a = ack.a_strength,
                b = ack.b_strength,
                "Acknowledged"
            ),
            Err(Ignored::TooShort { .. }) => {}
            Err(reason) => warn!("Dropped notification: {}", reason),
        }
    }

    debug!("Notification stream ended");
    tracker.session.close();
    tracker.clear();
}

#[cfg(test)]
mod tests {
    use super::*;
    use coyote_core::Channel;
    use pretty_assertions::assert_eq;

    fn seq(value: u8) -> Sequence {
        Sequence::wrapping(value)
    }

    #[test]
    fn test_ack_wakes_waiter() {
        let tracker = AckTracker::new(Session::new());
        let mut rx = tracker.register(seq(3));

        let ack = tracker.handle_notification(&[0xB1, 0x30, 40, 41]).unwrap();

        assert_eq!(rx.try_recv().unwrap(), ack);
        assert_eq!(tracker.pending_count(), 0);
        assert_eq!(tracker.session.reported_strength(Channel::A), Some(40));
        assert_eq!(tracker.session.reported_strength(Channel::B), Some(41));
    }

    #[test]
    fn test_ack_without_waiter_still_recorded() {
        let tracker = AckTracker::new(Session::new());
        let _rx = tracker.register(seq(1));

        tracker.handle_notification(&[0xB1, 0x20, 7, 8]).unwrap();

        assert!(tracker.is_pending(seq(1)));
        assert_eq!(tracker.session.reported_strength(Channel::A), Some(7));
    }

    #[test]
    fn test_short_frame_changes_nothing() {
        let tracker = AckTracker::new(Session::new());
        let _rx = tracker.register(seq(0));

        let result = tracker.handle_notification(&[0xB1, 0x00, 9]);

        assert_eq!(result, Err(Ignored::TooShort { len: 3 }));
        assert!(tracker.is_pending(seq(0)));
        assert_eq!(tracker.pending_count(), 1);
        assert_eq!(tracker.session.reported_strength(Channel::A), None);
    }

    #[test]
    fn test_foreign_marker_changes_nothing() {
        let tracker = AckTracker::new(Session::new());
        let _rx = tracker.register(seq(0));

        let result = tracker.handle_notification(&[0xB0, 0x00, 9, 9]);

        assert_eq!(result, Err(Ignored::UnexpectedMarker(0xB0)));
        assert!(tracker.is_pending(seq(0)));
        assert_eq!(tracker.session.reported_strength(Channel::B), None);
    }

    #[test]
    fn test_register_replaces_stale_waiter() {
        let tracker = AckTracker::new(Session::new());
        let mut stale = tracker.register(seq(5));
        let mut fresh = tracker.register(seq(5));

        tracker.handle_notification(&[0xB1, 0x50, 1, 1]).unwrap();

        assert!(stale.try_recv().is_err());
        assert!(fresh.try_recv().is_ok());
    }

    #[test]
    fn test_cancel_and_clear() {
        let tracker = AckTracker::new(Session::new());
        let _a = tracker.register(seq(1));
        let _b = tracker.register(seq(2));

        tracker.cancel(seq(1));
        assert!(!tracker.is_pending(seq(1)));
        assert!(tracker.is_pending(seq(2)));

        tracker.clear();
        assert_eq!(tracker.pending_count(), 0);
    }

    #[tokio::test]
    async fn test_pump_closes_session_when_stream_ends() {
        let session = Session::new();
        session.open();
        let tracker = AckTracker::new(session.clone());
        let mut waiter = tracker.register(seq(2));

        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        tx.send(bytes::Bytes::from_static(&[0xB1])).unwrap();
        tx.send(bytes::Bytes::from_static(&[0xB1, 0x20, 11, 12])).unwrap();
        drop(tx);

        pump(rx, tracker.clone()).await;

        assert_eq!(waiter.try_recv().unwrap().a_strength, 11);
        assert!(!session.is_connected());
        assert_eq!(tracker.pending_count(), 0);
    }
}
