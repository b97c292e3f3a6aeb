//! Session state for a Coyote device
//!
//! A session tracks:
//! - Connection state
//! - Sequence counter (4-bit, wraps per command)
//! - Intended channel state (updated optimistically when a command is sent)
//! - Reported channel strength (updated from device acknowledgments)

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use tracing::debug;

use crate::{
    ack::Ack,
    command::{Channel, Sequence, Waveform},
    constants::{DEFAULT_FREQUENCIES, DEFAULT_INTENSITIES, DEFAULT_STRENGTH, SEQUENCE_MODULUS},
};

/// Session state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Not connected
    Disconnected,

    /// Link established and notifications subscribed
    Connected,
}

/// Cached state of one output channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelState {
    /// Last commanded absolute strength (not clamped)
    pub strength: i32,

    /// Waveform last sent for this channel
    pub waveform: Waveform,
}

impl Default for ChannelState {
    fn default() -> Self {
        Self {
            strength: DEFAULT_STRENGTH,
            waveform: Waveform::from_raw(DEFAULT_FREQUENCIES, DEFAULT_INTENSITIES),
        }
    }
}

/// Session manager
///
/// Shared between the task issuing commands and the task draining
/// acknowledgments. Cloning is cheap (Arc internally); every lock is held
/// only for the duration of a synchronous update.
#[derive(Debug, Clone, Default)]
pub struct Session {
    inner: Arc<SessionInner>,
}

#[derive(Debug)]
struct SessionInner {
    /// Next sequence to hand out (always < 16)
    sequence: AtomicU8,

    /// Current session state
    state: parking_lot::RwLock<SessionState>,

    /// Intended state, indexed by channel
    channels: parking_lot::RwLock<[ChannelState; 2]>,

    /// Last acknowledged strengths, indexed by channel
    reported: parking_lot::RwLock<[Option<u8>; 2]>,
}

impl Default for SessionInner {
    fn default() -> Self {
        Self {
            sequence: AtomicU8::new(0),
            state: parking_lot::RwLock::new(SessionState::Disconnected),
            channels: parking_lot::RwLock::new([ChannelState::default(); 2]),
            reported: parking_lot::RwLock::new([None; 2]),
        }
    }
}

impl Session {
    /// Create a new disconnected session with default channel state
    pub fn new() -> Self {
        Self::default()
    }

    /// Get current state
    pub fn state(&self) -> SessionState {
        *self.inner.state.read()
    }

    /// Check if connected
    pub fn is_connected(&self) -> bool {
        matches!(self.state(), SessionState::Connected)
    }

    /// Mark the session connected
    pub fn open(&self) {
        *self.inner.state.write() = SessionState::Connected;
    }

    /// Mark the session disconnected
    ///
    /// Cached channel state is kept; reported strengths are forgotten since
    /// no further acknowledgments will arrive for this link.
    pub fn close(&self) {
        *self.inner.state.write() = SessionState::Disconnected;
        *self.inner.reported.write() = [None; 2];
    }

    /// Take the current sequence and advance the counter
    ///
    /// Wraps around after 15.
    pub fn next_sequence(&self) -> Sequence {
        let previous = self
            .inner
            .sequence
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |seq| {
                Some((seq + 1) % SEQUENCE_MODULUS)
            })
            .unwrap_or_else(|seq| seq);

        Sequence::wrapping(previous)
    }

    /// Sequence the next command will carry
    pub fn peek_sequence(&self) -> Sequence {
        Sequence::wrapping(self.inner.sequence.load(Ordering::Acquire))
    }

    /// Cached state of one channel
    pub fn channel(&self, channel: Channel) -> ChannelState {
        self.inner.channels.read()[channel.index()]
    }

    /// Overwrite both channels' strength
    pub fn set_strength(&self, value: i32) {
        let mut channels = self.inner.channels.write();
        for state in channels.iter_mut() {
            state.strength = value;
        }
        debug!(strength = value, "Cached strength set");
    }

    /// Shift both channels' strength by a signed delta
    pub fn shift_strength(&self, delta: i32) {
        let mut channels = self.inner.channels.write();
        for state in channels.iter_mut() {
            state.strength = state.strength.saturating_add(delta);
        }
        debug!(delta, "Cached strength shifted");
    }

    /// Apply one waveform to both channels
    pub fn set_waveform(&self, waveform: Waveform) {
        let mut channels = self.inner.channels.write();
        for state in channels.iter_mut() {
            state.waveform = waveform;
        }
        debug!(?waveform, "Cached waveform set");
    }

    /// Record strengths reported by an acknowledgment
    pub fn record_ack(&self, ack: &Ack) {
        *self.inner.reported.write() = [Some(ack.a_strength), Some(ack.b_strength)];
    }

    /// Strength the device last reported for a channel
    pub fn reported_strength(&self, channel: Channel) -> Option<u8> {
        self.inner.reported.read()[channel.index()]
    }

    /// Adopt reported strengths as intended strengths
    ///
    /// Returns `true` if any cached strength changed.
    pub fn reconcile(&self) -> bool {
        let reported = *self.inner.reported.read();
        let mut channels = self.inner.channels.write();
        let mut changed = false;

        for (state, reported) in channels.iter_mut().zip(reported) {
            if let Some(value) = reported {
                let value = i32::from(value);
                if state.strength != value {
                    debug!(from = state.strength, to = value, "Reconciled cached strength");
                    state.strength = value;
                    changed = true;
                }
            }
        }

        changed
    }

    /// Reset sequence counter (used in testing)
    #[cfg(test)]
    pub fn reset_sequence(&self) {
        self.inner.sequence.store(0, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_session_new() {
        let session = Session::new();
        assert_eq!(session.state(), SessionState::Disconnected);
        assert!(!session.is_connected());
        assert_eq!(session.channel(Channel::A).strength, DEFAULT_STRENGTH);
        assert_eq!(session.channel(Channel::B).waveform.frequencies, [10; 4]);
        assert_eq!(session.reported_strength(Channel::A), None);
    }

    #[test]
    fn test_session_open_close() {
        let session = Session::new();
        session.open();
        assert!(session.is_connected());

        session.record_ack(&Ack::decode(&[0xB1, 0x00, 9, 9]).unwrap());
        session.close();

        assert_eq!(session.state(), SessionState::Disconnected);
        assert_eq!(session.reported_strength(Channel::B), None);
    }

    #[test]
    fn test_sequence_generation() {
        let session = Session::new();

        let ids: Vec<u8> = (0..18).map(|_| session.next_sequence().value()).collect();

        assert_eq!(ids[..3].to_vec(), vec![0, 1, 2]);
        assert_eq!(ids[15], 15);
        assert_eq!(ids[16], 0); // Wrapped
        assert_eq!(ids[17], 1);
        assert_eq!(session.peek_sequence().value(), 2);
    }

    #[test]
    fn test_reset_sequence() {
        let session = Session::new();
        session.next_sequence();
        session.reset_sequence();
        assert_eq!(session.next_sequence().value(), 0);
    }

    #[test]
    fn test_strength_updates_both_channels() {
        let session = Session::new();
        session.set_strength(20);
        session.shift_strength(10);

        assert_eq!(session.channel(Channel::A).strength, 30);
        assert_eq!(session.channel(Channel::B).strength, 30);

        session.shift_strength(-45);
        assert_eq!(session.channel(Channel::A).strength, -15);
    }

    #[test]
    fn test_waveform_leaves_strength() {
        let session = Session::new();
        session.set_strength(42);
        session.set_waveform(Waveform::from_raw([10, 20, 30, 40], [20, 40, 60, 80]));

        assert_eq!(session.channel(Channel::A).strength, 42);
        assert_eq!(session.channel(Channel::B).waveform.intensities, [20, 40, 60, 80]);
    }

    #[test]
    fn test_reconcile() {
        let session = Session::new();
        session.set_strength(30);

        // Nothing reported yet
        assert!(!session.reconcile());

        session.record_ack(&Ack::decode(&[0xB1, 0x30, 30, 28]).unwrap());
        assert!(session.reconcile());
        assert_eq!(session.channel(Channel::A).strength, 30);
        assert_eq!(session.channel(Channel::B).strength, 28);

        // Already in agreement
        assert!(!session.reconcile());
    }

    #[test]
    fn test_session_clone() {
        let session1 = Session::new();
        let session2 = session1.clone();

        session1.open();
        session1.set_strength(77);

        // Both share same state
        assert!(session2.is_connected());
        assert_eq!(session2.channel(Channel::A).strength, 77);
    }
}
