//! Strength acknowledgment (0xB1) decoding
//!
//! Acknowledgments arrive on the notify characteristic with nobody waiting
//! synchronously for them, so a bad frame is never an error for a caller.
//! [`Ack::decode`] reports such frames as [`Ignored`], which the receiver
//! logs and otherwise drops.

use std::fmt;

use bytes::{BufMut, BytesMut};

use crate::{
    command::{Channel, Sequence},
    constants::MARKER_ACK,
};

/// Device acknowledgment of a strength command
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Ack {
    /// Sequence of the acknowledged command
    pub sequence: Sequence,
    /// Channel A strength as reported by the device
    pub a_strength: u8,
    /// Channel B strength as reported by the device
    pub b_strength: u8,
}

/// Why a notification frame was dropped
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Ignored {
    /// Fewer than four bytes: line noise
    TooShort { len: usize },
    /// First byte is not the acknowledgment marker
    UnexpectedMarker(u8),
    /// Sequence nibble outside 0..=15
    InvalidSequence(u8),
}

impl fmt::Display for Ignored {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooShort { len } => write!(f, "frame too short ({len} bytes)"),
            Self::UnexpectedMarker(marker) => write!(f, "unexpected marker 0x{marker:02X}"),
            Self::InvalidSequence(seq) => write!(f, "invalid sequence {seq}"),
        }
    }
}

impl Ack {
    /// Minimum notification length
    pub const MIN_SIZE: usize = 4;

    /// Decode an acknowledgment from a notification buffer
    ///
    /// Trailing bytes beyond the first four are ignored.
    ///
    /// # Examples
    ///
    /// ```
    /// use coyote_core::{Ack, Ignored};
    ///
    /// let ack = Ack::decode(&[0xB1, 0x70, 30, 25]).unwrap();
    /// assert_eq!(ack.sequence.value(), 7);
    /// assert_eq!(ack.a_strength, 30);
    ///
    /// assert_eq!(Ack::decode(&[0xB1, 0x70]), Err(Ignored::TooShort { len: 2 }));
    /// ```
    pub fn decode(data: &[u8]) -> Result<Self, Ignored> {
        let [marker, header, a_strength, b_strength, ..] = *data else {
            return Err(Ignored::TooShort { len: data.len() });
        };

        if marker != MARKER_ACK {
            return Err(Ignored::UnexpectedMarker(marker));
        }

        let nibble = (header & 0xF0) >> 4;
        let sequence = Sequence::new(nibble).ok_or(Ignored::InvalidSequence(nibble))?;

        Ok(Self {
            sequence,
            a_strength,
            b_strength,
        })
    }

    /// Encode the acknowledgment as the device would send it
    pub fn encode(&self) -> BytesMut {
        let mut buf = BytesMut::with_capacity(Self::MIN_SIZE);
        buf.put_u8(MARKER_ACK);
        buf.put_u8(self.sequence.value() << 4);
        buf.put_u8(self.a_strength);
        buf.put_u8(self.b_strength);
        buf
    }

    /// Reported strength of one channel
    pub fn strength(&self, channel: Channel) -> u8 {
        match channel {
            Channel::A => self.a_strength,
            Channel::B => self.b_strength,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_decode_ack() {
        let ack = Ack::decode(&[0xB1, 0xF3, 200, 0]).unwrap();
        assert_eq!(ack.sequence.value(), 15);
        assert_eq!(ack.strength(Channel::A), 200);
        assert_eq!(ack.strength(Channel::B), 0);
    }

    #[test]
    fn test_short_frames_are_noise() {
        for len in 0..Ack::MIN_SIZE {
            let data = vec![0xB1; len];
            assert_eq!(Ack::decode(&data), Err(Ignored::TooShort { len }));
        }
    }

    #[test]
    fn test_wrong_marker() {
        assert_eq!(
            Ack::decode(&[0xB0, 0x10, 1, 1]),
            Err(Ignored::UnexpectedMarker(0xB0))
        );
    }

    #[test]
    fn test_trailing_bytes_ignored() {
        let ack = Ack::decode(&[0xB1, 0x20, 12, 13, 0xFF, 0xFF]).unwrap();
        assert_eq!(ack.sequence.value(), 2);
        assert_eq!(ack.b_strength, 13);
    }

    #[test]
    fn test_encode_matches_decode() {
        let ack = Ack {
            sequence: Sequence::wrapping(9),
            a_strength: 44,
            b_strength: 45,
        };
        assert_eq!(ack.encode().as_ref(), &[0xB1, 0x90, 44, 45]);
        assert_eq!(Ack::decode(&ack.encode()), Ok(ack));
    }
}
