//! Strength/waveform command definitions and the 0xB0 frame codec

use std::fmt;

use bytes::{Buf, BufMut, BytesMut};
use tracing::trace;

use crate::{
    constants::{MAX_STRENGTH, OPCODE_STRENGTH, SEQUENCE_MODULUS, WAVEFORM_SLOTS},
    error::{Error, Result, WaveformField},
};

/// Output channel
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Channel {
    A,
    B,
}

impl Channel {
    /// Both channels, in wire order
    pub const ALL: [Channel; 2] = [Channel::A, Channel::B];

    pub(crate) fn index(self) -> usize {
        match self {
            Self::A => 0,
            Self::B => 1,
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::A => f.write_str("A"),
            Self::B => f.write_str("B"),
        }
    }
}

/// How the device interprets a channel's strength byte
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum StrengthMode {
    /// Leave strength alone (value ignored)
    Unchanged = 0b00,
    /// Add value to current strength
    Increase = 0b01,
    /// Subtract value from current strength
    Decrease = 0b10,
    /// Replace current strength with value
    Absolute = 0b11,
}

impl StrengthMode {
    /// Mode for a signed adjustment; zero counts as a decrease
    pub fn for_delta(delta: i32) -> Self {
        if delta > 0 {
            Self::Increase
        } else {
            Self::Decrease
        }
    }
}

impl From<StrengthMode> for u8 {
    fn from(mode: StrengthMode) -> u8 {
        mode as u8
    }
}

impl From<u8> for StrengthMode {
    /// Only the low two bits are considered
    fn from(bits: u8) -> Self {
        match bits & 0b11 {
            0b00 => Self::Unchanged,
            0b01 => Self::Increase,
            0b10 => Self::Decrease,
            _ => Self::Absolute,
        }
    }
}

/// 4-bit rolling command identifier
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Sequence(u8);

impl Sequence {
    /// Create a sequence, rejecting values outside 0..=15
    pub fn new(value: u8) -> Option<Self> {
        (value < SEQUENCE_MODULUS).then_some(Self(value))
    }

    /// Create a sequence from any integer, reduced mod 16
    pub fn wrapping(value: u8) -> Self {
        Self(value % SEQUENCE_MODULUS)
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// Following sequence, wrapping 15 to 0
    pub fn next(self) -> Self {
        Self::wrapping(self.0.wrapping_add(1))
    }
}

impl fmt::Display for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The four frequency/intensity slots of one channel
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Waveform {
    /// Device-raw frequency bytes (already converted)
    pub frequencies: [u8; WAVEFORM_SLOTS],
    /// Intensity bytes, passed through unmodified
    pub intensities: [u8; WAVEFORM_SLOTS],
}

impl Waveform {
    /// Create a waveform from already-converted frequency bytes
    pub const fn from_raw(
        frequencies: [u8; WAVEFORM_SLOTS],
        intensities: [u8; WAVEFORM_SLOTS],
    ) -> Self {
        Self {
            frequencies,
            intensities,
        }
    }

    /// Build a waveform for `channel` from caller-supplied slots
    ///
    /// Both slices hold device-raw bytes and are copied unchanged; run
    /// user-facing frequencies through [`convert_frequency`] first. Both
    /// slices must hold exactly four values.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidWaveform`] naming the offending channel and
    /// field if a slice has the wrong length.
    ///
    /// # Examples
    ///
    /// ```
    /// use coyote_core::{convert_frequency, Channel, Waveform};
    ///
    /// let frequencies = [10, 20, 300, 700].map(convert_frequency);
    /// let wave = Waveform::for_channel(Channel::A, &frequencies, &[20, 40, 60, 80]).unwrap();
    /// assert_eq!(wave.frequencies, [10, 20, 140, 210]);
    ///
    /// assert!(Waveform::for_channel(Channel::A, &[10, 20, 30], &[1, 2, 3, 4]).is_err());
    /// ```
    ///
    /// [`convert_frequency`]: crate::frequency::convert_frequency
    pub fn for_channel(channel: Channel, frequencies: &[u8], intensities: &[u8]) -> Result<Self> {
        Ok(Self::from_raw(
            slots(channel, WaveformField::Frequencies, frequencies)?,
            slots(channel, WaveformField::Intensities, intensities)?,
        ))
    }
}

fn slots(channel: Channel, field: WaveformField, values: &[u8]) -> Result<[u8; WAVEFORM_SLOTS]> {
    values.try_into().map_err(|_| Error::InvalidWaveform {
        channel,
        field,
        expected: WAVEFORM_SLOTS,
        actual: values.len(),
    })
}

/// Strength instruction for one channel
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct StrengthChange {
    pub mode: StrengthMode,
    /// Clamped to 0..=200 when encoded
    pub value: i32,
}

impl StrengthChange {
    pub const UNCHANGED: Self = Self {
        mode: StrengthMode::Unchanged,
        value: 0,
    };

    pub fn absolute(value: i32) -> Self {
        Self {
            mode: StrengthMode::Absolute,
            value,
        }
    }

    /// Increase or decrease by the magnitude of `delta`
    pub fn adjust(delta: i32) -> Self {
        Self {
            mode: StrengthMode::for_delta(delta),
            value: delta.saturating_abs(),
        }
    }

    /// Byte actually sent on the wire
    pub fn wire_value(&self) -> u8 {
        self.value.clamp(0, MAX_STRENGTH as i32) as u8
    }
}

/// Strength/waveform command (opcode 0xB0)
///
/// # Frame Structure
///
/// ```text
/// ┌────────┬──────────────┬────────┬────────┬──────────┬──────────┬──────────┬──────────┐
/// │ Opcode │ Seq | Modes  │ A str  │ B str  │ A freq   │ A int    │ B freq   │ B int    │
/// │ 0xB0   │ 4b  | 2b 2b  │ 0..200 │ 0..200 │ 4 bytes  │ 4 bytes  │ 4 bytes  │ 4 bytes  │
/// └────────┴──────────────┴────────┴────────┴──────────┴──────────┴──────────┴──────────┘
/// ```
///
/// # Examples
///
/// ```
/// use coyote_core::{StrengthCommand, StrengthChange, Sequence, Waveform};
///
/// let wave = Waveform::from_raw([10; 4], [5; 4]);
/// let command = StrengthCommand {
///     sequence: Sequence::wrapping(3),
///     a: StrengthChange::absolute(20),
///     b: StrengthChange::absolute(20),
///     a_waveform: wave,
///     b_waveform: wave,
/// };
///
/// let frame = command.encode();
/// assert_eq!(frame.len(), StrengthCommand::FRAME_SIZE);
/// assert_eq!(frame[1], 0x3F);
/// ```
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct StrengthCommand {
    pub sequence: Sequence,
    pub a: StrengthChange,
    pub b: StrengthChange,
    pub a_waveform: Waveform,
    pub b_waveform: Waveform,
}

impl StrengthCommand {
    /// Encoded frame size in bytes
    pub const FRAME_SIZE: usize = 4 + 4 * WAVEFORM_SLOTS;

    /// Mode nibble: A mode in bits 3..2, B mode in bits 1..0
    pub fn mode_bits(&self) -> u8 {
        (u8::from(self.a.mode) << 2) | u8::from(self.b.mode)
    }

    /// Encode command to bytes
    pub fn encode(&self) -> BytesMut {
        let mut buf = BytesMut::with_capacity(Self::FRAME_SIZE);

        buf.put_u8(OPCODE_STRENGTH);
        buf.put_u8((self.sequence.value() << 4) | self.mode_bits());
        buf.put_u8(self.a.wire_value());
        buf.put_u8(self.b.wire_value());

        // Channel-major: A freq, A intensity, B freq, B intensity
        buf.put_slice(&self.a_waveform.frequencies);
        buf.put_slice(&self.a_waveform.intensities);
        buf.put_slice(&self.b_waveform.frequencies);
        buf.put_slice(&self.b_waveform.intensities);

        trace!(
            sequence = self.sequence.value(),
            frame = %hex::encode(&buf),
            "Encoded strength command"
        );

        buf
    }

    /// Decode command from bytes
    ///
    /// Strength values come back as the clamped wire bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer is shorter than [`Self::FRAME_SIZE`]
    /// or does not start with the 0xB0 opcode.
    pub fn decode(mut buf: &[u8]) -> Result<Self> {
        if buf.len() < Self::FRAME_SIZE {
            return Err(Error::FrameTooShort {
                expected: Self::FRAME_SIZE,
                actual: buf.len(),
            });
        }

        let opcode = buf.get_u8();
        if opcode != OPCODE_STRENGTH {
            return Err(Error::UnexpectedOpcode {
                expected: OPCODE_STRENGTH,
                actual: opcode,
            });
        }

        let header = buf.get_u8();
        let a_value = buf.get_u8();
        let b_value = buf.get_u8();

        let mut slots = [[0u8; WAVEFORM_SLOTS]; 4];
        for slot in slots.iter_mut() {
            buf.copy_to_slice(slot);
        }
        let [a_freq, a_int, b_freq, b_int] = slots;

        Ok(Self {
            sequence: Sequence::wrapping(header >> 4),
            a: StrengthChange {
                mode: StrengthMode::from(header >> 2),
                value: a_value as i32,
            },
            b: StrengthChange {
                mode: StrengthMode::from(header),
                value: b_value as i32,
            },
            a_waveform: Waveform::from_raw(a_freq, a_int),
            b_waveform: Waveform::from_raw(b_freq, b_int),
        })
    }
}

impl fmt::Display for StrengthCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "B0[{}](A={:?}:{}, B={:?}:{})",
            self.sequence,
            self.a.mode,
            self.a.wire_value(),
            self.b.mode,
            self.b.wire_value()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn wave() -> Waveform {
        Waveform::from_raw([10, 20, 30, 40], [20, 40, 60, 80])
    }

    fn command(sequence: u8, a: StrengthChange, b: StrengthChange) -> StrengthCommand {
        StrengthCommand {
            sequence: Sequence::wrapping(sequence),
            a,
            b,
            a_waveform: wave(),
            b_waveform: Waveform::from_raw([100, 110, 120, 130], [1, 2, 3, 4]),
        }
    }

    #[test]
    fn test_encode_layout() {
        let frame = command(5, StrengthChange::absolute(20), StrengthChange::adjust(-7)).encode();

        assert_eq!(
            frame.as_ref(),
            &[
                0xB0, 0x5E, 20, 7, //
                10, 20, 30, 40, //
                20, 40, 60, 80, //
                100, 110, 120, 130, //
                1, 2, 3, 4,
            ]
        );
    }

    #[test]
    fn test_mode_bits() {
        let cmd = command(0, StrengthChange::adjust(3), StrengthChange::UNCHANGED);
        assert_eq!(cmd.mode_bits(), 0b0100);

        let cmd = command(0, StrengthChange::UNCHANGED, StrengthChange::absolute(1));
        assert_eq!(cmd.mode_bits(), 0b0011);
    }

    #[test]
    fn test_strength_clamped_on_wire() {
        let frame = command(0, StrengthChange::absolute(250), StrengthChange::absolute(-4)).encode();
        assert_eq!(frame[2], 200);
        assert_eq!(frame[3], 0);
    }

    #[test]
    fn test_adjust_zero_is_decrease() {
        let change = StrengthChange::adjust(0);
        assert_eq!(change.mode, StrengthMode::Decrease);
        assert_eq!(change.value, 0);
    }

    #[test]
    fn test_decode_rejects_short_frame() {
        let result = StrengthCommand::decode(&[0xB0, 0x00, 1, 2]);
        assert!(matches!(result, Err(Error::FrameTooShort { expected: 20, actual: 4 })));
    }

    #[test]
    fn test_decode_rejects_wrong_opcode() {
        let mut frame = command(1, StrengthChange::UNCHANGED, StrengthChange::UNCHANGED).encode();
        frame[0] = 0xB1;

        let result = StrengthCommand::decode(&frame);
        assert!(matches!(result, Err(Error::UnexpectedOpcode { actual: 0xB1, .. })));
    }

    #[test]
    fn test_waveform_validation() {
        let err = Waveform::for_channel(Channel::B, &[10, 20, 30, 40], &[1, 2, 3]).unwrap_err();
        assert!(err.is_validation());
        assert!(matches!(
            err,
            Error::InvalidWaveform {
                channel: Channel::B,
                field: WaveformField::Intensities,
                expected: 4,
                actual: 3,
            }
        ));

        let err = Waveform::for_channel(Channel::A, &[10, 20, 30, 40, 50], &[1, 2, 3, 4]).unwrap_err();
        assert!(matches!(err, Error::InvalidWaveform { field: WaveformField::Frequencies, actual: 5, .. }));
    }

    #[test]
    fn test_waveform_slots_copied_unchanged() {
        // Already-converted bytes above 100 must not be converted again
        let wave = Waveform::for_channel(Channel::A, &[200, 150, 100, 10], &[0, 90, 100, 255]).unwrap();
        assert_eq!(wave.frequencies, [200, 150, 100, 10]);
        assert_eq!(wave.intensities, [0, 90, 100, 255]);
    }

    #[test]
    fn test_sequence_wraps() {
        assert_eq!(Sequence::wrapping(15).next(), Sequence::wrapping(0));
        assert_eq!(Sequence::wrapping(17).value(), 1);
        assert!(Sequence::new(16).is_none());
        assert_eq!(Sequence::new(15).map(Sequence::value), Some(15));
    }

    proptest! {
        #[test]
        fn prop_sequence_survives_encoding(
            seq in any::<u8>(),
            a_mode in 0u8..4,
            b_mode in 0u8..4,
            a_value in 0i32..=200,
            b_value in 0i32..=200,
        ) {
            let cmd = StrengthCommand {
                sequence: Sequence::wrapping(seq),
                a: StrengthChange { mode: StrengthMode::from(a_mode), value: a_value },
                b: StrengthChange { mode: StrengthMode::from(b_mode), value: b_value },
                a_waveform: wave(),
                b_waveform: wave(),
            };

            let decoded = StrengthCommand::decode(&cmd.encode()).unwrap();
            prop_assert_eq!(decoded.sequence.value(), seq % 16);
            prop_assert_eq!(decoded, cmd);
        }
    }
}
