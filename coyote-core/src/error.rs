//! Error types for coyote-core

use crate::command::Channel;

/// Result type alias for coyote-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Which half of a waveform failed validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaveformField {
    Frequencies,
    Intensities,
}

impl std::fmt::Display for WaveformField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Frequencies => f.write_str("frequencies"),
            Self::Intensities => f.write_str("intensities"),
        }
    }
}

/// Core protocol errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Waveform slot count is wrong
    #[error("Invalid waveform for channel {channel}: expected {expected} {field}, got {actual}")]
    InvalidWaveform {
        channel: Channel,
        field: WaveformField,
        expected: usize,
        actual: usize,
    },

    /// Frame is too short to be valid
    #[error("Frame too short: expected at least {expected} bytes, got {actual} bytes")]
    FrameTooShort {
        expected: usize,
        actual: usize,
    },

    /// Frame starts with an unexpected opcode
    #[error("Unexpected opcode: expected 0x{expected:02X}, got 0x{actual:02X}")]
    UnexpectedOpcode {
        expected: u8,
        actual: u8,
    },
}

impl Error {
    /// Check if the error was raised while validating caller input
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::InvalidWaveform { .. })
    }
}
