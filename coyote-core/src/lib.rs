//! # coyote-core
//!
//! Core protocol implementation for Coyote stimulation devices.
//!
//! This crate provides the low-level protocol primitives:
//! - Strength/waveform command encoding (0xB0)
//! - Acknowledgment decoding (0xB1)
//! - Frequency conversion
//! - GATT UUID expansion
//! - Session state (sequence counter, cached channel state)
//!
//! Nothing in this crate performs I/O.

pub mod ack;
pub mod command;
pub mod constants;
pub mod error;
pub mod frequency;
pub mod gatt;
pub mod session;

pub use ack::{Ack, Ignored};
pub use command::{Channel, Sequence, StrengthChange, StrengthCommand, StrengthMode, Waveform};
pub use error::{Error, Result};
pub use frequency::convert_frequency;
pub use gatt::UuidTemplate;
pub use session::{ChannelState, Session, SessionState};
