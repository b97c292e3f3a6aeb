//! # coyote
//!
//! Rust driver for Coyote stimulation devices.
//!
//! ## Features
//!
//! - Strength and waveform control over a pluggable transport
//! - Sequence-tagged commands with optional acknowledgment waits
//! - Device-reported strength tracking and reconciliation
//! - A perception loop mapping game-screen observations to strength
//!
//! ## Quick Start
//!
//! ```no_run
//! use coyote::{Device, DeviceConfig, MemoryTransport};
//!
//! #[tokio::main]
//! async fn main() -> coyote::Result<()> {
//!     let config = DeviceConfig::from_env();
//!     let transport = MemoryTransport::new(config.device_name.clone());
//!
//!     // Connect to device
//!     let mut device = Device::new(transport, config);
//!     device.connect().await?;
//!
//!     device.set_waveform(&[10, 20, 30, 40], &[20, 40, 60, 80]).await?;
//!     device.set_absolute_strength(20).await?;
//!     device.adjust_strength(10).await?;
//!     println!("Strength: {}", device.get_current_strength());
//!
//!     // Disconnect
//!     device.disconnect().await?;
//!
//!     Ok(())
//! }
//! ```

pub mod ack;
pub mod config;
pub mod controller;
pub mod device;
pub mod error;

// Re-exports
pub use ack::AckTracker;
pub use config::{ControllerConfig, DeviceConfig};
pub use controller::{Controller, Observer};
pub use device::Device;
pub use error::{Error, Result};

// Re-export protocol, transport and game types
pub use coyote_core::{
    convert_frequency, Ack, Channel, ChannelState, Sequence, StrengthChange, StrengthMode,
    UuidTemplate, Waveform,
};
pub use coyote_transport::{MemoryHandle, MemoryTransport, Notifications, Target, Transport};
pub use coyote_types::{GameState, Load, Observation, PollStats, Recognition};
