//! Transport layer for Coyote devices
//!
//! A transport owns the radio link: discovery by advertised name, the write
//! characteristic, the notify characteristic and the battery characteristic.
//! Radio backends implement [`Transport`]; [`MemoryTransport`] is an
//! in-process simulated device.

pub mod error;
pub mod memory;

pub use error::{Error, Result};
pub use memory::{MemoryHandle, MemoryTransport};

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use coyote_core::UuidTemplate;
use tokio::sync::mpsc;

/// Receiving end of the notify characteristic
///
/// Every buffer the device notifies is pushed here in arrival order. The
/// stream ends when the link goes down.
pub type Notifications = mpsc::UnboundedReceiver<Bytes>;

/// What to look for when connecting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    /// Advertised device name
    pub name: String,
    /// Template the GATT short codes are expanded with
    pub uuids: UuidTemplate,
    /// How long discovery may take
    pub timeout: Duration,
}

/// Transport trait for different radio backends
#[async_trait]
pub trait Transport: Send + Sync {
    /// Discover the device and establish the link
    ///
    /// Fails with [`Error::DeviceNotFound`] if nothing advertising
    /// `target.name` shows up within `target.timeout`, and with
    /// [`Error::ConnectionFailed`] if the handshake fails.
    async fn connect(&mut self, target: &Target) -> Result<()>;

    /// Tear down the link
    async fn disconnect(&mut self) -> Result<()>;

    /// Check if connected
    fn is_connected(&self) -> bool;

    /// Subscribe to the notify characteristic
    ///
    /// Can be called once per connection.
    async fn subscribe(&mut self) -> Result<Notifications>;

    /// Write one frame to the write characteristic
    async fn write(&mut self, data: &[u8]) -> Result<()>;

    /// Read the battery characteristic (percent)
    async fn read_battery(&mut self) -> Result<u8>;

    /// Name of the connected device, or a description of the backend
    fn device_name(&self) -> String;
}
