//! In-memory transport
//!
//! Simulates a Coyote device inside the process. Written frames are
//! recorded, strength commands are applied to a simulated pair of channels,
//! and (unless disabled) every command is acknowledged on the notify stream
//! the way the hardware does it. A [`MemoryHandle`] lets tests and demos
//! inspect traffic and inject faults while the transport itself is owned by
//! a device.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tracing::{debug, trace, warn};

use coyote_core::{
    constants::{DEFAULT_STRENGTH, MAX_STRENGTH},
    Ack, StrengthChange, StrengthCommand, StrengthMode,
};

use crate::{error::*, Notifications, Target, Transport};

#[derive(Debug)]
struct Shared {
    connected: bool,
    advertising: bool,
    refuse_handshake: bool,
    fail_writes: bool,
    auto_ack: bool,
    battery: u8,
    strengths: [u8; 2],
    writes: Vec<Bytes>,
    notify_tx: Option<mpsc::UnboundedSender<Bytes>>,
}

impl Shared {
    /// Apply a strength command the way the device firmware does
    fn apply(&mut self, command: &StrengthCommand) -> Ack {
        for (strength, change) in self.strengths.iter_mut().zip([command.a, command.b]) {
            *strength = next_strength(*strength, &change);
        }

        Ack {
            sequence: command.sequence,
            a_strength: self.strengths[0],
            b_strength: self.strengths[1],
        }
    }
}

fn next_strength(current: u8, change: &StrengthChange) -> u8 {
    let value = change.wire_value();
    match change.mode {
        StrengthMode::Unchanged => current,
        StrengthMode::Increase => current.saturating_add(value).min(MAX_STRENGTH),
        StrengthMode::Decrease => current.saturating_sub(value),
        StrengthMode::Absolute => value,
    }
}

/// In-process simulated device
#[derive(Debug)]
pub struct MemoryTransport {
    name: String,
    shared: Arc<Mutex<Shared>>,
}

/// Inspection and fault-injection handle for a [`MemoryTransport`]
#[derive(Debug, Clone)]
pub struct MemoryHandle {
    shared: Arc<Mutex<Shared>>,
}

impl MemoryTransport {
    /// Create a discoverable, acknowledging device with full battery
    pub fn new(name: impl Into<String>) -> Self {
        let initial = DEFAULT_STRENGTH as u8;
        Self {
            name: name.into(),
            shared: Arc::new(Mutex::new(Shared {
                connected: false,
                advertising: true,
                refuse_handshake: false,
                fail_writes: false,
                auto_ack: true,
                battery: 100,
                strengths: [initial, initial],
                writes: Vec::new(),
                notify_tx: None,
            })),
        }
    }

    /// Set whether written commands are acknowledged
    pub fn with_auto_ack(self, auto_ack: bool) -> Self {
        self.shared.lock().auto_ack = auto_ack;
        self
    }

    /// Set the battery level reported by the device
    pub fn with_battery(self, percent: u8) -> Self {
        self.shared.lock().battery = percent;
        self
    }

    /// Handle sharing this transport's simulated device
    pub fn handle(&self) -> MemoryHandle {
        MemoryHandle {
            shared: Arc::clone(&self.shared),
        }
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn connect(&mut self, target: &Target) -> Result<()> {
        if self.is_connected() {
            return Err(Error::AlreadyConnected);
        }

        debug!("Scanning for {}...", target.name);

        let (advertising, refuse_handshake) = {
            let shared = self.shared.lock();
            (shared.advertising, shared.refuse_handshake)
        };

        if !advertising || target.name != self.name {
            // A real scan runs for the full window before giving up
            tokio::time::sleep(target.timeout).await;
            return Err(Error::DeviceNotFound {
                name: target.name.clone(),
                timeout: target.timeout,
            });
        }

        if refuse_handshake {
            return Err(Error::ConnectionFailed(format!(
                "{} refused the connection",
                self.name
            )));
        }

        debug!(
            "Connected to {} (write={}, notify={})",
            self.name,
            target.uuids.write(),
            target.uuids.notify()
        );

        let mut shared = self.shared.lock();
        shared.connected = true;
        // A fresh link starts without a subscription
        shared.notify_tx = None;
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<()> {
        let mut shared = self.shared.lock();
        if shared.connected {
            debug!("Disconnecting from {}...", self.name);
        }

        shared.connected = false;
        // Dropping the sender ends the notification stream
        shared.notify_tx = None;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.shared.lock().connected
    }

    async fn subscribe(&mut self) -> Result<Notifications> {
        let mut shared = self.shared.lock();
        if !shared.connected {
            return Err(Error::NotConnected);
        }
        if shared.notify_tx.is_some() {
            return Err(Error::AlreadySubscribed);
        }

        let (tx, rx) = mpsc::unbounded_channel();
        shared.notify_tx = Some(tx);
        Ok(rx)
    }

    async fn write(&mut self, data: &[u8]) -> Result<()> {
        let mut shared = self.shared.lock();
        if !shared.connected {
            return Err(Error::NotConnected);
        }
        if shared.fail_writes {
            return Err(Error::WriteFailed("simulated write failure".into()));
        }

        trace!("Writing {} bytes: {}", data.len(), hex::encode(data));
        shared.writes.push(Bytes::copy_from_slice(data));

        let command = match StrengthCommand::decode(data) {
            Ok(command) => command,
            Err(e) => {
                warn!("Simulated device ignored frame: {}", e);
                return Ok(());
            }
        };

        let ack = shared.apply(&command);
        if shared.auto_ack {
            if let Some(tx) = &shared.notify_tx {
                let _ = tx.send(ack.encode().freeze());
            }
        }

        Ok(())
    }

    async fn read_battery(&mut self) -> Result<u8> {
        let shared = self.shared.lock();
        if !shared.connected {
            return Err(Error::NotConnected);
        }

        Ok(shared.battery)
    }

    fn device_name(&self) -> String {
        self.name.clone()
    }
}

impl MemoryHandle {
    /// Frames written so far, oldest first
    pub fn writes(&self) -> Vec<Bytes> {
        self.shared.lock().writes.clone()
    }

    /// Number of frames written so far
    pub fn write_count(&self) -> usize {
        self.shared.lock().writes.len()
    }

    /// Strengths the simulated device currently holds (A, B)
    pub fn strengths(&self) -> [u8; 2] {
        self.shared.lock().strengths
    }

    /// Push a raw notification; returns `false` if nobody is subscribed
    pub fn notify(&self, data: impl Into<Bytes>) -> bool {
        match &self.shared.lock().notify_tx {
            Some(tx) => tx.send(data.into()).is_ok(),
            None => false,
        }
    }

    /// Control whether the device can be discovered
    pub fn set_advertising(&self, advertising: bool) {
        self.shared.lock().advertising = advertising;
    }

    /// Lose the radio link without closing the notification stream
    ///
    /// Mirrors a backend that notices the disconnect on its next operation
    /// rather than by ending the subscription.
    pub fn drop_link(&self) {
        self.shared.lock().connected = false;
    }

    /// Make the next connection handshakes fail
    pub fn set_refuse_handshake(&self, refuse: bool) {
        self.shared.lock().refuse_handshake = refuse;
    }

    /// Make writes fail
    pub fn set_fail_writes(&self, fail: bool) {
        self.shared.lock().fail_writes = fail;
    }

    /// Control whether written commands are acknowledged
    pub fn set_auto_ack(&self, auto_ack: bool) {
        self.shared.lock().auto_ack = auto_ack;
    }

    pub fn set_battery(&self, percent: u8) {
        self.shared.lock().battery = percent;
    }
}
