//! High-level device interface

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

use coyote_core::{
    Ack, Channel, ChannelState, Sequence, Session, StrengthChange, StrengthCommand, Waveform,
};
use coyote_transport::{Target, Transport};

use crate::ack::{pump, AckTracker};
use crate::config::DeviceConfig;
use crate::error::{Error, Result};

/// Coyote device
///
/// High-level interface for driving a Coyote stimulation device. Strength
/// and waveform changes are fire-and-forget: the cached channel state is
/// updated as soon as the frame is written, and acknowledgments are folded
/// in as they arrive.
///
/// # Examples
///
/// ```no_run
/// use coyote::{Device, DeviceConfig, MemoryTransport};
///
/// #[tokio::main]
/// async fn main() -> coyote::Result<()> {
///     let config = DeviceConfig::default();
///     let mut device = Device::new(MemoryTransport::new(config.device_name.clone()), config);
///
///     device.connect().await?;
///     device.set_waveform(&[10, 20, 30, 40], &[20, 40, 60, 80]).await?;
///     device.set_absolute_strength(20).await?;
///     println!("Strength: {}", device.get_current_strength());
///
///     device.disconnect().await?;
///     Ok(())
/// }
/// ```
pub struct Device {
    transport: Box<dyn Transport>,
    session: Session,
    acks: AckTracker,
    config: DeviceConfig,
    pump: Option<JoinHandle<()>>,
}

impl Device {
    /// Create a new device instance over the given transport
    pub fn new(transport: impl Transport + 'static, config: DeviceConfig) -> Self {
        let session = Session::new();
        Self {
            transport: Box::new(transport),
            acks: AckTracker::new(session.clone()),
            session,
            config,
            pump: None,
        }
    }

    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    /// Check if connected
    pub fn is_connected(&self) -> bool {
        self.session.is_connected() && self.transport.is_connected()
    }

    /// Connect to device
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - No device with the configured name is found in time
    /// - The link handshake fails
    /// - Notifications cannot be subscribed
    pub async fn connect(&mut self) -> Result<()> {
        if self.is_connected() {
            return Err(coyote_transport::Error::AlreadyConnected.into());
        }

        if self.session.is_connected() {
            // Transport lost the link but its notification stream is still open
            warn!("Link to {} lost, resetting session", self.transport.device_name());
            self.reset_session();
        }

        if self.transport.is_connected() {
            // Link outlived its notification stream
            debug!("Dropping stale link to {}", self.transport.device_name());
            self.transport.disconnect().await?;
        }

        info!("Connecting to {}...", self.config.device_name);

        let target = Target {
            name: self.config.device_name.clone(),
            uuids: self.config.uuids,
            timeout: self.config.connect_timeout,
        };
        self.transport.connect(&target).await?;

        let notifications = match self.transport.subscribe().await {
            Ok(notifications) => notifications,
            Err(e) => {
                if let Err(e) = self.transport.disconnect().await {
                    warn!("Failed to drop link after subscribe error: {}", e);
                }
                return Err(e.into());
            }
        };

        self.pump = Some(tokio::spawn(pump(notifications, self.acks.clone())));
        self.session.open();

        info!("Connected to {}", self.transport.device_name());
        Ok(())
    }

    /// Disconnect from device
    pub async fn disconnect(&mut self) -> Result<()> {
        if !self.session.is_connected() {
            return Ok(());
        }

        info!("Disconnecting from {}...", self.transport.device_name());

        self.reset_session();
        self.transport.disconnect().await?;

        info!("Disconnected");
        Ok(())
    }

    /// Set both channels to an absolute strength
    ///
    /// The wire value is clamped to 0..=200 but the cached strength is
    /// stored as given; pass values in range to keep the two in agreement.
    pub async fn set_absolute_strength(&mut self, value: i32) -> Result<()> {
        let change = StrengthChange::absolute(value);
        self.send_with_cached_waveform(change).await?;
        self.session.set_strength(value);
        Ok(())
    }

    /// Raise (`delta > 0`) or lower both channels' strength
    pub async fn adjust_strength(&mut self, delta: i32) -> Result<()> {
        let change = StrengthChange::adjust(delta);
        self.send_with_cached_waveform(change).await?;
        self.session.shift_strength(delta);
        Ok(())
    }

    /// Apply one waveform to both channels, leaving strength alone
    ///
    /// Both slices are device-raw bytes and go on the wire unchanged; convert
    /// user-facing frequencies with [`coyote_core::convert_frequency`] first.
    ///
    /// # Errors
    ///
    /// Fails validation, before touching the transport, unless both slices
    /// hold exactly four values.
    pub async fn set_waveform(&mut self, frequencies: &[u8], intensities: &[u8]) -> Result<()> {
        let a_waveform = Waveform::for_channel(Channel::A, frequencies, intensities)?;
        let b_waveform = Waveform::for_channel(Channel::B, frequencies, intensities)?;

        self.send_command(
            StrengthChange::UNCHANGED,
            StrengthChange::UNCHANGED,
            [a_waveform, b_waveform],
            false,
        )
        .await?;

        self.session.set_waveform(a_waveform);
        Ok(())
    }

    /// Cached strength of channel A
    pub fn get_current_strength(&self) -> i32 {
        self.session.channel(Channel::A).strength
    }

    /// Cached state of one channel
    pub fn channel_state(&self, channel: Channel) -> ChannelState {
        self.session.channel(channel)
    }

    /// Strength the device last acknowledged for one channel
    pub fn reported_strength(&self, channel: Channel) -> Option<u8> {
        self.session.reported_strength(channel)
    }

    /// Adopt device-reported strengths into the cache
    ///
    /// Returns `true` if the cache changed.
    pub fn reconcile(&self) -> bool {
        self.session.reconcile()
    }

    /// Read battery level (percent)
    pub async fn battery_level(&mut self) -> Result<u8> {
        self.ensure_connected()?;
        Ok(self.transport.read_battery().await?)
    }

    /// Send one strength/waveform command
    ///
    /// The command carries the current sequence, which then advances. With
    /// `wait_for_ack` set, waits for the device's acknowledgment of that
    /// sequence for at most the configured ack timeout and returns it.
    ///
    /// The cached channel state is not touched.
    pub async fn send_command(
        &mut self,
        a: StrengthChange,
        b: StrengthChange,
        waveforms: [Waveform; 2],
        wait_for_ack: bool,
    ) -> Result<Option<Ack>> {
        self.ensure_connected()?;

        let [a_waveform, b_waveform] = waveforms;
        let command = StrengthCommand {
            sequence: self.session.next_sequence(),
            a,
            b,
            a_waveform,
            b_waveform,
        };

        // Park the waiter first: the acknowledgment may beat the write's return
        let waiter = wait_for_ack.then(|| self.acks.register(command.sequence));

        trace!("Sending: {}", command);

        if let Err(e) = self.transport.write(&command.encode()).await {
            self.acks.cancel(command.sequence);
            return Err(e.into());
        }

        match waiter {
            Some(waiter) => self.wait_for_ack(command.sequence, waiter).await.map(Some),
            None => Ok(None),
        }
    }

    // Helper methods

    /// Stop the pump and forget everything tied to the current link
    fn reset_session(&mut self) {
        if let Some(pump) = self.pump.take() {
            pump.abort();
        }
        self.acks.clear();
        self.session.close();
    }

    fn ensure_connected(&self) -> Result<()> {
        if !self.is_connected() {
            return Err(Error::NotConnected);
        }
        Ok(())
    }

    async fn send_with_cached_waveform(&mut self, change: StrengthChange) -> Result<()> {
        let waveforms = Channel::ALL.map(|channel| self.session.channel(channel).waveform);
        self.send_command(change, change, waveforms, false).await?;
        Ok(())
    }

    async fn wait_for_ack(&self, sequence: Sequence, waiter: oneshot::Receiver<Ack>) -> Result<Ack> {
        let timeout = self.config.ack_timeout;

        match tokio::time::timeout(timeout, waiter).await {
            Ok(Ok(ack)) => {
                debug!("Command {} acknowledged", sequence);
                Ok(ack)
            }
            Ok(Err(_)) => Err(Error::AckDropped { sequence }),
            Err(_) => {
                self.acks.cancel(sequence);
                warn!("Command {} not acknowledged within {:?}", sequence, timeout);
                Err(Error::AckTimeout { sequence, timeout })
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn acks(&self) -> &AckTracker {
        &self.acks
    }
}

impl Drop for Device {
    fn drop(&mut self) {
        if let Some(pump) = self.pump.take() {
            pump.abort();
        }
        if self.session.is_connected() {
            warn!("Device dropped while still connected");
        }
    }
}
