//! Device and controller configuration

use std::time::Duration;

use tracing::warn;
use uuid::Uuid;

use coyote_core::{
    constants::{DEFAULT_ACK_TIMEOUT_MS, DEFAULT_CONNECT_TIMEOUT_MS, DEFAULT_DEVICE_NAME},
    UuidTemplate,
};

/// Environment variable overriding the device name
pub const ENV_DEVICE_NAME: &str = "COYOTE_DEVICE_NAME";

/// Environment variable overriding the discovery timeout (milliseconds)
pub const ENV_CONNECT_TIMEOUT_MS: &str = "COYOTE_CONNECT_TIMEOUT_MS";

/// Environment variable overriding the acknowledgment timeout (milliseconds)
pub const ENV_ACK_TIMEOUT_MS: &str = "COYOTE_ACK_TIMEOUT_MS";

/// Environment variable overriding the GATT base UUID
pub const ENV_BASE_UUID: &str = "COYOTE_BASE_UUID";

/// Connection settings for one device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceConfig {
    /// Advertised name to look for
    pub device_name: String,
    /// Template GATT short codes are expanded with
    pub uuids: UuidTemplate,
    /// How long discovery may take
    pub connect_timeout: Duration,
    /// How long a blocking send waits for its acknowledgment
    pub ack_timeout: Duration,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            device_name: DEFAULT_DEVICE_NAME.to_string(),
            uuids: UuidTemplate::default(),
            connect_timeout: Duration::from_millis(DEFAULT_CONNECT_TIMEOUT_MS),
            ack_timeout: Duration::from_millis(DEFAULT_ACK_TIMEOUT_MS),
        }
    }
}

impl DeviceConfig {
    /// Defaults overridden by `COYOTE_*` environment variables
    ///
    /// Unparseable values are logged and ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(name) = lookup(ENV_DEVICE_NAME) {
            config.device_name = name;
        }
        if let Some(timeout) = millis(&lookup, ENV_CONNECT_TIMEOUT_MS) {
            config.connect_timeout = timeout;
        }
        if let Some(timeout) = millis(&lookup, ENV_ACK_TIMEOUT_MS) {
            config.ack_timeout = timeout;
        }
        if let Some(raw) = lookup(ENV_BASE_UUID) {
            match Uuid::parse_str(&raw) {
                Ok(base) => config.uuids = UuidTemplate::new(base),
                Err(e) => warn!("Ignoring {}={:?}: {}", ENV_BASE_UUID, raw, e),
            }
        }

        config
    }

    /// Set device name
    pub fn with_device_name(mut self, name: impl Into<String>) -> Self {
        self.device_name = name.into();
        self
    }

    /// Set UUID template
    pub fn with_uuids(mut self, uuids: UuidTemplate) -> Self {
        self.uuids = uuids;
        self
    }

    /// Set discovery timeout
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set acknowledgment timeout
    pub fn with_ack_timeout(mut self, timeout: Duration) -> Self {
        self.ack_timeout = timeout;
        self
    }
}

fn millis(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<Duration> {
    let raw = lookup(key)?;
    match raw.trim().parse::<u64>() {
        Ok(ms) => Some(Duration::from_millis(ms)),
        Err(e) => {
            warn!("Ignoring {}={:?}: {}", key, raw, e);
            None
        }
    }
}

/// Perception loop settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerConfig {
    /// Target time between polls
    pub poll_interval: Duration,
    /// Pause after a failed poll
    pub error_backoff: Duration,
    /// Frequency bytes sent once connected (device-raw)
    pub startup_frequencies: [u8; 4],
    /// Intensities sent once connected
    pub startup_intensities: [u8; 4],
    /// Strength pulsed once connected, confirming the link to the wearer
    pub startup_strength: i32,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            error_backoff: Duration::from_secs(5),
            startup_frequencies: [10, 20, 30, 40],
            startup_intensities: [20, 40, 60, 80],
            startup_strength: 20,
        }
    }
}

impl ControllerConfig {
    /// Set poll interval
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Set pause after a failed poll
    pub fn with_error_backoff(mut self, backoff: Duration) -> Self {
        self.error_backoff = backoff;
        self
    }

    /// Set start-up waveform
    pub fn with_startup_waveform(mut self, frequencies: [u8; 4], intensities: [u8; 4]) -> Self {
        self.startup_frequencies = frequencies;
        self.startup_intensities = intensities;
        self
    }

    /// Set start-up strength
    pub fn with_startup_strength(mut self, strength: i32) -> Self {
        self.startup_strength = strength;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = DeviceConfig::default();
        assert_eq!(config.device_name, "47L121000");
        assert_eq!(config.connect_timeout, Duration::from_secs(10));
        assert_eq!(config.ack_timeout, Duration::from_secs(1));
        assert_eq!(config.uuids, UuidTemplate::BLUETOOTH_BASE);
    }

    #[test]
    fn test_env_overrides() {
        let config = DeviceConfig::from_lookup(lookup(&[
            (ENV_DEVICE_NAME, "47L121001"),
            (ENV_ACK_TIMEOUT_MS, "250"),
            (ENV_BASE_UUID, "12340000-0000-1000-8000-00805f9b34fb"),
        ]));

        assert_eq!(config.device_name, "47L121001");
        assert_eq!(config.ack_timeout, Duration::from_millis(250));
        assert_eq!(config.connect_timeout, Duration::from_secs(10));
        assert_eq!(
            config.uuids.write().to_string(),
            "1234150a-0000-1000-8000-00805f9b34fb"
        );
    }

    #[test]
    fn test_env_garbage_ignored() {
        let config = DeviceConfig::from_lookup(lookup(&[
            (ENV_CONNECT_TIMEOUT_MS, "soon"),
            (ENV_BASE_UUID, "not-a-uuid"),
        ]));
        assert_eq!(config, DeviceConfig::default());
    }

    #[test]
    fn test_builders() {
        let config = DeviceConfig::default()
            .with_device_name("dev")
            .with_ack_timeout(Duration::from_millis(10));
        assert_eq!(config.device_name, "dev");
        assert_eq!(config.ack_timeout, Duration::from_millis(10));

        let controller = ControllerConfig::default().with_poll_interval(Duration::from_millis(50));
        assert_eq!(controller.poll_interval, Duration::from_millis(50));
        assert_eq!(controller.error_backoff, Duration::from_secs(5));
    }
}
