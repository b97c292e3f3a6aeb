//! High-level error types

use std::time::Duration;

use coyote_core::Sequence;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Core protocol error: {0}")]
    Core(#[from] coyote_core::Error),

    #[error("Transport error: {0}")]
    Transport(#[from] coyote_transport::Error),

    #[error("Type error: {0}")]
    Types(#[from] coyote_types::Error),

    #[error("Device not connected")]
    NotConnected,

    #[error("No acknowledgment for command {sequence} within {timeout:?}")]
    AckTimeout { sequence: Sequence, timeout: Duration },

    #[error("Link dropped before command {sequence} was acknowledged")]
    AckDropped { sequence: Sequence },

    #[error(transparent)]
    Observation(anyhow::Error),
}

impl Error {
    /// Device could not be discovered
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::Transport(coyote_transport::Error::DeviceNotFound { .. })
        )
    }

    /// Caller input was rejected before anything was sent
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Core(e) if e.is_validation())
    }

    /// Check if error is recoverable (retry might succeed)
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::AckTimeout { .. } => true,
            Self::Transport(e) => e.is_connection_error(),
            _ => false,
        }
    }

    /// Check if error requires reconnection
    pub fn requires_reconnect(&self) -> bool {
        matches!(
            self,
            Self::NotConnected
                | Self::AckDropped { .. }
                | Self::Transport(coyote_transport::Error::NotConnected)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        let not_found = Error::from(coyote_transport::Error::DeviceNotFound {
            name: "47L121000".into(),
            timeout: Duration::from_secs(10),
        });
        assert!(not_found.is_not_found());
        assert!(!not_found.is_recoverable());

        let timeout = Error::AckTimeout {
            sequence: Sequence::wrapping(3),
            timeout: Duration::from_secs(1),
        };
        assert!(timeout.is_recoverable());
        assert!(!timeout.requires_reconnect());

        assert!(Error::NotConnected.requires_reconnect());

        let observation = Error::Observation(anyhow::anyhow!("capture failed"));
        assert!(!observation.requires_reconnect());
        assert_eq!(observation.to_string(), "capture failed");
    }
}
