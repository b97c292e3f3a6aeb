//! Transport errors

use std::time::Duration;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Device {name:?} not found within {timeout:?}")]
    DeviceNotFound { name: String, timeout: Duration },

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Not connected")]
    NotConnected,

    #[error("Already connected")]
    AlreadyConnected,

    #[error("Notifications already subscribed")]
    AlreadySubscribed,

    #[error("Write failed: {0}")]
    WriteFailed(String),

    #[error("Read failed: {0}")]
    ReadFailed(String),
}

impl Error {
    /// Discovery or link-level failure
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            Self::ConnectionFailed(_) | Self::WriteFailed(_) | Self::ReadFailed(_)
        )
    }
}
