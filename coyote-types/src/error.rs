//! Error types for coyote-types

/// Result type alias for coyote-types operations
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Load badge level outside 0..=2
    #[error("Invalid load level {0}: expected 0..=2")]
    InvalidLoad(u8),

    /// Miss counter text is not a usable integer
    #[error("Unreadable miss count {text:?}: {reason}")]
    MissCount { text: String, reason: String },
}
