//! Protocol constants

/// Opcode of the strength/waveform command (host to device)
pub const OPCODE_STRENGTH: u8 = 0xB0;

/// Marker byte of the strength acknowledgment (device to host)
pub const MARKER_ACK: u8 = 0xB1;

/// Highest strength value the device accepts
pub const MAX_STRENGTH: u8 = 200;

/// Number of frequency/intensity slots per channel
pub const WAVEFORM_SLOTS: usize = 4;

/// Number of distinct sequence values (4-bit counter)
pub const SEQUENCE_MODULUS: u8 = 16;

/// Default advertised device name
pub const DEFAULT_DEVICE_NAME: &str = "47L121000";

/// Default discovery timeout (milliseconds)
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 10_000;

/// Default acknowledgment timeout (milliseconds)
pub const DEFAULT_ACK_TIMEOUT_MS: u64 = 1_000;

/// Strength a fresh session assumes for both channels
pub const DEFAULT_STRENGTH: i32 = 5;

/// Frequency slots a fresh session assumes for both channels
pub const DEFAULT_FREQUENCIES: [u8; WAVEFORM_SLOTS] = [10, 10, 10, 10];

/// Intensity slots a fresh session assumes for both channels
pub const DEFAULT_INTENSITIES: [u8; WAVEFORM_SLOTS] = [5, 5, 5, 5];

/// GATT short codes, expanded through [`crate::gatt::UuidTemplate`]
pub mod gatt {
    /// Primary service
    pub const SERVICE: u16 = 0x180C;

    /// Command write characteristic
    pub const WRITE: u16 = 0x150A;

    /// Acknowledgment notify characteristic
    pub const NOTIFY: u16 = 0x150B;

    /// Battery level characteristic
    pub const BATTERY: u16 = 0x1500;
}
