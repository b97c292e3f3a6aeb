//! GATT identifier expansion
//!
//! The device advertises 16-bit short codes. Full 128-bit UUIDs are obtained
//! by placing the short code in bits 96..112 of a base template, so
//! `0x150A` with the Bluetooth base becomes
//! `0000150a-0000-1000-8000-00805f9b34fb`.

use uuid::Uuid;

use crate::constants::gatt;

/// Base UUID template a short code is embedded into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UuidTemplate {
    base: Uuid,
}

impl UuidTemplate {
    /// Bluetooth SIG base UUID (`0000xxxx-0000-1000-8000-00805f9b34fb`)
    pub const BLUETOOTH_BASE: Self = Self {
        base: Uuid::from_u128(0x0000_0000_0000_1000_8000_0080_5f9b_34fb),
    };

    const SHORT_MASK: u128 = 0xFFFF << 96;

    /// Use a custom base; whatever occupies the short-code bits is replaced
    pub fn new(base: Uuid) -> Self {
        Self { base }
    }

    pub fn base(&self) -> Uuid {
        self.base
    }

    /// Expand a short code into a full UUID
    ///
    /// # Examples
    ///
    /// ```
    /// use coyote_core::gatt::UuidTemplate;
    ///
    /// let uuid = UuidTemplate::BLUETOOTH_BASE.expand(0x150A);
    /// assert_eq!(uuid.to_string(), "0000150a-0000-1000-8000-00805f9b34fb");
    /// ```
    pub fn expand(&self, short: u16) -> Uuid {
        let cleared = self.base.as_u128() & !Self::SHORT_MASK;
        Uuid::from_u128(cleared | ((short as u128) << 96))
    }

    pub fn service(&self) -> Uuid {
        self.expand(gatt::SERVICE)
    }

    pub fn write(&self) -> Uuid {
        self.expand(gatt::WRITE)
    }

    pub fn notify(&self) -> Uuid {
        self.expand(gatt::NOTIFY)
    }

    pub fn battery(&self) -> Uuid {
        self.expand(gatt::BATTERY)
    }
}

impl Default for UuidTemplate {
    fn default() -> Self {
        Self::BLUETOOTH_BASE
    }
}
