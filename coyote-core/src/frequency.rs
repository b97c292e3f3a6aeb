//! Pulse frequency conversion
//!
//! The device takes one byte per frequency slot. User-facing periods
//! between 10 and 1000 are compressed into that byte in three bands:
//!
//! ```text
//!   10..=100   ->  10..=100   (1:1)
//!  101..=600   -> 100..=200   (1:5)
//!  601..=1000  -> 200..=240   (1:10)
//! ```
//!
//! Anything outside 10..=1000 maps to the minimum, 10. Inputs are never
//! rejected.

/// Lowest accepted input (also the fallback)
pub const MIN_FREQUENCY: i32 = 10;

/// Highest accepted input
pub const MAX_FREQUENCY: i32 = 1000;

/// Convert a user-facing frequency into the device byte
///
/// # Examples
///
/// ```
/// use coyote_core::frequency::convert_frequency;
///
/// assert_eq!(convert_frequency(40), 40);
/// assert_eq!(convert_frequency(600), 200);
/// assert_eq!(convert_frequency(1000), 240);
/// assert_eq!(convert_frequency(5), 10);
/// ```
pub fn convert_frequency(input: i32) -> u8 {
    let raw = match input {
        10..=100 => input,
        101..=600 => (input - 100) / 5 + 100,
        601..=1000 => (input - 600) / 10 + 200,
        _ => MIN_FREQUENCY,
    };

    // Every branch lands in 10..=240
    raw as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_band_edges() {
        assert_eq!(convert_frequency(10), 10);
        assert_eq!(convert_frequency(100), 100);
        assert_eq!(convert_frequency(101), 100);
        assert_eq!(convert_frequency(105), 101);
        assert_eq!(convert_frequency(600), 200);
        assert_eq!(convert_frequency(601), 200);
        assert_eq!(convert_frequency(610), 201);
        assert_eq!(convert_frequency(1000), 240);
    }

    #[test]
    fn test_out_of_range_falls_back_to_minimum() {
        assert_eq!(convert_frequency(0), 10);
        assert_eq!(convert_frequency(9), 10);
        assert_eq!(convert_frequency(-5), 10);
        assert_eq!(convert_frequency(1001), 10);
        assert_eq!(convert_frequency(i32::MAX), 10);
        assert_eq!(convert_frequency(i32::MIN), 10);
    }

    proptest! {
        #[test]
        fn prop_identity_band(f in 10i32..=100) {
            prop_assert_eq!(convert_frequency(f) as i32, f);
            // Converting a converted value changes nothing in this band
            prop_assert_eq!(convert_frequency(convert_frequency(f) as i32), convert_frequency(f));
        }

        #[test]
        fn prop_middle_band(f in 101i32..=600) {
            prop_assert_eq!(convert_frequency(f) as i32, (f - 100) / 5 + 100);
        }

        #[test]
        fn prop_upper_band(f in 601i32..=1000) {
            prop_assert_eq!(convert_frequency(f) as i32, (f - 600) / 10 + 200);
        }

        #[test]
        fn prop_outside_is_minimum(f in prop_oneof![i32::MIN..10, 1001i32..=i32::MAX]) {
            prop_assert_eq!(convert_frequency(f), 10);
        }
    }
}
