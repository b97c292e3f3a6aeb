//! OCR results and the text rules applied to them

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Error, Result};

/// One piece of recognized text
#[derive(Debug, Clone, PartialEq)]
pub struct Recognition {
    pub text: String,
    /// Recognizer confidence, 0.0..=1.0
    pub confidence: f32,
}

impl Recognition {
    pub fn new(text: impl Into<String>, confidence: f32) -> Self {
        Self {
            text: text.into(),
            confidence,
        }
    }
}

impl fmt::Display for Recognition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} ({:.2})", self.text, self.confidence)
    }
}

static DIGITS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").expect("static pattern"));

/// Read a `current/max` life counter
///
/// The text must contain a `/` and at least two integers. The smaller of
/// the first two is taken as current life and the larger as the maximum, so
/// OCR that swaps or mangles the order still yields a sane pair.
///
/// # Examples
///
/// ```
/// use coyote_types::recognition::parse_life;
///
/// assert_eq!(parse_life("17/20"), Some((17, 20)));
/// assert_eq!(parse_life("20 / 17"), Some((17, 20)));
/// assert_eq!(parse_life("17"), None);
/// ```
pub fn parse_life(text: &str) -> Option<(u32, u32)> {
    if !text.contains('/') {
        return None;
    }

    let mut numbers = DIGITS
        .find_iter(text)
        .filter_map(|m| m.as_str().parse::<u32>().ok());

    let n = numbers.next()?;
    let m = numbers.next()?;
    Some((n.min(m), n.max(m)))
}

/// Read the missed-enemy counter
///
/// Returns `Ok(None)` for recognitions containing `X`, which is the counter
/// icon rather than the number next to it.
///
/// # Errors
///
/// Returns [`Error::MissCount`] if the text is not an integer.
///
/// # Examples
///
/// ```
/// use coyote_types::recognition::parse_miss_count;
///
/// assert_eq!(parse_miss_count("3").unwrap(), Some(3));
/// assert_eq!(parse_miss_count("-2").unwrap(), Some(2));
/// assert_eq!(parse_miss_count("X").unwrap(), None);
/// assert!(parse_miss_count("3a").is_err());
/// ```
pub fn parse_miss_count(text: &str) -> Result<Option<u32>> {
    if text.contains('X') {
        return Ok(None);
    }

    let value = text.trim().parse::<i64>().map_err(|e| Error::MissCount {
        text: text.to_string(),
        reason: e.to_string(),
    })?;

    let count = u32::try_from(value.unsigned_abs()).map_err(|_| Error::MissCount {
        text: text.to_string(),
        reason: "out of range".to_string(),
    })?;

    Ok(Some(count))
}
