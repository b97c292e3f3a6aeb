//! Game state and the strength it maps to

use std::fmt;

use tracing::{debug, warn};

use crate::{
    error::{Error, Result},
    recognition::{parse_life, parse_miss_count, Recognition},
};

/// In-game load status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Load {
    #[default]
    Normal = 0,
    Confused = 1,
    Stalled = 2,
}

impl Load {
    pub fn level(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for Load {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(Self::Normal),
            1 => Ok(Self::Confused),
            2 => Ok(Self::Stalled),
            _ => Err(Error::InvalidLoad(value)),
        }
    }
}

/// What one poll of the game screen produced
#[derive(Debug, Clone, PartialEq)]
pub enum Observation {
    /// Inside a stage: recognitions around the missed-enemy counter
    Battle { misses: Vec<Recognition> },
    /// On the map: recognitions around the life counter, and the load badge
    Map { life: Vec<Recognition>, load: Load },
    /// Neither screen is showing
    Idle,
}

/// Game-state variables driving the strength
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameState {
    pub life: u32,
    pub max_life: u32,
    pub load: Load,
    /// Enemies missed in the current stage
    pub damage: u32,
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            life: 999,
            max_life: 999,
            load: Load::Normal,
            damage: 0,
        }
    }
}

impl GameState {
    /// Strength when life has dropped to one
    pub const LAST_LIFE_STRENGTH: i32 = 20;

    /// Strength floor otherwise
    pub const BASE_STRENGTH: i32 = 5;

    /// Map the state to an absolute strength
    ///
    /// ```text
    /// base  = 20                                   if life == 1
    ///       = 5 + trunc(10 * (max - life) / max)   otherwise
    /// base += 2 * damage
    /// final = trunc(base * (1 + 0.2 * load))
    /// ```
    ///
    /// # Examples
    ///
    /// ```
    /// use coyote_types::{GameState, Load};
    ///
    /// let state = GameState { life: 1, max_life: 999, load: Load::Stalled, damage: 3 };
    /// assert_eq!(state.target_strength(), 36);
    /// ```
    pub fn target_strength(&self) -> i32 {
        let mut base = if self.life == 1 {
            Self::LAST_LIFE_STRENGTH
        } else {
            Self::BASE_STRENGTH + self.life_penalty()
        };

        let damage = i32::try_from(self.damage).unwrap_or(i32::MAX);
        base = base.saturating_add(damage.saturating_mul(2));

        (f64::from(base) * (1.0 + 0.2 * f64::from(self.load.level()))) as i32
    }

    fn life_penalty(&self) -> i32 {
        if self.max_life == 0 {
            return 0;
        }
        let lost = f64::from(self.max_life.saturating_sub(self.life));
        (10.0 * (lost / f64::from(self.max_life))) as i32
    }

    /// Fold one observation into the state
    ///
    /// Unreadable recognitions are logged and skipped; the previous value is
    /// kept.
    pub fn apply(&mut self, observation: &Observation) {
        match observation {
            Observation::Battle { misses } => {
                for recognition in misses {
                    match parse_miss_count(&recognition.text) {
                        Ok(Some(count)) => self.damage = count,
                        Ok(None) => {}
                        Err(e) => warn!("Unreadable miss counter {}: {}", recognition, e),
                    }
                }
            }
            Observation::Map { life, load } => {
                for recognition in life {
                    if let Some((current, max)) = parse_life(&recognition.text) {
                        self.life = current;
                        self.max_life = max;
                    }
                }
                self.load = *load;
            }
            Observation::Idle => {}
        }

        debug!(state = %self, "Game state updated");
    }
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "life {}/{}, load {:?}, missed {}",
            self.life, self.max_life, self.load, self.damage
        )
    }
}
