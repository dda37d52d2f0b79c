//! Bar timeframe enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use super::ValidationError;

/// Named bar duration.
///
/// Variants are declared in ascending duration, so the derived ordering
/// sorts timeframes from shortest to longest.
///
/// # Examples
///
/// ```
/// use sirocco_core::types::Timeframe;
///
/// let tf: Timeframe = "M5".parse().unwrap();
/// assert_eq!(tf, Timeframe::M5);
/// assert_eq!(tf.secs(), 300);
/// assert!(Timeframe::M5 < Timeframe::H1);
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Timeframe {
    /// 1 minute bars
    M1,
    /// 5 minute bars
    M5,
    /// 15 minute bars
    M15,
    /// 30 minute bars
    M30,
    /// 1 hour bars
    H1,
    /// 4 hour bars
    H4,
    /// 1 day bars
    D1,
    /// 1 week bars
    W1,
}

impl Timeframe {
    /// All timeframes, shortest first.
    pub const ALL: [Self; 8] = [
        Self::M1,
        Self::M5,
        Self::M15,
        Self::M30,
        Self::H1,
        Self::H4,
        Self::D1,
        Self::W1,
    ];

    /// Returns the duration of one bar at this timeframe.
    #[must_use]
    pub const fn duration(&self) -> Duration {
        match self {
            Self::M1 => Duration::from_secs(60),
            Self::M5 => Duration::from_secs(5 * 60),
            Self::M15 => Duration::from_secs(15 * 60),
            Self::M30 => Duration::from_secs(30 * 60),
            Self::H1 => Duration::from_secs(60 * 60),
            Self::H4 => Duration::from_secs(4 * 60 * 60),
            Self::D1 => Duration::from_secs(24 * 60 * 60),
            Self::W1 => Duration::from_secs(7 * 24 * 60 * 60),
        }
    }

    /// Returns the duration in seconds.
    #[must_use]
    #[allow(clippy::cast_possible_wrap)]
    pub const fn secs(&self) -> i64 {
        self.duration().as_secs() as i64
    }

    /// Returns the canonical short code ("M1" … "W1").
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::M1 => "M1",
            Self::M5 => "M5",
            Self::M15 => "M15",
            Self::M30 => "M30",
            Self::H1 => "H1",
            Self::H4 => "H4",
            Self::D1 => "D1",
            Self::W1 => "W1",
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Timeframe {
    type Err = ValidationError;

    /// Parses a timeframe code, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "M1" => Ok(Self::M1),
            "M5" => Ok(Self::M5),
            "M15" => Ok(Self::M15),
            "M30" => Ok(Self::M30),
            "H1" => Ok(Self::H1),
            "H4" => Ok(Self::H4),
            "D1" => Ok(Self::D1),
            "W1" => Ok(Self::W1),
            _ => Err(ValidationError::InvalidTimeframe(s.to_string())),
        }
    }
}
