//! Opaque instrument identifier.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ValidationError;

/// Opaque 64-bit instrument identifier.
///
/// Instrument metadata (ticker, pip size, venue) lives in the external
/// catalog; the core only ever routes on the id.
///
/// # Examples
///
/// ```
/// use sirocco_core::types::SymbolId;
///
/// let eurusd = SymbolId::new(1);
/// assert_eq!(eurusd.as_u64(), 1);
/// assert_eq!(format!("{eurusd}"), "sym_1");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
#[serde(transparent)]
pub struct SymbolId(u64);

impl SymbolId {
    /// Creates a new `SymbolId` from a raw value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw id value.
    #[must_use]
    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sym_{}", self.0)
    }
}

impl From<u64> for SymbolId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<SymbolId> for u64 {
    fn from(id: SymbolId) -> Self {
        id.0
    }
}

impl FromStr for SymbolId {
    type Err = ValidationError;

    /// Parses a numeric id string (the form used by definition
    /// `symbol_list` columns).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u64>()
            .map(Self)
            .map_err(|_| ValidationError::InvalidSymbolId(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_id_roundtrip() {
        let id = SymbolId::new(42);
        let raw: u64 = id.into();
        assert_eq!(raw, 42);
        assert_eq!(SymbolId::from(42u64), id);
    }

    #[test]
    fn test_symbol_id_display() {
        assert_eq!(format!("{}", SymbolId::new(7)), "sym_7");
    }

    #[test]
    fn test_symbol_id_from_str() {
        let id: SymbolId = "1001".parse().unwrap();
        assert_eq!(id.as_u64(), 1001);

        let err = "EURUSD".parse::<SymbolId>();
        assert!(matches!(err, Err(ValidationError::InvalidSymbolId(_))));
    }
}
