//! Entity identifiers for orders, positions and trades.
//!
//! All three are non-empty strings. Position ids deliberately share the
//! entry order's id: the simulated broker creates a position under the
//! id of the order that filled it, and closing trades reference the
//! position through the same value, which is what lets the metrics
//! reducer pair entries with exits by a single key.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ValidationError;

macro_rules! string_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates a new id from a string.
            ///
            /// # Errors
            ///
            /// Returns `ValidationError::EmptyId` if the string is empty.
            pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
                let s = value.into();
                if s.is_empty() {
                    return Err(ValidationError::EmptyId);
                }
                Ok(Self(s))
            }

            /// Creates a new id without validation.
            #[must_use]
            pub fn new_unchecked(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Generates a fresh unique id using UUID v4.
            #[must_use]
            pub fn generate() -> Self {
                Self(uuid::Uuid::new_v4().to_string())
            }

            /// Returns the id as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

string_id! {
    /// Order identifier.
    OrderId
}

string_id! {
    /// Position identifier.
    ///
    /// Equal to the id of the order whose fill opened the position.
    PositionId
}

string_id! {
    /// Trade identifier.
    TradeId
}

impl From<OrderId> for PositionId {
    fn from(order_id: OrderId) -> Self {
        Self(order_id.0)
    }
}

impl PositionId {
    /// Returns this position id viewed as the linking order id.
    #[must_use]
    pub fn as_order_id(&self) -> OrderId {
        OrderId(self.0.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_rejects_empty() {
        assert!(matches!(OrderId::new(""), Err(ValidationError::EmptyId)));
        assert!(PositionId::new("").is_err());
        assert!(TradeId::new("").is_err());
    }

    #[test]
    fn test_id_generate_unique() {
        let a = TradeId::generate();
        let b = TradeId::generate();
        assert_ne!(a, b);
    }

    #[test]
    fn test_position_id_from_order_id() {
        let order_id = OrderId::new("SIM-0001").unwrap();
        let position_id = PositionId::from(order_id.clone());
        assert_eq!(position_id.as_str(), "SIM-0001");
        assert_eq!(position_id.as_order_id(), order_id);
    }

    #[test]
    fn test_id_display() {
        let id = OrderId::new("abc").unwrap();
        assert_eq!(format!("{id}"), "abc");
    }
}
