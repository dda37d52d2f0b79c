//! Order types: sides, statuses, placement requests and order records.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::{Lots, OrderId, Price, SymbolId, Timestamp};

use super::DataError;

/// Order side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderSide {
    /// Buy / long
    Buy,
    /// Sell / short
    Sell,
}

impl OrderSide {
    /// Returns the opposite side.
    #[must_use]
    pub const fn opposite(&self) -> Self {
        match self {
            Self::Buy => Self::Sell,
            Self::Sell => Self::Buy,
        }
    }

    /// Returns the direction multiplier (1 for Buy, -1 for Sell).
    #[must_use]
    pub fn direction(&self) -> rust_decimal::Decimal {
        match self {
            Self::Buy => rust_decimal::Decimal::ONE,
            Self::Sell => -rust_decimal::Decimal::ONE,
        }
    }
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => write!(f, "BUY"),
            Self::Sell => write!(f, "SELL"),
        }
    }
}

/// Order type.
///
/// Market is the only type the simulated broker fully specifies; limit
/// and stop orders share the record shape for adapter compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderType {
    /// Fill at the next opportunity
    Market,
    /// Fill at the given price or better
    Limit,
    /// Trigger a market order at the given price
    Stop,
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Market => write!(f, "MARKET"),
            Self::Limit => write!(f, "LIMIT"),
            Self::Stop => write!(f, "STOP"),
        }
    }
}

/// Order lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Accepted, waiting for a fill
    Pending,
    /// Fully filled
    Filled,
    /// Partially filled
    PartiallyFilled,
    /// Cancelled before filling
    Cancelled,
    /// Rejected by adapter-side validation
    Rejected,
}

impl OrderStatus {
    /// Returns true if the status is terminal.
    #[must_use]
    pub const fn is_final(&self) -> bool {
        matches!(self, Self::Filled | Self::Cancelled | Self::Rejected)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "PENDING"),
            Self::Filled => write!(f, "FILLED"),
            Self::PartiallyFilled => write!(f, "PARTIALLY_FILLED"),
            Self::Cancelled => write!(f, "CANCELLED"),
            Self::Rejected => write!(f, "REJECTED"),
        }
    }
}

/// An order record as returned by an execution collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Broker-assigned order id
    pub order_id: OrderId,
    /// Instrument identifier
    pub symbol_id: SymbolId,
    /// Order side
    pub side: OrderSide,
    /// Order type
    pub order_type: OrderType,
    /// Requested volume in lots
    pub volume: Lots,
    /// Limit/stop price, if applicable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Price>,
    /// Stop-loss price level
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_loss: Option<Price>,
    /// Take-profit price level
    #[serde(skip_serializing_if = "Option::is_none")]
    pub take_profit: Option<Price>,
    /// Lifecycle status
    pub status: OrderStatus,
    /// Creation timestamp
    pub created_at: Timestamp,
    /// Caller-supplied correlation id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_order_id: Option<String>,
}

/// A validated order placement request.
///
/// Built through [`OrderRequest::builder`]; `build` rejects requests
/// with zero volume.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRequest {
    /// Instrument identifier
    pub symbol_id: SymbolId,
    /// Order side
    pub side: OrderSide,
    /// Order type
    pub order_type: OrderType,
    /// Requested volume in lots
    pub volume: Lots,
    /// Limit/stop price, if applicable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Price>,
    /// Stop-loss price level
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_loss: Option<Price>,
    /// Take-profit price level
    #[serde(skip_serializing_if = "Option::is_none")]
    pub take_profit: Option<Price>,
    /// Caller-supplied correlation id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_order_id: Option<String>,
}

impl OrderRequest {
    /// Creates a new builder for `OrderRequest`.
    #[must_use]
    pub fn builder() -> OrderRequestBuilder {
        OrderRequestBuilder::default()
    }
}

/// Builder for [`OrderRequest`].
#[derive(Debug, Default)]
pub struct OrderRequestBuilder {
    symbol_id: Option<SymbolId>,
    side: Option<OrderSide>,
    order_type: Option<OrderType>,
    volume: Option<Lots>,
    price: Option<Price>,
    stop_loss: Option<Price>,
    take_profit: Option<Price>,
    client_order_id: Option<String>,
}

impl OrderRequestBuilder {
    /// Sets the instrument.
    #[must_use]
    pub fn symbol_id(mut self, symbol_id: SymbolId) -> Self {
        self.symbol_id = Some(symbol_id);
        self
    }

    /// Sets the side.
    #[must_use]
    pub fn side(mut self, side: OrderSide) -> Self {
        self.side = Some(side);
        self
    }

    /// Sets the order type.
    #[must_use]
    pub fn order_type(mut self, order_type: OrderType) -> Self {
        self.order_type = Some(order_type);
        self
    }

    /// Sets the volume.
    #[must_use]
    pub fn volume(mut self, volume: Lots) -> Self {
        self.volume = Some(volume);
        self
    }

    /// Sets the limit/stop price.
    #[must_use]
    pub fn price(mut self, price: Price) -> Self {
        self.price = Some(price);
        self
    }

    /// Sets the stop-loss level.
    #[must_use]
    pub fn stop_loss(mut self, stop_loss: Price) -> Self {
        self.stop_loss = Some(stop_loss);
        self
    }

    /// Sets the take-profit level.
    #[must_use]
    pub fn take_profit(mut self, take_profit: Price) -> Self {
        self.take_profit = Some(take_profit);
        self
    }

    /// Sets the client correlation id.
    #[must_use]
    pub fn client_order_id(mut self, id: impl Into<String>) -> Self {
        self.client_order_id = Some(id.into());
        self
    }

    /// Builds the `OrderRequest`.
    ///
    /// # Errors
    ///
    /// Returns an error if a required field is missing or the volume is
    /// zero.
    pub fn build(self) -> Result<OrderRequest, DataError> {
        let volume = self.volume.ok_or(DataError::MissingField("volume"))?;
        if volume.is_zero() {
            return Err(DataError::InvalidValue("volume must be positive".to_string()));
        }
        Ok(OrderRequest {
            symbol_id: self.symbol_id.ok_or(DataError::MissingField("symbol_id"))?,
            side: self.side.ok_or(DataError::MissingField("side"))?,
            order_type: self.order_type.ok_or(DataError::MissingField("order_type"))?,
            volume,
            price: self.price,
            stop_loss: self.stop_loss,
            take_profit: self.take_profit,
            client_order_id: self.client_order_id,
        })
    }
}
