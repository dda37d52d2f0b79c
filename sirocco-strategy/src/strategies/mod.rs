//! Built-in signal strategies.

mod buy_on_first_bar;
mod sma_cross;

pub use buy_on_first_bar::BuyOnFirstBar;
pub use sma_cross::SmaCross;
