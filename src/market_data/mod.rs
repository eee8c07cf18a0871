pub mod candle;

// Re-export for `use crate::market_data::Candle`.
pub use candle::{Candle, TickerSnapshot};
