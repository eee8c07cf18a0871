// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free indicator columns. Every function takes a whole
// window and returns one value per bar, with `None` marking bars whose
// look-back has not filled. `pipeline` stitches them into one table.

pub mod adx;
pub mod atr;
pub mod ema;
pub mod keltner;
pub mod macd;
pub mod pipeline;
pub mod rsi;
pub mod sma;
pub mod volume;

pub use atr::RiskParams;
pub use pipeline::{
    compute_indicators, compute_indicators_with, IndicatorBar, IndicatorSeries, MIN_CANDLES,
};
