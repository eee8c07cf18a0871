// =============================================================================
// Market Pulse — indicator, scoring and setup engine for crypto pairs
// =============================================================================
//
// candles -> indicators::compute_indicators -> IndicatorSeries
//         -> signals::build_dashboard / signals::scan_setups -> plain records
//
// The engine modules are pure and stateless. `exchange`, `scan` and `report`
// are the I/O around them.
// =============================================================================

pub mod error;
pub mod exchange;
pub mod indicators;
pub mod market_data;
pub mod report;
pub mod runtime_config;
pub mod scan;
pub mod signals;
pub mod types;

pub use error::EngineError;
pub use indicators::{compute_indicators, IndicatorBar, IndicatorSeries, RiskParams};
pub use market_data::{Candle, TickerSnapshot};
pub use signals::{build_dashboard, scan_setups, Candidate, DashboardResult, SetupRecord};
