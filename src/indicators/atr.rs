// =============================================================================
// Average True Range (ATR) and ATR-derived risk sizing
// =============================================================================
//
// True Range (TR) for each bar:
//   TR_0 = H - L
//   TR_t = max(H - L, |H - prevClose|, |L - prevClose|)
//
// ATR is the 14-bar simple mean of TR (undefined until the window fills).
//
// Safe leverage sizes a position so that a stop placed `stop_multiple` ATRs
// away loses at most `risk_budget` of the account:
//   volatility     = ATR / close
//   safe_leverage  = risk_budget / (stop_multiple * volatility), capped
// =============================================================================

use serde::{Deserialize, Serialize};

use super::sma::rolling_mean;
use crate::market_data::Candle;

pub const ATR_PERIOD: usize = 14;

/// Volatility below this is treated as a flat market.
const MIN_VOLATILITY: f64 = 1e-12;

/// Risk model behind the safe-leverage column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskParams {
    /// Fraction of the account a stop-out may cost.
    pub risk_budget: f64,
    /// Stop distance in ATRs.
    pub stop_multiple: f64,
    /// Upper bound on reported leverage.
    pub max_leverage: f64,
}

impl Default for RiskParams {
    fn default() -> Self {
        Self {
            risk_budget: 0.02,
            stop_multiple: 2.0,
            max_leverage: 20.0,
        }
    }
}

impl RiskParams {
    /// Leverage for a given `ATR / close` ratio.
    ///
    /// Flat markets (volatility ~ 0) get the cap instead of a division error.
    pub fn safe_leverage(&self, volatility_pct: f64) -> f64 {
        if volatility_pct < MIN_VOLATILITY {
            return self.max_leverage;
        }
        (self.risk_budget / (self.stop_multiple * volatility_pct)).min(self.max_leverage)
    }

    /// Price distance of the ATR stop.
    pub fn stop_distance(&self, atr: f64) -> f64 {
        atr * self.stop_multiple
    }
}

/// Per-bar true range. Bar 0 has no previous close and uses `high - low`.
pub fn true_range_series(candles: &[Candle]) -> Vec<f64> {
    candles
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let prev_close = if i == 0 { None } else { Some(candles[i - 1].close) };
            c.true_range(prev_close)
        })
        .collect()
}

/// ATR column: `period`-bar simple mean of true range.
pub fn calculate_atr(candles: &[Candle], period: usize) -> Vec<Option<f64>> {
    rolling_mean(&true_range_series(candles), period)
}

/// `ATR / close` per bar; undefined wherever ATR is.
pub fn volatility_pct(candles: &[Candle], atr: &[Option<f64>]) -> Vec<Option<f64>> {
    candles
        .iter()
        .zip(atr)
        .map(|(c, a)| a.map(|a| a / c.close))
        .collect()
}
