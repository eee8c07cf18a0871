// =============================================================================
// Volume — rolling mean and spike ratio
// =============================================================================

use super::sma::rolling_mean;
use crate::market_data::Candle;

pub const VOLUME_WINDOW: usize = 20;

/// Trailing mean of bar volume, undefined until `window` bars exist.
pub fn volume_sma(candles: &[Candle], window: usize) -> Vec<Option<f64>> {
    let volumes: Vec<f64> = candles.iter().map(|c| c.volume).collect();
    rolling_mean(&volumes, window)
}

/// Current volume as a multiple of its rolling mean. A zero mean reads 0.
pub fn volume_spike(volume: f64, mean: f64) -> f64 {
    if mean <= 0.0 {
        return 0.0;
    }
    volume / mean
}
