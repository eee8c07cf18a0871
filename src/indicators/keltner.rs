// =============================================================================
// Keltner Channel
// =============================================================================
//
// A volatility envelope around an exponential mean of close:
//   mid   = adjusted EMA(20) of close
//   upper = mid + 2 * ATR
//   lower = mid - 2 * ATR
//
// A close above the upper band flags a breakout extreme.

use super::ema::{span_alpha, AdjustedEwm};

pub const KC_SPAN: usize = 20;
pub const KC_ATR_MULTIPLIER: f64 = 2.0;

#[derive(Debug, Clone, Default)]
pub struct KeltnerSeries {
    pub mid: Vec<f64>,
    pub upper: Vec<Option<f64>>,
    pub lower: Vec<Option<f64>>,
}

/// Channel columns; the bands are undefined wherever ATR is.
pub fn calculate_keltner(closes: &[f64], atr: &[Option<f64>]) -> KeltnerSeries {
    let mut ewm = AdjustedEwm::new(span_alpha(KC_SPAN));
    let mid: Vec<f64> = closes.iter().map(|&c| ewm.update(c)).collect();

    let upper = mid
        .iter()
        .zip(atr)
        .map(|(m, a)| a.map(|a| m + KC_ATR_MULTIPLIER * a))
        .collect();
    let lower = mid
        .iter()
        .zip(atr)
        .map(|(m, a)| a.map(|a| m - KC_ATR_MULTIPLIER * a))
        .collect();

    KeltnerSeries { mid, upper, lower }
}
