// =============================================================================
// Average Directional Index (ADX)
// =============================================================================
//
// ADX quantifies trend **strength** regardless of direction.
//
// Calculation pipeline:
//   1. +DM = H_t - H_{t-1} when it beats the down move and is positive, else 0.
//      -DM = L_{t-1} - L_t under the mirrored rule. Bar 0 has neither.
//   2. Smooth +DM and -DM with an adjusted exponential average (alpha 1/14).
//   3. +DI = smoothed(+DM) / ATR * 100,  -DI = smoothed(-DM) / ATR * 100
//   4. DX  = |+DI - -DI| / (+DI + -DI) * 100   (0 when the sum is 0)
//   5. ADX = adjusted exponential average of DX (alpha 1/14)
//
// The ATR column doubles as the true-range smoothing, so the DI columns are
// undefined for as long as ATR is.
//
// Interpretation:
//   ADX > 25  => trending market
//   ADX < 20  => ranging / choppy market
// =============================================================================

use super::ema::{calculate_adjusted_ewm, AdjustedEwm};
use crate::market_data::Candle;

pub const DI_ALPHA: f64 = 1.0 / 14.0;

/// Directional-movement columns aligned with the candles.
#[derive(Debug, Clone, Default)]
pub struct AdxSeries {
    pub plus_di: Vec<Option<f64>>,
    pub minus_di: Vec<Option<f64>>,
    pub adx: Vec<Option<f64>>,
}

/// Raw (+DM, -DM) for bar `i`.
fn directional_movement(candles: &[Candle], i: usize) -> (f64, f64) {
    if i == 0 {
        return (0.0, 0.0);
    }
    let up_move = candles[i].high - candles[i - 1].high;
    let down_move = candles[i - 1].low - candles[i].low;

    let pdm = if up_move > down_move && up_move > 0.0 {
        up_move
    } else {
        0.0
    };
    let mdm = if down_move > up_move && down_move > 0.0 {
        down_move
    } else {
        0.0
    };
    (pdm, mdm)
}

/// Compute +DI, -DI and ADX given the candles and their ATR column.
pub fn calculate_adx(candles: &[Candle], atr: &[Option<f64>]) -> AdxSeries {
    let n = candles.len().min(atr.len());

    let mut plus_smooth = AdjustedEwm::new(DI_ALPHA);
    let mut minus_smooth = AdjustedEwm::new(DI_ALPHA);

    let mut plus_di = Vec::with_capacity(n);
    let mut minus_di = Vec::with_capacity(n);
    let mut dx = Vec::with_capacity(n);

    for i in 0..n {
        let (pdm, mdm) = directional_movement(candles, i);
        let sp = plus_smooth.update(pdm);
        let sm = minus_smooth.update(mdm);

        match atr[i] {
            Some(a) => {
                let (p, m) = di_pair(sp, sm, a);
                plus_di.push(Some(p));
                minus_di.push(Some(m));
                dx.push(Some(compute_dx(p, m)));
            }
            None => {
                plus_di.push(None);
                minus_di.push(None);
                dx.push(None);
            }
        }
    }

    let adx = calculate_adjusted_ewm(&dx, DI_ALPHA)
        .into_iter()
        .map(|v| v.map(|a| a.clamp(0.0, 100.0)))
        .collect();

    AdxSeries {
        plus_di,
        minus_di,
        adx,
    }
}

// =============================================================================
// Internal helpers
// =============================================================================

/// +DI / -DI from smoothed movement. A zero-range market has no direction.
fn di_pair(smooth_plus_dm: f64, smooth_minus_dm: f64, atr: f64) -> (f64, f64) {
    if atr <= 0.0 {
        return (0.0, 0.0);
    }
    (
        smooth_plus_dm / atr * 100.0,
        smooth_minus_dm / atr * 100.0,
    )
}

fn compute_dx(plus_di: f64, minus_di: f64) -> f64 {
    let di_sum = plus_di + minus_di;
    if di_sum == 0.0 {
        // Both +DI and -DI are zero: no directional movement.
        return 0.0;
    }
    ((plus_di - minus_di).abs() / di_sum * 100.0).clamp(0.0, 100.0)
}
