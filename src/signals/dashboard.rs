// =============================================================================
// Market Dashboard — composite score for the reference asset
// =============================================================================
//
// Base score 50, adjusted by two independent terms on the latest bar:
//
//   Ribbon   EMA7 > EMA25 > EMA99          +25
//            EMA7 < EMA25 < EMA99          -25
//   MACD     hist > 0 and rising           +15
//            hist > 0 and not rising        +5
//            hist <= 0 and falling         -15
//            hist <= 0 and not falling      0
//
// Only an accelerating decline is penalised; a fading one scores nothing.
// The final score maps onto a five-band traffic light.
// =============================================================================

use serde::{Deserialize, Serialize};

use super::round_to;
use crate::error::EngineError;
use crate::indicators::{IndicatorBar, IndicatorSeries, MIN_CANDLES};
use crate::types::{EmaStructure, MacdStatus, SignalLight};

const BASE_SCORE: i32 = 50;
const RIBBON_POINTS: i32 = 25;
const MACD_ACCEL_POINTS: i32 = 15;
const MACD_DECEL_POINTS: i32 = 5;

/// Latest-bar snapshot of the reference asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardResult {
    pub price: f64,
    pub score: i32,
    pub signal_light: SignalLight,
    pub ema_structure: EmaStructure,
    pub macd_status: MacdStatus,
    pub adx: f64,
    pub rsi: f64,
    pub safe_leverage: f64,
}

/// Score the latest bar of `series` against the bar before it.
///
/// Fails with `InsufficientHistory` when the series is too short or the
/// latest row still has undefined ADX / RSI / leverage.
pub fn build_dashboard(series: &IndicatorSeries) -> Result<DashboardResult, EngineError> {
    let insufficient = EngineError::InsufficientHistory {
        have: series.len(),
        need: MIN_CANDLES,
    };
    let (curr, prev) = series.last_two().ok_or_else(|| insufficient.clone())?;
    let (Some(adx), Some(rsi), Some(safe_leverage)) = (curr.adx, curr.rsi, curr.safe_leverage)
    else {
        return Err(insufficient);
    };

    let (ribbon_points, ema_structure) = score_ribbon(curr);
    let (macd_points, macd_status) = score_macd(curr, prev);
    let score = BASE_SCORE + ribbon_points + macd_points;

    Ok(DashboardResult {
        price: curr.candle.close,
        score,
        signal_light: SignalLight::from_score(score),
        ema_structure,
        macd_status,
        adx: round_to(adx, 1),
        rsi: round_to(rsi, 1),
        safe_leverage: round_to(safe_leverage, 1),
    })
}

pub(crate) fn score_ribbon(bar: &IndicatorBar) -> (i32, EmaStructure) {
    if bar.ema_7 > bar.ema_25 && bar.ema_25 > bar.ema_99 {
        (RIBBON_POINTS, EmaStructure::BullishAlignment)
    } else if bar.ema_7 < bar.ema_25 && bar.ema_25 < bar.ema_99 {
        (-RIBBON_POINTS, EmaStructure::BearishAlignment)
    } else {
        (0, EmaStructure::Tangled)
    }
}

pub(crate) fn score_macd(curr: &IndicatorBar, prev: &IndicatorBar) -> (i32, MacdStatus) {
    if curr.macd_hist > 0.0 {
        if curr.macd_hist > prev.macd_hist {
            (MACD_ACCEL_POINTS, MacdStatus::BullishAccelerating)
        } else {
            (MACD_DECEL_POINTS, MacdStatus::BullishDecelerating)
        }
    } else if curr.macd_hist < prev.macd_hist {
        (-MACD_ACCEL_POINTS, MacdStatus::BearishAccelerating)
    } else {
        (0, MacdStatus::Exhausted)
    }
}
