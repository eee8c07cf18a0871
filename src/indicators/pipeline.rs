// =============================================================================
// Indicator Pipeline
// =============================================================================
//
// Turns an ordered candle window into a per-bar indicator table. Every column
// has one entry per input bar; values whose look-back window has not filled
// yet are `None`. The original candle is carried unchanged on every row.
//
// Minimum input: 50 bars. Shorter windows are rejected with
// `EngineError::InsufficientHistory` so multi-asset callers can skip them.
// =============================================================================

use serde::{Deserialize, Serialize};

use super::adx::calculate_adx;
use super::atr::{calculate_atr, volatility_pct, RiskParams, ATR_PERIOD};
use super::ema::calculate_ema;
use super::keltner::calculate_keltner;
use super::macd::calculate_macd;
use super::rsi::{calculate_rsi, RSI_PERIOD};
use super::volume::{volume_sma, VOLUME_WINDOW};
use crate::error::EngineError;
use crate::market_data::Candle;

/// Bars required before any score is trusted.
pub const MIN_CANDLES: usize = 50;

pub const RIBBON_FAST: usize = 7;
pub const RIBBON_MID: usize = 25;
pub const RIBBON_SLOW: usize = 99;

/// One row of the indicator table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorBar {
    pub candle: Candle,

    // --- Trend ribbon -------------------------------------------------------
    pub ema_7: f64,
    pub ema_25: f64,
    pub ema_99: f64,

    // --- Momentum -----------------------------------------------------------
    pub macd_line: f64,
    pub macd_signal: f64,
    pub macd_hist: f64,

    // --- Volatility & risk --------------------------------------------------
    pub atr: Option<f64>,
    pub volatility_pct: Option<f64>,
    pub safe_leverage: Option<f64>,

    // --- Trend strength -----------------------------------------------------
    pub plus_di: Option<f64>,
    pub minus_di: Option<f64>,
    pub adx: Option<f64>,

    // --- Keltner channel ----------------------------------------------------
    pub kc_mid: f64,
    pub kc_upper: Option<f64>,
    pub kc_lower: Option<f64>,

    // --- Oscillator & volume ------------------------------------------------
    pub rsi: Option<f64>,
    pub volume_sma_20: Option<f64>,
}

/// Indicator table for one asset, oldest bar first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSeries {
    pub bars: Vec<IndicatorBar>,
}

impl IndicatorSeries {
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn last(&self) -> Option<&IndicatorBar> {
        self.bars.last()
    }

    /// The latest bar and the one before it.
    pub fn last_two(&self) -> Option<(&IndicatorBar, &IndicatorBar)> {
        match self.bars.as_slice() {
            [.., prev, curr] => Some((curr, prev)),
            _ => None,
        }
    }
}

/// Compute the indicator table with the default risk model.
pub fn compute_indicators(candles: &[Candle]) -> Result<IndicatorSeries, EngineError> {
    compute_indicators_with(candles, &RiskParams::default())
}

/// Compute the indicator table with an explicit risk model for the
/// safe-leverage column.
pub fn compute_indicators_with(
    candles: &[Candle],
    risk: &RiskParams,
) -> Result<IndicatorSeries, EngineError> {
    if candles.len() < MIN_CANDLES {
        return Err(EngineError::InsufficientHistory {
            have: candles.len(),
            need: MIN_CANDLES,
        });
    }
    validate(candles)?;

    let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();

    let ema_7 = calculate_ema(&closes, RIBBON_FAST);
    let ema_25 = calculate_ema(&closes, RIBBON_MID);
    let ema_99 = calculate_ema(&closes, RIBBON_SLOW);
    let macd = calculate_macd(&closes);

    let atr = calculate_atr(candles, ATR_PERIOD);
    let vol_pct = volatility_pct(candles, &atr);
    let adx = calculate_adx(candles, &atr);
    let kc = calculate_keltner(&closes, &atr);
    let rsi = calculate_rsi(&closes, RSI_PERIOD);
    let vol_sma = volume_sma(candles, VOLUME_WINDOW);

    let bars = candles
        .iter()
        .enumerate()
        .map(|(i, candle)| IndicatorBar {
            candle: *candle,
            ema_7: ema_7[i],
            ema_25: ema_25[i],
            ema_99: ema_99[i],
            macd_line: macd.line[i],
            macd_signal: macd.signal[i],
            macd_hist: macd.histogram[i],
            atr: atr[i],
            volatility_pct: vol_pct[i],
            safe_leverage: vol_pct[i].map(|v| risk.safe_leverage(v)),
            plus_di: adx.plus_di[i],
            minus_di: adx.minus_di[i],
            adx: adx.adx[i],
            kc_mid: kc.mid[i],
            kc_upper: kc.upper[i],
            kc_lower: kc.lower[i],
            rsi: rsi[i],
            volume_sma_20: vol_sma[i],
        })
        .collect();

    Ok(IndicatorSeries { bars })
}

/// Reject bars the indicators cannot digest.
fn validate(candles: &[Candle]) -> Result<(), EngineError> {
    for (index, c) in candles.iter().enumerate() {
        let prices = [c.open, c.high, c.low, c.close];
        if prices.iter().any(|p| !p.is_finite()) {
            return Err(EngineError::InvalidCandle {
                index,
                reason: "non-finite price",
            });
        }
        if prices.iter().any(|&p| p <= 0.0) {
            return Err(EngineError::InvalidCandle {
                index,
                reason: "non-positive price",
            });
        }
        if !c.volume.is_finite() || c.volume < 0.0 {
            return Err(EngineError::InvalidCandle {
                index,
                reason: "invalid volume",
            });
        }
        if index > 0 && c.timestamp <= candles[index - 1].timestamp {
            return Err(EngineError::InvalidCandle {
                index,
                reason: "timestamp not increasing",
            });
        }
    }
    Ok(())
}
