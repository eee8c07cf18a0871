// =============================================================================
// Setup Scanner — per-asset pattern detection and risk sizing
// =============================================================================
//
// Pattern precedence (first match wins):
//
//   1. BULL FLAG    close > EMA99 AND close > EMA25 AND 40 < RSI < 60
//   2. REVERSAL     prev close < prev EMA99 AND close > EMA99
//                   AND volume > 1.5 * prev volume
//   3. SUPER TREND  close > Keltner upper band
//
// A candidate is reported when it matched a pattern or moved more than
// `big_move_pct` on the day. Output keeps candidate order and is truncated,
// never re-sorted.
// =============================================================================

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::round_to;
use crate::indicators::volume::volume_spike;
use crate::indicators::{IndicatorBar, IndicatorSeries, RiskParams};
use crate::types::Pattern;

/// Maximum records a scan returns.
pub const MAX_SETUPS: usize = 4;

const BULL_FLAG_RSI_LOW: f64 = 40.0;
const BULL_FLAG_RSI_HIGH: f64 = 60.0;
const REVERSAL_VOLUME_MULTIPLE: f64 = 1.5;

/// One asset offered to the scanner, already enriched with indicators.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub ticker: String,
    pub series: IndicatorSeries,
    /// Signed 24h change in percent.
    pub change_pct: f64,
    /// 24h quote-currency volume; carried for scan diagnostics.
    pub quote_volume: f64,
}

/// Thresholds governing inclusion and truncation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SetupRules {
    pub max_setups: usize,
    /// Absolute day change (percent) that qualifies without a pattern.
    pub big_move_pct: f64,
    /// Stop distance in ATRs for `atr_stop`.
    pub stop_multiple: f64,
}

impl Default for SetupRules {
    fn default() -> Self {
        Self {
            max_setups: MAX_SETUPS,
            big_move_pct: 8.0,
            stop_multiple: RiskParams::default().stop_multiple,
        }
    }
}

/// A qualifying candidate, ready for the report layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetupRecord {
    pub ticker: String,
    pub price: f64,
    pub percent_change: f64,
    pub pattern: Pattern,
    pub rsi: f64,
    pub adx: f64,
    /// Distance of close above EMA25, in percent.
    pub dist_to_ema25: f64,
    /// Current volume over its 20-bar mean.
    pub vol_spike: f64,
    /// Stop distance in price units.
    pub atr_stop: f64,
    pub max_leverage: f64,
    pub support_level: f64,
    pub is_bullish_trend: bool,
}

/// Classify the latest bar against the previous one.
pub fn detect_pattern(curr: &IndicatorBar, prev: &IndicatorBar) -> Pattern {
    let close = curr.candle.close;

    let rsi_mid_band = curr
        .rsi
        .is_some_and(|r| r > BULL_FLAG_RSI_LOW && r < BULL_FLAG_RSI_HIGH);
    if close > curr.ema_99 && close > curr.ema_25 && rsi_mid_band {
        return Pattern::BullFlag;
    }

    if prev.candle.close < prev.ema_99
        && close > curr.ema_99
        && curr.candle.volume > prev.candle.volume * REVERSAL_VOLUME_MULTIPLE
    {
        return Pattern::Reversal;
    }

    if curr.kc_upper.is_some_and(|upper| close > upper) {
        return Pattern::SuperTrend;
    }

    Pattern::NoPattern
}

/// Scan with the default rules.
pub fn scan_setups(universe: &[Candidate]) -> Vec<SetupRecord> {
    scan_setups_with(universe, &SetupRules::default())
}

/// Evaluate every candidate in order and keep at most `rules.max_setups`.
///
/// Candidates without enough history are skipped, not reported as errors.
pub fn scan_setups_with(universe: &[Candidate], rules: &SetupRules) -> Vec<SetupRecord> {
    universe
        .iter()
        .filter_map(|c| evaluate_candidate(c, rules))
        .take(rules.max_setups)
        .collect()
}

fn evaluate_candidate(candidate: &Candidate, rules: &SetupRules) -> Option<SetupRecord> {
    let Some((curr, prev)) = candidate.series.last_two() else {
        debug!(ticker = %candidate.ticker, bars = candidate.series.len(), "setup skipped: no history");
        return None;
    };

    let (Some(rsi), Some(adx), Some(atr), Some(leverage), Some(vol_mean)) = (
        curr.rsi,
        curr.adx,
        curr.atr,
        curr.safe_leverage,
        curr.volume_sma_20,
    ) else {
        debug!(ticker = %candidate.ticker, "setup skipped: indicator windows not filled");
        return None;
    };

    let pattern = detect_pattern(curr, prev);
    if !pattern.is_match() && candidate.change_pct.abs() <= rules.big_move_pct {
        debug!(
            ticker = %candidate.ticker,
            change_pct = candidate.change_pct,
            quote_volume = candidate.quote_volume,
            "setup skipped: no pattern, small move"
        );
        return None;
    }

    debug!(
        ticker = %candidate.ticker,
        pattern = %pattern,
        change_pct = candidate.change_pct,
        quote_volume = candidate.quote_volume,
        "setup kept"
    );

    let close = curr.candle.close;
    let dist_to_ema25 = if curr.ema_25 != 0.0 {
        (close - curr.ema_25) / curr.ema_25 * 100.0
    } else {
        0.0
    };

    Some(SetupRecord {
        ticker: candidate.ticker.clone(),
        price: close,
        percent_change: round_to(candidate.change_pct, 2),
        pattern,
        rsi: round_to(rsi, 1),
        adx: round_to(adx, 1),
        dist_to_ema25: round_to(dist_to_ema25, 2),
        vol_spike: round_to(volume_spike(curr.candle.volume, vol_mean), 1),
        atr_stop: round_to(atr * rules.stop_multiple, 4),
        max_leverage: round_to(leverage, 1),
        support_level: round_to(curr.ema_25, 4),
        is_bullish_trend: close > curr.ema_99,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::signals::fixtures::{bar, reversal_series, rising_series, series_from};

    fn candidate(ticker: &str, series: IndicatorSeries, change_pct: f64) -> Candidate {
        Candidate {
            ticker: ticker.to_string(),
            series,
            change_pct,
            quote_volume: 50_000_000.0,
        }
    }

    fn flat_series() -> IndicatorSeries {
        series_from(&[100.0; 60], &[1000.0; 60], 1.0)
    }

    /// Latest bar satisfies both the bull-flag and super-trend rules.
    fn flag_and_breakout() -> IndicatorSeries {
        let mut curr = bar(110.0, 1000.0);
        curr.ema_25 = 100.0;
        curr.ema_99 = 90.0;
        curr.rsi = Some(50.0);
        curr.kc_upper = Some(105.0);
        IndicatorSeries {
            bars: vec![bar(100.0, 1000.0), curr],
        }
    }

    #[test]
    fn bull_flag_wins_over_super_trend() {
        let series = flag_and_breakout();
        let (curr, prev) = series.last_two().unwrap();
        assert!(curr.candle.close > curr.kc_upper.unwrap());
        assert_eq!(detect_pattern(curr, prev), Pattern::BullFlag);
    }

    #[test]
    fn bull_flag_needs_mid_band_rsi() {
        let mut series = flag_and_breakout();
        series.bars[1].rsi = Some(60.0);
        let (curr, prev) = series.last_two().unwrap();
        assert_eq!(detect_pattern(curr, prev), Pattern::SuperTrend);

        series.bars[1].rsi = None;
        let (curr, prev) = series.last_two().unwrap();
        assert_eq!(detect_pattern(curr, prev), Pattern::SuperTrend);
    }

    #[test]
    fn reversal_scenario() {
        let series = reversal_series();
        let (curr, prev) = series.last_two().unwrap();
        assert!(prev.candle.close < prev.ema_99);
        assert!(curr.candle.close > curr.ema_99);
        // Also above the Keltner band, but reversal takes precedence.
        assert!(curr.candle.close > curr.kc_upper.unwrap());
        assert_eq!(detect_pattern(curr, prev), Pattern::Reversal);

        let setups = scan_setups(&[candidate("REV-USDT", series, 4.2)]);
        assert_eq!(setups.len(), 1);
        assert_eq!(setups[0].pattern, Pattern::Reversal);
        assert!(setups[0].is_bullish_trend);
        assert!(setups[0].vol_spike > 2.5);
    }

    #[test]
    fn reversal_needs_volume_surge() {
        let mut prev = bar(95.0, 1000.0);
        prev.ema_99 = 98.0;
        let mut curr = bar(99.0, 1500.0);
        curr.ema_25 = 99.5;
        curr.ema_99 = 98.0;
        curr.kc_upper = Some(120.0);
        assert_eq!(detect_pattern(&curr, &prev), Pattern::NoPattern);

        curr.candle.volume = 1501.0;
        assert_eq!(detect_pattern(&curr, &prev), Pattern::Reversal);
    }

    #[test]
    fn rising_market_reads_as_super_trend() {
        let setups = scan_setups(&[candidate("UP-USDT", rising_series(), 3.0)]);
        assert_eq!(setups.len(), 1);
        assert_eq!(setups[0].pattern, Pattern::SuperTrend);
    }

    #[test]
    fn zero_range_flat_market_has_no_pattern() {
        for price in [3.7, 50.0, 99.99, 123.45] {
            let series = series_from(&[price; 60], &[1000.0; 60], 0.0);
            let (curr, prev) = series.last_two().unwrap();
            assert_eq!(curr.kc_upper, Some(price));
            assert_eq!(detect_pattern(curr, prev), Pattern::NoPattern, "price {price}");
            assert_eq!(curr.safe_leverage, Some(20.0));
            assert!(scan_setups(&[candidate("DEAD-USDT", series, 1.0)]).is_empty());
        }
    }

    #[test]
    fn quiet_asset_without_pattern_is_dropped() {
        assert!(scan_setups(&[candidate("FLAT-USDT", flat_series(), 2.0)]).is_empty());
        assert!(scan_setups(&[candidate("FLAT-USDT", flat_series(), 8.0)]).is_empty());
    }

    #[test]
    fn big_movers_kept_without_pattern() {
        let setups = scan_setups(&[
            candidate("PUMP-USDT", flat_series(), 12.5),
            candidate("DUMP-USDT", flat_series(), -9.1),
        ]);
        assert_eq!(setups.len(), 2);
        assert_eq!(setups[0].pattern, Pattern::NoPattern);
        assert_eq!(setups[0].percent_change, 12.5);
        assert_eq!(setups[1].ticker, "DUMP-USDT");
        assert_eq!(setups[1].percent_change, -9.1);
    }

    #[test]
    fn never_more_than_four_and_order_kept() {
        let universe: Vec<Candidate> = (0..10)
            .map(|i| candidate(&format!("T{i}-USDT"), flat_series(), 20.0 - i as f64))
            .collect();
        let setups = scan_setups(&universe);
        assert_eq!(setups.len(), 4);
        let tickers: Vec<&str> = setups.iter().map(|s| s.ticker.as_str()).collect();
        assert_eq!(tickers, ["T0-USDT", "T1-USDT", "T2-USDT", "T3-USDT"]);
    }

    #[test]
    fn fewer_qualifiers_returned_in_full() {
        let universe = vec![
            candidate("A-USDT", flat_series(), 1.0),
            candidate("B-USDT", flat_series(), 15.0),
            candidate("C-USDT", flat_series(), -0.5),
        ];
        let setups = scan_setups(&universe);
        assert_eq!(setups.len(), 1);
        assert_eq!(setups[0].ticker, "B-USDT");
    }

    #[test]
    fn thin_history_is_skipped() {
        let mut unfilled = flag_and_breakout();
        unfilled.bars[1].volume_sma_20 = None;
        let universe = vec![
            candidate("EMPTY-USDT", IndicatorSeries::default(), 30.0),
            candidate("THIN-USDT", unfilled, 30.0),
            candidate("OK-USDT", flag_and_breakout(), 0.0),
        ];
        let setups = scan_setups(&universe);
        assert_eq!(setups.len(), 1);
        assert_eq!(setups[0].ticker, "OK-USDT");
    }

    #[test]
    fn record_fields() {
        let mut series = flag_and_breakout();
        {
            let curr = &mut series.bars[1];
            curr.candle.volume = 3000.0;
            curr.volume_sma_20 = Some(1000.0);
            curr.atr = Some(2.5);
            curr.safe_leverage = Some(4.444);
            curr.adx = Some(31.27);
        }
        let setups = scan_setups(&[candidate("ETH-USDT", series, 3.14159)]);
        let s = &setups[0];
        assert_eq!(s.ticker, "ETH-USDT");
        assert_eq!(s.price, 110.0);
        assert_eq!(s.percent_change, 3.14);
        assert_eq!(s.pattern, Pattern::BullFlag);
        assert_eq!(s.rsi, 50.0);
        assert_eq!(s.adx, 31.3);
        assert_eq!(s.dist_to_ema25, 10.0);
        assert_eq!(s.vol_spike, 3.0);
        assert_eq!(s.atr_stop, 5.0);
        assert_eq!(s.max_leverage, 4.4);
        assert_eq!(s.support_level, 100.0);
        assert!(s.is_bullish_trend);
    }

    #[test]
    fn custom_rules() {
        let rules = SetupRules {
            max_setups: 1,
            big_move_pct: 1.0,
            stop_multiple: 3.0,
        };
        let universe = vec![
            candidate("A-USDT", flat_series(), 1.5),
            candidate("B-USDT", flat_series(), 2.0),
        ];
        let setups = scan_setups_with(&universe, &rules);
        assert_eq!(setups.len(), 1);
        assert_eq!(setups[0].ticker, "A-USDT");
        let atr = flat_series().last().unwrap().atr.unwrap();
        assert!((setups[0].atr_stop - round_to(atr * 3.0, 4)).abs() < 1e-12);
    }

    #[test]
    fn serialises_with_primitive_fields() {
        let setups = scan_setups(&[candidate("SOL-USDT", flag_and_breakout(), 1.0)]);
        let v = serde_json::to_value(&setups[0]).unwrap();
        assert_eq!(v["pattern"], "bull flag");
        assert!(v["is_bullish_trend"].is_boolean());
        assert!(v["vol_spike"].is_f64());
        assert!(v["atr_stop"].is_f64());
        assert!(v["ticker"].is_string());
    }
}
