// =============================================================================
// Scan orchestration — one full dashboard + setup pass
// =============================================================================
//
// 1. Reference asset: fetch, compute indicators, build the dashboard.
// 2. Universe: fetch tickers, select gainers and losers.
// 3. Candidates: fetch all candle windows concurrently, compute indicators,
//    and run the setup scanner in candidate order.
//
// A failure on any single asset is logged and that asset is left out; the
// scan itself always produces a report.
// =============================================================================

use anyhow::Result;
use chrono::{DateTime, Utc};
use futures_util::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::EngineError;
use crate::exchange::CandleSource;
use crate::indicators::{compute_indicators_with, IndicatorSeries};
use crate::market_data::TickerSnapshot;
use crate::runtime_config::ScanConfig;
use crate::signals::{build_dashboard, scan_setups_with, select_candidates, Candidate};
use crate::signals::{DashboardResult, SetupRecord};

/// Everything one scan hands to the report layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    pub generated_at: DateTime<Utc>,
    pub reference_symbol: String,
    /// `None` when the reference asset could not be scored.
    pub dashboard: Option<DashboardResult>,
    pub setups: Vec<SetupRecord>,
}

/// Run a complete scan against `source`.
pub async fn run_scan<S: CandleSource>(source: &S, config: &ScanConfig) -> ScanReport {
    let dashboard = market_dashboard(source, config).await;

    let setups = match source.fetch_tickers().await {
        Ok(tickers) => scan_universe(source, config, &tickers).await,
        Err(e) => {
            warn!(error = %e, "ticker fetch failed, skipping setup scan");
            Vec::new()
        }
    };

    info!(
        reference = %config.reference_symbol,
        score = dashboard.as_ref().map(|d| d.score),
        setups = setups.len(),
        "scan complete"
    );

    ScanReport {
        generated_at: Utc::now(),
        reference_symbol: config.reference_symbol.clone(),
        dashboard,
        setups,
    }
}

/// Dashboard for the configured reference asset, if it can be scored.
pub async fn market_dashboard<S: CandleSource>(
    source: &S,
    config: &ScanConfig,
) -> Option<DashboardResult> {
    let symbol = &config.reference_symbol;
    let series = match load_series(source, symbol, config).await {
        Ok(series) => series,
        Err(e) => {
            log_skip(symbol, &e);
            return None;
        }
    };

    match build_dashboard(&series) {
        Ok(dashboard) => {
            debug!(
                symbol = %symbol,
                score = dashboard.score,
                light = %dashboard.signal_light,
                "dashboard built"
            );
            Some(dashboard)
        }
        Err(e) => {
            warn!(symbol = %symbol, error = %e, "dashboard unavailable");
            None
        }
    }
}

/// Select candidates from `tickers` and scan them for setups.
pub async fn scan_universe<S: CandleSource>(
    source: &S,
    config: &ScanConfig,
    tickers: &[TickerSnapshot],
) -> Vec<SetupRecord> {
    let selected = select_candidates(tickers, &config.universe_rules());

    let loads = selected
        .iter()
        .map(|t| load_series(source, &t.symbol, config));
    let results = join_all(loads).await;

    let candidates: Vec<Candidate> = selected
        .into_iter()
        .zip(results)
        .filter_map(|(ticker, result)| match result {
            Ok(series) => Some(Candidate {
                ticker: ticker.symbol,
                series,
                change_pct: ticker.change_pct,
                quote_volume: ticker.quote_volume,
            }),
            Err(e) => {
                log_skip(&ticker.symbol, &e);
                None
            }
        })
        .collect();

    scan_setups_with(&candidates, &config.setup_rules())
}

async fn load_series<S: CandleSource>(
    source: &S,
    symbol: &str,
    config: &ScanConfig,
) -> Result<IndicatorSeries> {
    let candles = source
        .fetch_candles(symbol, &config.bar, config.lookback)
        .await?;
    let series = compute_indicators_with(&candles, &config.risk_params())?;
    Ok(series)
}

/// Short history is routine; anything else deserves a warning.
fn log_skip(symbol: &str, e: &anyhow::Error) {
    match e.downcast_ref::<EngineError>() {
        Some(engine) if engine.is_insufficient_history() => {
            debug!(symbol, error = %engine, "asset skipped");
        }
        _ => warn!(symbol, error = %e, "asset skipped"),
    }
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use anyhow::{bail, Context};

    use super::*;
    use crate::market_data::Candle;
    use crate::signals::fixtures::candles_from;
    use crate::types::{Pattern, SignalLight};

    #[derive(Default)]
    struct FixedSource {
        candles: HashMap<String, Vec<Candle>>,
        tickers: Vec<TickerSnapshot>,
        tickers_down: bool,
    }

    impl FixedSource {
        fn with_candles(mut self, symbol: &str, candles: Vec<Candle>) -> Self {
            self.candles.insert(symbol.to_string(), candles);
            self
        }

        fn with_ticker(mut self, symbol: &str, change_pct: f64, quote_volume: f64) -> Self {
            self.tickers.push(TickerSnapshot {
                symbol: symbol.to_string(),
                last: 1.0,
                change_pct,
                quote_volume,
            });
            self
        }
    }

    impl CandleSource for FixedSource {
        async fn fetch_candles(&self, symbol: &str, _bar: &str, limit: usize) -> Result<Vec<Candle>> {
            let candles = self
                .candles
                .get(symbol)
                .with_context(|| format!("unknown symbol {symbol}"))?;
            let start = candles.len().saturating_sub(limit);
            Ok(candles[start..].to_vec())
        }

        async fn fetch_tickers(&self) -> Result<Vec<TickerSnapshot>> {
            if self.tickers_down {
                bail!("tickers endpoint unavailable");
            }
            Ok(self.tickers.clone())
        }
    }

    fn rising() -> Vec<Candle> {
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + 60.0 * i as f64 / 59.0).collect();
        candles_from(&closes, &[1000.0; 60], 1.0)
    }

    fn flat() -> Vec<Candle> {
        candles_from(&[100.0; 60], &[1000.0; 60], 1.0)
    }

    fn reversal() -> Vec<Candle> {
        let mut closes = vec![100.0; 40];
        closes.extend(std::iter::repeat(95.0).take(19));
        closes.push(99.0);
        let mut volumes = vec![1000.0; 59];
        volumes.push(3000.0);
        candles_from(&closes, &volumes, 0.5)
    }

    const LIQUID: f64 = 50_000_000.0;

    fn market() -> FixedSource {
        FixedSource::default()
            .with_candles("BTC-USDT", rising())
            .with_candles("UP-USDT", rising())
            .with_candles("REV-USDT", reversal())
            .with_candles("FLAT-USDT", flat())
            .with_candles("SHORT-USDT", rising()[..30].to_vec())
            .with_candles("THIN-USDT", rising())
            .with_ticker("UP-USDT", 5.0, LIQUID)
            .with_ticker("REV-USDT", 3.0, LIQUID)
            .with_ticker("FLAT-USDT", 1.0, LIQUID)
            .with_ticker("SHORT-USDT", 20.0, LIQUID)
            .with_ticker("GONE-USDT", 15.0, LIQUID)
            .with_ticker("THIN-USDT", 40.0, 1_000.0)
    }

    #[tokio::test]
    async fn full_scan() {
        let report = run_scan(&market(), &ScanConfig::default()).await;

        assert_eq!(report.reference_symbol, "BTC-USDT");
        let dashboard = report.dashboard.expect("reference asset should score");
        assert_eq!(dashboard.signal_light, SignalLight::StrongBullish);

        let found: Vec<(&str, Pattern)> = report
            .setups
            .iter()
            .map(|s| (s.ticker.as_str(), s.pattern))
            .collect();
        assert_eq!(
            found,
            [("UP-USDT", Pattern::SuperTrend), ("REV-USDT", Pattern::Reversal)]
        );
    }

    #[tokio::test]
    async fn missing_reference_still_scans_universe() {
        let config = ScanConfig {
            reference_symbol: "NOPE-USDT".to_string(),
            ..ScanConfig::default()
        };
        let report = run_scan(&market(), &config).await;
        assert!(report.dashboard.is_none());
        assert_eq!(report.setups.len(), 2);
    }

    #[tokio::test]
    async fn ticker_outage_keeps_dashboard() {
        let mut source = market();
        source.tickers_down = true;
        let report = run_scan(&source, &ScanConfig::default()).await;
        assert!(report.dashboard.is_some());
        assert!(report.setups.is_empty());
    }

    #[tokio::test]
    async fn short_reference_history_has_no_dashboard() {
        let source = FixedSource::default().with_candles("BTC-USDT", flat()[..49].to_vec());
        assert!(market_dashboard(&source, &ScanConfig::default()).await.is_none());
    }

    #[tokio::test]
    async fn lookback_limits_the_window() {
        let source = FixedSource::default().with_candles("BTC-USDT", rising());
        let config = ScanConfig {
            lookback: 40,
            ..ScanConfig::default()
        };
        // 40 bars is below the minimum window.
        assert!(market_dashboard(&source, &config).await.is_none());
    }

    #[tokio::test]
    async fn report_serialises() {
        let report = run_scan(&market(), &ScanConfig::default()).await;
        let v = serde_json::to_value(&report).unwrap();
        assert!(v["generated_at"].is_string());
        assert_eq!(v["dashboard"]["signal_light"], "strong bullish");
        assert_eq!(v["setups"][1]["pattern"], "reversal");
    }
}
