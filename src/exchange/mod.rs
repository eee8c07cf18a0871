// =============================================================================
// Market data sources
// =============================================================================
//
// The engine never fetches anything itself. A `CandleSource` hands it candle
// windows and ticker snapshots; `okx` talks to the public OKX REST API and
// tests plug in fixed data.

pub mod okx;

use std::future::Future;

use anyhow::Result;

use crate::market_data::{Candle, TickerSnapshot};

pub use okx::OkxClient;

/// Supplier of candle history and the tradable universe.
pub trait CandleSource {
    /// Up to `limit` candles of resolution `bar` for `symbol`, oldest first.
    fn fetch_candles(
        &self,
        symbol: &str,
        bar: &str,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<Candle>>> + Send;

    /// Latest 24h snapshot for every listed symbol.
    fn fetch_tickers(&self) -> impl Future<Output = Result<Vec<TickerSnapshot>>> + Send;
}
