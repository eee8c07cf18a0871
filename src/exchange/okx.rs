// =============================================================================
// OKX public REST client — candles and spot tickers
// =============================================================================
//
// Only unauthenticated market endpoints are used, so there is no signing.
//
//   GET /api/v5/market/candles?instId=..&bar=..&limit=..
//       data: [[ts, o, h, l, c, vol, volCcy, volCcyQuote, confirm], ...]
//       newest row first; every field is a string.
//
//   GET /api/v5/market/tickers?instType=SPOT
//       data: [{ instId, last, open24h, volCcy24h, ... }, ...]
//
// A non-"0" `code` in the envelope is an error even on HTTP 200.
// =============================================================================

use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde_json::Value;
use tracing::{debug, instrument};

use super::CandleSource;
use crate::market_data::{Candle, TickerSnapshot};

/// OKX REST client for public market data.
#[derive(Clone)]
pub struct OkxClient {
    base_url: String,
    client: reqwest::Client,
}

impl OkxClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build reqwest client")?;

        let base_url = base_url.into().trim_end_matches('/').to_string();
        debug!(base_url = %base_url, "OkxClient initialised");

        Ok(Self { base_url, client })
    }

    async fn get_json(&self, path: &str, query: &[(&str, String)]) -> Result<Value> {
        let url = format!("{}{}", self.base_url, path);

        let resp = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .with_context(|| format!("GET {path} request failed"))?;

        let status = resp.status();
        let body: Value = resp
            .json()
            .await
            .with_context(|| format!("failed to parse {path} response"))?;

        if !status.is_success() {
            bail!("OKX GET {path} returned {status}: {body}");
        }

        Ok(body)
    }
}

impl CandleSource for OkxClient {
    #[instrument(skip(self), name = "okx::fetch_candles")]
    async fn fetch_candles(&self, symbol: &str, bar: &str, limit: usize) -> Result<Vec<Candle>> {
        let body = self
            .get_json(
                "/api/v5/market/candles",
                &[
                    ("instId", symbol.to_string()),
                    ("bar", bar.to_string()),
                    ("limit", limit.to_string()),
                ],
            )
            .await?;

        let candles = parse_candles(&body).with_context(|| format!("bad candles for {symbol}"))?;
        debug!(symbol, count = candles.len(), "candles fetched");
        Ok(candles)
    }

    #[instrument(skip(self), name = "okx::fetch_tickers")]
    async fn fetch_tickers(&self) -> Result<Vec<TickerSnapshot>> {
        let body = self
            .get_json("/api/v5/market/tickers", &[("instType", "SPOT".to_string())])
            .await?;

        let tickers = parse_tickers(&body)?;
        debug!(count = tickers.len(), "tickers fetched");
        Ok(tickers)
    }
}

// =============================================================================
// Response parsing
// =============================================================================

fn check_envelope(body: &Value) -> Result<&Vec<Value>> {
    let code = body["code"].as_str().context("missing field code")?;
    if code != "0" {
        bail!(
            "OKX error code {code}: {}",
            body["msg"].as_str().unwrap_or_default()
        );
    }
    body["data"].as_array().context("missing field data")
}

/// Parse a candles response into oldest-first candles.
pub fn parse_candles(body: &Value) -> Result<Vec<Candle>> {
    let rows = check_envelope(body)?;

    let mut candles = rows
        .iter()
        .enumerate()
        .map(|(i, row)| parse_candle_row(row).with_context(|| format!("bad candle row {i}")))
        .collect::<Result<Vec<_>>>()?;

    candles.reverse();
    Ok(candles)
}

fn parse_candle_row(row: &Value) -> Result<Candle> {
    let timestamp = row[0]
        .as_str()
        .context("missing field ts")?
        .parse::<i64>()
        .context("field ts is not an integer")?;

    Ok(Candle {
        timestamp,
        open: parse_string_f64(&row[1], "o")?,
        high: parse_string_f64(&row[2], "h")?,
        low: parse_string_f64(&row[3], "l")?,
        close: parse_string_f64(&row[4], "c")?,
        volume: parse_string_f64(&row[5], "vol")?,
    })
}

/// Parse a tickers response. Entries with unusable numbers are dropped.
pub fn parse_tickers(body: &Value) -> Result<Vec<TickerSnapshot>> {
    let rows = check_envelope(body)?;

    let tickers = rows
        .iter()
        .filter_map(|row| match parse_ticker(row) {
            Ok(t) => Some(t),
            Err(e) => {
                debug!(inst = %row["instId"], error = %e, "ticker skipped");
                None
            }
        })
        .collect();

    Ok(tickers)
}

fn parse_ticker(row: &Value) -> Result<TickerSnapshot> {
    let symbol = row["instId"]
        .as_str()
        .context("missing field instId")?
        .to_string();
    let last = parse_string_f64(&row["last"], "last")?;
    let open = parse_string_f64(&row["open24h"], "open24h")?;
    let quote_volume = parse_string_f64(&row["volCcy24h"], "volCcy24h")?;

    let change_pct = if open > 0.0 {
        (last - open) / open * 100.0
    } else {
        0.0
    };

    Ok(TickerSnapshot {
        symbol,
        last,
        change_pct,
        quote_volume,
    })
}

/// OKX encodes every number as a JSON string.
fn parse_string_f64(val: &Value, field: &str) -> Result<f64> {
    val.as_str()
        .with_context(|| format!("missing field {field}"))?
        .parse::<f64>()
        .with_context(|| format!("field {field} is not a number"))
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn candles_are_reversed_to_oldest_first() {
        let body = json!({
            "code": "0",
            "msg": "",
            "data": [
                ["1700172800000", "36500.1", "37000", "36000", "36800.5", "1200.5", "0", "0", "0"],
                ["1700086400000", "36000", "36600", "35800", "36500.1", "980.25", "0", "0", "1"]
            ]
        });
        let candles = parse_candles(&body).unwrap();
        assert_eq!(candles.len(), 2);
        assert_eq!(candles[0].timestamp, 1_700_086_400_000);
        assert_eq!(candles[1].timestamp, 1_700_172_800_000);
        assert!((candles[0].close - 36500.1).abs() < 1e-9);
        assert!((candles[1].volume - 1200.5).abs() < 1e-9);
        assert!((candles[1].high - 37000.0).abs() < 1e-9);
    }

    #[test]
    fn error_code_is_rejected() {
        let body = json!({ "code": "51001", "msg": "Instrument ID does not exist", "data": [] });
        let err = parse_candles(&body).unwrap_err();
        assert!(err.to_string().contains("51001"));
    }

    #[test]
    fn malformed_candle_row_fails() {
        let body = json!({ "code": "0", "msg": "", "data": [["1700086400000", "abc", "1", "1", "1", "1"]] });
        assert!(parse_candles(&body).is_err());
    }

    #[test]
    fn tickers_compute_change_and_skip_bad_rows() {
        let body = json!({
            "code": "0",
            "msg": "",
            "data": [
                { "instType": "SPOT", "instId": "BTC-USDT", "last": "110", "open24h": "100",
                  "volCcy24h": "2500000000", "vol24h": "25000" },
                { "instType": "SPOT", "instId": "NEW-USDT", "last": "1", "open24h": "",
                  "volCcy24h": "10", "vol24h": "10" },
                { "instType": "SPOT", "instId": "ZERO-USDT", "last": "1", "open24h": "0",
                  "volCcy24h": "10", "vol24h": "10" }
            ]
        });
        let tickers = parse_tickers(&body).unwrap();
        assert_eq!(tickers.len(), 2);
        assert_eq!(tickers[0].symbol, "BTC-USDT");
        assert!((tickers[0].change_pct - 10.0).abs() < 1e-9);
        assert!((tickers[0].quote_volume - 2.5e9).abs() < 1e-3);
        assert_eq!(tickers[1].change_pct, 0.0);
    }

    #[test]
    fn client_trims_trailing_slash() {
        let client = OkxClient::new("https://www.okx.com/", Duration::from_secs(5)).unwrap();
        assert_eq!(client.base_url, "https://www.okx.com");
    }
}
