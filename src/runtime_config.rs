// =============================================================================
// Runtime Configuration — scan tunables with atomic save
// =============================================================================
//
// Every threshold the scanner uses lives here. All fields carry
// `#[serde(default)]` so that adding new fields never breaks loading an older
// config file.
//
// Persistence uses an atomic tmp + rename pattern to prevent corruption on
// crash.
// =============================================================================

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::indicators::RiskParams;
use crate::signals::setups::SetupRules;
use crate::signals::universe::UniverseRules;

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_reference_symbol() -> String {
    "BTC-USDT".to_string()
}

fn default_quote_currency() -> String {
    "USDT".to_string()
}

fn default_bar() -> String {
    "1D".to_string()
}

fn default_lookback() -> usize {
    100
}

fn default_min_quote_volume() -> f64 {
    15_000_000.0
}

fn default_top_gainers() -> usize {
    6
}

fn default_top_losers() -> usize {
    4
}

fn default_max_setups() -> usize {
    4
}

fn default_big_move_pct() -> f64 {
    8.0
}

fn default_risk_budget() -> f64 {
    0.02
}

fn default_stop_atr_multiple() -> f64 {
    2.0
}

fn default_max_leverage() -> f64 {
    20.0
}

fn default_okx_base_url() -> String {
    "https://www.okx.com".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_report_dir() -> String {
    "reports".to_string()
}

// =============================================================================
// ScanConfig
// =============================================================================

/// Top-level configuration for one scan run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    // --- Market data --------------------------------------------------------

    /// Asset scored on the dashboard.
    #[serde(default = "default_reference_symbol")]
    pub reference_symbol: String,

    /// Only pairs quoted in this currency enter the universe.
    #[serde(default = "default_quote_currency")]
    pub quote_currency: String,

    /// Candle resolution requested from the exchange.
    #[serde(default = "default_bar")]
    pub bar: String,

    /// Candles requested per asset.
    #[serde(default = "default_lookback")]
    pub lookback: usize,

    // --- Universe -----------------------------------------------------------

    /// Liquidity floor on 24h quote volume.
    #[serde(default = "default_min_quote_volume")]
    pub min_quote_volume: f64,

    #[serde(default = "default_top_gainers")]
    pub top_gainers: usize,

    #[serde(default = "default_top_losers")]
    pub top_losers: usize,

    // --- Setup scan ---------------------------------------------------------

    #[serde(default = "default_max_setups")]
    pub max_setups: usize,

    /// Day change (absolute percent) that qualifies a candidate on its own.
    #[serde(default = "default_big_move_pct")]
    pub big_move_pct: f64,

    // --- Risk model ---------------------------------------------------------

    /// Fraction of the account a stop-out may cost (0.02 = 2 %).
    #[serde(default = "default_risk_budget")]
    pub risk_budget: f64,

    /// Stop distance in ATRs.
    #[serde(default = "default_stop_atr_multiple")]
    pub stop_atr_multiple: f64,

    /// Cap on reported leverage.
    #[serde(default = "default_max_leverage")]
    pub max_leverage: f64,

    // --- I/O ----------------------------------------------------------------

    #[serde(default = "default_okx_base_url")]
    pub okx_base_url: String,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Directory that receives the written reports.
    #[serde(default = "default_report_dir")]
    pub report_dir: String,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            reference_symbol: default_reference_symbol(),
            quote_currency: default_quote_currency(),
            bar: default_bar(),
            lookback: default_lookback(),
            min_quote_volume: default_min_quote_volume(),
            top_gainers: default_top_gainers(),
            top_losers: default_top_losers(),
            max_setups: default_max_setups(),
            big_move_pct: default_big_move_pct(),
            risk_budget: default_risk_budget(),
            stop_atr_multiple: default_stop_atr_multiple(),
            max_leverage: default_max_leverage(),
            okx_base_url: default_okx_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
            report_dir: default_report_dir(),
        }
    }
}

impl ScanConfig {
    /// Load configuration from a JSON file at `path`.
    ///
    /// If the file does not exist, returns an error so the caller can fall
    /// back to defaults with a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read scan config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse scan config from {}", path.display()))?;

        info!(
            path = %path.display(),
            reference = %config.reference_symbol,
            lookback = config.lookback,
            "scan config loaded"
        );

        Ok(config)
    }

    /// Persist the configuration to `path` using an atomic write
    /// (write to `.tmp`, then rename).
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        let content = serde_json::to_string_pretty(self)
            .context("failed to serialise scan config to JSON")?;

        let tmp_path = path.with_extension("json.tmp");

        std::fs::write(&tmp_path, &content)
            .with_context(|| format!("failed to write tmp config to {}", tmp_path.display()))?;

        std::fs::rename(&tmp_path, path)
            .with_context(|| format!("failed to rename tmp config to {}", path.display()))?;

        info!(path = %path.display(), "scan config saved (atomic)");
        Ok(())
    }

    pub fn risk_params(&self) -> RiskParams {
        RiskParams {
            risk_budget: self.risk_budget,
            stop_multiple: self.stop_atr_multiple,
            max_leverage: self.max_leverage,
        }
    }

    pub fn setup_rules(&self) -> SetupRules {
        SetupRules {
            max_setups: self.max_setups,
            big_move_pct: self.big_move_pct,
            stop_multiple: self.stop_atr_multiple,
        }
    }

    pub fn universe_rules(&self) -> UniverseRules {
        UniverseRules {
            quote_suffix: format!("-{}", self.quote_currency),
            min_quote_volume: self.min_quote_volume,
            top_gainers: self.top_gainers,
            top_losers: self.top_losers,
        }
    }
}
