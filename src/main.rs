// =============================================================================
// Market Pulse — Main Entry Point
// =============================================================================
//
// Runs a single scan: score the reference asset, scan the liquid universe for
// setups, print the result as JSON and write the dated report files.
// =============================================================================

use std::time::Duration;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use market_pulse::exchange::OkxClient;
use market_pulse::report::{quant_log, write_report};
use market_pulse::runtime_config::ScanConfig;
use market_pulse::scan::run_scan;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config_path =
        std::env::var("PULSE_CONFIG").unwrap_or_else(|_| "pulse_config.json".into());
    let mut config = ScanConfig::load(&config_path).unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        ScanConfig::default()
    });

    if let Ok(symbol) = std::env::var("PULSE_REFERENCE_SYMBOL") {
        let symbol = symbol.trim().to_uppercase();
        if !symbol.is_empty() {
            config.reference_symbol = symbol;
        }
    }

    info!(
        reference = %config.reference_symbol,
        bar = %config.bar,
        lookback = config.lookback,
        "Market scan starting"
    );

    // ── 2. Scan ──────────────────────────────────────────────────────────
    let client = OkxClient::new(
        config.okx_base_url.clone(),
        Duration::from_secs(config.request_timeout_secs),
    )?;
    let report = run_scan(&client, &config).await;

    // ── 3. Output ────────────────────────────────────────────────────────
    let json = serde_json::to_string_pretty(&report).context("failed to serialise report")?;
    println!("{json}");
    println!("{}", quant_log(&report));

    let path = write_report(&report, &config.report_dir)?;
    info!(path = %path.display(), "Market scan finished");
    Ok(())
}
