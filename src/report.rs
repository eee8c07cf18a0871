// =============================================================================
// Report output
// =============================================================================
//
// Writes a scan as pretty JSON plus a short plain-text quant log, both named
// after the scan date. Files are written atomically (tmp + rename).

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

use crate::scan::ScanReport;

/// One-screen summary: the dashboard score and one line per setup.
pub fn quant_log(report: &ScanReport) -> String {
    let mut out = String::from("### QUANT DATA LOG\n");
    let _ = writeln!(out, "Reference: {}", report.reference_symbol);

    match &report.dashboard {
        Some(d) => {
            let _ = writeln!(out, "Score: {} ({})", d.score, d.signal_light);
            let _ = writeln!(out, "Ribbon: {}", d.ema_structure);
            let _ = writeln!(out, "MACD: {}", d.macd_status);
        }
        None => out.push_str("Score: n/a\n"),
    }

    for s in &report.setups {
        let _ = writeln!(out, "- {}: {} (MaxLev: {}x)", s.ticker, s.pattern, s.max_leverage);
    }
    out
}

/// Write `<dir>/<date>_scan.json` and `<dir>/<date>_quant_log.md`.
///
/// Returns the path of the JSON file.
pub fn write_report(report: &ScanReport, dir: impl AsRef<Path>) -> Result<PathBuf> {
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create report dir {}", dir.display()))?;

    let date = report.generated_at.format("%Y-%m-%d");

    let json_path = dir.join(format!("{date}_scan.json"));
    let json = serde_json::to_string_pretty(report).context("failed to serialise scan report")?;
    write_atomic(&json_path, &json)?;

    let log_path = dir.join(format!("{date}_quant_log.md"));
    write_atomic(&log_path, &quant_log(report))?;

    info!(path = %json_path.display(), setups = report.setups.len(), "report written");
    Ok(json_path)
}

fn write_atomic(path: &Path, content: &str) -> Result<()> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp_path = PathBuf::from(tmp);

    std::fs::write(&tmp_path, content)
        .with_context(|| format!("failed to write {}", tmp_path.display()))?;
    std::fs::rename(&tmp_path, path)
        .with_context(|| format!("failed to rename tmp file to {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::signals::{DashboardResult, SetupRecord};
    use crate::types::{EmaStructure, MacdStatus, Pattern, SignalLight};

    fn sample() -> ScanReport {
        ScanReport {
            generated_at: Utc.with_ymd_and_hms(2026, 3, 14, 8, 0, 0).unwrap(),
            reference_symbol: "BTC-USDT".to_string(),
            dashboard: Some(DashboardResult {
                price: 64_000.0,
                score: 80,
                signal_light: SignalLight::StrongBullish,
                ema_structure: EmaStructure::BullishAlignment,
                macd_status: MacdStatus::BullishDecelerating,
                adx: 31.2,
                rsi: 58.4,
                safe_leverage: 3.1,
            }),
            setups: vec![SetupRecord {
                ticker: "SOL-USDT".to_string(),
                price: 142.5,
                percent_change: 9.12,
                pattern: Pattern::BullFlag,
                rsi: 55.0,
                adx: 27.3,
                dist_to_ema25: 4.1,
                vol_spike: 1.8,
                atr_stop: 11.25,
                max_leverage: 2.5,
                support_level: 136.9,
                is_bullish_trend: true,
            }],
        }
    }

    #[test]
    fn quant_log_lines() {
        let log = quant_log(&sample());
        assert!(log.contains("Score: 80 (strong bullish)"));
        assert!(log.contains("- SOL-USDT: bull flag (MaxLev: 2.5x)"));
    }

    #[test]
    fn quant_log_without_dashboard() {
        let mut report = sample();
        report.dashboard = None;
        report.setups.clear();
        assert_eq!(
            quant_log(&report),
            "### QUANT DATA LOG\nReference: BTC-USDT\nScore: n/a\n"
        );
    }

    #[test]
    fn writes_dated_files() {
        let dir = std::env::temp_dir().join(format!("market-pulse-report-{}", std::process::id()));
        let path = write_report(&sample(), &dir).unwrap();
        assert_eq!(path, dir.join("2026-03-14_scan.json"));

        let parsed: ScanReport =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed.setups.len(), 1);
        assert_eq!(parsed.setups[0].pattern, Pattern::BullFlag);
        assert!(dir.join("2026-03-14_quant_log.md").exists());
        assert!(!dir.join("2026-03-14_scan.json.tmp").exists());

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
