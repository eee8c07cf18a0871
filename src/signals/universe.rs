// =============================================================================
// Candidate universe selection
// =============================================================================
//
// From the full ticker list: keep liquid pairs in the configured quote
// currency, rank by 24h change (descending), then take the strongest gainers
// and the weakest losers. Gainers come first in the output, losers after.

use tracing::debug;

use crate::market_data::TickerSnapshot;

/// Selection thresholds.
#[derive(Debug, Clone, PartialEq)]
pub struct UniverseRules {
    /// Symbols must end with this suffix, e.g. "-USDT".
    pub quote_suffix: String,
    /// Strict lower bound on 24h quote volume.
    pub min_quote_volume: f64,
    pub top_gainers: usize,
    pub top_losers: usize,
}

impl Default for UniverseRules {
    fn default() -> Self {
        Self {
            quote_suffix: "-USDT".to_string(),
            min_quote_volume: 15_000_000.0,
            top_gainers: 6,
            top_losers: 4,
        }
    }
}

/// Pick up to `top_gainers + top_losers` snapshots, never the same one twice.
pub fn select_candidates(snapshots: &[TickerSnapshot], rules: &UniverseRules) -> Vec<TickerSnapshot> {
    let mut liquid: Vec<&TickerSnapshot> = snapshots
        .iter()
        .filter(|t| t.symbol.ends_with(&rules.quote_suffix))
        .filter(|t| t.quote_volume > rules.min_quote_volume)
        .filter(|t| t.change_pct.is_finite())
        .collect();

    // Stable: equal changes keep their input order.
    liquid.sort_by(|a, b| b.change_pct.total_cmp(&a.change_pct));

    let gainers_end = rules.top_gainers.min(liquid.len());
    let losers_start = liquid.len().saturating_sub(rules.top_losers).max(gainers_end);

    debug!(
        total = snapshots.len(),
        liquid = liquid.len(),
        gainers = gainers_end,
        losers = liquid.len() - losers_start,
        "candidate universe selected"
    );

    liquid[..gainers_end]
        .iter()
        .chain(&liquid[losers_start..])
        .map(|t| (*t).clone())
        .collect()
}
