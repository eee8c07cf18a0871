// =============================================================================
// Scoring & Setup Classification
// =============================================================================
//
// Consumers of the indicator table. Everything here reads the last one or two
// rows and emits plain output records (numbers, booleans, label enums) that
// serialise without further conversion.

pub mod dashboard;
pub mod setups;
pub mod universe;

pub use dashboard::{build_dashboard, DashboardResult};
pub use setups::{
    detect_pattern, scan_setups, scan_setups_with, Candidate, SetupRecord, SetupRules, MAX_SETUPS,
};
pub use universe::select_candidates;

/// Round to `decimals` places for report output.
pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
