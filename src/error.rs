// =============================================================================
// Engine errors
// =============================================================================
//
// Only input-shape problems surface as errors. Numeric degeneracies (flat
// markets, zero directional movement, no losses) are defaulted inside the
// indicator code and never reach the caller.

/// Reasons the indicator pipeline or scorers refuse an input window.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineError {
    /// Fewer bars than the longest warm-up needs.
    InsufficientHistory { have: usize, need: usize },
    /// A bar that cannot be scored: non-finite or non-positive prices,
    /// negative volume, or a timestamp that does not move forward.
    InvalidCandle { index: usize, reason: &'static str },
}

impl EngineError {
    /// `true` for the "not enough data yet" case that scans skip silently.
    pub fn is_insufficient_history(&self) -> bool {
        matches!(self, Self::InsufficientHistory { .. })
    }
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InsufficientHistory { have, need } => {
                write!(f, "insufficient_history: have {have} bars, need {need}")
            }
            Self::InvalidCandle { index, reason } => {
                write!(f, "invalid_candle: bar {index}: {reason}")
            }
        }
    }
}

impl std::error::Error for EngineError {}
