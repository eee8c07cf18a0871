// =============================================================================
// Structural labels shared by the dashboard and the setup scanner
// =============================================================================
//
// Each label serialises as its human-readable text so downstream report
// consumers never see Rust variant names.

use serde::{Deserialize, Serialize};

/// Traffic-light verdict derived from the composite score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignalLight {
    #[serde(rename = "strong bullish")]
    StrongBullish,
    #[serde(rename = "weak bullish")]
    WeakBullish,
    #[serde(rename = "neutral/range-bound")]
    Neutral,
    #[serde(rename = "weak bearish")]
    WeakBearish,
    #[serde(rename = "strong bearish")]
    StrongBearish,
}

impl SignalLight {
    /// Bands: >= 75, 55..=74, <= 25, 26..=45, otherwise neutral.
    pub fn from_score(score: i32) -> Self {
        if score >= 75 {
            Self::StrongBullish
        } else if score >= 55 {
            Self::WeakBullish
        } else if score <= 25 {
            Self::StrongBearish
        } else if score <= 45 {
            Self::WeakBearish
        } else {
            Self::Neutral
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::StrongBullish => "strong bullish",
            Self::WeakBullish => "weak bullish",
            Self::Neutral => "neutral/range-bound",
            Self::WeakBearish => "weak bearish",
            Self::StrongBearish => "strong bearish",
        }
    }
}

impl std::fmt::Display for SignalLight {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Ordering of the EMA 7 / 25 / 99 ribbon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EmaStructure {
    #[serde(rename = "bullish perfect alignment")]
    BullishAlignment,
    #[serde(rename = "bearish perfect alignment")]
    BearishAlignment,
    #[serde(rename = "tangled / no direction")]
    Tangled,
}

impl EmaStructure {
    pub fn label(self) -> &'static str {
        match self {
            Self::BullishAlignment => "bullish perfect alignment",
            Self::BearishAlignment => "bearish perfect alignment",
            Self::Tangled => "tangled / no direction",
        }
    }
}

impl std::fmt::Display for EmaStructure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Direction and acceleration of the MACD histogram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MacdStatus {
    #[serde(rename = "bullish momentum accelerating")]
    BullishAccelerating,
    #[serde(rename = "bullish momentum decelerating")]
    BullishDecelerating,
    #[serde(rename = "bearish pressure accelerating")]
    BearishAccelerating,
    #[serde(rename = "momentum exhausted")]
    Exhausted,
}

impl MacdStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::BullishAccelerating => "bullish momentum accelerating",
            Self::BullishDecelerating => "bullish momentum decelerating",
            Self::BearishAccelerating => "bearish pressure accelerating",
            Self::Exhausted => "momentum exhausted",
        }
    }
}

impl std::fmt::Display for MacdStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Chart pattern reported for a candidate asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Pattern {
    #[serde(rename = "bull flag")]
    BullFlag,
    #[serde(rename = "reversal")]
    Reversal,
    #[serde(rename = "super trend")]
    SuperTrend,
    #[serde(rename = "no distinct pattern")]
    NoPattern,
}

impl Pattern {
    pub fn label(self) -> &'static str {
        match self {
            Self::BullFlag => "bull flag",
            Self::Reversal => "reversal",
            Self::SuperTrend => "super trend",
            Self::NoPattern => "no distinct pattern",
        }
    }

    pub fn is_match(self) -> bool {
        self != Self::NoPattern
    }
}

impl std::fmt::Display for Pattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
