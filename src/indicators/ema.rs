// =============================================================================
// Exponential Moving Average (EMA)
// =============================================================================
//
// Two weightings are used by the engine:
//
// Recursive (ribbon, MACD):
//   alpha  = 2 / (span + 1)
//   EMA_0  = price_0
//   EMA_t  = price_t * alpha + EMA_{t-1} * (1 - alpha)
//
// Bias-adjusted (Keltner mid, DI/ADX smoothing):
//   EMA_t  = sum_k (1 - alpha)^k * x_{t-k} / sum_k (1 - alpha)^k
//
// The adjusted form is kept incrementally as a normalised mean plus its
// weight sum, so both run in O(n) with no lookahead:
//   W_t    = 1 + (1 - alpha) * W_{t-1}
//   EMA_t  = EMA_{t-1} + (x_t - EMA_{t-1}) / W_t
// A constant input reproduces itself exactly.
// =============================================================================

/// Smoothing factor for a span-style EMA.
pub fn span_alpha(span: usize) -> f64 {
    2.0 / (span as f64 + 1.0)
}

/// Recursive EMA over `values`, one output per input.
///
/// The series is seeded with the first value, so every index is defined.
/// Returns an empty `Vec` for empty input or `span == 0`.
pub fn calculate_ema(values: &[f64], span: usize) -> Vec<f64> {
    if span == 0 || values.is_empty() {
        return Vec::new();
    }

    let alpha = span_alpha(span);
    let mut result = Vec::with_capacity(values.len());
    let mut prev = values[0];
    result.push(prev);

    for &v in &values[1..] {
        // Same recurrence as price * alpha + prev * (1 - alpha), exact on flat input.
        prev += alpha * (v - prev);
        result.push(prev);
    }

    result
}

/// Running state of a bias-adjusted exponential average.
#[derive(Debug, Clone, Copy)]
pub struct AdjustedEwm {
    decay: f64,
    weight: f64,
    mean: f64,
}

impl AdjustedEwm {
    pub fn new(alpha: f64) -> Self {
        Self {
            decay: 1.0 - alpha,
            weight: 0.0,
            mean: 0.0,
        }
    }

    /// Feed the next observation and return the current average.
    pub fn update(&mut self, value: f64) -> f64 {
        self.weight = 1.0 + self.decay * self.weight;
        self.mean += (value - self.mean) / self.weight;
        self.mean
    }
}

/// Bias-adjusted exponential average over a series that may start with
/// undefined values.
///
/// Leading `None`s stay `None`; averaging starts at the first defined value.
/// Inputs are expected to be defined from that point on.
pub fn calculate_adjusted_ewm(values: &[Option<f64>], alpha: f64) -> Vec<Option<f64>> {
    let mut ewm = AdjustedEwm::new(alpha);
    let mut last: Option<f64> = None;

    values
        .iter()
        .map(|v| {
            if let Some(x) = v {
                last = Some(ewm.update(*x));
            }
            last
        })
        .collect()
}
