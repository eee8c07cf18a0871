// =============================================================================
// Simple rolling mean
// =============================================================================

/// Trailing `window`-bar arithmetic mean, aligned with the input.
///
/// Indices before the window fills are `None`. `window == 0` yields all `None`.
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<Option<f64>> {
    let mut result = vec![None; values.len()];
    if window == 0 || values.len() < window {
        return result;
    }

    let w = window as f64;
    for (offset, slice) in values.windows(window).enumerate() {
        result[offset + window - 1] = Some(slice.iter().sum::<f64>() / w);
    }

    result
}
