//! Trailing window sums over row positions.

/// Sum of the trailing `window` values ending at each index.
///
/// The window is positional: it counts rows, not calendar days. Index `i`
/// gets `Some(sum(values[i+1-window ..= i]))` once at least `window` rows
/// exist at or before it, and `None` before that.
///
/// The recompute is intentionally naive (O(n·k)): the caller re-derives the
/// sums only a bounded number of times per query, and the simple form keeps
/// the selection loop easy to audit.
pub fn trailing_sums(values: &[f64], window: usize) -> Vec<Option<f64>> {
    debug_assert!(window > 0, "window must be positive");

    values
        .iter()
        .enumerate()
        .map(|(i, _)| {
            if i + 1 < window {
                None
            } else {
                Some(values[i + 1 - window..=i].iter().sum())
            }
        })
        .collect()
}
