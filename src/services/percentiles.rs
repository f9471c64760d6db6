/// Percentile helpers for empirical samples.
///
/// - Empty input => `0.0`.
/// - `quantile <= 0` => first element, `quantile >= 1` => last element.
/// - Otherwise linear interpolation between the two bracketing order
///   statistics at position `(len - 1) * quantile`.

/// Returns the interpolated quantile of a slice that is already sorted
/// in ascending order.
pub fn value_sorted(sorted_values: &[f64], quantile: f64) -> f64 {
    let n = sorted_values.len();
    if n == 0 {
        return 0.0;
    }
    if quantile <= 0.0 {
        return sorted_values[0];
    }
    if quantile >= 1.0 {
        return sorted_values[n - 1];
    }

    let position = (n as f64 - 1.0) * quantile;
    let base = position.floor() as usize;
    let rest = position - base as f64;
    match sorted_values.get(base + 1) {
        Some(next) => sorted_values[base] + rest * (next - sorted_values[base]),
        None => sorted_values[base],
    }
}

/// Convenience wrapper that sorts a copy of the input first.
pub fn value(values: &[f64], quantile: f64) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    value_sorted(&sorted, quantile)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_returns_zero_for_empty_input() {
        assert_eq!(value(&[], 0.5), 0.0);
    }

    #[test]
    fn value_returns_the_single_element_for_any_quantile() {
        for q in [0.0, 0.1, 0.5, 0.9, 1.0] {
            assert_eq!(value(&[42.0], q), 42.0);
        }
    }

    #[test]
    fn value_interpolates_between_order_statistics() {
        let values = [10.0, 20.0, 30.0, 40.0];
        assert_eq!(value(&values, 0.5), 25.0);
        assert_eq!(value(&values, 0.25), 17.5);
        assert_eq!(value(&values, 0.0), 10.0);
        assert_eq!(value(&values, 1.0), 40.0);
    }

    #[test]
    fn value_sorts_before_interpolating() {
        let values = [40.0, 10.0, 30.0, 20.0];
        assert_eq!(value(&values, 0.5), 25.0);
    }

    #[test]
    fn value_clamps_out_of_range_quantiles() {
        let values = [1.0, 2.0, 3.0];
        assert_eq!(value(&values, -0.5), 1.0);
        assert_eq!(value(&values, 1.5), 3.0);
    }
}
