/// Round to the nearest integer, ties to even (the convention of pandas' `round`).
pub fn round_half_even(value: f64) -> f64 {
    value.round_ties_even()
}

/// Round to a fixed number of decimal places, ties to even. NaN passes through.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round_ties_even() / factor
}

/// Arithmetic mean, `None` for an empty input.
pub fn mean(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));

    (count > 0).then(|| sum / count as f64)
}
