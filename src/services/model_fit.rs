use crate::domain::model::TrendSeasonalModel;

const SEASONAL_INDEX_MIN: f64 = 0.80;
const SEASONAL_INDEX_MAX: f64 = 1.20;

/// Fits a linear trend (ordinary least squares against the month index
/// 1..n) plus a 12-slot multiplicative seasonal index to the smoothed
/// series.
pub fn fit_trend_seasonal(series: &[f64]) -> TrendSeasonalModel {
    let n = series.len();
    let x: Vec<f64> = (1..=n).map(|i| i as f64).collect();

    let slope = ols_slope(series, &x);
    let intercept = mean(series) - slope * mean(&x);

    let ma12 = trailing_moving_average(series, 12);
    // Non-positive moving averages leave no usable ratio for a month.
    let ratios: Vec<f64> = series
        .iter()
        .zip(&ma12)
        .map(|(y, ma)| if *ma > 0.0 { y / ma } else { f64::NAN })
        .collect();

    let mut seasonal_index = [1.0; 12];
    for (bucket, index) in seasonal_index.iter_mut().enumerate() {
        let bucket_ratios: Vec<f64> = ratios
            .iter()
            .enumerate()
            .filter(|(i, r)| i % 12 == bucket && r.is_finite() && **r > 0.0)
            .map(|(_, r)| *r)
            .collect();
        if !bucket_ratios.is_empty() {
            *index = mean(&bucket_ratios);
        }
        *index = index.clamp(SEASONAL_INDEX_MIN, SEASONAL_INDEX_MAX);
    }

    let fitted = (0..n)
        .map(|i| ((intercept + slope * (i as f64 + 1.0)) * seasonal_index[i % 12]).max(0.0))
        .collect();

    TrendSeasonalModel {
        intercept,
        slope,
        seasonal_index,
        fitted,
    }
}

fn ols_slope(y: &[f64], x: &[f64]) -> f64 {
    let xbar = mean(x);
    let ybar = mean(y);
    let mut num = 0.0;
    let mut den = 0.0;
    for (xi, yi) in x.iter().zip(y) {
        num += (xi - xbar) * (yi - ybar);
        den += (xi - xbar) * (xi - xbar);
    }
    if den == 0.0 { 0.0 } else { num / den }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Moving average over the trailing `window` months including the
/// current one, shortened at the start of the series.
fn trailing_moving_average(series: &[f64], window: usize) -> Vec<f64> {
    (0..series.len())
        .map(|i| {
            let start = (i + 1).saturating_sub(window);
            mean(&series[start..=i])
        })
        .collect()
}
