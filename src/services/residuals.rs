use crate::domain::model::TrendSeasonalModel;
use crate::services::percentiles;

/// Empirical distribution of model residuals, expressed as fractional
/// deviation from the fitted value.
#[derive(Debug, Clone)]
pub struct ResidualDistribution {
    /// The raw residual pool the simulator resamples from.
    pub pool: Vec<f64>,
    pub p10: f64,
    pub p50: f64,
    pub p90: f64,
}

/// Derives residuals `smoothed[i] / fitted[i] - 1` from closed months
/// with a positive fitted value. When no closed month qualifies the
/// estimator falls back to all months so a forecast can still be
/// produced.
pub fn residual_distribution(
    smoothed: &[f64],
    model: &TrendSeasonalModel,
    closed: &[bool],
) -> ResidualDistribution {
    let mut pool: Vec<f64> = smoothed
        .iter()
        .zip(&model.fitted)
        .zip(closed)
        .filter(|((_, fitted), is_closed)| **is_closed && **fitted > 0.0)
        .map(|((y, fitted), _)| y / fitted - 1.0)
        .collect();

    if pool.is_empty() {
        pool = smoothed
            .iter()
            .zip(&model.fitted)
            .map(|(y, fitted)| if *fitted > 0.0 { y / fitted - 1.0 } else { 0.0 })
            .collect();
    }

    ResidualDistribution {
        p10: percentiles::value(&pool, 0.10),
        p50: percentiles::value(&pool, 0.50),
        p90: percentiles::value(&pool, 0.90),
        pool,
    }
}
