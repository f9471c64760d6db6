use crate::domain::model::{PercentileBand, TrendSeasonalModel};
use crate::domain::series::FORECAST_MONTHS;
use crate::services::residuals::ResidualDistribution;

/// The "objective-only" forecast track: trend-times-seasonality
/// extrapolation widened by the residual quantiles, plus the fixed
/// additions. No subjective factors are applied. Band ordering holds
/// because all three rows scale the same non-negative base by ordered
/// quantiles.
pub fn forecast_by_residual_quantiles(
    model: &TrendSeasonalModel,
    fixed_additions: &[f64],
    residuals: &ResidualDistribution,
) -> PercentileBand {
    let mut band = PercentileBand::with_capacity(FORECAST_MONTHS);
    for i in 0..FORECAST_MONTHS {
        let base = model.forecast_base(i);
        let fixed = fixed_additions.get(i).copied().unwrap_or(0.0);
        band.p10.push(base * (1.0 + residuals.p10) + fixed);
        band.p50.push(base * (1.0 + residuals.p50) + fixed);
        band.p90.push(base * (1.0 + residuals.p90) + fixed);
    }
    band
}

/// Deterministic reference series: the pure trend-plus-seasonality
/// extrapolation with fixed additions, no residual widening.
pub fn regression_reference(model: &TrendSeasonalModel, fixed_additions: &[f64]) -> Vec<f64> {
    (0..FORECAST_MONTHS)
        .map(|i| model.forecast_base(i) + fixed_additions.get(i).copied().unwrap_or(0.0))
        .collect()
}
