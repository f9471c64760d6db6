use std::collections::HashMap;

use chrono::NaiveDate;
use rand::Rng;
use thiserror::Error;

use crate::domain::adjustments::{ClientFactor, OpinionFactor, ProductFactor};
use crate::domain::model::{PercentileBand, TrendSeasonalModel};
use crate::domain::series::FORECAST_MONTHS;
use crate::services::factor_resolvers::{
    client_multiplier, product_multiplier, sample_opinion_multiplier,
};
use crate::services::percentiles;

#[derive(Error, Debug)]
pub enum SimulationError {
    #[error("trial count must be greater than zero")]
    InvalidTrials,
}

/// Everything the mixed simulation needs, resolved before any trial
/// runs. The simulator itself touches no state beyond the RNG.
pub struct MixedForecastInputs<'a> {
    pub model: &'a TrendSeasonalModel,
    pub fixed_additions: &'a [f64],
    pub residual_pool: &'a [f64],
    pub product_factors: &'a [ProductFactor],
    pub client_factors: &'a [ClientFactor],
    pub opinions: &'a [OpinionFactor],
    pub product_weights: &'a HashMap<String, f64>,
    /// First day of each of the 12 forecast months.
    pub forecast_months: &'a [NaiveDate],
}

/// The stochastic "mixed" forecast: per trial and month, one residual
/// resampled from the closed-month pool, scaled by the product and
/// client multipliers and a freshly jittered opinion multiplier,
/// floored at zero, then the fixed addition on top. The N samples per
/// month reduce to P10/P50/P90 through the shared interpolated
/// percentile, so the band ordering holds by construction.
pub fn run_mixed_simulation_with_rng<R: Rng + ?Sized>(
    inputs: &MixedForecastInputs,
    trials: usize,
    rng: &mut R,
) -> Result<PercentileBand, SimulationError> {
    if trials == 0 {
        return Err(SimulationError::InvalidTrials);
    }

    // The deterministic multipliers do not vary across trials.
    let product_by_month: Vec<f64> = inputs
        .forecast_months
        .iter()
        .map(|m| product_multiplier(inputs.product_factors, *m, inputs.product_weights))
        .collect();
    let client_by_month: Vec<f64> = inputs
        .forecast_months
        .iter()
        .map(|m| client_multiplier(inputs.client_factors, *m))
        .collect();

    let months = inputs.forecast_months.len().min(FORECAST_MONTHS);
    let mut samples_by_month: Vec<Vec<f64>> = vec![Vec::with_capacity(trials); months];

    for _ in 0..trials {
        for i in 0..months {
            let base = inputs.model.forecast_base(i);
            let residual = sample_residual(inputs.residual_pool, rng);

            let mut ops = base * (1.0 + residual);
            ops *= product_by_month[i];
            ops *= client_by_month[i];
            ops *= sample_opinion_multiplier(inputs.opinions, inputs.forecast_months[i], rng);

            let fixed = inputs.fixed_additions.get(i).copied().unwrap_or(0.0);
            samples_by_month[i].push(ops.max(0.0) + fixed);
        }
    }

    let mut band = PercentileBand::with_capacity(months);
    for samples in &mut samples_by_month {
        samples.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        band.p10.push(percentiles::value_sorted(samples, 0.10));
        band.p50.push(percentiles::value_sorted(samples, 0.50));
        band.p90.push(percentiles::value_sorted(samples, 0.90));
    }
    Ok(band)
}

fn sample_residual<R: Rng + ?Sized>(pool: &[f64], rng: &mut R) -> f64 {
    if pool.is_empty() {
        return 0.0;
    }
    let value = pool[rng.gen_range(0..pool.len())];
    if value.is_finite() { value } else { 0.0 }
}
