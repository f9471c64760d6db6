/// Linear trend plus 12-slot multiplicative seasonal index, fitted to
/// the smoothed 48-month series.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendSeasonalModel {
    pub intercept: f64,
    pub slope: f64,
    /// One multiplier per calendar-month bucket, clamped to [0.80, 1.20].
    pub seasonal_index: [f64; 12],
    /// In-sample fit, floored at zero.
    pub fitted: Vec<f64>,
}

impl TrendSeasonalModel {
    /// Extrapolated trend-times-seasonality value for forecast month
    /// `offset` (0-based, continuing the in-sample time index).
    pub fn forecast_base(&self, offset: usize) -> f64 {
        let t = (self.fitted.len() + offset + 1) as f64;
        let base = (self.intercept + self.slope * t) * self.seasonal_index[offset % 12];
        base.max(0.0)
    }
}

/// A 12-month P10/P50/P90 band. Built from per-month sorted samples or
/// shared residual quantiles, so the ordering holds by construction.
#[derive(Debug, Clone, PartialEq)]
pub struct PercentileBand {
    pub p10: Vec<f64>,
    pub p50: Vec<f64>,
    pub p90: Vec<f64>,
}

impl PercentileBand {
    pub fn with_capacity(months: usize) -> Self {
        Self {
            p10: Vec::with_capacity(months),
            p50: Vec::with_capacity(months),
            p90: Vec::with_capacity(months),
        }
    }
}

/// Tuning knobs of the pipeline. Passed explicitly into every stage;
/// no stage reads ambient state.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastConfig {
    /// Monte Carlo trial count.
    pub trials: usize,
    /// Ratio bounds outside which a month is a spike candidate.
    pub spike_clip_min: f64,
    pub spike_clip_max: f64,
    /// Width of the seasonal acceptance band, in MAD multiples.
    pub seasonal_mad_k: f64,
    /// Clip bounds for the year-over-year trend factors used by
    /// unclosed-month imputation.
    pub trend_factor_min: f64,
    pub trend_factor_max: f64,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            trials: 1000,
            spike_clip_min: 0.70,
            spike_clip_max: 1.40,
            seasonal_mad_k: 3.0,
            trend_factor_min: 0.85,
            trend_factor_max: 1.15,
        }
    }
}
