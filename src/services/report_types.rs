use serde::Serialize;

use crate::domain::model::PercentileBand;

/// Everything one forecast run produces, written out as yaml.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ForecastReport {
    pub client: String,
    pub fiscal_year: i32,
    pub data_source: String,
    pub trials: u64,
    pub history_complete: bool,
    /// Forecast months as yyyy-mm, April first.
    pub months: Vec<String>,
    pub mixed: BandReport,
    pub objective: BandReport,
    pub regression: Vec<f64>,
    pub fixed_additions: Vec<f64>,
    pub diagnostics: DiagnosticsReport,
    /// One line per product factor, client factor and fixed item, so
    /// the report shows which adjustments shaped the mixed band.
    pub adjustment_summary: Vec<String>,
    pub opinion_summary: Vec<String>,
    pub opinions_by_month: Vec<String>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct BandReport {
    pub p10: Vec<f64>,
    pub p50: Vec<f64>,
    pub p90: Vec<f64>,
    pub annual_p10: f64,
    pub annual_p50: f64,
    pub annual_p90: f64,
    /// Spread between the annual P90 and P10 totals.
    pub annual_range: f64,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct DiagnosticsReport {
    pub slope: f64,
    pub intercept: f64,
    pub residual_p10: f64,
    pub residual_p50: f64,
    pub residual_p90: f64,
    /// Clamped year-over-year factor per calendar month, as used by
    /// unclosed-month imputation.
    pub month_trend_factors: Vec<f64>,
}

impl BandReport {
    pub fn from_band(band: &PercentileBand) -> Self {
        let annual_p10: f64 = band.p10.iter().sum();
        let annual_p90: f64 = band.p90.iter().sum();
        BandReport {
            annual_p10,
            annual_p50: band.p50.iter().sum(),
            annual_p90,
            annual_range: annual_p90 - annual_p10,
            p10: band.p10.clone(),
            p50: band.p50.clone(),
            p90: band.p90.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn annual_totals_sum_the_monthly_band() {
        let band = PercentileBand {
            p10: vec![1.0, 2.0],
            p50: vec![3.0, 4.0],
            p90: vec![5.0, 6.0],
        };
        let report = BandReport::from_band(&band);
        assert_eq!(report.annual_p10, 3.0);
        assert_eq!(report.annual_p50, 7.0);
        assert_eq!(report.annual_p90, 11.0);
        assert_eq!(report.annual_range, 8.0);
        assert_eq!(report.p50, vec![3.0, 4.0]);
    }
}
