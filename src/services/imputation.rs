use chrono::NaiveDate;

use crate::domain::model::ForecastConfig;
use crate::domain::series::{closed_flags, last_closed_month_start};
use crate::services::percentiles;

/// Result of filling in the unclosed tail of the historical series.
#[derive(Debug, Clone)]
pub struct ImputationOutcome {
    pub series: Vec<f64>,
    pub last_closed_month_start: NaiveDate,
    /// Median year-over-year ratio per calendar-month bucket, clamped.
    pub month_trend_factors: [f64; 12],
}

/// Replaces every unclosed month with a same-month trend extrapolation
/// of the prior year, so partial in-month actuals do not drag the model
/// down. Closed months pass through unchanged, and an imputed value is
/// never lower than the partial actual already recorded.
pub fn impute_unclosed_months(
    series: &[f64],
    series_start: NaiveDate,
    run_date: NaiveDate,
    config: &ForecastConfig,
) -> ImputationOutcome {
    let last_closed = last_closed_month_start(run_date);
    let closed = closed_flags(series_start, series.len(), last_closed);
    let factors = month_trend_factors(series, &closed, config);

    let mut out = series.to_vec();
    for i in 0..out.len() {
        if closed[i] {
            continue;
        }

        let current = out[i];
        // The prior-year value is read from the adjusted series, so a
        // long unclosed tail cascades year over year.
        let candidate = if i >= 12 && out[i - 12] > 0.0 {
            out[i - 12] * factors[i % 12]
        } else {
            closed_month_average(&out, &closed, i % 12)
        };

        let mut value = if candidate.is_finite() { candidate } else { current };
        value = value.max(0.0);
        // A partial actual can only be revised upward, never downward.
        out[i] = value.max(current);
    }

    ImputationOutcome {
        series: out,
        last_closed_month_start: last_closed,
        month_trend_factors: factors,
    }
}

/// Median current-year / prior-year ratio per calendar-month bucket,
/// using closed pairs with a positive prior value. Defaults to 1.0 when
/// a bucket has no usable pair.
fn month_trend_factors(series: &[f64], closed: &[bool], config: &ForecastConfig) -> [f64; 12] {
    let mut factors = [1.0; 12];

    for (bucket, factor) in factors.iter_mut().enumerate() {
        let mut ratios = Vec::new();
        for i in 12..series.len() {
            if i % 12 != bucket || !closed[i] {
                continue;
            }
            let prev = series[i - 12];
            if prev > 0.0 {
                ratios.push(series[i] / prev);
            }
        }

        if !ratios.is_empty() {
            let mut median = percentiles::value(&ratios, 0.5);
            if !median.is_finite() || median <= 0.0 {
                median = 1.0;
            }
            *factor = median.clamp(config.trend_factor_min, config.trend_factor_max);
        }
    }

    factors
}

/// Mean of the closed values sharing a calendar-month bucket; 0 when
/// none exist.
fn closed_month_average(series: &[f64], closed: &[bool], bucket: usize) -> f64 {
    let values: Vec<f64> = series
        .iter()
        .enumerate()
        .filter(|(i, v)| i % 12 == bucket && closed[*i] && v.is_finite())
        .map(|(_, v)| *v)
        .collect();

    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::series::HISTORY_MONTHS;

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2022, 4, 1).unwrap()
    }

    // Run date that leaves the final two series months (2026/02, 2026/03)
    // unclosed: 2026/02 run => last closed month is 2026/01.
    fn run_date_with_two_open_months() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, 10).unwrap()
    }

    #[test]
    fn closed_months_are_passed_through_unchanged() {
        let series: Vec<f64> = (0..HISTORY_MONTHS).map(|i| 100.0 + i as f64).collect();
        let outcome = impute_unclosed_months(
            &series,
            start(),
            run_date_with_two_open_months(),
            &ForecastConfig::default(),
        );

        for i in 0..HISTORY_MONTHS - 2 {
            assert_eq!(outcome.series[i], series[i], "month {i} changed");
        }
    }

    #[test]
    fn unclosed_months_are_never_revised_below_the_partial_actual() {
        let mut series = vec![100.0; HISTORY_MONTHS];
        // Partial actual in the last month already above any plausible
        // trend extrapolation.
        series[HISTORY_MONTHS - 1] = 500.0;

        let outcome = impute_unclosed_months(
            &series,
            start(),
            run_date_with_two_open_months(),
            &ForecastConfig::default(),
        );

        assert!(outcome.series[HISTORY_MONTHS - 1] >= 500.0);
        for i in 0..HISTORY_MONTHS {
            assert!(outcome.series[i] >= series[i]);
        }
    }

    #[test]
    fn trend_factors_are_clamped_to_the_configured_bounds() {
        // Each year doubles, so the raw year-over-year ratio is 2.0.
        let mut series = Vec::with_capacity(HISTORY_MONTHS);
        for year in 0..4 {
            for _ in 0..12 {
                series.push(100.0 * f64::powi(2.0, year));
            }
        }

        let config = ForecastConfig::default();
        let outcome =
            impute_unclosed_months(&series, start(), run_date_with_two_open_months(), &config);

        for factor in outcome.month_trend_factors {
            assert!(factor >= config.trend_factor_min);
            assert!(factor <= config.trend_factor_max);
        }
        // The unclosed months extrapolate from the prior year at the
        // clamped factor.
        let expected = series[HISTORY_MONTHS - 1 - 12] * config.trend_factor_max;
        assert!((outcome.series[HISTORY_MONTHS - 1] - expected).abs() < 1e-9);
    }

    #[test]
    fn a_long_unclosed_tail_cascades_year_over_year() {
        // Last closed month is 2025/01 (index 33), leaving 14 months
        // unclosed so the final ones have no closed prior-year value.
        let run_date = NaiveDate::from_ymd_opt(2025, 2, 10).unwrap();
        let mut series = vec![0.0; HISTORY_MONTHS];
        for (i, value) in series.iter_mut().enumerate().take(34) {
            *value = 100.0 * f64::powi(1.15, (i / 12) as i32);
        }

        let outcome =
            impute_unclosed_months(&series, start(), run_date, &ForecastConfig::default());

        // Index 46 extrapolates from index 34, which is itself imputed.
        let expected_34 = series[22] * 1.15;
        let expected_46 = expected_34 * 1.15;
        assert!((outcome.series[34] - expected_34).abs() < 1e-9);
        assert!((outcome.series[46] - expected_46).abs() < 1e-9);
    }

    #[test]
    fn falls_back_to_the_closed_same_month_average_without_a_prior_year_value() {
        let mut series = vec![100.0; HISTORY_MONTHS];
        // No prior-year value for the final month bucket.
        series[HISTORY_MONTHS - 1 - 12] = 0.0;
        series[HISTORY_MONTHS - 1] = 0.0;

        let outcome = impute_unclosed_months(
            &series,
            start(),
            run_date_with_two_open_months(),
            &ForecastConfig::default(),
        );

        // Average of the closed values in that bucket: 100, 100 and 0.
        assert!((outcome.series[HISTORY_MONTHS - 1] - 200.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn a_run_date_after_the_window_closes_every_month() {
        let series = vec![100.0; HISTORY_MONTHS];
        let run_date = NaiveDate::from_ymd_opt(2026, 8, 30).unwrap();
        let outcome =
            impute_unclosed_months(&series, start(), run_date, &ForecastConfig::default());

        assert_eq!(outcome.series, series);
        assert_eq!(
            outcome.last_closed_month_start,
            NaiveDate::from_ymd_opt(2026, 7, 1).unwrap()
        );
    }
}
