use chrono::NaiveDate;
use rand::Rng;
use thiserror::Error;

use crate::domain::adjustments::FixedItem;
use crate::domain::model::{ForecastConfig, PercentileBand};
use crate::domain::series::{
    FORECAST_MONTHS, HISTORY_MONTHS, add_months, closed_flags, fiscal_year_start,
    month_index_from, series_start,
};
use crate::services::band_chart::{BandChartError, write_band_chart_png};
use crate::services::imputation::impute_unclosed_months;
use crate::services::model_fit::fit_trend_seasonal;
use crate::services::monte_carlo::{
    MixedForecastInputs, SimulationError, run_mixed_simulation_with_rng,
};
use crate::services::opinion_summary::{summarize_by_month, summarize_latest};
use crate::services::product_weights::product_weights_closed_12;
use crate::services::quantile_forecast::{forecast_by_residual_quantiles, regression_reference};
use crate::services::report_types::{BandReport, DiagnosticsReport, ForecastReport};
use crate::services::residuals::residual_distribution;
use crate::services::smoothing::smooth_seasonal_aware;
use crate::services::workbook_yaml::{Workbook, WorkbookError, load_workbook_from_yaml_file};

#[derive(Error, Debug)]
pub enum ForecastError {
    #[error(transparent)]
    Workbook(#[from] WorkbookError),
    #[error(transparent)]
    Simulation(#[from] SimulationError),
    #[error(transparent)]
    Chart(#[from] BandChartError),
}

/// One completed forecast run. The report carries everything the yaml
/// output needs; the bands are kept alongside for chart rendering.
pub struct ForecastRun {
    pub report: ForecastReport,
    pub mixed: PercentileBand,
    pub objective: PercentileBand,
}

/// Resolves fixed contracted items into a 12-element additive series of
/// expected value (amount times confidence), indexed from fiscal April.
pub fn fixed_additions(items: &[FixedItem], forecast_start: NaiveDate) -> Vec<f64> {
    let mut additions = vec![0.0; FORECAST_MONTHS];
    for item in items {
        let index = month_index_from(forecast_start, item.month);
        if (0..FORECAST_MONTHS as i64).contains(&index) {
            additions[index as usize] += item.amount * item.confidence;
        }
    }
    additions
}

fn summarize_adjustments(workbook: &Workbook) -> Vec<String> {
    let mut entries = Vec::new();
    for factor in &workbook.product_factors {
        let mut entry = format!(
            "product {}: {} {:+}% from {}",
            factor.product,
            factor.person,
            (factor.step * 100.0).round() as i64,
            factor.effective_month.format("%Y-%m")
        );
        if !factor.reason.is_empty() {
            entry.push_str(": ");
            entry.push_str(&factor.reason);
        }
        entries.push(entry);
    }
    for factor in &workbook.client_factors {
        let mut entry = format!(
            "client: {} {:+}% from {}",
            factor.person,
            (factor.step * 100.0).round() as i64,
            factor.effective_month.format("%Y-%m")
        );
        if !factor.reason.is_empty() {
            entry.push_str(": ");
            entry.push_str(&factor.reason);
        }
        entries.push(entry);
    }
    for item in &workbook.fixed_items {
        let mut entry = format!(
            "fixed {}: {} {:.0} x {:.2}",
            item.month.format("%Y-%m"),
            item.project,
            item.amount,
            item.confidence
        );
        if let Some(person) = &item.person {
            entry.push_str(" (");
            entry.push_str(person);
            entry.push(')');
        }
        entries.push(entry);
    }
    entries
}

pub fn run_forecast_with_rng<R: Rng + ?Sized>(
    workbook: &Workbook,
    run_date: NaiveDate,
    config: &ForecastConfig,
    rng: &mut R,
) -> Result<ForecastRun, ForecastError> {
    let start = series_start(workbook.fiscal_year);
    let aggregate = workbook.sales.aggregate();

    let imputed = impute_unclosed_months(&aggregate, start, run_date, config);
    let smoothed = smooth_seasonal_aware(&imputed.series, config);
    let model = fit_trend_seasonal(&smoothed);

    let closed = closed_flags(start, HISTORY_MONTHS, imputed.last_closed_month_start);
    let residuals = residual_distribution(&smoothed, &model, &closed);
    let weights =
        product_weights_closed_12(&workbook.sales.products, start, imputed.last_closed_month_start);

    let forecast_start = fiscal_year_start(workbook.fiscal_year);
    let forecast_months: Vec<NaiveDate> = (0..FORECAST_MONTHS)
        .map(|i| add_months(forecast_start, i))
        .collect();
    let additions = fixed_additions(&workbook.fixed_items, forecast_start);

    let objective = forecast_by_residual_quantiles(&model, &additions, &residuals);
    let regression = regression_reference(&model, &additions);

    let inputs = MixedForecastInputs {
        model: &model,
        fixed_additions: &additions,
        residual_pool: &residuals.pool,
        product_factors: &workbook.product_factors,
        client_factors: &workbook.client_factors,
        opinions: &workbook.opinions,
        product_weights: &weights,
        forecast_months: &forecast_months,
    };
    let mixed = run_mixed_simulation_with_rng(&inputs, config.trials, rng)?;

    let report = ForecastReport {
        client: workbook.client.clone(),
        fiscal_year: workbook.fiscal_year,
        data_source: String::new(),
        trials: config.trials as u64,
        history_complete: workbook.sales.complete_48,
        months: forecast_months
            .iter()
            .map(|m| m.format("%Y-%m").to_string())
            .collect(),
        mixed: BandReport::from_band(&mixed),
        objective: BandReport::from_band(&objective),
        regression,
        fixed_additions: additions,
        diagnostics: DiagnosticsReport {
            slope: model.slope,
            intercept: model.intercept,
            residual_p10: residuals.p10,
            residual_p50: residuals.p50,
            residual_p90: residuals.p90,
            month_trend_factors: imputed.month_trend_factors.to_vec(),
        },
        adjustment_summary: summarize_adjustments(workbook),
        opinion_summary: summarize_latest(&workbook.opinions)
            .split(" / ")
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        opinions_by_month: summarize_by_month(&workbook.opinions, &forecast_months),
    };

    Ok(ForecastRun {
        report,
        mixed,
        objective,
    })
}

/// Runs the whole pipeline for a workbook file and renders the band
/// charts next to the requested output path.
pub fn forecast_from_workbook_file<R: Rng + ?Sized>(
    input_path: &str,
    output_path: &str,
    run_date: NaiveDate,
    config: &ForecastConfig,
    rng: &mut R,
) -> Result<ForecastRun, ForecastError> {
    let workbook = load_workbook_from_yaml_file(input_path)?;
    let mut run = run_forecast_with_rng(&workbook, run_date, config, rng)?;

    run.report.data_source = std::path::Path::new(input_path)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| input_path.to_string());

    write_band_chart_png(
        &format!("{output_path}.mixed.png"),
        &format!("{} FY{} mixed forecast", run.report.client, run.report.fiscal_year),
        &run.report.months,
        &run.mixed,
        &run.report.regression,
    )?;
    write_band_chart_png(
        &format!("{output_path}.objective.png"),
        &format!(
            "{} FY{} objective forecast",
            run.report.client, run.report.fiscal_year
        ),
        &run.report.months,
        &run.objective,
        &run.report.regression,
    )?;

    Ok(run)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::workbook_yaml::deserialize_workbook_from_yaml_str;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn flat_workbook(extra: &str) -> Workbook {
        let monthly: Vec<String> = (0..HISTORY_MONTHS).map(|_| "100".to_string()).collect();
        let yaml = format!(
            "client: Acme\nfiscal_year: 2026\nproducts:\n  - name: Widget\n    monthly: [{}]\n{extra}",
            monthly.join(", ")
        );
        deserialize_workbook_from_yaml_str(&yaml).unwrap()
    }

    fn past_run_date() -> NaiveDate {
        // Far enough ahead that all 48 history months are closed.
        NaiveDate::from_ymd_opt(2030, 6, 15).unwrap()
    }

    #[test]
    fn fixed_additions_fall_into_their_fiscal_month() {
        let items = vec![
            FixedItem {
                person: None,
                month: NaiveDate::from_ymd_opt(2026, 8, 1).unwrap(),
                project: "Spot".to_string(),
                amount: 1000.0,
                confidence: 0.9,
            },
            FixedItem {
                person: None,
                month: NaiveDate::from_ymd_opt(2027, 6, 1).unwrap(),
                project: "Next year".to_string(),
                amount: 500.0,
                confidence: 1.0,
            },
        ];
        let additions = fixed_additions(&items, fiscal_year_start(2026));

        assert_eq!(additions.len(), FORECAST_MONTHS);
        assert!((additions[4] - 900.0).abs() < 1e-9);
        assert_eq!(additions.iter().sum::<f64>(), 900.0);
    }

    fn config_with_trials(trials: usize) -> ForecastConfig {
        ForecastConfig {
            trials,
            ..ForecastConfig::default()
        }
    }

    #[test]
    fn flat_history_forecasts_near_its_level() {
        let workbook = flat_workbook("");
        let mut rng = StdRng::seed_from_u64(7);
        let run = run_forecast_with_rng(
            &workbook,
            past_run_date(),
            &config_with_trials(200),
            &mut rng,
        )
        .unwrap();

        for value in &run.report.objective.p50 {
            assert!((value - 100.0).abs() < 1.0, "p50 {value} strays from 100");
        }
        for i in 0..FORECAST_MONTHS {
            assert!(run.report.mixed.p10[i] <= run.report.mixed.p50[i]);
            assert!(run.report.mixed.p50[i] <= run.report.mixed.p90[i]);
        }
        assert_eq!(run.report.months[0], "2026-04");
        assert_eq!(run.report.months[11], "2027-03");
    }

    #[test]
    fn a_client_factor_moves_only_the_mixed_band() {
        let extra = "\
client_factors:
  - { person: Boss, effective_month: 2026-04-01, step: -50%, reason: churn }
";
        let workbook = flat_workbook(extra);
        let mut rng = StdRng::seed_from_u64(7);
        let run = run_forecast_with_rng(
            &workbook,
            past_run_date(),
            &config_with_trials(200),
            &mut rng,
        )
        .unwrap();

        assert!((run.report.objective.p50[0] - 100.0).abs() < 1.0);
        assert!((run.report.mixed.p50[0] - 50.0).abs() < 1.0);
        assert_eq!(
            run.report.adjustment_summary,
            vec!["client: Boss -50% from 2026-04: churn".to_string()]
        );
    }

    #[test]
    fn identical_seeds_reproduce_the_report() {
        // Several stakeholders so per-trial jitter draws have to land on
        // the same person every run.
        let workbook = flat_workbook(
            "opinions:\n  - { person: A, effective_month: 2026-04-01, step: 0.2, confidence: 0.8, note: upside }\n  - { person: B, effective_month: 2026-04-01, step: -0.1, confidence: 0.6, note: risk }\n  - { person: C, effective_month: 2026-04-01, step: 0.3, confidence: 0.5, note: launch }\n",
        );
        let config = config_with_trials(100);

        let mut first_rng = StdRng::seed_from_u64(42);
        let first =
            run_forecast_with_rng(&workbook, past_run_date(), &config, &mut first_rng).unwrap();
        let mut second_rng = StdRng::seed_from_u64(42);
        let second =
            run_forecast_with_rng(&workbook, past_run_date(), &config, &mut second_rng).unwrap();

        assert_eq!(first.report, second.report);
    }

    #[test]
    fn opinion_summaries_reach_the_report() {
        let extra = "\
opinions:
  - { person: Sato, effective_month: 2026-04-01, step: 0.2, confidence: 0.8, note: new contract likely }
";
        let workbook = flat_workbook(extra);
        let mut rng = StdRng::seed_from_u64(1);
        let run = run_forecast_with_rng(
            &workbook,
            past_run_date(),
            &config_with_trials(50),
            &mut rng,
        )
        .unwrap();

        assert_eq!(run.report.opinion_summary.len(), 1);
        assert!(run.report.opinion_summary[0].starts_with("Sato +20%"));
        assert_eq!(run.report.opinions_by_month.len(), FORECAST_MONTHS);
        assert_eq!(run.report.opinions_by_month[0], "Sato +20% (0.80)");
    }
}
