use crate::services::report_types::{BandReport, ForecastReport};

pub fn format_forecast_report(report: &ForecastReport) -> String {
    let mut lines = Vec::new();
    lines.push("Revenue Forecast".to_string());
    lines.push(format!("Client: {}", report.client));
    lines.push(format!("Fiscal year: FY{}", report.fiscal_year));
    lines.push(format!("Data source: {}", report.data_source));
    lines.push(format!("Trials: {}", report.trials));
    if !report.history_complete {
        lines.push("Warning: history shorter than 48 months, missing months padded with zero".to_string());
    }
    lines.push(String::new());
    lines.push("Annual totals:".to_string());
    lines.push("Band | P10 | P50 | P90 | Range".to_string());
    lines.push("-----|-----|-----|-----|------".to_string());
    lines.push(format_annual_row("Mixed", &report.mixed));
    lines.push(format_annual_row("Objective", &report.objective));
    lines.push(String::new());
    lines.push("Monthly mixed forecast:".to_string());
    lines.push("Month | P10 | P50 | P90 | Regression".to_string());
    lines.push("------|-----|-----|-----|-----------".to_string());
    for (i, month) in report.months.iter().enumerate() {
        lines.push(format!(
            "{month} | {:.0} | {:.0} | {:.0} | {:.0}",
            report.mixed.p10[i], report.mixed.p50[i], report.mixed.p90[i], report.regression[i]
        ));
    }
    if !report.adjustment_summary.is_empty() {
        lines.push(String::new());
        lines.push("Adjustments:".to_string());
        for entry in &report.adjustment_summary {
            lines.push(format!("  {entry}"));
        }
    }
    if !report.opinion_summary.is_empty() {
        lines.push(String::new());
        lines.push("Opinions:".to_string());
        for entry in &report.opinion_summary {
            lines.push(format!("  {entry}"));
        }
    }

    lines.join("\n")
}

fn format_annual_row(label: &str, band: &BandReport) -> String {
    format!(
        "{label} | {:.0} | {:.0} | {:.0} | {:.0}",
        band.annual_p10, band.annual_p50, band.annual_p90, band.annual_range
    )
}
