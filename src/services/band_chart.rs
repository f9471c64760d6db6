use plotters::prelude::*;
use thiserror::Error;

use crate::domain::model::PercentileBand;

#[derive(Error, Debug)]
pub enum BandChartError {
    #[error("failed to render chart: {0}")]
    Render(String),
}

/// Renders the p10/p50/p90 band and the regression reference as line
/// series over the twelve forecast months.
pub fn write_band_chart_png(
    path: &str,
    title: &str,
    months: &[String],
    band: &PercentileBand,
    regression: &[f64],
) -> Result<(), BandChartError> {
    let root = BitMapBackend::new(path, (1024, 640)).into_drawing_area();
    root.fill(&WHITE)
        .map_err(|e| BandChartError::Render(e.to_string()))?;

    let y_max = band
        .p90
        .iter()
        .chain(regression.iter())
        .cloned()
        .fold(0.0_f64, f64::max)
        .max(1.0)
        * 1.1;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 28))
        .margin(12)
        .x_label_area_size(48)
        .y_label_area_size(72)
        .build_cartesian_2d(0usize..months.len().saturating_sub(1).max(1), 0.0..y_max)
        .map_err(|e| BandChartError::Render(e.to_string()))?;

    chart
        .configure_mesh()
        .x_labels(months.len())
        .x_label_formatter(&|i| months.get(*i).cloned().unwrap_or_default())
        .y_desc("revenue")
        .draw()
        .map_err(|e| BandChartError::Render(e.to_string()))?;

    let series: [(&[f64], RGBColor, &str); 4] = [
        (&band.p10, RED, "p10"),
        (&band.p50, RGBColor(224, 160, 0), "p50"),
        (&band.p90, BLUE, "p90"),
        (regression, RGBColor(128, 128, 128), "regression"),
    ];
    for (values, color, label) in series {
        chart
            .draw_series(LineSeries::new(
                values.iter().cloned().enumerate(),
                color.stroke_width(2),
            ))
            .map_err(|e| BandChartError::Render(e.to_string()))?
            .label(label)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 18, y)], color));
    }

    chart
        .configure_series_labels()
        .border_style(BLACK)
        .background_style(WHITE.mix(0.8))
        .draw()
        .map_err(|e| BandChartError::Render(e.to_string()))?;

    root.present()
        .map_err(|e| BandChartError::Render(e.to_string()))?;
    Ok(())
}
