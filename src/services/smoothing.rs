use crate::domain::model::ForecastConfig;
use crate::services::percentiles;

/// Dampens single-month outliers while leaving recurring seasonal
/// swings alone.
///
/// A month is only touched when its ratio to the trailing 12-month
/// average falls outside the spike-clip bounds AND outside its
/// calendar-month acceptance band (median ± k·MAD of that bucket's
/// ratios). The second condition is what protects legitimate seasonal
/// extremes from being flattened.
pub fn smooth_seasonal_aware(series: &[f64], config: &ForecastConfig) -> Vec<f64> {
    let n = series.len();
    let base = trailing_average_base(series);

    // Ratio distribution per calendar-month bucket.
    let mut ratios_by_bucket: [Vec<f64>; 12] = Default::default();
    for i in 0..n {
        let ratio = if base[i] > 0.0 { series[i] / base[i] } else { 1.0 };
        if ratio.is_finite() && ratio > 0.0 {
            ratios_by_bucket[i % 12].push(ratio);
        }
    }

    let mut medians = [1.0; 12];
    let mut mads = [0.05; 12];
    for bucket in 0..12 {
        let ratios = &ratios_by_bucket[bucket];
        if ratios.is_empty() {
            continue;
        }
        medians[bucket] = percentiles::value(ratios, 0.5);

        let deviations: Vec<f64> = ratios.iter().map(|r| (r - medians[bucket]).abs()).collect();
        let mad = percentiles::value(&deviations, 0.5);
        // Floor keeps the acceptance band from collapsing to a point.
        mads[bucket] = mad.max(0.05);
    }

    let mut out = series.to_vec();
    for i in 0..n {
        if base[i] <= 0.0 {
            continue;
        }
        let ratio = out[i] / base[i];
        if !ratio.is_finite() || ratio <= 0.0 {
            continue;
        }
        if ratio >= config.spike_clip_min && ratio <= config.spike_clip_max {
            continue;
        }

        let bucket = i % 12;
        let lo = (medians[bucket] - config.seasonal_mad_k * mads[bucket]).max(0.30);
        let hi = (medians[bucket] + config.seasonal_mad_k * mads[bucket]).max(lo + 0.05);

        // Inside the seasonal band: a recurring extreme, not a spike.
        if ratio >= lo && ratio <= hi {
            continue;
        }

        out[i] = base[i] * ratio.clamp(config.spike_clip_min, config.spike_clip_max);
    }
    out
}

/// Trailing 12-month average of the preceding months, excluding the
/// month itself; falls back to the raw value when nothing precedes it.
fn trailing_average_base(series: &[f64]) -> Vec<f64> {
    let n = series.len();
    let mut base = vec![0.0; n];
    for i in 0..n {
        let start = i.saturating_sub(12);
        let window = &series[start..i];
        base[i] = if window.is_empty() {
            series[i]
        } else {
            window.iter().sum::<f64>() / window.len() as f64
        };
    }
    base
}
