pub mod band_chart;
pub mod factor_resolvers;
pub mod forecast;
pub mod imputation;
pub mod model_fit;
pub mod monte_carlo;
pub mod opinion_summary;
pub mod percentiles;
pub mod product_weights;
pub mod quantile_forecast;
pub mod report_types;
pub mod residuals;
pub mod smoothing;
pub mod workbook_yaml;
