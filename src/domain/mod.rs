pub mod adjustments;
pub mod model;
pub mod series;
