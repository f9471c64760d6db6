use chrono::NaiveDate;

/// A product-level trend adjustment: "this product looks like it will
/// move by `step` from `effective_month` onward".
#[derive(Debug, Clone, PartialEq)]
pub struct ProductFactor {
    pub person: String,
    pub product: String,
    pub effective_month: NaiveDate,
    /// Fractional rate, e.g. -0.30 for an expected 30% decline.
    pub step: f64,
    pub reason: String,
}

/// A client-level trend adjustment applied to the whole entity.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientFactor {
    pub person: String,
    pub effective_month: NaiveDate,
    pub step: f64,
    pub reason: String,
}

/// A stakeholder opinion. Unlike the factor records it is not applied
/// verbatim: the simulator jitters it per trial and weights it by the
/// stated confidence.
#[derive(Debug, Clone, PartialEq)]
pub struct OpinionFactor {
    pub person: String,
    pub effective_month: NaiveDate,
    pub step: f64,
    /// In [0, 1]; 1 means the opinion is fully trusted.
    pub confidence: f64,
    pub note: String,
}

/// A committed one-off amount (spot development, spot event). Added as
/// `amount * confidence` to its month, outside the stochastic model.
#[derive(Debug, Clone, PartialEq)]
pub struct FixedItem {
    pub person: Option<String>,
    pub month: NaiveDate,
    pub project: String,
    pub amount: f64,
    pub confidence: f64,
}

/// Variant tag shared by the three adjustment families. Ingestion uses
/// it to report which table a malformed row came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdjustmentKind {
    Product,
    Client,
    Opinion,
}

impl AdjustmentKind {
    pub fn table_name(&self) -> &'static str {
        match self {
            AdjustmentKind::Product => "product_factors",
            AdjustmentKind::Client => "client_factors",
            AdjustmentKind::Opinion => "opinions",
        }
    }
}
