use std::io;

use chrono::NaiveDate;
use serde::Deserialize;
use thiserror::Error;

use crate::domain::adjustments::{
    AdjustmentKind, ClientFactor, FixedItem, OpinionFactor, ProductFactor,
};
use crate::domain::series::{HISTORY_MONTHS, ProductSales, SalesHistory};

/// Parsed and validated forecast inputs, one file per client.
///
/// Row policy, preserved from the sheet-based workflow: a row missing
/// any required field is treated as absent and silently dropped, while
/// a filled-in row carrying an uninterpretable value fails the whole
/// run before the engine starts.
#[derive(Debug, Clone, PartialEq)]
pub struct Workbook {
    pub client: String,
    pub fiscal_year: i32,
    pub sales: SalesHistory,
    pub product_factors: Vec<ProductFactor>,
    pub client_factors: Vec<ClientFactor>,
    pub opinions: Vec<OpinionFactor>,
    pub fixed_items: Vec<FixedItem>,
}

#[derive(Error, Debug)]
pub enum WorkbookError {
    #[error("failed to read workbook file: {0}")]
    Read(#[from] io::Error),
    #[error("failed to parse workbook yaml: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("workbook has no products")]
    NoProducts,
    #[error("product {product:?} has {len} monthly values, more than the {HISTORY_MONTHS} supported")]
    SeriesTooLong { product: String, len: usize },
    #[error("product {product:?} month {month}: revenue {value} is not a usable amount")]
    BadRevenueValue {
        product: String,
        month: usize,
        value: f64,
    },
    #[error("{table} row {row}: date {value:?} is not a valid yyyy-mm-dd date")]
    BadDate {
        table: &'static str,
        row: usize,
        value: String,
    },
    #[error("{table} row {row}: step {value:?} cannot be interpreted as a rate")]
    BadStep {
        table: &'static str,
        row: usize,
        value: String,
    },
    #[error("{table} row {row}: step {value} is implausibly large")]
    StepOutOfRange {
        table: &'static str,
        row: usize,
        value: f64,
    },
    #[error("{table} row {row}: confidence {value} is outside 0..1")]
    BadConfidence {
        table: &'static str,
        row: usize,
        value: f64,
    },
    #[error("fixed_items row {row}: amount {value} is not a usable amount")]
    BadAmount { row: usize, value: f64 },
}

/// A rate that may be written as a fraction, a bare percent number or a
/// percent string; `-0.30`, `-30` and `"-30%"` all mean the same thing.
#[derive(Deserialize, Debug, Clone)]
#[serde(untagged)]
enum StepValue {
    Number(f64),
    Text(String),
}

#[derive(Deserialize)]
struct WorkbookRecord {
    client: String,
    fiscal_year: i32,
    products: Vec<ProductRecord>,
    #[serde(default)]
    product_factors: Vec<ProductFactorRecord>,
    #[serde(default)]
    client_factors: Vec<ClientFactorRecord>,
    #[serde(default)]
    opinions: Vec<OpinionRecord>,
    #[serde(default)]
    fixed_items: Vec<FixedItemRecord>,
}

#[derive(Deserialize)]
struct ProductRecord {
    name: String,
    monthly: Vec<f64>,
}

#[derive(Deserialize)]
struct ProductFactorRecord {
    person: Option<String>,
    product: Option<String>,
    effective_month: Option<String>,
    step: Option<StepValue>,
    reason: Option<String>,
}

#[derive(Deserialize)]
struct ClientFactorRecord {
    person: Option<String>,
    effective_month: Option<String>,
    step: Option<StepValue>,
    reason: Option<String>,
}

#[derive(Deserialize)]
struct OpinionRecord {
    person: Option<String>,
    effective_month: Option<String>,
    step: Option<StepValue>,
    confidence: Option<f64>,
    note: Option<String>,
}

#[derive(Deserialize)]
struct FixedItemRecord {
    person: Option<String>,
    month: Option<String>,
    project: Option<String>,
    amount: Option<f64>,
    confidence: Option<f64>,
}

pub fn load_workbook_from_yaml_file(path: &str) -> Result<Workbook, WorkbookError> {
    let contents = std::fs::read_to_string(path)?;
    deserialize_workbook_from_yaml_str(&contents)
}

pub fn deserialize_workbook_from_yaml_str(input: &str) -> Result<Workbook, WorkbookError> {
    let record: WorkbookRecord = serde_yaml::from_str(input)?;
    if record.products.is_empty() {
        return Err(WorkbookError::NoProducts);
    }

    let sales = resolve_sales(record.products)?;
    let product_factors = resolve_product_factors(&record.product_factors)?;
    let client_factors = resolve_client_factors(&record.client_factors)?;
    let opinions = resolve_opinions(&record.opinions)?;
    let fixed_items = resolve_fixed_items(&record.fixed_items)?;

    Ok(Workbook {
        client: record.client.trim().to_string(),
        fiscal_year: record.fiscal_year,
        sales,
        product_factors,
        client_factors,
        opinions,
        fixed_items,
    })
}

fn resolve_sales(records: Vec<ProductRecord>) -> Result<SalesHistory, WorkbookError> {
    let mut products = Vec::with_capacity(records.len());
    let mut complete_48 = true;

    for record in records {
        let name = record.name.trim().to_string();
        if name.is_empty() {
            continue;
        }
        if record.monthly.len() > HISTORY_MONTHS {
            return Err(WorkbookError::SeriesTooLong {
                product: name,
                len: record.monthly.len(),
            });
        }
        for (month, value) in record.monthly.iter().enumerate() {
            if !value.is_finite() || *value < 0.0 {
                return Err(WorkbookError::BadRevenueValue {
                    product: name,
                    month,
                    value: *value,
                });
            }
        }
        if record.monthly.len() < HISTORY_MONTHS {
            complete_48 = false;
        }

        let mut monthly = record.monthly;
        monthly.resize(HISTORY_MONTHS, 0.0);
        products.push(ProductSales { name, monthly });
    }

    if products.is_empty() {
        return Err(WorkbookError::NoProducts);
    }
    Ok(SalesHistory {
        products,
        complete_48,
    })
}

fn resolve_product_factors(
    records: &[ProductFactorRecord],
) -> Result<Vec<ProductFactor>, WorkbookError> {
    let table = AdjustmentKind::Product.table_name();
    let mut factors = Vec::new();
    for (row, record) in records.iter().enumerate() {
        let (Some(person), Some(product), Some(month), Some(step)) = (
            present(record.person.as_deref()),
            present(record.product.as_deref()),
            present(record.effective_month.as_deref()),
            present_step(record.step.as_ref()),
        ) else {
            continue;
        };

        factors.push(ProductFactor {
            person: person.to_string(),
            product: product.to_string(),
            effective_month: parse_month(table, row, month)?,
            step: parse_step(table, row, step)?,
            reason: record.reason.clone().unwrap_or_default().trim().to_string(),
        });
    }
    Ok(factors)
}

fn resolve_client_factors(
    records: &[ClientFactorRecord],
) -> Result<Vec<ClientFactor>, WorkbookError> {
    let table = AdjustmentKind::Client.table_name();
    let mut factors = Vec::new();
    for (row, record) in records.iter().enumerate() {
        let (Some(person), Some(month), Some(step)) = (
            present(record.person.as_deref()),
            present(record.effective_month.as_deref()),
            present_step(record.step.as_ref()),
        ) else {
            continue;
        };

        factors.push(ClientFactor {
            person: person.to_string(),
            effective_month: parse_month(table, row, month)?,
            step: parse_step(table, row, step)?,
            reason: record.reason.clone().unwrap_or_default().trim().to_string(),
        });
    }
    Ok(factors)
}

fn resolve_opinions(records: &[OpinionRecord]) -> Result<Vec<OpinionFactor>, WorkbookError> {
    let table = AdjustmentKind::Opinion.table_name();
    let mut opinions = Vec::new();
    for (row, record) in records.iter().enumerate() {
        let (Some(person), Some(month), Some(step), Some(confidence)) = (
            present(record.person.as_deref()),
            present(record.effective_month.as_deref()),
            present_step(record.step.as_ref()),
            record.confidence,
        ) else {
            continue;
        };

        if !(0.0..=1.0).contains(&confidence) || !confidence.is_finite() {
            return Err(WorkbookError::BadConfidence {
                table,
                row,
                value: confidence,
            });
        }

        opinions.push(OpinionFactor {
            person: person.to_string(),
            effective_month: parse_month(table, row, month)?,
            step: parse_step(table, row, step)?,
            confidence,
            note: record.note.clone().unwrap_or_default().trim().to_string(),
        });
    }
    Ok(opinions)
}

fn resolve_fixed_items(records: &[FixedItemRecord]) -> Result<Vec<FixedItem>, WorkbookError> {
    let mut items = Vec::new();
    for (row, record) in records.iter().enumerate() {
        let (Some(month), Some(amount), Some(confidence)) = (
            present(record.month.as_deref()),
            record.amount,
            record.confidence,
        ) else {
            continue;
        };

        if !amount.is_finite() || amount < 0.0 {
            return Err(WorkbookError::BadAmount { row, value: amount });
        }
        if !(0.0..=1.0).contains(&confidence) || !confidence.is_finite() {
            return Err(WorkbookError::BadConfidence {
                table: "fixed_items",
                row,
                value: confidence,
            });
        }
        if amount == 0.0 {
            continue;
        }

        items.push(FixedItem {
            person: present(record.person.as_deref()).map(str::to_string),
            month: parse_month("fixed_items", row, month)?,
            project: record
                .project
                .clone()
                .unwrap_or_default()
                .trim()
                .to_string(),
            amount,
            confidence,
        });
    }
    Ok(items)
}

/// A blank or whitespace-only value counts as missing, not malformed.
fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn present_step(value: Option<&StepValue>) -> Option<&StepValue> {
    match value {
        Some(StepValue::Text(s)) if s.trim().is_empty() => None,
        other => other,
    }
}

fn parse_month(table: &'static str, row: usize, value: &str) -> Result<NaiveDate, WorkbookError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(value, "%Y/%m/%d"))
        .map_err(|_| WorkbookError::BadDate {
            table,
            row,
            value: value.to_string(),
        })
}

fn parse_step(table: &'static str, row: usize, value: &StepValue) -> Result<f64, WorkbookError> {
    let rate = match value {
        StepValue::Number(n) => {
            if !n.is_finite() {
                return Err(WorkbookError::BadStep {
                    table,
                    row,
                    value: n.to_string(),
                });
            }
            normalize_rate(*n)
        }
        StepValue::Text(raw) => {
            let cleaned: String = raw
                .trim()
                .chars()
                .filter(|c| !c.is_whitespace() && *c != ',')
                .map(|c| if c == '％' { '%' } else { c })
                .collect();
            let parsed = if let Some(number) = cleaned.strip_suffix('%') {
                number.parse::<f64>().ok().map(|n| n / 100.0)
            } else {
                cleaned.parse::<f64>().ok().map(normalize_rate)
            };
            parsed.filter(|n| n.is_finite()).ok_or_else(|| {
                WorkbookError::BadStep {
                    table,
                    row,
                    value: raw.clone(),
                }
            })?
        }
    };

    if rate.abs() > 5.0 {
        return Err(WorkbookError::StepOutOfRange {
            table,
            row,
            value: rate,
        });
    }
    Ok(rate)
}

/// Bare numbers above 1 in magnitude are read as percent (`-30` means
/// -30%), anything else as a fraction.
fn normalize_rate(value: f64) -> f64 {
    if value.abs() > 1.0 { value / 100.0 } else { value }
}
