use std::collections::HashMap;

use chrono::NaiveDate;

use crate::domain::series::{ProductSales, closed_flags};

/// Each product's share of revenue over the most recent 12 closed
/// months. Shares sum to 1; when no month is closed or the window total
/// is zero every product gets a uniform share.
pub fn product_weights_closed_12(
    products: &[ProductSales],
    series_start: NaiveDate,
    last_closed: NaiveDate,
) -> HashMap<String, f64> {
    let mut weights = HashMap::new();
    if products.is_empty() {
        return weights;
    }

    let len = products.iter().map(|p| p.monthly.len()).max().unwrap_or(0);
    let closed = closed_flags(series_start, len, last_closed);
    let closed_end = closed.iter().rposition(|c| *c);

    let uniform = 1.0 / products.len() as f64;
    let Some(closed_end) = closed_end else {
        for product in products {
            weights.insert(product.name.clone(), uniform);
        }
        return weights;
    };

    let window_start = closed_end.saturating_sub(11);
    let sums: Vec<f64> = products
        .iter()
        .map(|p| {
            p.monthly
                .iter()
                .enumerate()
                .filter(|(i, _)| *i >= window_start && *i <= closed_end)
                .map(|(_, v)| *v)
                .sum()
        })
        .collect();
    let total: f64 = sums.iter().sum();

    for (product, sum) in products.iter().zip(&sums) {
        let share = if total > 0.0 { sum / total } else { uniform };
        weights.insert(product.name.clone(), share);
    }
    weights
}
