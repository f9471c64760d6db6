use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use rand::Rng;

use crate::domain::adjustments::{ClientFactor, OpinionFactor, ProductFactor};

/// Spread of the per-trial opinion jitter: one of -5%, 0, +5% added to
/// the stakeholder's step before confidence weighting.
const OPINION_JITTER: f64 = 0.05;

/// Product-level multiplier for one forecast month: each product's
/// steps effective by then are summed, weighted by that product's
/// revenue share, and folded into `1 + Σ(weight · step)`, floored at 0.
pub fn product_multiplier(
    factors: &[ProductFactor],
    target_month: NaiveDate,
    weights: &HashMap<String, f64>,
) -> f64 {
    if factors.is_empty() {
        return 1.0;
    }

    // Name order keeps the float summation deterministic.
    let mut step_by_product: BTreeMap<&str, f64> = BTreeMap::new();
    for factor in factors {
        if factor.effective_month > target_month || !factor.step.is_finite() {
            continue;
        }
        *step_by_product.entry(factor.product.as_str()).or_insert(0.0) += factor.step;
    }
    if step_by_product.is_empty() {
        return 1.0;
    }

    let weighted_step: f64 = step_by_product
        .iter()
        .map(|(product, step)| weights.get(*product).copied().unwrap_or(0.0) * step)
        .sum();

    (1.0 + weighted_step).max(0.0)
}

/// Client-level multiplier: unweighted sum of the steps effective by
/// the target month, floored at 0.
pub fn client_multiplier(factors: &[ClientFactor], target_month: NaiveDate) -> f64 {
    let step: f64 = factors
        .iter()
        .filter(|f| f.effective_month <= target_month && f.step.is_finite())
        .map(|f| f.step)
        .sum();
    (1.0 + step).max(0.0)
}

/// Opinion multiplier, resampled per simulation trial. Takes each
/// stakeholder's most recent opinion effective by the target month,
/// jitters its step, weights it by confidence and combines the
/// stakeholders multiplicatively so no single opinion can cancel
/// another outright.
pub fn sample_opinion_multiplier<R: Rng + ?Sized>(
    opinions: &[OpinionFactor],
    target_month: NaiveDate,
    rng: &mut R,
) -> f64 {
    // Name order so the jitter draws land on the same stakeholders for
    // a given RNG stream.
    let mut latest: BTreeMap<&str, &OpinionFactor> = BTreeMap::new();
    for opinion in opinions {
        if opinion.effective_month > target_month {
            continue;
        }
        latest
            .entry(opinion.person.as_str())
            .and_modify(|current| {
                if current.effective_month < opinion.effective_month {
                    *current = opinion;
                }
            })
            .or_insert(opinion);
    }

    let mut multiplier = 1.0;
    for opinion in latest.values() {
        let jitter = (rng.gen_range(0..3) as f64 - 1.0) * OPINION_JITTER;
        multiplier *= 1.0 + (opinion.step + jitter) * opinion.confidence;
    }
    multiplier
}
