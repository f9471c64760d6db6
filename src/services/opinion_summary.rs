use chrono::NaiveDate;
use std::collections::BTreeMap;

use crate::domain::adjustments::OpinionFactor;

/// One-line digest of the latest opinion per stakeholder, e.g.
/// `Sato +20% (0.80): promo ends`. Stakeholders are listed in name
/// order so the summary is stable across runs.
pub fn summarize_latest(opinions: &[OpinionFactor]) -> String {
    let mut latest: BTreeMap<&str, &OpinionFactor> = BTreeMap::new();
    for opinion in opinions {
        latest
            .entry(opinion.person.as_str())
            .and_modify(|current| {
                if current.effective_month < opinion.effective_month {
                    *current = opinion;
                }
            })
            .or_insert(opinion);
    }

    latest
        .values()
        .map(|o| format_entry(o, true))
        .collect::<Vec<_>>()
        .join(" / ")
}

/// Per forecast month: the latest noted opinion of each stakeholder
/// whose opinion is effective by that month.
pub fn summarize_by_month(opinions: &[OpinionFactor], months: &[NaiveDate]) -> Vec<String> {
    months
        .iter()
        .map(|month| {
            let mut latest: BTreeMap<&str, &OpinionFactor> = BTreeMap::new();
            for opinion in opinions {
                if opinion.effective_month > *month || opinion.note.trim().is_empty() {
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
            latest
                .values()
                .map(|o| format_entry(o, false))
                .collect::<Vec<_>>()
                .join(" / ")
        })
        .collect()
}

fn format_entry(opinion: &OpinionFactor, with_note: bool) -> String {
    let pct = (opinion.step * 100.0).round() as i64;
    let sign = if pct > 0 { "+" } else { "" };
    let mut entry = format!("{} {sign}{pct}% ({:.2})", opinion.person, opinion.confidence);
    if with_note && !opinion.note.trim().is_empty() {
        entry.push_str(": ");
        entry.push_str(opinion.note.trim());
    }
    entry
}
