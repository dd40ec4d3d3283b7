use crate::models::Insight;
use std::collections::HashSet;

/// Canonical dedup key: rendered text, lowercased, non-alphanumerics
/// stripped. Insights that read the same are the same, regardless of which
/// generator produced them.
fn canonical_key(insight: &Insight) -> String {
    insight
        .title
        .chars()
        .chain(insight.message.chars())
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Collapse near-identical insights, keeping the first occurrence per key
/// and preserving relative order otherwise. Idempotent.
pub fn dedupe(insights: Vec<Insight>) -> Vec<Insight> {
    let mut seen = HashSet::new();
    insights
        .into_iter()
        .filter(|insight| seen.insert(canonical_key(insight)))
        .collect()
}

/// Stable sort, descending: priority tier first, category weight as the
/// tiebreak. Insights equal on both keys keep their original order.
pub fn prioritize(mut insights: Vec<Insight>) -> Vec<Insight> {
    insights.sort_by(|a, b| {
        b.priority
            .weight()
            .cmp(&a.priority.weight())
            .then_with(|| b.category.weight().cmp(&a.category.weight()))
    });
    insights
}

/// Hard cap on the insights shown per dashboard load.
pub fn select(mut insights: Vec<Insight>, cap: usize) -> Vec<Insight> {
    insights.truncate(cap);
    insights
}
