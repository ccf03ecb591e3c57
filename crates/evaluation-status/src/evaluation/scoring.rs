use std::collections::BTreeMap;

use super::domain::{EmployeeId, ItemId};

/// One scored item entering the weighted total.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightedScore {
    pub item_id: ItemId,
    /// Percentage weight in 0..=100.
    pub weight: f64,
    pub score: f64,
}

impl WeightedScore {
    pub fn new(item_id: ItemId, weight: f64, score: f64) -> Self {
        Self {
            item_id,
            weight,
            score,
        }
    }
}

/// Scores one evaluator reported, keyed by item.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluatorScores {
    pub evaluator_id: EmployeeId,
    pub scores: BTreeMap<ItemId, f64>,
}

impl EvaluatorScores {
    pub fn new(evaluator_id: EmployeeId) -> Self {
        Self {
            evaluator_id,
            scores: BTreeMap::new(),
        }
    }

    pub fn with_score(mut self, item_id: ItemId, score: f64) -> Self {
        self.scores.insert(item_id, score);
        self
    }
}

/// Weighted aggregate `Σ(weight × score) / 100`, clamped to `[0, max_rate]`.
///
/// The weights of a partial submission are not renormalized, so submitting a subset of items
/// always totals less than the complete set with the same scores. Returns `None` for an empty
/// input.
pub fn weighted_total(entries: &[WeightedScore], max_rate: f64) -> Option<f64> {
    if entries.is_empty() {
        return None;
    }

    let weighted_sum: f64 = entries.iter().map(|entry| entry.weight * entry.score).sum();
    let total = (weighted_sum / 100.0).clamp(0.0, max_rate.max(0.0));

    Some(round_score(total))
}

/// Per-item arithmetic mean across the evaluators that scored the item.
///
/// Items nobody scored are absent from the result.
pub fn average_across_evaluators(evaluators: &[EvaluatorScores]) -> BTreeMap<ItemId, f64> {
    let mut sums: BTreeMap<ItemId, (f64, u32)> = BTreeMap::new();

    for evaluator in evaluators {
        for (item_id, score) in &evaluator.scores {
            let entry = sums.entry(item_id.clone()).or_insert((0.0, 0));
            entry.0 += score;
            entry.1 += 1;
        }
    }

    sums.into_iter()
        .map(|(item_id, (sum, count))| (item_id, sum / f64::from(count)))
        .collect()
}

/// Averages the evaluators per item, then weights the averages.
///
/// `weight_of` resolves an item's weight; unknown items weigh nothing.
pub fn multi_evaluator_total<F>(
    evaluators: &[EvaluatorScores],
    weight_of: F,
    max_rate: f64,
) -> Option<f64>
where
    F: Fn(&ItemId) -> f64,
{
    let entries: Vec<WeightedScore> = average_across_evaluators(evaluators)
        .into_iter()
        .map(|(item_id, average)| {
            let weight = weight_of(&item_id);
            WeightedScore::new(item_id, weight, average)
        })
        .collect();

    weighted_total(&entries, max_rate)
}

/// Rounds to two decimal places.
pub fn round_score(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
