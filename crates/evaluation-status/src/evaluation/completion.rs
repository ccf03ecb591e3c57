use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::domain::{
    AssignmentItem, DownwardEvaluationRecord, EmployeeId, EvaluationCriterion, EvaluatorMapping,
    ItemId, PeerEvaluationRecord, SelfEvaluationRecord,
};

/// Raw completion of a step, before approvals and revision requests are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionState {
    None,
    InProgress,
    Complete,
}

/// Completion of a step against its expected items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionAssessment {
    pub state: CompletionState,
    pub expected: usize,
    pub completed: usize,
    /// Items carried by records but absent from the expectation.
    pub outside_expected: BTreeSet<ItemId>,
}

impl CompletionAssessment {
    pub fn is_complete(&self) -> bool {
        self.state == CompletionState::Complete
    }
}

/// Completion of one secondary evaluator over the items mapped to them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluatorCompletion {
    pub evaluator_id: EmployeeId,
    pub expected_items: BTreeSet<ItemId>,
    pub assessment: CompletionAssessment,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecondaryCompletion {
    pub state: CompletionState,
    pub evaluators: Vec<EvaluatorCompletion>,
}

impl SecondaryCompletion {
    pub fn completed_evaluators(&self) -> usize {
        self.evaluators
            .iter()
            .filter(|evaluator| evaluator.assessment.is_complete())
            .count()
    }
}

pub fn expected_items(assignments: &[AssignmentItem]) -> BTreeSet<ItemId> {
    assignments
        .iter()
        .map(|assignment| assignment.item_id.clone())
        .collect()
}

/// Classifies `(item, completion marker)` pairs against the expected item set.
///
/// Any record for an expected item moves the state off `None`; records outside the expectation
/// are only collected. `Complete` requires every expected item to carry a set marker, so an empty
/// expectation never completes.
pub fn assess_items<'a, I>(expected: &BTreeSet<ItemId>, marks: I) -> CompletionAssessment
where
    I: IntoIterator<Item = (&'a ItemId, bool)>,
{
    let mut has_records = false;
    let mut completed = BTreeSet::new();
    let mut outside_expected = BTreeSet::new();

    for (item_id, marked) in marks {
        if !expected.contains(item_id) {
            outside_expected.insert(item_id.clone());
            continue;
        }
        has_records = true;
        if marked {
            completed.insert(item_id);
        }
    }

    let state = if !has_records {
        CompletionState::None
    } else if !expected.is_empty() && completed.len() == expected.len() {
        CompletionState::Complete
    } else {
        CompletionState::InProgress
    };

    CompletionAssessment {
        state,
        expected: expected.len(),
        completed: completed.len(),
        outside_expected,
    }
}

pub fn assess_criteria(
    assignments: &[AssignmentItem],
    criteria: &[EvaluationCriterion],
) -> CompletionAssessment {
    let expected = expected_items(assignments);
    assess_items(
        &expected,
        criteria
            .iter()
            .map(|criterion| (&criterion.item_id, criterion.is_defined())),
    )
}

/// Self-evaluation items count as complete once submitted to the manager.
pub fn assess_self_evaluation(
    assignments: &[AssignmentItem],
    records: &[SelfEvaluationRecord],
) -> CompletionAssessment {
    let expected = expected_items(assignments);
    assess_items(
        &expected,
        records
            .iter()
            .map(|record| (&record.item_id, record.submitted_to_manager)),
    )
}

pub fn assess_downward(
    expected: &BTreeSet<ItemId>,
    records: &[&DownwardEvaluationRecord],
) -> CompletionAssessment {
    assess_items(
        expected,
        records
            .iter()
            .map(|record| (&record.item_id, record.is_completed)),
    )
}

/// Items each mapped evaluator is expected to cover.
///
/// A mapping without an item covers the whole assignment set.
pub fn evaluator_expectations(
    assignments: &[AssignmentItem],
    mappings: &[EvaluatorMapping],
) -> BTreeMap<EmployeeId, BTreeSet<ItemId>> {
    let all_items = expected_items(assignments);
    let mut expectations: BTreeMap<EmployeeId, BTreeSet<ItemId>> = BTreeMap::new();

    for mapping in mappings {
        let items = expectations
            .entry(mapping.evaluator_id.clone())
            .or_default();
        match &mapping.item_id {
            Some(item_id) => {
                items.insert(item_id.clone());
            }
            None => items.extend(all_items.iter().cloned()),
        }
    }

    expectations
}

/// Adds evaluators that have no mapping, expecting the whole assignment set from each.
pub fn include_unmapped_evaluators<'a, I>(
    expectations: &mut BTreeMap<EmployeeId, BTreeSet<ItemId>>,
    assignments: &[AssignmentItem],
    evaluator_ids: I,
) -> usize
where
    I: IntoIterator<Item = &'a EmployeeId>,
{
    let mut added = 0;
    for evaluator_id in evaluator_ids {
        if !expectations.contains_key(evaluator_id) {
            expectations.insert(evaluator_id.clone(), expected_items(assignments));
            added += 1;
        }
    }
    added
}

/// Assesses every evaluator in `expectations` over their own items.
///
/// The step completes only when all listed evaluators are individually complete. Records from
/// evaluators outside `expectations` are ignored.
pub fn assess_secondary(
    expectations: &BTreeMap<EmployeeId, BTreeSet<ItemId>>,
    records: &[DownwardEvaluationRecord],
) -> SecondaryCompletion {
    let evaluators: Vec<EvaluatorCompletion> = expectations
        .iter()
        .map(|(evaluator_id, expected_items)| {
            let own_records: Vec<&DownwardEvaluationRecord> = records
                .iter()
                .filter(|record| &record.evaluator_id == evaluator_id)
                .collect();
            EvaluatorCompletion {
                evaluator_id: evaluator_id.clone(),
                assessment: assess_downward(expected_items, &own_records),
                expected_items: expected_items.clone(),
            }
        })
        .collect();

    let state = combine_states(evaluators.iter().map(|evaluator| evaluator.assessment.state));

    SecondaryCompletion { state, evaluators }
}

/// Peer evaluations expect exactly the requested peer records.
pub fn assess_peer(records: &[PeerEvaluationRecord]) -> CompletionAssessment {
    let completed = records.iter().filter(|record| record.is_completed).count();
    let state = if records.is_empty() {
        CompletionState::None
    } else if completed == records.len() {
        CompletionState::Complete
    } else {
        CompletionState::InProgress
    };

    CompletionAssessment {
        state,
        expected: records.len(),
        completed,
        outside_expected: BTreeSet::new(),
    }
}

fn combine_states<I>(states: I) -> CompletionState
where
    I: IntoIterator<Item = CompletionState>,
{
    let mut any = false;
    let mut all_complete = true;
    let mut all_none = true;

    for state in states {
        any = true;
        all_complete &= state == CompletionState::Complete;
        all_none &= state == CompletionState::None;
    }

    if !any || all_none {
        CompletionState::None
    } else if all_complete {
        CompletionState::Complete
    } else {
        CompletionState::InProgress
    }
}
