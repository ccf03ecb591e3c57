use serde::{Deserialize, Serialize};

use super::completion::CompletionState;
use super::domain::{ApprovalStatus, EmployeeId, RevisionRequestRecipient};

/// Reported status of a step after approvals and revision requests are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    None,
    InProgress,
    Complete,
    Pending,
    Approved,
    RevisionRequested,
    RevisionCompleted,
}

impl StepStatus {
    pub const fn label(self) -> &'static str {
        match self {
            StepStatus::None => "none",
            StepStatus::InProgress => "in_progress",
            StepStatus::Complete => "complete",
            StepStatus::Pending => "pending",
            StepStatus::Approved => "approved",
            StepStatus::RevisionRequested => "revision_requested",
            StepStatus::RevisionCompleted => "revision_completed",
        }
    }
}

impl From<CompletionState> for StepStatus {
    fn from(value: CompletionState) -> Self {
        match value {
            CompletionState::None => StepStatus::None,
            CompletionState::InProgress => StepStatus::InProgress,
            CompletionState::Complete => StepStatus::Complete,
        }
    }
}

/// Open/completed revision recipients relevant to one status decision.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RevisionState {
    pub has_open: bool,
    pub has_completed: bool,
}

impl RevisionState {
    pub fn from_recipients<'a, I>(recipients: I) -> Self
    where
        I: IntoIterator<Item = &'a RevisionRequestRecipient>,
    {
        recipients
            .into_iter()
            .fold(Self::default(), |state, recipient| Self {
                has_open: state.has_open || !recipient.is_completed,
                has_completed: state.has_completed || recipient.is_completed,
            })
    }

    /// Restricts the recipients to one person before folding.
    pub fn for_recipient(
        recipients: &[RevisionRequestRecipient],
        recipient_id: &EmployeeId,
    ) -> Self {
        Self::from_recipients(
            recipients
                .iter()
                .filter(|recipient| &recipient.recipient_id == recipient_id),
        )
    }
}

/// Merges raw completion, the stored approval value and revision state into one status.
///
/// Rules apply in order and the first match wins:
/// 1. an open revision recipient yields `RevisionRequested`;
/// 2. a completed recipient with a stored `RevisionCompleted` yields `RevisionCompleted`;
/// 3. a stored `Approved` is trusted as-is;
/// 4. complete raw work awaits a decision as `Pending`, with or without an approval row;
/// 5. anything else reports the raw completion.
pub fn resolve_step_status(
    completion: CompletionState,
    approval: Option<ApprovalStatus>,
    revision: RevisionState,
) -> StepStatus {
    if revision.has_open {
        return StepStatus::RevisionRequested;
    }

    match approval {
        Some(ApprovalStatus::RevisionCompleted) if revision.has_completed => {
            StepStatus::RevisionCompleted
        }
        Some(ApprovalStatus::Approved) => StepStatus::Approved,
        _ if completion == CompletionState::Complete => StepStatus::Pending,
        _ => completion.into(),
    }
}

/// Reduces per-evaluator statuses into one step status.
///
/// Any revision request dominates; unanimous approval approves; unfinished work keeps the step
/// in progress; finished redos surface as `RevisionCompleted`; everything else awaits approval.
pub fn reduce_statuses<I>(statuses: I) -> StepStatus
where
    I: IntoIterator<Item = StepStatus>,
{
    let statuses: Vec<StepStatus> = statuses.into_iter().collect();

    if statuses.is_empty() {
        return StepStatus::None;
    }
    if statuses.contains(&StepStatus::RevisionRequested) {
        return StepStatus::RevisionRequested;
    }
    if statuses.iter().all(|status| *status == StepStatus::Approved) {
        return StepStatus::Approved;
    }
    if statuses.iter().all(|status| *status == StepStatus::None) {
        return StepStatus::None;
    }
    if statuses
        .iter()
        .any(|status| matches!(status, StepStatus::InProgress | StepStatus::None))
    {
        return StepStatus::InProgress;
    }
    if statuses.contains(&StepStatus::RevisionCompleted) {
        return StepStatus::RevisionCompleted;
    }

    StepStatus::Pending
}
