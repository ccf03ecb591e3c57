use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(
    /// Identifier of an evaluation period.
    PeriodId
);
string_id!(
    /// Identifier of an employee. Evaluators and revision recipients are employees too.
    EmployeeId
);
string_id!(
    /// Identifier of an assigned work item.
    ItemId
);
string_id!(ProjectId);
string_id!(
    /// Identifier of the (period, employee) enrollment that keys step approvals.
    MappingId
);
string_id!(RevisionRequestId);

/// Evaluation steps tracked for every enrolled employee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationStep {
    CriteriaSetup,
    SelfEvaluation,
    PrimaryDownward,
    SecondaryDownward,
    PeerEvaluation,
}

impl EvaluationStep {
    pub const fn label(self) -> &'static str {
        match self {
            EvaluationStep::CriteriaSetup => "criteria_setup",
            EvaluationStep::SelfEvaluation => "self_evaluation",
            EvaluationStep::PrimaryDownward => "primary_downward_evaluation",
            EvaluationStep::SecondaryDownward => "secondary_downward_evaluation",
            EvaluationStep::PeerEvaluation => "peer_evaluation",
        }
    }

    pub fn ordered() -> [EvaluationStep; 5] {
        [
            EvaluationStep::CriteriaSetup,
            EvaluationStep::SelfEvaluation,
            EvaluationStep::PrimaryDownward,
            EvaluationStep::SecondaryDownward,
            EvaluationStep::PeerEvaluation,
        ]
    }
}

/// Unit of work assigned to an employee for a period, carrying its evaluation weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignmentItem {
    pub item_id: ItemId,
    pub employee_id: EmployeeId,
    pub period_id: PeriodId,
    pub project_id: ProjectId,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub display_order: u32,
}

/// Evaluation criterion written for one assigned item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationCriterion {
    pub item_id: ItemId,
    pub employee_id: EmployeeId,
    pub period_id: PeriodId,
    pub content: String,
}

impl EvaluationCriterion {
    pub fn is_defined(&self) -> bool {
        !self.content.trim().is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelfEvaluationRecord {
    pub item_id: ItemId,
    pub employee_id: EmployeeId,
    pub period_id: PeriodId,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub submitted_to_evaluator: bool,
    #[serde(default)]
    pub submitted_to_manager: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DownwardEvaluationType {
    Primary,
    Secondary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownwardEvaluationRecord {
    pub item_id: ItemId,
    pub employee_id: EmployeeId,
    pub evaluator_id: EmployeeId,
    pub period_id: PeriodId,
    pub evaluation_type: DownwardEvaluationType,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub is_completed: bool,
}

/// Evaluator line an evaluator mapping belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationLine {
    Primary,
    Secondary,
}

/// Assigns an evaluator to an employee, optionally scoped to one item.
///
/// A mapping without `item_id` covers every assigned item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluatorMapping {
    pub period_id: PeriodId,
    pub employee_id: EmployeeId,
    pub evaluator_id: EmployeeId,
    pub line: EvaluationLine,
    #[serde(default)]
    pub item_id: Option<ItemId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerEvaluationRecord {
    pub employee_id: EmployeeId,
    pub evaluator_id: EmployeeId,
    pub period_id: PeriodId,
    #[serde(default)]
    pub is_completed: bool,
}

/// Enrollment of an employee in a period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodEmployeeMapping {
    pub id: MappingId,
    pub period_id: PeriodId,
    pub employee_id: EmployeeId,
}

/// Administrator sign-off value stored per step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    #[default]
    Pending,
    Approved,
    RevisionRequested,
    RevisionCompleted,
}

impl ApprovalStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ApprovalStatus::Pending => "pending",
            ApprovalStatus::Approved => "approved",
            ApprovalStatus::RevisionRequested => "revision_requested",
            ApprovalStatus::RevisionCompleted => "revision_completed",
        }
    }
}

/// Approval row for one (period, employee) enrollment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepApproval {
    pub mapping_id: MappingId,
    #[serde(default)]
    pub criteria_setup: ApprovalStatus,
    #[serde(default)]
    pub self_evaluation: ApprovalStatus,
    #[serde(default)]
    pub primary_downward: ApprovalStatus,
    #[serde(default)]
    pub secondary_downward: ApprovalStatus,
    /// Per-evaluator overrides of `secondary_downward`.
    #[serde(default)]
    pub secondary_by_evaluator: BTreeMap<EmployeeId, ApprovalStatus>,
    #[serde(default)]
    pub approved_by: Option<EmployeeId>,
    #[serde(default)]
    pub approved_at: Option<DateTime<Utc>>,
}

impl StepApproval {
    pub fn status_for(&self, step: EvaluationStep) -> Option<ApprovalStatus> {
        match step {
            EvaluationStep::CriteriaSetup => Some(self.criteria_setup),
            EvaluationStep::SelfEvaluation => Some(self.self_evaluation),
            EvaluationStep::PrimaryDownward => Some(self.primary_downward),
            EvaluationStep::SecondaryDownward => Some(self.secondary_downward),
            EvaluationStep::PeerEvaluation => None,
        }
    }

    pub fn secondary_status_for(&self, evaluator_id: &EmployeeId) -> ApprovalStatus {
        self.secondary_by_evaluator
            .get(evaluator_id)
            .copied()
            .unwrap_or(self.secondary_downward)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecipientType {
    Evaluatee,
    PrimaryEvaluator,
    SecondaryEvaluator,
}

/// Request instructing one or more recipients to redo a step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevisionRequest {
    pub id: RevisionRequestId,
    pub period_id: PeriodId,
    pub employee_id: EmployeeId,
    pub step: EvaluationStep,
    pub comment: String,
    pub requested_by: EmployeeId,
    pub requested_at: DateTime<Utc>,
    pub recipients: Vec<RevisionRequestRecipient>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevisionRequestRecipient {
    pub request_id: RevisionRequestId,
    pub recipient_id: EmployeeId,
    pub recipient_type: RecipientType,
    #[serde(default)]
    pub is_read: bool,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub response_comment: Option<String>,
}

/// Period-specific numeric range mapped to a letter grade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeBand {
    pub grade: String,
    pub min_range: f64,
    pub max_range: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationPeriod {
    pub id: PeriodId,
    #[serde(default)]
    pub name: String,
    pub max_self_evaluation_rate: f64,
    #[serde(default)]
    pub grade_bands: Vec<GradeBand>,
}

impl EvaluationPeriod {
    pub fn grade_config(&self) -> PeriodGradeConfig {
        PeriodGradeConfig {
            max_rate: self.max_self_evaluation_rate,
            bands: self.grade_bands.clone(),
        }
    }
}

/// Score cap and grade bands resolved for a period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodGradeConfig {
    pub max_rate: f64,
    pub bands: Vec<GradeBand>,
}
