//! Per-employee status and score reporting for an evaluation period.
//!
//! Raw submissions are classified per step, merged with the stored approval value and any
//! revision requests, and scored against the period's weights, score cap and grade bands.

pub mod completion;
mod config;
pub mod domain;
pub mod grading;
pub mod overlay;
pub mod report;
pub mod repository;
pub mod scoring;
pub mod service;
pub mod snapshot;

#[cfg(test)]
mod tests;

pub use completion::CompletionState;
pub use config::{StatusConfig, DEFAULT_ROSTER_CONCURRENCY};
pub use domain::{
    ApprovalStatus, AssignmentItem, DownwardEvaluationRecord, DownwardEvaluationType, EmployeeId,
    EvaluationCriterion, EvaluationLine, EvaluationPeriod, EvaluationStep, EvaluatorMapping,
    GradeBand, ItemId, MappingId, PeerEvaluationRecord, PeriodEmployeeMapping, PeriodGradeConfig,
    PeriodId, ProjectId, RecipientType, RevisionRequest, RevisionRequestId,
    RevisionRequestRecipient, SelfEvaluationRecord, StepApproval,
};
pub use grading::GradeScale;
pub use overlay::{reduce_statuses, resolve_step_status, RevisionState, StepStatus};
pub use report::{
    write_roster_csv, AnomalyKind, DataAnomaly, EmployeeStatusReport, EvaluatorStatusView,
    PeriodRoster, StepReport,
};
pub use repository::{EvaluationSource, RepositoryError};
pub use service::{PeriodStatusService, StatusError};
pub use snapshot::{PeriodSnapshot, SnapshotError, SnapshotStore};
