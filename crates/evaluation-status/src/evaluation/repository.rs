use async_trait::async_trait;

use super::domain::{
    AssignmentItem, DownwardEvaluationRecord, DownwardEvaluationType, EmployeeId,
    EvaluationCriterion, EvaluationLine, EvaluationStep, EvaluatorMapping, MappingId,
    PeerEvaluationRecord, PeriodEmployeeMapping, PeriodGradeConfig, PeriodId,
    RevisionRequestRecipient, SelfEvaluationRecord, StepApproval,
};

/// Read-only access to the records owned by the submission, approval and assignment
/// subsystems, scoped to one period and employee.
#[async_trait]
pub trait EvaluationSource: Send + Sync {
    async fn fetch_period_employees(
        &self,
        period_id: &PeriodId,
    ) -> Result<Vec<EmployeeId>, RepositoryError>;

    async fn fetch_period_mapping(
        &self,
        period_id: &PeriodId,
        employee_id: &EmployeeId,
    ) -> Result<Option<PeriodEmployeeMapping>, RepositoryError>;

    async fn fetch_assignments(
        &self,
        period_id: &PeriodId,
        employee_id: &EmployeeId,
    ) -> Result<Vec<AssignmentItem>, RepositoryError>;

    async fn fetch_evaluation_criteria(
        &self,
        period_id: &PeriodId,
        employee_id: &EmployeeId,
    ) -> Result<Vec<EvaluationCriterion>, RepositoryError>;

    async fn fetch_self_evaluations(
        &self,
        period_id: &PeriodId,
        employee_id: &EmployeeId,
    ) -> Result<Vec<SelfEvaluationRecord>, RepositoryError>;

    async fn fetch_downward_evaluations(
        &self,
        period_id: &PeriodId,
        employee_id: &EmployeeId,
        evaluation_type: DownwardEvaluationType,
    ) -> Result<Vec<DownwardEvaluationRecord>, RepositoryError>;

    async fn fetch_evaluator_mappings(
        &self,
        period_id: &PeriodId,
        employee_id: &EmployeeId,
        line: EvaluationLine,
    ) -> Result<Vec<EvaluatorMapping>, RepositoryError>;

    async fn fetch_peer_evaluations(
        &self,
        period_id: &PeriodId,
        employee_id: &EmployeeId,
    ) -> Result<Vec<PeerEvaluationRecord>, RepositoryError>;

    async fn fetch_step_approval(
        &self,
        mapping_id: &MappingId,
    ) -> Result<Option<StepApproval>, RepositoryError>;

    /// Recipients of revision requests for a step, completed ones included.
    ///
    /// A recipient is open while `is_completed` is false.
    async fn fetch_revision_recipients(
        &self,
        period_id: &PeriodId,
        employee_id: &EmployeeId,
        step: EvaluationStep,
        recipient_id: Option<&EmployeeId>,
    ) -> Result<Vec<RevisionRequestRecipient>, RepositoryError>;

    async fn fetch_period_grade_bands(
        &self,
        period_id: &PeriodId,
    ) -> Result<Option<PeriodGradeConfig>, RepositoryError>;
}

/// Error enumeration for collaborator fetch failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("repository unavailable: {0}")]
    Unavailable(String),
    #[error("corrupt record: {0}")]
    Corrupt(String),
}
