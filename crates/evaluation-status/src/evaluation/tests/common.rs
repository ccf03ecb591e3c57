use std::sync::Arc;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use crate::evaluation::domain::{
    ApprovalStatus, AssignmentItem, DownwardEvaluationRecord, DownwardEvaluationType, EmployeeId,
    EvaluationCriterion, EvaluationLine, EvaluationPeriod, EvaluationStep, EvaluatorMapping,
    GradeBand, ItemId, MappingId, PeerEvaluationRecord, PeriodEmployeeMapping, PeriodGradeConfig,
    PeriodId, ProjectId, RecipientType, RevisionRequest, RevisionRequestId,
    RevisionRequestRecipient, SelfEvaluationRecord, StepApproval,
};
use crate::evaluation::repository::{EvaluationSource, RepositoryError};
use crate::evaluation::snapshot::{PeriodSnapshot, SnapshotStore};
use crate::evaluation::{PeriodStatusService, StatusConfig};

pub(super) const MAX_RATE: f64 = 120.0;

pub(super) fn period_id() -> PeriodId {
    PeriodId::new("2025-H1")
}

pub(super) fn employee_id() -> EmployeeId {
    EmployeeId::new("emp-001")
}

pub(super) fn evaluator(id: &str) -> EmployeeId {
    EmployeeId::new(id)
}

pub(super) fn item(id: &str) -> ItemId {
    ItemId::new(id)
}

fn band(grade: &str, min_range: f64, max_range: f64) -> GradeBand {
    GradeBand {
        grade: grade.to_string(),
        min_range,
        max_range,
    }
}

/// Contiguous bands over [0, 120] at two-decimal resolution.
pub(super) fn grade_bands() -> Vec<GradeBand> {
    vec![
        band("S+", 114.0, 120.0),
        band("S", 108.0, 113.99),
        band("A+", 102.0, 107.99),
        band("A", 96.0, 101.99),
        band("B+", 90.0, 95.99),
        band("B", 84.0, 89.99),
        band("C", 0.0, 83.99),
    ]
}

pub(super) fn period() -> EvaluationPeriod {
    EvaluationPeriod {
        id: period_id(),
        name: "2025 first half".to_string(),
        max_self_evaluation_rate: MAX_RATE,
        grade_bands: grade_bands(),
    }
}

pub(super) fn grade_config() -> PeriodGradeConfig {
    period().grade_config()
}

pub(super) fn mapping_for(employee: &EmployeeId) -> PeriodEmployeeMapping {
    PeriodEmployeeMapping {
        id: MappingId::new(format!("map-{employee}")),
        period_id: period_id(),
        employee_id: employee.clone(),
    }
}

pub(super) fn assignment(item_id: &str, weight: f64) -> AssignmentItem {
    assignment_for(&employee_id(), item_id, weight)
}

pub(super) fn assignment_for(employee: &EmployeeId, item_id: &str, weight: f64) -> AssignmentItem {
    AssignmentItem {
        item_id: item(item_id),
        employee_id: employee.clone(),
        period_id: period_id(),
        project_id: ProjectId::new("proj-ledger"),
        weight: Some(weight),
        display_order: 0,
    }
}

/// Items weighted 30/40/30.
pub(super) fn standard_assignments() -> Vec<AssignmentItem> {
    vec![
        assignment("item-1", 30.0),
        assignment("item-2", 40.0),
        assignment("item-3", 30.0),
    ]
}

pub(super) fn criterion(item_id: &str, content: &str) -> EvaluationCriterion {
    EvaluationCriterion {
        item_id: item(item_id),
        employee_id: employee_id(),
        period_id: period_id(),
        content: content.to_string(),
    }
}

pub(super) fn self_record(item_id: &str, score: f64, submitted: bool) -> SelfEvaluationRecord {
    self_record_for(&employee_id(), item_id, score, submitted)
}

pub(super) fn self_record_for(
    employee: &EmployeeId,
    item_id: &str,
    score: f64,
    submitted: bool,
) -> SelfEvaluationRecord {
    SelfEvaluationRecord {
        item_id: item(item_id),
        employee_id: employee.clone(),
        period_id: period_id(),
        score: Some(score),
        submitted_to_evaluator: submitted,
        submitted_to_manager: submitted,
    }
}

pub(super) fn downward(
    evaluation_type: DownwardEvaluationType,
    evaluator_id: &str,
    item_id: &str,
    score: f64,
    is_completed: bool,
) -> DownwardEvaluationRecord {
    DownwardEvaluationRecord {
        item_id: item(item_id),
        employee_id: employee_id(),
        evaluator_id: evaluator(evaluator_id),
        period_id: period_id(),
        evaluation_type,
        score: Some(score),
        is_completed,
    }
}

pub(super) fn evaluator_mapping(
    line: EvaluationLine,
    evaluator_id: &str,
    item_id: Option<&str>,
) -> EvaluatorMapping {
    EvaluatorMapping {
        period_id: period_id(),
        employee_id: employee_id(),
        evaluator_id: evaluator(evaluator_id),
        line,
        item_id: item_id.map(item),
    }
}

pub(super) fn peer(evaluator_id: &str, is_completed: bool) -> PeerEvaluationRecord {
    PeerEvaluationRecord {
        employee_id: employee_id(),
        evaluator_id: evaluator(evaluator_id),
        period_id: period_id(),
        is_completed,
    }
}

pub(super) fn approval() -> StepApproval {
    StepApproval {
        mapping_id: mapping_for(&employee_id()).id,
        criteria_setup: ApprovalStatus::Pending,
        self_evaluation: ApprovalStatus::Pending,
        primary_downward: ApprovalStatus::Pending,
        secondary_downward: ApprovalStatus::Pending,
        secondary_by_evaluator: Default::default(),
        approved_by: None,
        approved_at: None,
    }
}

pub(super) fn recipient(recipient_id: &str, is_completed: bool) -> RevisionRequestRecipient {
    RevisionRequestRecipient {
        request_id: RevisionRequestId::new("rev-1"),
        recipient_id: evaluator(recipient_id),
        recipient_type: RecipientType::SecondaryEvaluator,
        is_read: true,
        is_completed,
        completed_at: is_completed.then(|| Utc.with_ymd_and_hms(2025, 7, 2, 9, 0, 0).unwrap()),
        response_comment: None,
    }
}

pub(super) fn revision_request(
    step: EvaluationStep,
    recipients: Vec<RevisionRequestRecipient>,
) -> RevisionRequest {
    RevisionRequest {
        id: RevisionRequestId::new("rev-1"),
        period_id: period_id(),
        employee_id: employee_id(),
        step,
        comment: "Please revisit the scores".to_string(),
        requested_by: evaluator("admin-1"),
        requested_at: Utc.with_ymd_and_hms(2025, 7, 1, 9, 0, 0).unwrap(),
        recipients,
    }
}

/// Snapshot containing the period and the default employee's enrollment only.
pub(super) fn base_snapshot() -> PeriodSnapshot {
    PeriodSnapshot {
        periods: vec![period()],
        mappings: vec![mapping_for(&employee_id())],
        assignments: standard_assignments(),
        ..PeriodSnapshot::default()
    }
}

pub(super) fn status_service(snapshot: PeriodSnapshot) -> PeriodStatusService<SnapshotStore> {
    PeriodStatusService::new(
        Arc::new(SnapshotStore::new(snapshot)),
        StatusConfig::default(),
    )
}

/// Source whose storage layer is offline.
pub(super) struct UnavailableSource;

fn offline<T>() -> Result<T, RepositoryError> {
    Err(RepositoryError::Unavailable("database offline".to_string()))
}

#[async_trait]
impl EvaluationSource for UnavailableSource {
    async fn fetch_period_employees(
        &self,
        _period_id: &PeriodId,
    ) -> Result<Vec<EmployeeId>, RepositoryError> {
        offline()
    }

    async fn fetch_period_mapping(
        &self,
        _period_id: &PeriodId,
        _employee_id: &EmployeeId,
    ) -> Result<Option<PeriodEmployeeMapping>, RepositoryError> {
        offline()
    }

    async fn fetch_assignments(
        &self,
        _period_id: &PeriodId,
        _employee_id: &EmployeeId,
    ) -> Result<Vec<AssignmentItem>, RepositoryError> {
        offline()
    }

    async fn fetch_evaluation_criteria(
        &self,
        _period_id: &PeriodId,
        _employee_id: &EmployeeId,
    ) -> Result<Vec<EvaluationCriterion>, RepositoryError> {
        offline()
    }

    async fn fetch_self_evaluations(
        &self,
        _period_id: &PeriodId,
        _employee_id: &EmployeeId,
    ) -> Result<Vec<SelfEvaluationRecord>, RepositoryError> {
        offline()
    }

    async fn fetch_downward_evaluations(
        &self,
        _period_id: &PeriodId,
        _employee_id: &EmployeeId,
        _evaluation_type: DownwardEvaluationType,
    ) -> Result<Vec<DownwardEvaluationRecord>, RepositoryError> {
        offline()
    }

    async fn fetch_evaluator_mappings(
        &self,
        _period_id: &PeriodId,
        _employee_id: &EmployeeId,
        _line: EvaluationLine,
    ) -> Result<Vec<EvaluatorMapping>, RepositoryError> {
        offline()
    }

    async fn fetch_peer_evaluations(
        &self,
        _period_id: &PeriodId,
        _employee_id: &EmployeeId,
    ) -> Result<Vec<PeerEvaluationRecord>, RepositoryError> {
        offline()
    }

    async fn fetch_step_approval(
        &self,
        _mapping_id: &MappingId,
    ) -> Result<Option<StepApproval>, RepositoryError> {
        offline()
    }

    async fn fetch_revision_recipients(
        &self,
        _period_id: &PeriodId,
        _employee_id: &EmployeeId,
        _step: EvaluationStep,
        _recipient_id: Option<&EmployeeId>,
    ) -> Result<Vec<RevisionRequestRecipient>, RepositoryError> {
        offline()
    }

    async fn fetch_period_grade_bands(
        &self,
        _period_id: &PeriodId,
    ) -> Result<Option<PeriodGradeConfig>, RepositoryError> {
        offline()
    }
}

/// Delegates to a snapshot but fails the approval lookup.
pub(super) struct ApprovalOutageSource {
    pub(super) inner: SnapshotStore,
}

#[async_trait]
impl EvaluationSource for ApprovalOutageSource {
    async fn fetch_period_employees(
        &self,
        period_id: &PeriodId,
    ) -> Result<Vec<EmployeeId>, RepositoryError> {
        self.inner.fetch_period_employees(period_id).await
    }

    async fn fetch_period_mapping(
        &self,
        period_id: &PeriodId,
        employee_id: &EmployeeId,
    ) -> Result<Option<PeriodEmployeeMapping>, RepositoryError> {
        self.inner.fetch_period_mapping(period_id, employee_id).await
    }

    async fn fetch_assignments(
        &self,
        period_id: &PeriodId,
        employee_id: &EmployeeId,
    ) -> Result<Vec<AssignmentItem>, RepositoryError> {
        self.inner.fetch_assignments(period_id, employee_id).await
    }

    async fn fetch_evaluation_criteria(
        &self,
        period_id: &PeriodId,
        employee_id: &EmployeeId,
    ) -> Result<Vec<EvaluationCriterion>, RepositoryError> {
        self.inner
            .fetch_evaluation_criteria(period_id, employee_id)
            .await
    }

    async fn fetch_self_evaluations(
        &self,
        period_id: &PeriodId,
        employee_id: &EmployeeId,
    ) -> Result<Vec<SelfEvaluationRecord>, RepositoryError> {
        self.inner.fetch_self_evaluations(period_id, employee_id).await
    }

    async fn fetch_downward_evaluations(
        &self,
        period_id: &PeriodId,
        employee_id: &EmployeeId,
        evaluation_type: DownwardEvaluationType,
    ) -> Result<Vec<DownwardEvaluationRecord>, RepositoryError> {
        self.inner
            .fetch_downward_evaluations(period_id, employee_id, evaluation_type)
            .await
    }

    async fn fetch_evaluator_mappings(
        &self,
        period_id: &PeriodId,
        employee_id: &EmployeeId,
        line: EvaluationLine,
    ) -> Result<Vec<EvaluatorMapping>, RepositoryError> {
        self.inner
            .fetch_evaluator_mappings(period_id, employee_id, line)
            .await
    }

    async fn fetch_peer_evaluations(
        &self,
        period_id: &PeriodId,
        employee_id: &EmployeeId,
    ) -> Result<Vec<PeerEvaluationRecord>, RepositoryError> {
        self.inner.fetch_peer_evaluations(period_id, employee_id).await
    }

    async fn fetch_step_approval(
        &self,
        _mapping_id: &MappingId,
    ) -> Result<Option<StepApproval>, RepositoryError> {
        Err(RepositoryError::Corrupt("approval row unreadable".to_string()))
    }

    async fn fetch_revision_recipients(
        &self,
        period_id: &PeriodId,
        employee_id: &EmployeeId,
        step: EvaluationStep,
        recipient_id: Option<&EmployeeId>,
    ) -> Result<Vec<RevisionRequestRecipient>, RepositoryError> {
        self.inner
            .fetch_revision_recipients(period_id, employee_id, step, recipient_id)
            .await
    }

    async fn fetch_period_grade_bands(
        &self,
        period_id: &PeriodId,
    ) -> Result<Option<PeriodGradeConfig>, RepositoryError> {
        self.inner.fetch_period_grade_bands(period_id).await
    }
}
