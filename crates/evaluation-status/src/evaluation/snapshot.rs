use std::fmt;
use std::io::Read;
use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::domain::{
    AssignmentItem, DownwardEvaluationRecord, DownwardEvaluationType, EmployeeId,
    EvaluationCriterion, EvaluationLine, EvaluationPeriod, EvaluationStep, EvaluatorMapping,
    MappingId, PeerEvaluationRecord, PeriodEmployeeMapping, PeriodGradeConfig, PeriodId,
    RevisionRequest, RevisionRequestRecipient, SelfEvaluationRecord, StepApproval,
};
use super::repository::{EvaluationSource, RepositoryError};

/// Exported record sets for one or more periods.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PeriodSnapshot {
    pub periods: Vec<EvaluationPeriod>,
    pub mappings: Vec<PeriodEmployeeMapping>,
    pub assignments: Vec<AssignmentItem>,
    pub criteria: Vec<EvaluationCriterion>,
    pub self_evaluations: Vec<SelfEvaluationRecord>,
    pub downward_evaluations: Vec<DownwardEvaluationRecord>,
    pub evaluator_mappings: Vec<EvaluatorMapping>,
    pub peer_evaluations: Vec<PeerEvaluationRecord>,
    pub approvals: Vec<StepApproval>,
    pub revision_requests: Vec<RevisionRequest>,
}

#[derive(Debug)]
pub enum SnapshotError {
    Io(std::io::Error),
    Json(serde_json::Error),
}

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnapshotError::Io(err) => write!(f, "failed to read evaluation snapshot: {}", err),
            SnapshotError::Json(err) => write!(f, "invalid evaluation snapshot: {}", err),
        }
    }
}

impl std::error::Error for SnapshotError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SnapshotError::Io(err) => Some(err),
            SnapshotError::Json(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for SnapshotError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_json::Error> for SnapshotError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}

/// In-memory [`EvaluationSource`] backed by a JSON snapshot export.
#[derive(Debug, Clone, Default)]
pub struct SnapshotStore {
    snapshot: PeriodSnapshot,
}

impl SnapshotStore {
    pub fn new(snapshot: PeriodSnapshot) -> Self {
        let orphaned = snapshot
            .revision_requests
            .iter()
            .filter(|request| request.recipients.is_empty())
            .count();
        if orphaned > 0 {
            warn!(requests = orphaned, "revision requests without recipients");
        }

        Self { snapshot }
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, SnapshotError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        let store = Self::from_reader(file)?;
        info!(
            path = %path.display(),
            periods = store.snapshot.periods.len(),
            employees = store.snapshot.mappings.len(),
            "loaded evaluation snapshot"
        );
        Ok(store)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, SnapshotError> {
        let snapshot: PeriodSnapshot = serde_json::from_reader(reader)?;
        Ok(Self::new(snapshot))
    }

    pub fn snapshot(&self) -> &PeriodSnapshot {
        &self.snapshot
    }
}

fn scoped<'a, T, F>(
    records: &'a [T],
    key: F,
    period_id: &PeriodId,
    employee_id: &EmployeeId,
) -> Vec<T>
where
    T: Clone,
    F: Fn(&'a T) -> (&'a PeriodId, &'a EmployeeId),
{
    records
        .iter()
        .filter(|record| {
            let (record_period, record_employee) = key(*record);
            record_period == period_id && record_employee == employee_id
        })
        .cloned()
        .collect()
}

#[async_trait]
impl EvaluationSource for SnapshotStore {
    async fn fetch_period_employees(
        &self,
        period_id: &PeriodId,
    ) -> Result<Vec<EmployeeId>, RepositoryError> {
        Ok(self
            .snapshot
            .mappings
            .iter()
            .filter(|mapping| &mapping.period_id == period_id)
            .map(|mapping| mapping.employee_id.clone())
            .collect())
    }

    async fn fetch_period_mapping(
        &self,
        period_id: &PeriodId,
        employee_id: &EmployeeId,
    ) -> Result<Option<PeriodEmployeeMapping>, RepositoryError> {
        Ok(self
            .snapshot
            .mappings
            .iter()
            .find(|mapping| {
                &mapping.period_id == period_id && &mapping.employee_id == employee_id
            })
            .cloned())
    }

    async fn fetch_assignments(
        &self,
        period_id: &PeriodId,
        employee_id: &EmployeeId,
    ) -> Result<Vec<AssignmentItem>, RepositoryError> {
        let mut items = scoped(
            &self.snapshot.assignments,
            |item| (&item.period_id, &item.employee_id),
            period_id,
            employee_id,
        );
        items.sort_by_key(|item| item.display_order);
        Ok(items)
    }

    async fn fetch_evaluation_criteria(
        &self,
        period_id: &PeriodId,
        employee_id: &EmployeeId,
    ) -> Result<Vec<EvaluationCriterion>, RepositoryError> {
        Ok(scoped(
            &self.snapshot.criteria,
            |criterion| (&criterion.period_id, &criterion.employee_id),
            period_id,
            employee_id,
        ))
    }

    async fn fetch_self_evaluations(
        &self,
        period_id: &PeriodId,
        employee_id: &EmployeeId,
    ) -> Result<Vec<SelfEvaluationRecord>, RepositoryError> {
        Ok(scoped(
            &self.snapshot.self_evaluations,
            |record| (&record.period_id, &record.employee_id),
            period_id,
            employee_id,
        ))
    }

    async fn fetch_downward_evaluations(
        &self,
        period_id: &PeriodId,
        employee_id: &EmployeeId,
        evaluation_type: DownwardEvaluationType,
    ) -> Result<Vec<DownwardEvaluationRecord>, RepositoryError> {
        let mut records = scoped(
            &self.snapshot.downward_evaluations,
            |record| (&record.period_id, &record.employee_id),
            period_id,
            employee_id,
        );
        records.retain(|record| record.evaluation_type == evaluation_type);
        Ok(records)
    }

    async fn fetch_evaluator_mappings(
        &self,
        period_id: &PeriodId,
        employee_id: &EmployeeId,
        line: EvaluationLine,
    ) -> Result<Vec<EvaluatorMapping>, RepositoryError> {
        let mut mappings = scoped(
            &self.snapshot.evaluator_mappings,
            |mapping| (&mapping.period_id, &mapping.employee_id),
            period_id,
            employee_id,
        );
        mappings.retain(|mapping| mapping.line == line);
        Ok(mappings)
    }

    async fn fetch_peer_evaluations(
        &self,
        period_id: &PeriodId,
        employee_id: &EmployeeId,
    ) -> Result<Vec<PeerEvaluationRecord>, RepositoryError> {
        Ok(scoped(
            &self.snapshot.peer_evaluations,
            |record| (&record.period_id, &record.employee_id),
            period_id,
            employee_id,
        ))
    }

    async fn fetch_step_approval(
        &self,
        mapping_id: &MappingId,
    ) -> Result<Option<StepApproval>, RepositoryError> {
        Ok(self
            .snapshot
            .approvals
            .iter()
            .find(|approval| &approval.mapping_id == mapping_id)
            .cloned())
    }

    async fn fetch_revision_recipients(
        &self,
        period_id: &PeriodId,
        employee_id: &EmployeeId,
        step: EvaluationStep,
        recipient_id: Option<&EmployeeId>,
    ) -> Result<Vec<RevisionRequestRecipient>, RepositoryError> {
        Ok(self
            .snapshot
            .revision_requests
            .iter()
            .filter(|request| {
                &request.period_id == period_id
                    && &request.employee_id == employee_id
                    && request.step == step
            })
            .flat_map(|request| request.recipients.iter())
            .filter(|recipient| recipient_id.map_or(true, |id| &recipient.recipient_id == id))
            .cloned()
            .collect())
    }

    async fn fetch_period_grade_bands(
        &self,
        period_id: &PeriodId,
    ) -> Result<Option<PeriodGradeConfig>, RepositoryError> {
        Ok(self
            .snapshot
            .periods
            .iter()
            .find(|period| &period.id == period_id)
            .map(EvaluationPeriod::grade_config))
    }
}
