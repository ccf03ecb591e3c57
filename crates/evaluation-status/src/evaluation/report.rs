use std::io::Write;

use serde::Serialize;

use super::domain::{EmployeeId, EvaluationStep, ItemId, PeriodId};
use super::overlay::StepStatus;

/// Status and score of one evaluator within a downward step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluatorStatusView {
    pub evaluator_id: EmployeeId,
    pub status: StepStatus,
    pub score: Option<f64>,
    pub assigned_item_count: usize,
    pub completed_item_count: usize,
}

/// Report for one evaluation step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepReport {
    pub status: StepStatus,
    pub total_score: Option<f64>,
    pub grade: Option<String>,
    pub is_submitted: bool,
    pub total_mapping_count: usize,
    pub completed_mapping_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evaluators: Option<Vec<EvaluatorStatusView>>,
}

impl StepReport {
    pub(crate) fn unscored(
        status: StepStatus,
        is_submitted: bool,
        total_mapping_count: usize,
        completed_mapping_count: usize,
    ) -> Self {
        Self {
            status,
            total_score: None,
            grade: None,
            is_submitted,
            total_mapping_count,
            completed_mapping_count,
            evaluators: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyKind {
    /// A record references an item outside the employee's assignment set.
    UnassignedItem,
}

/// Non-fatal inconsistency found while assembling a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DataAnomaly {
    pub kind: AnomalyKind,
    pub step: EvaluationStep,
    pub item_id: ItemId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evaluator_id: Option<EmployeeId>,
}

/// Every step report for one employee within one period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmployeeStatusReport {
    pub period_id: PeriodId,
    pub employee_id: EmployeeId,
    pub criteria_setup: StepReport,
    pub self_evaluation: StepReport,
    pub primary_downward_evaluation: StepReport,
    pub secondary_downward_evaluation: StepReport,
    pub peer_evaluation: StepReport,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub anomalies: Vec<DataAnomaly>,
}

impl EmployeeStatusReport {
    pub fn step(&self, step: EvaluationStep) -> &StepReport {
        match step {
            EvaluationStep::CriteriaSetup => &self.criteria_setup,
            EvaluationStep::SelfEvaluation => &self.self_evaluation,
            EvaluationStep::PrimaryDownward => &self.primary_downward_evaluation,
            EvaluationStep::SecondaryDownward => &self.secondary_downward_evaluation,
            EvaluationStep::PeerEvaluation => &self.peer_evaluation,
        }
    }
}

/// Reports for every employee enrolled in a period, in enrollment order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodRoster {
    pub period_id: PeriodId,
    pub reports: Vec<EmployeeStatusReport>,
}

#[derive(Debug, Serialize)]
struct RosterRow<'a> {
    period_id: &'a str,
    employee_id: &'a str,
    step: &'static str,
    status: &'static str,
    total_score: Option<f64>,
    grade: Option<&'a str>,
    is_submitted: bool,
    total_mapping_count: usize,
    completed_mapping_count: usize,
}

/// Writes one CSV row per employee and step.
pub fn write_roster_csv<W: Write>(roster: &PeriodRoster, writer: W) -> Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    for report in &roster.reports {
        for step in EvaluationStep::ordered() {
            let step_report = report.step(step);
            csv_writer.serialize(RosterRow {
                period_id: roster.period_id.as_str(),
                employee_id: report.employee_id.as_str(),
                step: step.label(),
                status: step_report.status.label(),
                total_score: step_report.total_score,
                grade: step_report.grade.as_deref(),
                is_submitted: step_report.is_submitted,
                total_mapping_count: step_report.total_mapping_count,
                completed_mapping_count: step_report.completed_mapping_count,
            })?;
        }
    }

    csv_writer.flush()?;
    Ok(())
}
