use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use futures::stream::{self, StreamExt, TryStreamExt};
use tracing::{debug, info, warn};

use super::completion::{self, CompletionAssessment};
use super::config::StatusConfig;
use super::domain::{
    ApprovalStatus, AssignmentItem, DownwardEvaluationRecord, DownwardEvaluationType, EmployeeId,
    EvaluationCriterion, EvaluationLine, EvaluationStep, EvaluatorMapping, ItemId,
    PeerEvaluationRecord, PeriodEmployeeMapping, PeriodGradeConfig, PeriodId,
    RevisionRequestRecipient, SelfEvaluationRecord, StepApproval,
};
use super::grading::GradeScale;
use super::overlay::{reduce_statuses, resolve_step_status, RevisionState, StepStatus};
use super::report::{
    AnomalyKind, DataAnomaly, EmployeeStatusReport, EvaluatorStatusView, PeriodRoster,
    StepReport,
};
use super::repository::{EvaluationSource, RepositoryError};
use super::scoring::{multi_evaluator_total, weighted_total, EvaluatorScores, WeightedScore};

/// Service assembling per-step status and score reports from an [`EvaluationSource`].
pub struct PeriodStatusService<S> {
    source: Arc<S>,
    config: StatusConfig,
}

impl<S> PeriodStatusService<S>
where
    S: EvaluationSource + 'static,
{
    pub fn new(source: Arc<S>, config: StatusConfig) -> Self {
        Self { source, config }
    }

    /// Compute the full status report for one employee in one period.
    pub async fn employee_report(
        &self,
        period_id: &PeriodId,
        employee_id: &EmployeeId,
    ) -> Result<EmployeeStatusReport, StatusError> {
        let snapshot = self.load_snapshot(period_id, employee_id).await?;
        let report = assemble_report(period_id, employee_id, &snapshot);

        debug!(
            %period_id,
            %employee_id,
            self_status = report.self_evaluation.status.label(),
            primary_status = report.primary_downward_evaluation.status.label(),
            secondary_status = report.secondary_downward_evaluation.status.label(),
            anomalies = report.anomalies.len(),
            "assembled employee status report"
        );

        Ok(report)
    }

    /// Compute reports for every employee enrolled in the period, preserving enrollment order.
    pub async fn roster_report(&self, period_id: &PeriodId) -> Result<PeriodRoster, StatusError> {
        let employees = self.source.fetch_period_employees(period_id).await?;
        info!(%period_id, employees = employees.len(), "computing period roster");

        let reports = stream::iter(employees.iter())
            .map(|employee_id| self.employee_report(period_id, employee_id))
            .buffered(self.config.roster_concurrency.max(1))
            .try_collect::<Vec<_>>()
            .await?;

        Ok(PeriodRoster {
            period_id: period_id.clone(),
            reports,
        })
    }

    async fn load_snapshot(
        &self,
        period_id: &PeriodId,
        employee_id: &EmployeeId,
    ) -> Result<EmployeeSnapshot, StatusError> {
        let source = self.source.as_ref();

        let (
            mapping,
            grade_config,
            assignments,
            criteria,
            self_evaluations,
            primary_records,
            secondary_records,
            primary_mappings,
            secondary_mappings,
            peer_records,
            revisions,
        ) = tokio::try_join!(
            source.fetch_period_mapping(period_id, employee_id),
            source.fetch_period_grade_bands(period_id),
            source.fetch_assignments(period_id, employee_id),
            source.fetch_evaluation_criteria(period_id, employee_id),
            source.fetch_self_evaluations(period_id, employee_id),
            source.fetch_downward_evaluations(
                period_id,
                employee_id,
                DownwardEvaluationType::Primary
            ),
            source.fetch_downward_evaluations(
                period_id,
                employee_id,
                DownwardEvaluationType::Secondary
            ),
            source.fetch_evaluator_mappings(period_id, employee_id, EvaluationLine::Primary),
            source.fetch_evaluator_mappings(period_id, employee_id, EvaluationLine::Secondary),
            source.fetch_peer_evaluations(period_id, employee_id),
            fetch_revisions(source, period_id, employee_id),
        )?;

        let grade_config = match grade_config {
            Some(config) if config.max_rate > 0.0 && !config.bands.is_empty() => config,
            _ => {
                return Err(StatusError::MissingPeriodConfiguration {
                    period_id: period_id.clone(),
                })
            }
        };

        let approval = match &mapping {
            Some(mapping) => source.fetch_step_approval(&mapping.id).await?,
            None => {
                debug!(%period_id, %employee_id, "no period mapping; approvals default to pending");
                None
            }
        };

        Ok(EmployeeSnapshot {
            mapping,
            grade_config,
            assignments,
            criteria,
            self_evaluations,
            primary_records,
            secondary_records,
            primary_mappings,
            secondary_mappings,
            peer_records,
            approval,
            revisions,
        })
    }
}

async fn fetch_revisions<S>(
    source: &S,
    period_id: &PeriodId,
    employee_id: &EmployeeId,
) -> Result<StepRevisions, RepositoryError>
where
    S: EvaluationSource + ?Sized,
{
    let (criteria, self_evaluation, primary, secondary) = tokio::try_join!(
        source.fetch_revision_recipients(
            period_id,
            employee_id,
            EvaluationStep::CriteriaSetup,
            None
        ),
        source.fetch_revision_recipients(
            period_id,
            employee_id,
            EvaluationStep::SelfEvaluation,
            Some(employee_id)
        ),
        source.fetch_revision_recipients(
            period_id,
            employee_id,
            EvaluationStep::PrimaryDownward,
            None
        ),
        source.fetch_revision_recipients(
            period_id,
            employee_id,
            EvaluationStep::SecondaryDownward,
            None
        ),
    )?;

    Ok(StepRevisions {
        criteria,
        self_evaluation,
        primary,
        secondary,
    })
}

/// Revision recipients per step, open and completed.
struct StepRevisions {
    criteria: Vec<RevisionRequestRecipient>,
    self_evaluation: Vec<RevisionRequestRecipient>,
    primary: Vec<RevisionRequestRecipient>,
    secondary: Vec<RevisionRequestRecipient>,
}

/// Everything fetched for one employee before the pure merge step.
struct EmployeeSnapshot {
    mapping: Option<PeriodEmployeeMapping>,
    grade_config: PeriodGradeConfig,
    assignments: Vec<AssignmentItem>,
    criteria: Vec<EvaluationCriterion>,
    self_evaluations: Vec<SelfEvaluationRecord>,
    primary_records: Vec<DownwardEvaluationRecord>,
    secondary_records: Vec<DownwardEvaluationRecord>,
    primary_mappings: Vec<EvaluatorMapping>,
    secondary_mappings: Vec<EvaluatorMapping>,
    peer_records: Vec<PeerEvaluationRecord>,
    approval: Option<StepApproval>,
    revisions: StepRevisions,
}

/// Scoring context shared by every scored step.
struct ScoringContext {
    weights: BTreeMap<ItemId, f64>,
    max_rate: f64,
    scale: GradeScale,
}

impl ScoringContext {
    fn new(assignments: &[AssignmentItem], config: &PeriodGradeConfig) -> Self {
        let weights = assignments
            .iter()
            .map(|item| (item.item_id.clone(), item.weight.unwrap_or(0.0)))
            .collect();

        Self {
            weights,
            max_rate: config.max_rate,
            scale: GradeScale::new(config.bands.clone()),
        }
    }

    /// Unknown items weigh nothing.
    fn weight_of(&self, item_id: &ItemId) -> f64 {
        self.weights.get(item_id).copied().unwrap_or(0.0)
    }

    fn grade(&self, step: EvaluationStep, score: Option<f64>) -> Option<String> {
        let score = score?;
        let grade = self.scale.grade_for(score).map(str::to_string);
        if grade.is_none() {
            debug!(step = step.label(), score, "score falls outside every grade band");
        }
        grade
    }

    fn total<'a, I>(&self, records: I) -> Option<f64>
    where
        I: IntoIterator<Item = (&'a ItemId, f64)>,
    {
        let entries: Vec<WeightedScore> = records
            .into_iter()
            .map(|(item_id, score)| {
                WeightedScore::new(item_id.clone(), self.weight_of(item_id), score)
            })
            .collect();
        weighted_total(&entries, self.max_rate)
    }
}

fn assemble_report(
    period_id: &PeriodId,
    employee_id: &EmployeeId,
    snapshot: &EmployeeSnapshot,
) -> EmployeeStatusReport {
    let scoring = ScoringContext::new(&snapshot.assignments, &snapshot.grade_config);
    let mut anomalies = Vec::new();

    let criteria_setup = criteria_report(snapshot, &mut anomalies);
    let self_evaluation = self_evaluation_report(snapshot, employee_id, &scoring, &mut anomalies);
    let primary_downward_evaluation = primary_report(snapshot, &scoring, &mut anomalies);
    let secondary_downward_evaluation = secondary_report(snapshot, &scoring, &mut anomalies);
    let peer_evaluation = peer_report(snapshot);

    for anomaly in &anomalies {
        warn!(
            %period_id,
            %employee_id,
            step = anomaly.step.label(),
            item_id = %anomaly.item_id,
            "evaluation record references an item outside the assignment set"
        );
    }
    if snapshot.mapping.is_none() && !snapshot.assignments.is_empty() {
        debug!(%period_id, %employee_id, "assignments exist without a period mapping");
    }

    EmployeeStatusReport {
        period_id: period_id.clone(),
        employee_id: employee_id.clone(),
        criteria_setup,
        self_evaluation,
        primary_downward_evaluation,
        secondary_downward_evaluation,
        peer_evaluation,
        anomalies,
    }
}

fn approval_for(snapshot: &EmployeeSnapshot, step: EvaluationStep) -> Option<ApprovalStatus> {
    snapshot
        .approval
        .as_ref()
        .and_then(|approval| approval.status_for(step))
}

fn record_anomalies(
    anomalies: &mut Vec<DataAnomaly>,
    step: EvaluationStep,
    assessment: &CompletionAssessment,
    evaluator_id: Option<&EmployeeId>,
) {
    anomalies.extend(assessment.outside_expected.iter().map(|item_id| DataAnomaly {
        kind: AnomalyKind::UnassignedItem,
        step,
        item_id: item_id.clone(),
        evaluator_id: evaluator_id.cloned(),
    }));
}

fn criteria_report(snapshot: &EmployeeSnapshot, anomalies: &mut Vec<DataAnomaly>) -> StepReport {
    let assessment = completion::assess_criteria(&snapshot.assignments, &snapshot.criteria);
    record_anomalies(anomalies, EvaluationStep::CriteriaSetup, &assessment, None);

    let status = resolve_step_status(
        assessment.state,
        approval_for(snapshot, EvaluationStep::CriteriaSetup),
        RevisionState::from_recipients(&snapshot.revisions.criteria),
    );

    StepReport::unscored(
        status,
        assessment.is_complete(),
        assessment.expected,
        assessment.completed,
    )
}

fn self_evaluation_report(
    snapshot: &EmployeeSnapshot,
    employee_id: &EmployeeId,
    scoring: &ScoringContext,
    anomalies: &mut Vec<DataAnomaly>,
) -> StepReport {
    let assessment =
        completion::assess_self_evaluation(&snapshot.assignments, &snapshot.self_evaluations);
    record_anomalies(anomalies, EvaluationStep::SelfEvaluation, &assessment, None);

    let total_score = scoring.total(
        snapshot
            .self_evaluations
            .iter()
            .filter(|record| record.submitted_to_manager)
            .filter_map(|record| record.score.map(|score| (&record.item_id, score))),
    );

    let status = resolve_step_status(
        assessment.state,
        approval_for(snapshot, EvaluationStep::SelfEvaluation),
        RevisionState::for_recipient(&snapshot.revisions.self_evaluation, employee_id),
    );

    StepReport {
        status,
        total_score,
        grade: scoring.grade(EvaluationStep::SelfEvaluation, total_score),
        is_submitted: assessment.is_complete(),
        total_mapping_count: assessment.expected,
        completed_mapping_count: assessment.completed,
        evaluators: None,
    }
}

fn primary_report(
    snapshot: &EmployeeSnapshot,
    scoring: &ScoringContext,
    anomalies: &mut Vec<DataAnomaly>,
) -> StepReport {
    let evaluator_ids: BTreeSet<&EmployeeId> = snapshot
        .primary_mappings
        .iter()
        .map(|mapping| &mapping.evaluator_id)
        .collect();
    if evaluator_ids.len() > 1 {
        warn!(
            evaluators = evaluator_ids.len(),
            "more than one primary evaluator mapped; using the first"
        );
    }
    // Without a mapping the lowest evaluator id with records stands in.
    let evaluator_id = match snapshot.primary_mappings.first() {
        Some(mapping) => Some(&mapping.evaluator_id),
        None => {
            let fallback = snapshot
                .primary_records
                .iter()
                .map(|record| &record.evaluator_id)
                .min();
            if let Some(id) = fallback {
                debug!(
                    evaluator_id = %id,
                    "no primary evaluator mapped; using recorded evaluator"
                );
            }
            fallback
        }
    };

    let records: Vec<&DownwardEvaluationRecord> = snapshot
        .primary_records
        .iter()
        .filter(|record| evaluator_id == Some(&record.evaluator_id))
        .collect();

    let expected = completion::expected_items(&snapshot.assignments);
    let assessment = completion::assess_downward(&expected, &records);
    record_anomalies(
        anomalies,
        EvaluationStep::PrimaryDownward,
        &assessment,
        evaluator_id,
    );

    let total_score = scoring.total(completed_scores(records.iter().copied()));

    let revision = match evaluator_id {
        Some(id) => RevisionState::for_recipient(&snapshot.revisions.primary, id),
        None => RevisionState::from_recipients(&snapshot.revisions.primary),
    };
    let evaluator_status = resolve_step_status(
        assessment.state,
        approval_for(snapshot, EvaluationStep::PrimaryDownward),
        revision,
    );

    let evaluators = evaluator_id.map(|id| {
        vec![EvaluatorStatusView {
            evaluator_id: id.clone(),
            status: evaluator_status,
            score: total_score,
            assigned_item_count: assessment.expected,
            completed_item_count: assessment.completed,
        }]
    });

    StepReport {
        status: reduce_statuses([evaluator_status]),
        total_score,
        grade: scoring.grade(EvaluationStep::PrimaryDownward, total_score),
        is_submitted: assessment.is_complete(),
        total_mapping_count: assessment.expected,
        completed_mapping_count: assessment.completed,
        evaluators,
    }
}

fn secondary_report(
    snapshot: &EmployeeSnapshot,
    scoring: &ScoringContext,
    anomalies: &mut Vec<DataAnomaly>,
) -> StepReport {
    let mut expectations =
        completion::evaluator_expectations(&snapshot.assignments, &snapshot.secondary_mappings);
    let unmapped = completion::include_unmapped_evaluators(
        &mut expectations,
        &snapshot.assignments,
        snapshot
            .secondary_records
            .iter()
            .map(|record| &record.evaluator_id)
            .chain(
                snapshot
                    .revisions
                    .secondary
                    .iter()
                    .map(|recipient| &recipient.recipient_id),
            ),
    );
    if unmapped > 0 {
        debug!(
            evaluators = unmapped,
            "secondary evaluators without a mapping are expected to cover every item"
        );
    }
    let secondary = completion::assess_secondary(&expectations, &snapshot.secondary_records);

    let mut statuses = Vec::with_capacity(secondary.evaluators.len());
    let mut evaluator_scores = Vec::with_capacity(secondary.evaluators.len());
    let mut views = Vec::with_capacity(secondary.evaluators.len());

    for evaluator in &secondary.evaluators {
        let own_records: Vec<&DownwardEvaluationRecord> = snapshot
            .secondary_records
            .iter()
            .filter(|record| record.evaluator_id == evaluator.evaluator_id)
            .collect();

        let unassigned: BTreeSet<&ItemId> = own_records
            .iter()
            .map(|record| &record.item_id)
            .filter(|item_id| !scoring.weights.contains_key(*item_id))
            .collect();
        anomalies.extend(unassigned.into_iter().map(|item_id| DataAnomaly {
            kind: AnomalyKind::UnassignedItem,
            step: EvaluationStep::SecondaryDownward,
            item_id: item_id.clone(),
            evaluator_id: Some(evaluator.evaluator_id.clone()),
        }));

        let mut scores = EvaluatorScores::new(evaluator.evaluator_id.clone());
        for (item_id, score) in completed_scores(own_records.iter().copied()) {
            scores = scores.with_score(item_id.clone(), score);
        }

        let status = resolve_step_status(
            evaluator.assessment.state,
            snapshot
                .approval
                .as_ref()
                .map(|approval| approval.secondary_status_for(&evaluator.evaluator_id)),
            RevisionState::for_recipient(&snapshot.revisions.secondary, &evaluator.evaluator_id),
        );

        views.push(EvaluatorStatusView {
            evaluator_id: evaluator.evaluator_id.clone(),
            status,
            score: scoring.total(scores.scores.iter().map(|(item_id, score)| (item_id, *score))),
            assigned_item_count: evaluator.assessment.expected,
            completed_item_count: evaluator.assessment.completed,
        });
        statuses.push(status);
        evaluator_scores.push(scores);
    }

    let total_score = multi_evaluator_total(
        &evaluator_scores,
        |item_id| scoring.weight_of(item_id),
        scoring.max_rate,
    );

    StepReport {
        status: reduce_statuses(statuses),
        total_score,
        grade: scoring.grade(EvaluationStep::SecondaryDownward, total_score),
        is_submitted: secondary.state == completion::CompletionState::Complete,
        total_mapping_count: secondary.evaluators.len(),
        completed_mapping_count: secondary.completed_evaluators(),
        evaluators: Some(views),
    }
}

/// Peer evaluations report raw completion only.
fn peer_report(snapshot: &EmployeeSnapshot) -> StepReport {
    let assessment = completion::assess_peer(&snapshot.peer_records);
    StepReport::unscored(
        StepStatus::from(assessment.state),
        assessment.is_complete(),
        assessment.expected,
        assessment.completed,
    )
}

fn completed_scores<'a, I>(records: I) -> impl Iterator<Item = (&'a ItemId, f64)>
where
    I: IntoIterator<Item = &'a DownwardEvaluationRecord>,
{
    records
        .into_iter()
        .filter(|record| record.is_completed)
        .filter_map(|record| record.score.map(|score| (&record.item_id, score)))
}

/// Error raised while assembling status reports.
#[derive(Debug, thiserror::Error)]
pub enum StatusError {
    #[error("evaluation period {period_id} has no score cap or grade bands configured")]
    MissingPeriodConfiguration { period_id: PeriodId },
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
