use evaluation_status::error::AppError;
use evaluation_status::evaluation::{EmployeeStatusReport, EvaluationStep, PeriodRoster, StepReport};

pub(crate) fn render_employee_report(report: &EmployeeStatusReport) -> Result<(), AppError> {
    let rendered = serde_json::to_string_pretty(report)?;
    println!("{rendered}");
    Ok(())
}

pub(crate) fn render_roster(roster: &PeriodRoster) {
    println!("Evaluation period {}", roster.period_id);
    if roster.reports.is_empty() {
        println!("No employees enrolled");
        return;
    }

    for report in &roster.reports {
        println!("\n{}", report.employee_id);
        for step in EvaluationStep::ordered() {
            println!("- {}: {}", step.label(), describe_step(report.step(step)));
        }
        if !report.anomalies.is_empty() {
            println!("  {} record(s) reference unassigned items", report.anomalies.len());
        }
    }
}

fn describe_step(step: &StepReport) -> String {
    let mut line = format!(
        "{} ({}/{})",
        step.status.label(),
        step.completed_mapping_count,
        step.total_mapping_count
    );
    if let Some(score) = step.total_score {
        line.push_str(&format!(" | score {score:.2}"));
    }
    if let Some(grade) = &step.grade {
        line.push_str(&format!(" | grade {grade}"));
    }
    line
}
