use crate::render::{render_employee_report, render_roster};
use clap::{Args, Parser, Subcommand};
use evaluation_status::config::AppConfig;
use evaluation_status::error::AppError;
use evaluation_status::evaluation::{
    write_roster_csv, EmployeeId, PeriodId, PeriodStatusService, SnapshotStore,
};
use evaluation_status::telemetry;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "evaluation-status",
    about = "Report evaluation period step status and scores from a snapshot export",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the status report of one employee as JSON
    Employee(EmployeeArgs),
    /// Summarize every employee enrolled in a period
    Roster(RosterArgs),
}

#[derive(Args, Debug)]
struct EmployeeArgs {
    /// JSON snapshot export holding the period records
    #[arg(long)]
    snapshot: PathBuf,
    /// Evaluation period identifier
    #[arg(long)]
    period: String,
    /// Employee identifier
    #[arg(long)]
    employee: String,
}

#[derive(Args, Debug)]
struct RosterArgs {
    /// JSON snapshot export holding the period records
    #[arg(long)]
    snapshot: PathBuf,
    /// Evaluation period identifier
    #[arg(long)]
    period: String,
    /// Write one CSV row per employee and step to this path instead of printing a table
    #[arg(long)]
    csv: Option<PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;
    info!(environment = ?config.environment, "starting evaluation status report");

    match cli.command {
        Command::Employee(args) => {
            let service = load_service(&args.snapshot, &config)?;
            let report = service
                .employee_report(&PeriodId::new(args.period), &EmployeeId::new(args.employee))
                .await?;
            render_employee_report(&report)
        }
        Command::Roster(args) => {
            let service = load_service(&args.snapshot, &config)?;
            let roster = service.roster_report(&PeriodId::new(args.period)).await?;
            match args.csv {
                Some(path) => {
                    write_roster_csv(&roster, File::create(&path)?)?;
                    info!(
                        path = %path.display(),
                        employees = roster.reports.len(),
                        "wrote roster csv"
                    );
                    Ok(())
                }
                None => {
                    render_roster(&roster);
                    Ok(())
                }
            }
        }
    }
}

fn load_service(
    snapshot: &Path,
    config: &AppConfig,
) -> Result<PeriodStatusService<SnapshotStore>, AppError> {
    let store = SnapshotStore::from_path(snapshot)?;
    Ok(PeriodStatusService::new(Arc::new(store), config.status.clone()))
}
