use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use yorisoi_core::{
    clipboard::WriterClipboard,
    constants::{ENV_FIXTURES, ENV_NOTIFICATION_TTL_MS},
    AssignmentStatus, CoreConfig, Patient, PatientBrowserAction, RecordStatus, RoundSummary, SegmentView, Session,
    SortKey, TextFormat, VisitContext,
};
use yorisoi_types::{display_date, short_display_date};

#[derive(Parser)]
#[command(name = "yorisoi")]
#[command(about = "Home-visit rounds documentation CLI")]
struct Cli {
    /// YAML dataset to load instead of the bundled demo data
    #[arg(long, global = true)]
    fixtures: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List patients
    Patients {
        /// Filter on name, kana or id
        #[arg(long, short)]
        query: Option<String>,
        /// Sort key: date, id or name
        #[arg(long, short, default_value = "date")]
        sort: String,
    },
    /// List a patient's records
    Records {
        patient_id: String,
    },
    /// Print a record as copy-paste text
    Text {
        patient_id: String,
        record_id: String,
        /// Text format: emr, soap or home_visit
        #[arg(long, short, default_value = "emr")]
        format: String,
    },
    /// Copy a record's text to stdout and report the outcome on stderr
    Copy {
        patient_id: String,
        record_id: String,
        /// Text format: emr, soap or home_visit
        #[arg(long, short, default_value = "emr")]
        format: String,
    },
    /// List rounds with confirmation progress
    Rounds,
    /// List the segments of a round
    Segments {
        round_id: String,
    },
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("yorisoi_core=warn".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let fixtures = cli
        .fixtures
        .map(|p| p.display().to_string())
        .or_else(|| std::env::var(ENV_FIXTURES).ok());
    let cfg = CoreConfig::from_env_values(fixtures, std::env::var(ENV_NOTIFICATION_TTL_MS).ok())?;
    let session = Session::load(&cfg).context("failed to load dataset")?;

    match cli.command {
        Commands::Patients { query, sort } => {
            let key: SortKey = sort.parse()?;
            let rows = session.patients.list(query.as_deref().unwrap_or_default(), key);
            if rows.is_empty() {
                println!("No patients found.");
            }
            for patient in rows {
                println!("{}", patient_line(patient));
            }
        }
        Commands::Records { patient_id } => {
            let patient = session
                .patients
                .patients()
                .iter()
                .find(|p| p.id.as_str() == patient_id)
                .with_context(|| format!("patient not found: {patient_id}"))?;
            println!(
                "{} ({}) {}歳 {} 生年月日: {}",
                patient.name,
                patient.kana,
                patient.age,
                patient.gender.label(),
                display_date(&patient.birth_date)
            );
            if patient.records.is_empty() {
                println!("No records found.");
            }
            for record in &patient.records {
                println!(
                    "ID: {}, 日付: {}, 状態: {}",
                    record.id,
                    display_date(&record.date),
                    status_label(record.status)
                );
            }
        }
        Commands::Text {
            patient_id,
            record_id,
            format,
        } => {
            let format: TextFormat = format.parse()?;
            let patient = session
                .patients
                .patients()
                .iter()
                .find(|p| p.id.as_str() == patient_id)
                .with_context(|| format!("patient not found: {patient_id}"))?;
            let record = patient
                .find_record(&record_id)
                .with_context(|| format!("record not found: {record_id}"))?;
            let context = VisitContext::new(patient.name.clone(), record.date.clone());
            println!("{}", format.render(&context, &record.clinical_data));
        }
        Commands::Copy {
            patient_id,
            record_id,
            format,
        } => {
            let format: TextFormat = format.parse()?;
            let now = Utc::now();
            let browser = session
                .patients
                .update(PatientBrowserAction::SelectPatient(patient_id.clone()), now)
                .update(PatientBrowserAction::SelectRecord(record_id.clone()), now);
            if browser.selected_record().is_none() {
                anyhow::bail!("record not found: {patient_id}/{record_id}");
            }
            let mut sink = WriterClipboard::new(std::io::stdout().lock());
            let browser = browser.copy_selected(&mut sink, format, now);
            if let Some(notification) = browser.notifier().visible(now) {
                eprintln!("{}", notification.message);
            }
        }
        Commands::Rounds => {
            let summaries = session.rounds.summaries();
            if summaries.is_empty() {
                println!("No rounds found.");
            }
            for summary in &summaries {
                println!("{}", round_line(summary));
            }
        }
        Commands::Segments { round_id } => {
            let views = session
                .rounds
                .segment_views(&round_id)
                .with_context(|| format!("round not found: {round_id}"))?;
            for view in &views {
                println!("{}", segment_line(view));
            }
        }
    }

    Ok(())
}

fn status_label(status: RecordStatus) -> &'static str {
    match status {
        RecordStatus::Approved => "承認済",
        RecordStatus::Pending => "未承認",
    }
}

fn patient_line(patient: &Patient) -> String {
    let latest = patient
        .latest_record()
        .map(|r| short_display_date(&r.date))
        .unwrap_or_else(|| "-".into());
    let pending = if patient.has_pending() { " [未承認あり]" } else { "" };
    format!(
        "ID: {}, 氏名: {} ({}), {}歳, 最終記録: {}{}",
        patient.id, patient.name, patient.kana, patient.age, latest, pending
    )
}

fn round_line(summary: &RoundSummary) -> String {
    format!(
        "ID: {}, {} {}, {}, 確定: {}/{}",
        summary.round_id,
        display_date(&summary.date),
        summary.timeframe,
        summary.facility_name,
        summary.progress.confirmed,
        summary.progress.total
    )
}

fn segment_line(view: &SegmentView) -> String {
    let mark = if view.status == AssignmentStatus::Confirmed {
        "✓"
    } else {
        " "
    };
    format!(
        "[{}] #{} {} (推定: {}) -> {}",
        mark, view.order, view.segment_id, view.predicted_name, view.label
    )
}
