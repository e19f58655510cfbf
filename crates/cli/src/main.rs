// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

use clap::{Parser, Subcommand};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use color_eyre::{
    Result,
    eyre::{Context, bail, eyre},
};
use licenca_domain::{
    DEFAULT_DURATION_MONTHS, RetirementProgress, RetirementReport, StatusClassification,
    StatusCounts, Subject, UpcomingLeave, UpcomingWindowCounts, build_retirement_report,
    classify_many, normalize_cpf, parse_date, retirement_progress, retirement_summary,
    status_counts_by_unit, upcoming_detailed, upcoming_window_counts,
};
use licenca_import::{
    AbsenceRecord, DEFAULT_UPCOMING_DAYS, TracingDiagnostics, attach_absences, build_dashboard,
    load_absences, load_subjects, subjects_from_json,
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use time::{Date, OffsetDateTime};
use tracing::level_filters::LevelFilter;
use tracing::{error, info, warn};
use tracing_log::AsTrace;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    color_eyre::install()?;
    let args: Args = Args::parse();
    init_tracing(args.log_level());

    match args.run() {
        Ok(()) => (),
        Err(err) => {
            error!("{err:?}");
            std::process::exit(1);
        }
    }
    Ok(())
}

/// Logs go to stderr so stdout carries only JSON. `RUST_LOG` overrides the
/// verbosity flags.
fn init_tracing(level: LevelFilter) {
    let filter: EnvFilter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

/// Leave schedule and retirement eligibility reports from HR spreadsheets
#[derive(Debug, Parser)]
#[command(name = "licenca", author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    source: SourceArgs,

    #[command(flatten)]
    verbosity: Verbosity<InfoLevel>,
}

#[derive(Debug, clap::Args)]
struct SourceArgs {
    /// Subject sheet (CSV)
    #[arg(short, long, global = true, conflicts_with = "json")]
    input: Option<PathBuf>,

    /// Absence sheet (CSV) with type and day columns
    #[arg(short, long, global = true)]
    absences: Option<PathBuf>,

    /// Pre-built subject array (JSON) instead of a subject sheet
    #[arg(long, global = true)]
    json: Option<PathBuf>,

    /// Reference date for every computation; defaults to today (UTC)
    #[arg(short, long, global = true)]
    reference_date: Option<String>,

    /// Leave duration in months for schedule text with a single date
    #[arg(long, global = true, default_value_t = DEFAULT_DURATION_MONTHS)]
    default_months: u32,

    /// CSV field delimiter; detected from the header line when omitted
    #[arg(short, long, global = true, value_parser = parse_delimiter)]
    delimiter: Option<u8>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Leave status per subject, overall and per unit
    #[command(visible_alias = "s")]
    Status,

    /// Leave periods starting soon
    #[command(visible_alias = "u")]
    Upcoming {
        /// Look-ahead in days for the detailed list
        #[arg(long, default_value_t = DEFAULT_UPCOMING_DAYS)]
        days: u32,
    },

    /// Retirement outlook for all subjects, or the full report of one
    #[command(visible_alias = "r")]
    Retirement {
        /// CPF or name of a single subject
        #[arg(long)]
        subject: Option<String>,
    },

    /// Everything above in one document
    #[command(visible_alias = "d")]
    Dashboard {
        /// Look-ahead in days for the detailed list
        #[arg(long, default_value_t = DEFAULT_UPCOMING_DAYS)]
        days: u32,
    },
}

#[derive(Debug, Serialize)]
struct StatusOutput {
    reference_date: Date,
    leave_status: StatusClassification,
    status_by_unit: BTreeMap<String, StatusCounts>,
}

#[derive(Debug, Serialize)]
struct UpcomingOutput {
    reference_date: Date,
    days: u32,
    windows: UpcomingWindowCounts,
    upcoming: Vec<UpcomingLeave>,
}

#[derive(Debug, Serialize)]
struct SubjectRetirementOutput {
    report: RetirementReport,
    progress: RetirementProgress,
}

impl Args {
    fn log_level(&self) -> LevelFilter {
        self.verbosity.log_level_filter().as_trace()
    }

    fn run(self) -> Result<()> {
        let today: Date = resolve_reference_date(self.source.reference_date.as_deref())?;
        let subjects: Vec<Subject> = self.source.load()?;
        info!(subjects = subjects.len(), %today, "Running report");
        self.command.run(&subjects, today)
    }
}

impl SourceArgs {
    fn load(&self) -> Result<Vec<Subject>> {
        let sink: TracingDiagnostics = TracingDiagnostics;
        let mut subjects: Vec<Subject> = match (&self.json, &self.input) {
            (Some(path), _) => subjects_from_json(&read(path)?)
                .wrap_err_with(|| format!("Failed to load subjects from {}", path.display()))?,
            (None, Some(path)) => {
                load_subjects(&read(path)?, self.delimiter, self.default_months, &sink)
                    .wrap_err_with(|| format!("Failed to load subjects from {}", path.display()))?
            }
            (None, None) => bail!("Either --input or --json is required"),
        };

        if let Some(path) = &self.absences {
            let records: Vec<AbsenceRecord> = load_absences(&read(path)?, self.delimiter)
                .wrap_err_with(|| format!("Failed to load absences from {}", path.display()))?;
            let unmatched: usize = attach_absences(&mut subjects, records);
            if unmatched > 0 {
                warn!(unmatched, "Some absence records match no subject");
            }
        }

        Ok(subjects)
    }
}

impl Command {
    fn run(self, subjects: &[Subject], today: Date) -> Result<()> {
        let sink: TracingDiagnostics = TracingDiagnostics;
        match self {
            Self::Status => print_json(&StatusOutput {
                reference_date: today,
                leave_status: classify_many(subjects, today, &sink),
                status_by_unit: status_counts_by_unit(subjects, today),
            }),
            Self::Upcoming { days } => print_json(&UpcomingOutput {
                reference_date: today,
                days,
                windows: upcoming_window_counts(subjects, today),
                upcoming: upcoming_detailed(subjects, days, today),
            }),
            Self::Retirement { subject: None } => {
                print_json(&retirement_summary(subjects, today, &sink))
            }
            Self::Retirement {
                subject: Some(query),
            } => {
                let subject: &Subject = find_subject(subjects, &query)
                    .ok_or_else(|| eyre!("No subject matches '{query}'"))?;
                print_json(&SubjectRetirementOutput {
                    report: build_retirement_report(subject, today)?,
                    progress: retirement_progress(subject, today)?,
                })
            }
            Self::Dashboard { days } => print_json(&build_dashboard(subjects, today, days, &sink)),
        }
    }
}

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).wrap_err_with(|| format!("Failed to read {}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let text: String = serde_json::to_string_pretty(value).wrap_err("Failed to serialize output")?;
    println!("{text}");
    Ok(())
}

/// Parses `--reference-date`, or captures today once.
fn resolve_reference_date(raw: Option<&str>) -> Result<Date> {
    match raw {
        Some(text) => parse_date(text).ok_or_else(|| eyre!("Unrecognized reference date '{text}'")),
        None => Ok(OffsetDateTime::now_utc().date()),
    }
}

fn parse_delimiter(raw: &str) -> Result<u8, String> {
    match raw {
        "\\t" | "tab" => Ok(b'\t'),
        _ => match raw.as_bytes() {
            [byte] if byte.is_ascii() => Ok(*byte),
            _ => Err(format!("delimiter must be a single ASCII character, got '{raw}'")),
        },
    }
}

/// Finds a subject by CPF (any punctuation) or by name.
fn find_subject<'a>(subjects: &'a [Subject], query: &str) -> Option<&'a Subject> {
    let by_name: String = Subject::new(query).id();
    let by_cpf: Option<String> = normalize_cpf(query);
    subjects
        .iter()
        .find(|s| by_cpf.as_ref().is_some_and(|cpf| s.id() == *cpf) || s.id() == by_name)
}
