use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use rust_decimal::Decimal;
use std::fs;
use std::path::PathBuf;
use tabled::{settings::Style, Table, Tabled};

use autoregrs::engine::{Autoregulator, DailyPlan, Snapshot, WeeklyReview};
use autoregrs::error::{AutoregError, ErrorSeverity};
use autoregrs::logging::{init_logging, LogFormat, LogLevel};
use autoregrs::models::{ProgramGoal, WorkoutPrescription};
use autoregrs::periodization::MesocyclePhaseResolver;
use autoregrs::rpe::RpeGuidance;
use autoregrs::sources::{Clock, FixedClock, SystemClock};
use autoregrs::AppConfig;

/// autoregrs - Autoregulated Training CLI
///
/// Adjusts planned strength and conditioning sessions to the athlete's
/// recovery, strain and sleep, within the structure of a periodized program.
#[derive(Parser)]
#[command(name = "autoregrs")]
#[command(author = "autoregrs Contributors")]
#[command(version = "0.1.0")]
#[command(about = "Autoregulated training adjustments", long_about = None)]
struct Cli {
    /// Sets a custom config file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase verbosity of output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Log output format (pretty, json, compact)
    #[arg(long, value_name = "FORMAT")]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Adjust today's workout from a snapshot of records and program state
    Adjust {
        /// Snapshot JSON file
        #[arg(short, long)]
        snapshot: PathBuf,

        /// Print the full plan as JSON
        #[arg(long)]
        json: bool,

        /// Also review the week in the snapshot
        #[arg(short, long)]
        week: bool,

        /// Planned RPE for today's top sets (1-10)
        #[arg(long, value_name = "RPE")]
        base_rpe: Option<Decimal>,
    },

    /// Show the training phase for a program week
    Phase {
        /// 1-based program week
        #[arg(short, long)]
        week: u32,

        /// Goal JSON file
        #[arg(short, long)]
        goal: PathBuf,

        /// Print the phase schedule for this many weeks
        #[arg(short, long)]
        schedule: Option<u32>,
    },

    /// Shift a target RPE by an intensity adjustment
    Rpe {
        /// Planned RPE (1-10)
        #[arg(short, long)]
        base: Decimal,

        /// Intensity adjustment (-2 to +2)
        #[arg(short, long, allow_hyphen_values = true)]
        adjustment: Decimal,
    },

    /// Configure application settings
    Config {
        /// Print the active configuration
        #[arg(long)]
        show: bool,

        /// Write a default configuration file
        #[arg(long)]
        init: bool,
    },
}

#[derive(Tabled)]
struct MetricRow {
    #[tabled(rename = "Metric")]
    metric: String,
    #[tabled(rename = "Today")]
    today: String,
    #[tabled(rename = "Trend")]
    trend: String,
}

#[derive(Tabled)]
struct WorkoutRow {
    #[tabled(rename = "")]
    label: &'static str,
    #[tabled(rename = "Planned")]
    planned: String,
    #[tabled(rename = "Adjusted")]
    adjusted: String,
}

#[derive(Tabled)]
struct PhaseRow {
    #[tabled(rename = "Week")]
    week: u32,
    #[tabled(rename = "Phase")]
    phase: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut app_config = match &cli.config {
        Some(path) => AppConfig::load_from_file(path)?,
        None => AppConfig::load_or_default(),
    };

    if cli.verbose > 0 {
        app_config.logging.level = LogLevel::from_verbosity(cli.verbose);
    }
    if let Some(format) = cli.log_format {
        app_config.logging.format = format;
    }
    init_logging(&app_config.logging)?;
    app_config.metrics.validate().map_err(report)?;

    match cli.command {
        Commands::Adjust {
            snapshot,
            json,
            week,
            base_rpe,
        } => run_adjust(&app_config, snapshot, json, week, base_rpe)?,

        Commands::Phase {
            week,
            goal,
            schedule,
        } => {
            let content = fs::read_to_string(&goal)
                .with_context(|| format!("Failed to read goal file: {}", goal.display()))?;
            let goal: ProgramGoal =
                serde_json::from_str(&content).with_context(|| "Failed to parse goal JSON")?;

            let phase = MesocyclePhaseResolver::phase(week, &goal);
            println!("{}", format!("Week {}: {}", week, phase).cyan().bold());
            println!(
                "  Week in mesocycle: {}",
                MesocyclePhaseResolver::week_in_mesocycle(week, &goal)
            );
            println!("  Program length: {} weeks", goal.timeframe.total_weeks());

            if let Some(weeks) = schedule {
                let rows: Vec<PhaseRow> = MesocyclePhaseResolver::schedule(&goal, weeks)
                    .into_iter()
                    .enumerate()
                    .map(|(i, phase)| PhaseRow {
                        week: i as u32 + 1,
                        phase: phase.to_string(),
                    })
                    .collect();
                println!("{}", Table::new(rows).with(Style::rounded()));
            }
        }

        Commands::Rpe { base, adjustment } => {
            let guidance = RpeGuidance::new(base, adjustment, &[]).map_err(report)?;
            println!(
                "{}",
                format!(
                    "Target RPE {} ({})",
                    guidance.adjusted_rpe.normalize(),
                    guidance.description
                )
                .green()
                .bold()
            );
            println!("  {}", guidance.guidance);
            for note in &guidance.notes {
                println!("  {}", note.dimmed());
            }
        }

        Commands::Config { show, init } => {
            if init {
                let path = cli.config.unwrap_or_else(AppConfig::default_config_path);
                let mut config = AppConfig::default();
                config.save_to_file(&path)?;
                println!("{}", format!("✓ Wrote default configuration to {}", path.display()).green());
            }
            if show || !init {
                println!("{}", toml::to_string_pretty(&app_config)?);
            }
        }
    }

    Ok(())
}

fn run_adjust(
    app_config: &AppConfig,
    snapshot_path: PathBuf,
    json: bool,
    include_week: bool,
    base_rpe: Option<Decimal>,
) -> Result<()> {
    let snapshot = Snapshot::load(&snapshot_path)
        .map_err(report)
        .with_context(|| format!("Failed to load snapshot: {}", snapshot_path.display()))?;

    let config = snapshot
        .config
        .clone()
        .unwrap_or_else(|| app_config.autoregulation.clone());
    let clock: Box<dyn Clock> = match snapshot.date {
        Some(date) => Box::new(FixedClock(date)),
        None => Box::new(SystemClock),
    };
    let (biometrics, programs, catalog) = snapshot.sources();

    let engine = Autoregulator::new(&biometrics, &programs, &catalog, clock.as_ref(), config)
        .with_metrics_settings(app_config.metrics.clone());

    let plan = engine
        .plan_day(&snapshot.goal.id, &snapshot.workout)
        .map_err(report)?;
    let review = if include_week {
        Some(
            engine
                .review_week(&snapshot.goal.id, &snapshot.week)
                .map_err(report)?,
        )
    } else {
        None
    };
    let rpe = match (&plan, base_rpe) {
        (Some(plan), Some(base)) => {
            Some(RpeGuidance::for_analysis(base, &plan.analysis).map_err(report)?)
        }
        _ => None,
    };

    if json {
        let output = serde_json::json!({
            "plan": plan,
            "weekly_review": review,
            "rpe": rpe,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    match &plan {
        Some(plan) => print_plan(&snapshot.workout, plan),
        None => {
            println!("{}", "No recovery data for today".yellow().bold());
            println!("  Train as planned: {}", snapshot.workout.title);
        }
    }

    if let Some(rpe) = rpe {
        println!();
        println!(
            "{}",
            format!("Target RPE {} ({})", rpe.adjusted_rpe.normalize(), rpe.description).bold()
        );
        println!("  {}", rpe.guidance);
    }

    if let Some(review) = review {
        print_review(&review);
    }

    Ok(())
}

fn print_plan(planned: &WorkoutPrescription, plan: &DailyPlan) {
    let header = format!(
        "{} · week {} ({}) · {}",
        plan.date, plan.program_week, plan.analysis.current_phase, planned.day
    );
    println!("{}", header.cyan().bold());

    let m = &plan.metrics;
    let metrics = vec![
        MetricRow {
            metric: "Recovery".to_string(),
            today: format!("{:.0}%", m.recovery),
            trend: format!("{:+.1}", m.recovery_trend),
        },
        MetricRow {
            metric: "Strain".to_string(),
            today: format!("{:.1}", m.strain),
            trend: format!("{:+.1}", m.strain_trend),
        },
        MetricRow {
            metric: "Sleep quality".to_string(),
            today: format!("{:.0}%", m.sleep_quality),
            trend: "-".to_string(),
        },
        MetricRow {
            metric: "HRV".to_string(),
            today: m
                .hrv
                .map(|hrv| format!("{:.0} ms", hrv))
                .unwrap_or_else(|| "-".to_string()),
            trend: format!("{:+.1}", m.hrv_trend),
        },
    ];
    println!("{}", Table::new(metrics).with(Style::rounded()));

    let adjusted = &plan.workout;
    let rows = vec![
        WorkoutRow {
            label: "Title",
            planned: planned.title.clone(),
            adjusted: adjusted.title.clone(),
        },
        WorkoutRow {
            label: "Intensity",
            planned: planned.intensity.to_string(),
            adjusted: adjusted.intensity.to_string(),
        },
        WorkoutRow {
            label: "Duration",
            planned: planned.duration.clone(),
            adjusted: adjusted.duration.clone(),
        },
        WorkoutRow {
            label: "Exercises",
            planned: exercise_list(planned),
            adjusted: exercise_list(adjusted),
        },
    ];
    println!("{}", Table::new(rows).with(Style::rounded()));

    match &plan.adjustment {
        Some(adjustment) => println!(
            "{}",
            format!(
                "✓ Adjusted ({}, confidence {:.0}%)",
                adjustment.adjustment_type,
                adjustment.confidence_score * 100.0
            )
            .green()
            .bold()
        ),
        None if plan.is_adjusted() => println!("{}", "✓ Exercise substitutions applied".green()),
        None => println!("{}", "✓ No adjustment needed".green()),
    }

    for note in &adjusted.adjustment_notes {
        println!("  • {}", note);
    }
    for sub in &plan.substitutions {
        println!("  • {}", sub.note);
    }
    if plan.deload_recommended {
        println!("{}", "  Recovery is trending down late in the mesocycle: consider a deload week".yellow());
    }
}

fn print_review(review: &WeeklyReview) {
    let summary = &review.performance.summary;
    println!();
    println!(
        "{}",
        format!(
            "Week {} of {} · {:.0}% complete · {:?}",
            summary.current_week, summary.total_weeks, summary.percent_complete, summary.pace_vs_plan
        )
        .magenta()
        .bold()
    );

    if review.performance.flags.is_empty() {
        println!("  No weekly patterns flagged");
    }
    for flag in &review.performance.flags {
        println!("  {} {}", "!".yellow().bold(), flag.detail);
    }
    for adjustment in &review.adjustments {
        println!(
            "  {}: {} → {}, {}",
            adjustment.original_workout.day,
            adjustment.original_workout.intensity,
            adjustment.adjusted_workout.intensity,
            adjustment.adjusted_workout.duration
        );
    }
}

fn exercise_list(workout: &WorkoutPrescription) -> String {
    if workout.exercises.is_empty() {
        return "-".to_string();
    }
    workout
        .exercises
        .iter()
        .map(|e| e.name.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Log a library error at its severity and convert it for display
fn report(err: AutoregError) -> anyhow::Error {
    match err.severity() {
        ErrorSeverity::Error => tracing::error!(error = %err, "Command failed"),
        ErrorSeverity::Warning => tracing::warn!(error = %err, "Command failed"),
    }
    anyhow::anyhow!(err.user_message())
}
