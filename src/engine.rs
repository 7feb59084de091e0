//! End-to-end daily and weekly autoregulation
//!
//! [`Autoregulator`] wires the pure stages to their collaborators:
//!
//! ```text
//! biometrics ─┐
//!             ├─> metrics ─┐
//! clock ──────┘            ├─> rule engine ─> workout adjustment ─> substitutions
//! program store ─> goal ───┘
//! ```
//!
//! It is the only place the current date is read.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::adjustment::{AdjustmentContext, WorkoutAdjustmentGenerator};
use crate::autoregulation::AutoregulationRuleEngine;
use crate::config::{AutoregulationConfig, MetricsSettings};
use crate::error::{AutoregError, Result};
use crate::models::{
    ExerciseDefinition, GoalSummary, ProgramAwareAnalysis, ProgramGoal, WorkoutAdjustment,
    WorkoutPrescription,
};
use crate::periodization::{program_week, MesocyclePhaseResolver};
use crate::program::{ProgramPerformance, ProgramPerformanceAnalyzer};
use crate::recovery::{RecoveryMetrics, RecoveryMetricsCalculator};
use crate::sources::{
    BiometricDataSource, Clock, ExerciseCatalog, InMemoryCatalog, InMemoryProgramStore,
    ProgramStore, StaticBiometrics,
};
use crate::substitution::{apply_substitutions, ResolvedSubstitution, SubstitutionTable};

/// Everything decided for one training day
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyPlan {
    pub date: NaiveDate,
    pub program_week: u32,
    pub week_in_mesocycle: u32,
    pub metrics: RecoveryMetrics,
    pub analysis: ProgramAwareAnalysis,
    /// `None` when the planned workout stands
    pub adjustment: Option<WorkoutAdjustment>,
    pub substitutions: Vec<ResolvedSubstitution>,
    pub deload_recommended: bool,
    /// The session to perform after all changes
    pub workout: WorkoutPrescription,
}

impl DailyPlan {
    pub fn is_adjusted(&self) -> bool {
        self.adjustment.is_some() || !self.substitutions.is_empty()
    }
}

/// Weekly program review with the adjustments it implies
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklyReview {
    pub performance: ProgramPerformance,
    pub adjustments: Vec<WorkoutAdjustment>,
}

pub struct Autoregulator<'a> {
    biometrics: &'a dyn BiometricDataSource,
    programs: &'a dyn ProgramStore,
    catalog: &'a dyn ExerciseCatalog,
    clock: &'a dyn Clock,
    calculator: RecoveryMetricsCalculator,
    substitutions: SubstitutionTable,
    config: AutoregulationConfig,
}

impl<'a> Autoregulator<'a> {
    pub fn new(
        biometrics: &'a dyn BiometricDataSource,
        programs: &'a dyn ProgramStore,
        catalog: &'a dyn ExerciseCatalog,
        clock: &'a dyn Clock,
        config: AutoregulationConfig,
    ) -> Self {
        Self {
            biometrics,
            programs,
            catalog,
            clock,
            calculator: RecoveryMetricsCalculator::default(),
            substitutions: SubstitutionTable::default(),
            config: config.validate_settings(),
        }
    }

    pub fn with_metrics_settings(mut self, settings: MetricsSettings) -> Self {
        self.calculator = RecoveryMetricsCalculator::new(settings);
        self
    }

    pub fn with_substitution_table(mut self, table: SubstitutionTable) -> Self {
        self.substitutions = table;
        self
    }

    pub fn config(&self) -> &AutoregulationConfig {
        &self.config
    }

    /// Today's metrics from the configured window
    pub fn current_metrics(&self) -> Result<RecoveryMetrics> {
        let window = self.calculator.window_days();
        let recovery = self.biometrics.recovery_records(window)?;
        let strain = self.biometrics.strain_records(window)?;
        let sleep = self.biometrics.sleep_records(window)?;

        Ok(self
            .calculator
            .calculate(self.clock.today(), &recovery, &strain, &sleep))
    }

    /// Decide today's session for a goal
    ///
    /// Returns `Ok(None)` when there is no recovery record for today; the
    /// planned workout then stands as written.
    pub fn plan_day(
        &self,
        goal_id: &str,
        workout: &WorkoutPrescription,
    ) -> Result<Option<DailyPlan>> {
        let today = self.clock.today();
        let metrics = self.current_metrics()?;

        if !metrics.availability.recovery {
            tracing::info!(%today, goal = goal_id, "No recovery record for today, no adjustment");
            return Ok(None);
        }

        let goal = self.programs.goal(goal_id)?;
        let summary = self.programs.goal_summary(goal_id)?;
        let week = program_week(goal.start_date, today);
        let week_in_mesocycle = MesocyclePhaseResolver::week_in_mesocycle(week, &goal);

        let analysis = AutoregulationRuleEngine::analyze(&metrics, &goal, week, &self.config);
        let adjustment = WorkoutAdjustmentGenerator::adjust(
            workout,
            AdjustmentContext {
                metrics: &metrics,
                config: &self.config,
                analysis: Some(&analysis),
                summary: Some(&summary),
            },
        );

        let mut session = adjustment
            .as_ref()
            .map(|a| a.adjusted_workout.clone())
            .unwrap_or_else(|| workout.clone());

        let (substitutions, deload_recommended) = if self.config.enabled {
            let plan = self
                .substitutions
                .plan(&session, &metrics, week_in_mesocycle);
            let resolved = self.substitutions.resolve(&plan, self.catalog);
            session = apply_substitutions(&session, &resolved);
            (resolved, plan.deload_recommended)
        } else {
            (Vec::new(), false)
        };

        tracing::info!(
            %today,
            goal = goal_id,
            week,
            phase = %analysis.current_phase,
            adjusted = adjustment.is_some(),
            substitutions = substitutions.len(),
            "Daily plan ready"
        );

        Ok(Some(DailyPlan {
            date: today,
            program_week: week,
            week_in_mesocycle,
            metrics,
            analysis,
            adjustment,
            substitutions,
            deload_recommended,
            workout: session,
        }))
    }

    /// Review the trailing week and adjust the upcoming sessions
    pub fn review_week(
        &self,
        goal_id: &str,
        upcoming: &[WorkoutPrescription],
    ) -> Result<WeeklyReview> {
        let window = self.calculator.window_days();
        let recovery = self.biometrics.recovery_records(window)?;
        let strain = self.biometrics.strain_records(window)?;
        let sleep = self.biometrics.sleep_records(window)?;
        let today = self.clock.today();
        let averages = self
            .calculator
            .weekly_averages(today, &recovery, &strain, &sleep);

        let goal = self.programs.goal(goal_id)?;
        let summary = self.programs.goal_summary(goal_id)?;
        let week = program_week(goal.start_date, today);

        let performance =
            ProgramPerformanceAnalyzer::analyze(&averages, &goal, &summary, week, &self.config);
        let adjustments = if self.config.enabled {
            ProgramPerformanceAnalyzer::generate_weekly_adjustments(upcoming, &performance)
        } else {
            Vec::new()
        };

        Ok(WeeklyReview {
            performance,
            adjustments,
        })
    }
}

/// A self-contained input bundle: records, program state and the planned work
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    /// Date to plan for; the system date when absent
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub biometrics: StaticBiometrics,
    pub goal: ProgramGoal,
    pub summary: GoalSummary,
    pub workout: WorkoutPrescription,
    /// Upcoming sessions for the weekly review
    #[serde(default)]
    pub week: Vec<WorkoutPrescription>,
    #[serde(default)]
    pub catalog: Vec<ExerciseDefinition>,
    /// Overrides the application config when present
    #[serde(default)]
    pub config: Option<AutoregulationConfig>,
}

impl Snapshot {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let snapshot: Snapshot = serde_json::from_str(json)?;
        if snapshot.workout.day.trim().is_empty() {
            return Err(AutoregError::Validation(
                "workout.day must not be empty".to_string(),
            ));
        }
        Ok(snapshot)
    }

    /// Build the in-memory collaborators described by this snapshot
    ///
    /// With a pinned `date`, records dated after it are left out so a replayed
    /// day sees the same history it had at the time.
    pub fn sources(&self) -> (StaticBiometrics, InMemoryProgramStore, InMemoryCatalog) {
        let biometrics = StaticBiometrics::new(
            self.biometrics
                .recovery
                .iter()
                .filter(|r| self.on_or_before_date(r.date))
                .cloned()
                .collect(),
            self.biometrics
                .strain
                .iter()
                .filter(|s| self.on_or_before_date(s.date))
                .cloned()
                .collect(),
            self.biometrics
                .sleep
                .iter()
                .filter(|s| self.on_or_before_date(s.date))
                .cloned()
                .collect(),
        );

        let mut programs = InMemoryProgramStore::new();
        programs.insert(self.goal.clone(), self.summary.clone());

        let catalog = InMemoryCatalog::new(self.catalog.iter().cloned());

        (biometrics, programs, catalog)
    }

    fn on_or_before_date(&self, date: NaiveDate) -> bool {
        self.date.map_or(true, |pinned| date <= pinned)
    }
}
