//! Interfaces to the collaborators the engine reads from
//!
//! The adjustment logic never performs I/O. Biometric history, exercise
//! lookups, program definitions and the current date all arrive through these
//! traits, already resolved, so the core stays deterministic under test.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{Result, SourceError};
use crate::models::{
    ExerciseDefinition, GoalSummary, ProgramGoal, RecoveryRecord, SleepRecord, StrainRecord,
};

/// Supplies the current calendar date
pub trait Clock {
    fn today(&self) -> NaiveDate;
}

/// Clock backed by the local system time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        chrono::Local::now().date_naive()
    }
}

/// Clock pinned to a single date
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// Daily readiness records, newest first, at most one per date
pub trait BiometricDataSource {
    fn recovery_records(&self, days: usize) -> Result<Vec<RecoveryRecord>>;
    fn strain_records(&self, days: usize) -> Result<Vec<StrainRecord>>;
    fn sleep_records(&self, days: usize) -> Result<Vec<SleepRecord>>;
}

/// Resolves exercise ids to definitions
pub trait ExerciseCatalog {
    fn lookup(&self, exercise_id: &str) -> Option<ExerciseDefinition>;
}

/// Supplies goals and their progress
pub trait ProgramStore {
    fn goal(&self, goal_id: &str) -> Result<ProgramGoal>;
    fn goal_summary(&self, goal_id: &str) -> Result<GoalSummary>;
}

/// Biometric history held in memory
///
/// Records are sorted newest first on construction, so callers may pass them
/// in any order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StaticBiometrics {
    #[serde(default)]
    pub recovery: Vec<RecoveryRecord>,
    #[serde(default)]
    pub strain: Vec<StrainRecord>,
    #[serde(default)]
    pub sleep: Vec<SleepRecord>,
}

impl StaticBiometrics {
    pub fn new(
        mut recovery: Vec<RecoveryRecord>,
        mut strain: Vec<StrainRecord>,
        mut sleep: Vec<SleepRecord>,
    ) -> Self {
        recovery.sort_by(|a, b| b.date.cmp(&a.date));
        strain.sort_by(|a, b| b.date.cmp(&a.date));
        sleep.sort_by(|a, b| b.date.cmp(&a.date));
        Self { recovery, strain, sleep }
    }
}

impl BiometricDataSource for StaticBiometrics {
    fn recovery_records(&self, days: usize) -> Result<Vec<RecoveryRecord>> {
        Ok(self.recovery.iter().take(days).cloned().collect())
    }

    fn strain_records(&self, days: usize) -> Result<Vec<StrainRecord>> {
        Ok(self.strain.iter().take(days).cloned().collect())
    }

    fn sleep_records(&self, days: usize) -> Result<Vec<SleepRecord>> {
        Ok(self.sleep.iter().take(days).cloned().collect())
    }
}

/// Exercise catalog held in memory
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    exercises: HashMap<String, ExerciseDefinition>,
}

impl InMemoryCatalog {
    pub fn new(definitions: impl IntoIterator<Item = ExerciseDefinition>) -> Self {
        Self {
            exercises: definitions
                .into_iter()
                .map(|def| (def.id.clone(), def))
                .collect(),
        }
    }
}

impl ExerciseCatalog for InMemoryCatalog {
    fn lookup(&self, exercise_id: &str) -> Option<ExerciseDefinition> {
        self.exercises.get(exercise_id).cloned()
    }
}

/// Program store holding goals and summaries in memory
#[derive(Debug, Clone, Default)]
pub struct InMemoryProgramStore {
    goals: HashMap<String, (ProgramGoal, GoalSummary)>,
}

impl InMemoryProgramStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, goal: ProgramGoal, summary: GoalSummary) {
        self.goals.insert(goal.id.clone(), (goal, summary));
    }
}

impl ProgramStore for InMemoryProgramStore {
    fn goal(&self, goal_id: &str) -> Result<ProgramGoal> {
        self.goals
            .get(goal_id)
            .map(|(goal, _)| goal.clone())
            .ok_or_else(|| {
                SourceError::GoalNotFound {
                    goal_id: goal_id.to_string(),
                }
                .into()
            })
    }

    fn goal_summary(&self, goal_id: &str) -> Result<GoalSummary> {
        self.goals
            .get(goal_id)
            .map(|(_, summary)| summary.clone())
            .ok_or_else(|| {
                SourceError::GoalNotFound {
                    goal_id: goal_id.to_string(),
                }
                .into()
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AutoregError;
    use crate::models::{GoalType, PaceVsPlan, Timeframe, TimeUnit};

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }

    #[test]
    fn test_static_biometrics_sorted_newest_first() {
        let records = (1..=10)
            .map(|d| RecoveryRecord {
                date: date(d),
                score: d as f64 * 10.0,
                hrv_ms: 50.0,
                resting_heart_rate: 52.0,
            })
            .collect();
        let source = StaticBiometrics::new(records, Vec::new(), Vec::new());

        let window = source.recovery_records(7).unwrap();
        assert_eq!(window.len(), 7);
        assert_eq!(window[0].date, date(10));
        assert_eq!(window[6].date, date(4));
    }

    #[test]
    fn test_program_store_lookup() {
        let mut store = InMemoryProgramStore::new();
        store.insert(
            ProgramGoal {
                id: "g1".to_string(),
                goal_type: GoalType::Strength,
                timeframe: Timeframe { value: 12, unit: TimeUnit::Weeks },
                periodization: None,
                start_date: date(1),
            },
            GoalSummary {
                percent_complete: 25.0,
                weeks_elapsed: 3,
                total_weeks: 12,
                pace_vs_plan: PaceVsPlan::OnTrack,
            },
        );

        assert_eq!(store.goal("g1").unwrap().goal_type, GoalType::Strength);
        assert_eq!(store.goal_summary("g1").unwrap().weeks_elapsed, 3);
        assert!(matches!(
            store.goal("missing"),
            Err(AutoregError::Source(SourceError::GoalNotFound { .. }))
        ));
    }

    #[test]
    fn test_fixed_clock() {
        assert_eq!(FixedClock(date(15)).today(), date(15));
    }
}
