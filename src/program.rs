//! Program-level performance analysis over the trailing week
//!
//! Works from weekly averages rather than a single day, so it catches slow
//! drifts that daily autoregulation misses, and can turn them into
//! per-workout adjustments for the coming week.

use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::config::AutoregulationConfig;
use crate::duration::scale_duration;
use crate::models::{
    AdjustmentType, GoalSummary, Intensity, MetricsSnapshot, PaceVsPlan, ProgramGoal,
    TrainingPhase, WorkoutAdjustment, WorkoutPrescription,
};
use crate::periodization::MesocyclePhaseResolver;
use crate::recovery::WeeklyAverages;
use crate::describe;

const OVERREACHING_RECOVERY: f64 = 55.0;
const OVERREACHING_STRAIN: f64 = 12.0;
const UNDERTRAINING_RECOVERY: f64 = 80.0;
const UNDERTRAINING_STRAIN: f64 = 8.0;
const POOR_SLEEP_QUALITY: f64 = 70.0;
const BASE_CONFIDENCE: f64 = 0.5;
const CONFIDENCE_PER_FLAG: f64 = 0.2;

/// Weekly pattern worth acting on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PerformanceFlag {
    Overreaching,
    UndertrainingPotential,
    PoorSleepPattern,
    ElevatedStress,
}

impl PerformanceFlag {
    pub fn action(self) -> WeeklyAction {
        match self {
            PerformanceFlag::Overreaching | PerformanceFlag::ElevatedStress => {
                WeeklyAction::IncreaseRecovery
            }
            PerformanceFlag::UndertrainingPotential => WeeklyAction::IncreaseIntensity,
            PerformanceFlag::PoorSleepPattern => WeeklyAction::ModifySchedule,
        }
    }
}

/// Program-level response to a flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeeklyAction {
    IncreaseRecovery,
    IncreaseIntensity,
    ModifySchedule,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlaggedPattern {
    pub flag: PerformanceFlag,
    pub action: WeeklyAction,
    pub detail: String,
}

/// Where the athlete stands in the program
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgramSummary {
    pub current_week: u32,
    pub total_weeks: u32,
    pub percent_complete: f64,
    pub pace_vs_plan: PaceVsPlan,
    pub current_phase: TrainingPhase,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgramPerformance {
    pub averages: WeeklyAverages,
    pub flags: Vec<FlaggedPattern>,
    pub summary: ProgramSummary,
}

impl ProgramPerformance {
    pub fn has_action(&self, action: WeeklyAction) -> bool {
        self.flags.iter().any(|f| f.action == action)
    }

    fn details_for(&self, action: WeeklyAction) -> Vec<String> {
        self.flags
            .iter()
            .filter(|f| f.action == action)
            .map(|f| f.detail.clone())
            .collect()
    }
}

/// Weekly program monitor
pub struct ProgramPerformanceAnalyzer;

impl ProgramPerformanceAnalyzer {
    /// Flag weekly patterns and summarize program progress
    pub fn analyze(
        averages: &WeeklyAverages,
        goal: &ProgramGoal,
        goal_summary: &GoalSummary,
        current_week: u32,
        config: &AutoregulationConfig,
    ) -> ProgramPerformance {
        let config = config.validate_settings();
        let mut flags = Vec::new();

        if averages.avg_recovery < OVERREACHING_RECOVERY && averages.avg_strain > OVERREACHING_STRAIN {
            flags.push(Self::flag(
                PerformanceFlag::Overreaching,
                format!(
                    "Average recovery {:.0}% with strain {:.1}: signs of overreaching",
                    averages.avg_recovery, averages.avg_strain
                ),
            ));
        }

        if goal_summary.pace_vs_plan == PaceVsPlan::Ahead
            && averages.avg_recovery > UNDERTRAINING_RECOVERY
            && averages.avg_strain < UNDERTRAINING_STRAIN
        {
            flags.push(Self::flag(
                PerformanceFlag::UndertrainingPotential,
                format!(
                    "Ahead of plan with {:.0}% average recovery and low strain: room to push",
                    averages.avg_recovery
                ),
            ));
        }

        if averages.avg_sleep_quality < POOR_SLEEP_QUALITY {
            flags.push(Self::flag(
                PerformanceFlag::PoorSleepPattern,
                format!(
                    "Average sleep quality {:.0}%: schedule hard sessions after your best nights",
                    averages.avg_sleep_quality
                ),
            ));
        }

        if let Some(hrv) = averages.avg_hrv {
            if hrv < config.hrv_threshold {
                flags.push(Self::flag(
                    PerformanceFlag::ElevatedStress,
                    format!(
                        "Average HRV {:.0} ms is below your threshold of {:.0} ms",
                        hrv, config.hrv_threshold
                    ),
                ));
            }
        }

        for flagged in &flags {
            tracing::debug!(flag = ?flagged.flag, action = ?flagged.action, "Weekly pattern flagged");
        }

        ProgramPerformance {
            averages: averages.clone(),
            flags,
            summary: ProgramSummary {
                current_week,
                total_weeks: Self::total_weeks(goal, goal_summary),
                percent_complete: goal_summary.percent_complete,
                pace_vs_plan: goal_summary.pace_vs_plan,
                current_phase: MesocyclePhaseResolver::phase(current_week, goal),
            },
        }
    }

    /// Program length as the store reports it, else derived from the timeframe
    fn total_weeks(goal: &ProgramGoal, goal_summary: &GoalSummary) -> u32 {
        if goal_summary.total_weeks > 0 {
            goal_summary.total_weeks
        } else {
            goal.timeframe.total_weeks()
        }
    }

    /// Turn flagged patterns into adjustments for the week's workouts
    ///
    /// Recovery actions take precedence over an intensity increase. The
    /// hardest session also absorbs a schedule change when sleep is poor.
    pub fn generate_weekly_adjustments(
        week: &[WorkoutPrescription],
        performance: &ProgramPerformance,
    ) -> Vec<WorkoutAdjustment> {
        let increase_recovery = performance.has_action(WeeklyAction::IncreaseRecovery);
        let increase_intensity =
            !increase_recovery && performance.has_action(WeeklyAction::IncreaseIntensity);
        let modify_schedule = performance.has_action(WeeklyAction::ModifySchedule);

        let hardest = if modify_schedule {
            week.iter()
                .enumerate()
                .filter(|(_, w)| w.intensity > Intensity::VeryLow)
                .max_by_key(|(i, w)| (w.intensity, std::cmp::Reverse(*i)))
                .map(|(i, _)| i)
        } else {
            None
        };

        let snapshot = MetricsSnapshot {
            recovery: performance.averages.avg_recovery,
            strain: performance.averages.avg_strain,
            sleep_quality: performance.averages.avg_sleep_quality,
            hrv: performance.averages.avg_hrv,
        };
        let confidence =
            (BASE_CONFIDENCE + CONFIDENCE_PER_FLAG * performance.flags.len() as f64).min(1.0);

        let mut adjustments = Vec::new();

        for (index, workout) in week.iter().enumerate() {
            let mut adjusted = workout.clone();
            let mut reasons = Vec::new();

            if increase_recovery && workout.intensity >= Intensity::MediumHigh {
                adjusted = Self::ease(&adjusted, -1);
                adjusted.duration = scale_duration(&adjusted.duration, dec!(0.85));
                reasons.extend(performance.details_for(WeeklyAction::IncreaseRecovery));
            }

            if increase_intensity && workout.intensity == Intensity::Low {
                adjusted = Self::ease(&adjusted, 1);
                reasons.extend(performance.details_for(WeeklyAction::IncreaseIntensity));
            }

            if hardest == Some(index) {
                if adjusted.intensity == workout.intensity {
                    adjusted = Self::ease(&adjusted, -1);
                }
                adjusted.adjustment_notes.push(
                    "Move this session to the day after your best night of sleep".to_string(),
                );
                reasons.extend(performance.details_for(WeeklyAction::ModifySchedule));
            }

            if reasons.is_empty() {
                continue;
            }

            let reason = reasons.join("; ");
            adjusted.adjustment_notes.insert(0, reason.clone());

            adjustments.push(WorkoutAdjustment {
                original_workout: workout.clone(),
                adjusted_workout: adjusted,
                adjustment_reason: reason,
                adjustment_type: AdjustmentType::Intensity,
                confidence_score: confidence,
                metrics: snapshot.clone(),
            });
        }

        tracing::info!(
            week = performance.summary.current_week,
            adjusted = adjustments.len(),
            "Weekly adjustments generated"
        );

        adjustments
    }

    fn flag(flag: PerformanceFlag, detail: String) -> FlaggedPattern {
        FlaggedPattern {
            flag,
            action: flag.action(),
            detail,
        }
    }

    fn ease(workout: &WorkoutPrescription, steps: i32) -> WorkoutPrescription {
        let intensity = workout.intensity.step(steps);
        WorkoutPrescription {
            intensity,
            description: describe::rewrite_intensity(&workout.description, workout.intensity, intensity),
            ..workout.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GoalType, Periodization, PhaseDistribution, Timeframe, TimeUnit};
    use chrono::NaiveDate;

    fn goal() -> ProgramGoal {
        ProgramGoal {
            id: "hypertrophy".to_string(),
            goal_type: GoalType::MuscleGain,
            timeframe: Timeframe { value: 3, unit: TimeUnit::Months },
            periodization: Some(Periodization {
                mesocycle_length: 4,
                phase_distribution: PhaseDistribution {
                    accumulation: 2,
                    intensification: 1,
                    realization: 0,
                },
            }),
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        }
    }

    fn summary(pace: PaceVsPlan) -> GoalSummary {
        GoalSummary {
            percent_complete: 45.0,
            weeks_elapsed: 6,
            total_weeks: 13,
            pace_vs_plan: pace,
        }
    }

    fn averages(recovery: f64, strain: f64, sleep: f64, hrv: Option<f64>) -> WeeklyAverages {
        WeeklyAverages {
            days: 7,
            avg_recovery: recovery,
            avg_strain: strain,
            avg_sleep_quality: sleep,
            avg_hrv: hrv,
        }
    }

    fn session(day: &str, intensity: Intensity, duration: &str) -> WorkoutPrescription {
        WorkoutPrescription {
            day: day.to_string(),
            title: format!("{} session", day),
            description: format!("{} intensity work", intensity),
            intensity,
            duration: duration.to_string(),
            workout_type: "strength".to_string(),
            exercises: Vec::new(),
            adjustment_notes: Vec::new(),
        }
    }

    fn week() -> Vec<WorkoutPrescription> {
        vec![
            session("Monday", Intensity::High, "60 minutes"),
            session("Tuesday", Intensity::Low, "30 minutes"),
            session("Thursday", Intensity::MediumHigh, "40-60 minutes"),
            session("Saturday", Intensity::Medium, "45 minutes"),
        ]
    }

    fn flags(performance: &ProgramPerformance) -> Vec<PerformanceFlag> {
        performance.flags.iter().map(|f| f.flag).collect()
    }

    #[test]
    fn test_flags() {
        let config = AutoregulationConfig::default();

        let p = ProgramPerformanceAnalyzer::analyze(
            &averages(50.0, 14.0, 65.0, Some(35.0)),
            &goal(),
            &summary(PaceVsPlan::OnTrack),
            6,
            &config,
        );
        assert_eq!(
            flags(&p),
            vec![
                PerformanceFlag::Overreaching,
                PerformanceFlag::PoorSleepPattern,
                PerformanceFlag::ElevatedStress
            ]
        );

        let p = ProgramPerformanceAnalyzer::analyze(
            &averages(85.0, 6.0, 90.0, Some(70.0)),
            &goal(),
            &summary(PaceVsPlan::Ahead),
            6,
            &config,
        );
        assert_eq!(flags(&p), vec![PerformanceFlag::UndertrainingPotential]);

        let p = ProgramPerformanceAnalyzer::analyze(
            &averages(85.0, 6.0, 90.0, Some(70.0)),
            &goal(),
            &summary(PaceVsPlan::OnTrack),
            6,
            &config,
        );
        assert!(p.flags.is_empty());
    }

    #[test]
    fn test_summary() {
        let p = ProgramPerformanceAnalyzer::analyze(
            &averages(70.0, 10.0, 85.0, None),
            &goal(),
            &summary(PaceVsPlan::Behind),
            6,
            &AutoregulationConfig::default(),
        );
        assert_eq!(p.summary.current_week, 6);
        assert_eq!(p.summary.total_weeks, 13);
        assert_eq!(p.summary.pace_vs_plan, PaceVsPlan::Behind);
        assert_eq!(p.summary.current_phase, TrainingPhase::Accumulation);
    }

    #[test]
    fn test_summary_total_weeks_from_store() {
        let mut store_summary = summary(PaceVsPlan::OnTrack);
        store_summary.total_weeks = 10;
        let p = ProgramPerformanceAnalyzer::analyze(
            &averages(70.0, 10.0, 85.0, None),
            &goal(),
            &store_summary,
            6,
            &AutoregulationConfig::default(),
        );
        assert_eq!(p.summary.total_weeks, 10);

        // A store without a total falls back to the 3-month timeframe
        store_summary.total_weeks = 0;
        let p = ProgramPerformanceAnalyzer::analyze(
            &averages(70.0, 10.0, 85.0, None),
            &goal(),
            &store_summary,
            6,
            &AutoregulationConfig::default(),
        );
        assert_eq!(p.summary.total_weeks, 13);
    }

    #[test]
    fn test_weekly_recovery_adjustments() {
        let p = ProgramPerformanceAnalyzer::analyze(
            &averages(50.0, 14.0, 85.0, Some(60.0)),
            &goal(),
            &summary(PaceVsPlan::OnTrack),
            6,
            &AutoregulationConfig::default(),
        );
        let week = week();
        let adjustments = ProgramPerformanceAnalyzer::generate_weekly_adjustments(&week, &p);

        assert_eq!(adjustments.len(), 2);
        assert_eq!(adjustments[0].adjusted_workout.intensity, Intensity::MediumHigh);
        assert_eq!(adjustments[0].adjusted_workout.duration, "51 minutes");
        assert_eq!(adjustments[1].original_workout.day, "Thursday");
        assert_eq!(adjustments[1].adjusted_workout.intensity, Intensity::Medium);
        assert_eq!(adjustments[1].adjusted_workout.duration, "34-51 minutes");
        assert!((adjustments[0].confidence_score - 0.7).abs() < 1e-9);
    }

    #[test]
    fn test_weekly_undertraining_adjustments() {
        let p = ProgramPerformanceAnalyzer::analyze(
            &averages(85.0, 6.0, 90.0, Some(70.0)),
            &goal(),
            &summary(PaceVsPlan::Ahead),
            6,
            &AutoregulationConfig::default(),
        );
        let adjustments = ProgramPerformanceAnalyzer::generate_weekly_adjustments(&week(), &p);

        assert_eq!(adjustments.len(), 1);
        assert_eq!(adjustments[0].original_workout.day, "Tuesday");
        assert_eq!(adjustments[0].adjusted_workout.intensity, Intensity::MediumLow);
    }

    #[test]
    fn test_schedule_change_targets_hardest_session() {
        let p = ProgramPerformanceAnalyzer::analyze(
            &averages(70.0, 10.0, 60.0, Some(70.0)),
            &goal(),
            &summary(PaceVsPlan::OnTrack),
            6,
            &AutoregulationConfig::default(),
        );
        let adjustments = ProgramPerformanceAnalyzer::generate_weekly_adjustments(&week(), &p);

        assert_eq!(adjustments.len(), 1);
        let adjusted = &adjustments[0].adjusted_workout;
        assert_eq!(adjusted.day, "Monday");
        assert_eq!(adjusted.intensity, Intensity::MediumHigh);
        assert_eq!(adjusted.duration, "60 minutes");
        assert!(adjusted
            .adjustment_notes
            .iter()
            .any(|n| n.contains("best night of sleep")));
    }

    #[test]
    fn test_no_flags_no_adjustments() {
        let p = ProgramPerformanceAnalyzer::analyze(
            &averages(72.0, 10.0, 88.0, Some(65.0)),
            &goal(),
            &summary(PaceVsPlan::OnTrack),
            6,
            &AutoregulationConfig::default(),
        );
        assert!(ProgramPerformanceAnalyzer::generate_weekly_adjustments(&week(), &p).is_empty());
    }
}
