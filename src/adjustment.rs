//! Turns readiness into a concrete, adjusted workout prescription
//!
//! Two stages. [`WorkoutAdjustmentGenerator::should_adjust_workout`] scores
//! today's metrics against the configured thresholds, starting from a base
//! confidence of 0.5 and adding a fixed amount per rule that fires:
//!
//! | Rule                                             | Type                     | +Confidence |
//! |--------------------------------------------------|--------------------------|-------------|
//! | recovery < 40                                    | skip (if allowed) or add_recovery | 0.30 |
//! | 40 <= recovery < min_recovery_for_intense, High  | intensity                | 0.20 |
//! | recovery > 85, Low, increases allowed            | intensity                | 0.20 |
//! | HRV < threshold, High                            | intensity                | 0.15 |
//! | sleep < threshold, above Low                     | intensity                | 0.15 |
//! | strain > threshold                               | add_recovery             | 0.20 |
//!
//! The second band's upper edge follows `min_recovery_for_intense` (60 by
//! default), so raising that setting widens the band and lowering it narrows
//! it. Recovery below 40 is always handled by the first rule.
//!
//! The total is scaled by the aggressiveness factor and clamped to [0, 1].
//! The first rule to fire picks the adjustment type. An adjustment is made only
//! when at least one rule fired and the final confidence exceeds 0.4.
//!
//! [`WorkoutAdjustmentGenerator::generate_adjusted_workout`] then applies the
//! mutation to a fresh copy of the prescription.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::config::AutoregulationConfig;
use crate::describe;
use crate::duration::{extend_duration, scale_duration};
use crate::models::{
    AdjustmentType, GoalSummary, Intensity, PaceVsPlan, ProgramAwareAnalysis,
    VolumeRecommendation, WorkoutAdjustment, WorkoutPrescription,
};
use crate::recovery::RecoveryMetrics;

pub const BASE_CONFIDENCE: f64 = 0.5;
pub const MIN_CONFIDENCE: f64 = 0.4;

const SKIP_RECOVERY: f64 = 40.0;
const INCREASE_RECOVERY: f64 = 85.0;
const LIGHT_SESSION_RECOVERY: f64 = 50.0;
const LONG_SESSION_RECOVERY: f64 = 80.0;
const GOOD_RECOVERY: f64 = 67.0;
const RECOVERY_EXTENSION_MINUTES: u32 = 15;

/// Outcome of the classification stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjustmentDecision {
    pub should_adjust: bool,
    pub adjustment_type: Option<AdjustmentType>,
    /// Confidence after the aggressiveness factor (0.0-1.0)
    pub confidence: f64,
    pub triggered_rules: usize,
    pub reasons: Vec<String>,
}

impl AdjustmentDecision {
    pub fn reason(&self) -> String {
        self.reasons.join("; ")
    }
}

/// Everything a mutation may consult besides the workout itself
#[derive(Debug, Clone, Copy)]
pub struct AdjustmentContext<'a> {
    pub metrics: &'a RecoveryMetrics,
    pub config: &'a AutoregulationConfig,
    pub analysis: Option<&'a ProgramAwareAnalysis>,
    pub summary: Option<&'a GoalSummary>,
}

pub struct WorkoutAdjustmentGenerator;

impl WorkoutAdjustmentGenerator {
    /// Decide whether today's prescription should change, and how
    pub fn should_adjust_workout(
        workout: &WorkoutPrescription,
        metrics: &RecoveryMetrics,
        config: &AutoregulationConfig,
    ) -> AdjustmentDecision {
        let config = config.validate_settings();
        let intensity = workout.intensity;

        let mut adjustment_type: Option<AdjustmentType> = None;
        let mut confidence = BASE_CONFIDENCE;
        let mut reasons = Vec::new();
        let mut fire = |kind: AdjustmentType, weight: f64, reason: String| {
            adjustment_type.get_or_insert(kind);
            confidence += weight;
            reasons.push(reason);
        };

        if metrics.recovery < SKIP_RECOVERY {
            let kind = if config.allow_skip_workouts {
                AdjustmentType::Skip
            } else {
                AdjustmentType::AddRecovery
            };
            fire(
                kind,
                0.3,
                format!("Recovery is very low ({:.0}%)", metrics.recovery),
            );
        }

        if metrics.recovery >= SKIP_RECOVERY
            && metrics.recovery < config.min_recovery_for_intense
            && intensity == Intensity::High
        {
            fire(
                AdjustmentType::Intensity,
                0.2,
                format!(
                    "Recovery ({:.0}%) is below what a high-intensity session needs",
                    metrics.recovery
                ),
            );
        }

        if metrics.recovery > INCREASE_RECOVERY
            && intensity == Intensity::Low
            && config.allow_intensity_increase
        {
            fire(
                AdjustmentType::Intensity,
                0.2,
                format!(
                    "Recovery is excellent ({:.0}%): room to train harder",
                    metrics.recovery
                ),
            );
        }

        if let Some(hrv) = metrics.hrv {
            if hrv < config.hrv_threshold && intensity == Intensity::High {
                fire(
                    AdjustmentType::Intensity,
                    0.15,
                    format!(
                        "HRV ({:.0} ms) is below your threshold of {:.0} ms",
                        hrv, config.hrv_threshold
                    ),
                );
            }
        }

        if metrics.sleep_quality < config.sleep_quality_threshold && intensity > Intensity::Low {
            fire(
                AdjustmentType::Intensity,
                0.15,
                format!(
                    "Sleep quality ({:.0}%) is below your threshold of {:.0}%",
                    metrics.sleep_quality, config.sleep_quality_threshold
                ),
            );
        }

        if metrics.strain > config.max_strain_threshold {
            fire(
                AdjustmentType::AddRecovery,
                0.2,
                format!(
                    "Recent strain ({:.1}) exceeds your limit of {:.1}",
                    metrics.strain, config.max_strain_threshold
                ),
            );
        }

        let triggered_rules = reasons.len();
        let confidence =
            (confidence * config.aggressiveness.confidence_factor()).clamp(0.0, 1.0);
        let should_adjust = triggered_rules > 0 && confidence > MIN_CONFIDENCE;

        tracing::debug!(
            triggered_rules,
            confidence,
            adjustment_type = ?adjustment_type,
            should_adjust,
            "Workout classification"
        );

        AdjustmentDecision {
            should_adjust,
            adjustment_type,
            confidence,
            triggered_rules,
            reasons,
        }
    }

    /// Signed number of ladder steps for an intensity adjustment
    pub fn intensity_steps(
        current: Intensity,
        metrics: &RecoveryMetrics,
        config: &AutoregulationConfig,
    ) -> i32 {
        let mut steps = 0;

        if metrics.recovery < SKIP_RECOVERY {
            steps -= 2;
        } else if metrics.recovery < config.min_recovery_for_intense {
            steps -= 1;
        } else if metrics.recovery > INCREASE_RECOVERY
            && current == Intensity::Low
            && config.allow_intensity_increase
        {
            steps += 1;
        }

        if metrics.hrv.is_some_and(|hrv| hrv < config.hrv_threshold) {
            steps -= 1;
        }
        if metrics.sleep_quality < config.sleep_quality_threshold {
            steps -= 1;
        }

        steps
    }

    /// Multiplier applied to both duration bounds
    pub fn duration_multiplier(metrics: &RecoveryMetrics, config: &AutoregulationConfig) -> Decimal {
        let mut multiplier = if metrics.recovery < LIGHT_SESSION_RECOVERY {
            dec!(0.7)
        } else if metrics.recovery > LONG_SESSION_RECOVERY {
            dec!(1.2)
        } else {
            dec!(1.0)
        };

        if metrics.strain > config.max_strain_threshold {
            multiplier *= dec!(0.8);
        }

        multiplier
    }

    /// Apply one adjustment to a copy of `workout`
    ///
    /// The input is never modified. `reason` is always attached to the
    /// adjusted copy, followed by any program analysis and pace context.
    pub fn generate_adjusted_workout(
        workout: &WorkoutPrescription,
        adjustment_type: AdjustmentType,
        reason: &str,
        ctx: AdjustmentContext<'_>,
    ) -> WorkoutPrescription {
        let config = ctx.config.validate_settings();
        let metrics = ctx.metrics;

        let mut adjusted = match adjustment_type {
            AdjustmentType::Intensity => {
                let steps = Self::intensity_steps(workout.intensity, metrics, &config);
                let intensity = workout.intensity.step(steps);
                WorkoutPrescription {
                    intensity,
                    description: describe::rewrite_intensity(
                        &workout.description,
                        workout.intensity,
                        intensity,
                    ),
                    ..workout.clone()
                }
            }
            AdjustmentType::Duration => WorkoutPrescription {
                duration: scale_duration(
                    &workout.duration,
                    Self::duration_multiplier(metrics, &config),
                ),
                ..workout.clone()
            },
            AdjustmentType::Type => {
                if metrics.recovery < LIGHT_SESSION_RECOVERY {
                    Self::light_recovery_session(&workout.day)
                } else {
                    workout.clone()
                }
            }
            AdjustmentType::Skip => Self::rest_day(&workout.day),
            AdjustmentType::AddRecovery => WorkoutPrescription {
                description: describe::with_cool_down(&workout.description),
                duration: extend_duration(&workout.duration, RECOVERY_EXTENSION_MINUTES),
                ..workout.clone()
            },
        };

        adjusted.adjustment_notes.push(reason.to_string());

        if let Some(analysis) = ctx.analysis {
            Self::append_analysis_notes(&mut adjusted, analysis);
        }

        if config.respect_program_goals {
            if let Some(summary) = ctx.summary {
                if let Some(sentence) =
                    Self::program_context_sentence(summary, adjustment_type, metrics.recovery)
                {
                    adjusted.adjustment_notes.push(sentence.to_string());
                }
            }
        }

        adjusted
    }

    /// Classify and, when warranted, adjust today's workout
    ///
    /// Returns `None` when autoregulation is disabled, when there is no
    /// recovery record for today, or when no rule is confident enough.
    pub fn adjust(
        workout: &WorkoutPrescription,
        ctx: AdjustmentContext<'_>,
    ) -> Option<WorkoutAdjustment> {
        if !ctx.config.enabled {
            return None;
        }
        if !ctx.metrics.availability.recovery {
            tracing::info!(day = %workout.day, "No recovery data for today, keeping planned workout");
            return None;
        }

        let decision = Self::should_adjust_workout(workout, ctx.metrics, ctx.config);
        let adjustment_type = match decision.adjustment_type {
            Some(kind) if decision.should_adjust => kind,
            _ => return None,
        };

        let reason = decision.reason();
        let adjusted = Self::generate_adjusted_workout(workout, adjustment_type, &reason, ctx);

        tracing::info!(
            day = %workout.day,
            adjustment = %adjustment_type,
            confidence = decision.confidence,
            "Workout adjusted"
        );

        Some(WorkoutAdjustment {
            original_workout: workout.clone(),
            adjusted_workout: adjusted,
            adjustment_reason: reason,
            adjustment_type,
            confidence_score: decision.confidence,
            metrics: ctx.metrics.snapshot(),
        })
    }

    /// Canned rest day replacing a skipped session
    pub fn rest_day(day: &str) -> WorkoutPrescription {
        WorkoutPrescription {
            day: day.to_string(),
            title: "Rest Day".to_string(),
            description: "Full rest. Prioritize sleep, hydration and nutrition; light walking is fine."
                .to_string(),
            intensity: Intensity::VeryLow,
            duration: "Full day rest".to_string(),
            workout_type: "rest".to_string(),
            exercises: Vec::new(),
            adjustment_notes: Vec::new(),
        }
    }

    /// Canned light session replacing a demanding one
    pub fn light_recovery_session(day: &str) -> WorkoutPrescription {
        WorkoutPrescription {
            day: day.to_string(),
            title: "Active Recovery".to_string(),
            description: "Easy movement to promote blood flow: light cardio, mobility and stretching."
                .to_string(),
            intensity: Intensity::Low,
            duration: "20-30 minutes".to_string(),
            workout_type: "recovery".to_string(),
            exercises: Vec::new(),
            adjustment_notes: Vec::new(),
        }
    }

    fn append_analysis_notes(adjusted: &mut WorkoutPrescription, analysis: &ProgramAwareAnalysis) {
        let notes = &mut adjusted.adjustment_notes;

        if analysis.volume_recommendation != VolumeRecommendation::Maintain {
            let pct = analysis.volume_recommendation.percent_change();
            let sign = if pct > Decimal::ZERO { "+" } else { "" };
            notes.push(format!("Volume change: {}{}% working sets", sign, pct));
        }

        notes.extend(
            analysis
                .exercise_substitutions
                .iter()
                .map(|s| format!("Substitution: {}", s)),
        );

        notes.push(format!("Current phase: {}", analysis.current_phase));
        notes.extend(analysis.notes.iter().cloned());
    }

    /// At most one sentence relating today's change to program pace
    fn program_context_sentence(
        summary: &GoalSummary,
        adjustment_type: AdjustmentType,
        recovery: f64,
    ) -> Option<&'static str> {
        let behind = summary.pace_vs_plan == PaceVsPlan::Behind;
        let ahead = summary.pace_vs_plan == PaceVsPlan::Ahead;

        if behind && recovery >= GOOD_RECOVERY && adjustment_type != AdjustmentType::Skip {
            Some("You're behind schedule and well recovered: completing this session helps close the gap.")
        } else if ahead && adjustment_type == AdjustmentType::Intensity {
            Some("You're ahead of schedule, so adjusting intensity today won't cost progress.")
        } else if adjustment_type == AdjustmentType::Skip && behind {
            Some("You're behind schedule: rest today and look for a chance to make up this session later in the week.")
        } else {
            None
        }
    }
}
