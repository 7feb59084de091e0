//! Threshold rules that turn readiness into a program-aware recommendation
//!
//! Rules run in a fixed order and compound: each one adjusts the running
//! volume recommendation and intensity shift left by the rules before it.
//! Intensity reductions from strain, sleep and deload subtract from the
//! running total but never push it below -2.
//!
//! | # | Condition                                        | Effect                               |
//! |---|--------------------------------------------------|--------------------------------------|
//! | 1 | recovery < 33                                    | decrease, -2, rest day, substitutions |
//! | 2 | 33 <= recovery < 50                              | decrease, -1                          |
//! | 3 | 50 <= recovery < 66, intensification/realization | -0.5                                  |
//! | 4 | recovery >= 66                                   | increase in accumulation if > 80, else maintain |
//! | 5 | strain > 18                                      | volume capped at maintain, -1         |
//! | 6 | sleep efficiency < 70                            | -0.5                                  |
//! | 7 | deload phase                                     | decrease, -1                          |

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::config::AutoregulationConfig;
use crate::models::{
    AutoregulationTrigger, ProgramAwareAnalysis, ProgramGoal, TrainingPhase, VolumeRecommendation,
};
use crate::periodization::MesocyclePhaseResolver;
use crate::recovery::RecoveryMetrics;

pub const CRITICAL_RECOVERY: f64 = 33.0;
pub const LOW_RECOVERY: f64 = 50.0;
pub const MODERATE_RECOVERY: f64 = 66.0;
pub const VOLUME_INCREASE_RECOVERY: f64 = 80.0;
pub const HIGH_STRAIN: f64 = 18.0;
pub const POOR_SLEEP_EFFICIENCY: f64 = 70.0;

const MIN_ADJUSTMENT: Decimal = dec!(-2);
const MAX_ADJUSTMENT: Decimal = dec!(2);

/// Generic guidance attached when recovery is critically low
pub const CRITICAL_SUBSTITUTIONS: [&str; 3] = [
    "Favor isolation movements over heavy compound lifts",
    "Choose low-impact alternatives to plyometric or ballistic work",
    "Use machine or supported variations for stability",
];

/// Evaluates the autoregulation rules for one day
pub struct AutoregulationRuleEngine;

impl AutoregulationRuleEngine {
    /// Analyze today's readiness in the context of the program phase
    pub fn analyze(
        metrics: &RecoveryMetrics,
        goal: &ProgramGoal,
        current_week: u32,
        config: &AutoregulationConfig,
    ) -> ProgramAwareAnalysis {
        let config = config.validate_settings();
        let phase = MesocyclePhaseResolver::phase(current_week, goal);

        let mut analysis = ProgramAwareAnalysis {
            current_phase: phase,
            volume_recommendation: VolumeRecommendation::Maintain,
            intensity_adjustment: Decimal::ZERO,
            exercise_substitutions: Vec::new(),
            rest_day_recommendation: false,
            notes: Vec::new(),
            autoregulation_triggers: Vec::new(),
        };

        if !config.enabled {
            analysis
                .notes
                .push("Autoregulation disabled: follow the program as written".to_string());
            return analysis;
        }

        let recovery = metrics.recovery;

        // Recovery bands (rules 1-4 are mutually exclusive)
        if recovery < CRITICAL_RECOVERY {
            analysis.volume_recommendation = VolumeRecommendation::Decrease;
            analysis.intensity_adjustment = dec!(-2);
            analysis.rest_day_recommendation = true;
            analysis.exercise_substitutions = CRITICAL_SUBSTITUTIONS
                .iter()
                .map(|s| s.to_string())
                .collect();
            Self::trigger(
                &mut analysis,
                AutoregulationTrigger::CriticalRecovery,
                format!(
                    "Recovery critically low ({:.0}%): rest or active recovery recommended",
                    recovery
                ),
            );
        } else if recovery < LOW_RECOVERY {
            analysis.volume_recommendation = VolumeRecommendation::Decrease;
            analysis.intensity_adjustment = dec!(-1);
            Self::trigger(
                &mut analysis,
                AutoregulationTrigger::LowRecovery,
                format!("Recovery low ({:.0}%): reduce volume and intensity", recovery),
            );
        } else if recovery < MODERATE_RECOVERY {
            if phase.is_high_intensity() {
                analysis.intensity_adjustment -= dec!(0.5);
                analysis.notes.push(format!(
                    "Moderate recovery ({:.0}%) during {} phase: ease intensity slightly",
                    recovery, phase
                ));
            }
        } else if phase == TrainingPhase::Accumulation && recovery > VOLUME_INCREASE_RECOVERY {
            analysis.volume_recommendation = VolumeRecommendation::Increase;
            analysis.notes.push(format!(
                "Excellent recovery ({:.0}%) in accumulation: room to add volume",
                recovery
            ));
        } else {
            analysis.volume_recommendation = VolumeRecommendation::Maintain;
        }

        if metrics.strain > HIGH_STRAIN {
            if analysis.volume_recommendation == VolumeRecommendation::Increase {
                analysis.volume_recommendation = VolumeRecommendation::Maintain;
            }
            analysis.intensity_adjustment = reduce(analysis.intensity_adjustment, dec!(1));
            Self::trigger(
                &mut analysis,
                AutoregulationTrigger::HighStrain,
                format!(
                    "High recent strain ({:.1}): hold volume and lower intensity",
                    metrics.strain
                ),
            );
        }

        if metrics.sleep_quality < POOR_SLEEP_EFFICIENCY {
            analysis.intensity_adjustment = reduce(analysis.intensity_adjustment, dec!(0.5));
            Self::trigger(
                &mut analysis,
                AutoregulationTrigger::PoorSleep,
                format!(
                    "Poor sleep efficiency ({:.0}%): lower intensity",
                    metrics.sleep_quality
                ),
            );
        }

        if phase == TrainingPhase::Deload {
            analysis.volume_recommendation = VolumeRecommendation::Decrease;
            analysis.intensity_adjustment = reduce(analysis.intensity_adjustment, dec!(1));
            Self::trigger(
                &mut analysis,
                AutoregulationTrigger::DeloadPhase,
                "Deload week: reduced volume and intensity regardless of readiness".to_string(),
            );
        }

        analysis.intensity_adjustment = analysis
            .intensity_adjustment
            .clamp(MIN_ADJUSTMENT, MAX_ADJUSTMENT);

        tracing::debug!(
            phase = %phase,
            volume = ?analysis.volume_recommendation,
            intensity = %analysis.intensity_adjustment,
            triggers = ?analysis.autoregulation_triggers,
            "Autoregulation analysis complete"
        );

        analysis
    }

    fn trigger(analysis: &mut ProgramAwareAnalysis, trigger: AutoregulationTrigger, note: String) {
        tracing::debug!(%trigger, "Autoregulation rule fired");
        analysis.autoregulation_triggers.push(trigger);
        analysis.notes.push(note);
    }
}

/// Subtract `amount`, flooring at the minimum adjustment
fn reduce(current: Decimal, amount: Decimal) -> Decimal {
    (current - amount).max(MIN_ADJUSTMENT)
}
