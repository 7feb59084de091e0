//! RPE targets shifted by the day's intensity adjustment

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::Serialize;

use crate::error::{CalculationError, Result};
use crate::models::{AutoregulationTrigger, ProgramAwareAnalysis};

pub const MIN_RPE: Decimal = dec!(1);
pub const MAX_RPE: Decimal = dec!(10);

/// One row of the RPE scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RpeEntry {
    pub rpe: u8,
    pub description: &'static str,
    pub guidance: &'static str,
}

pub const RPE_TABLE: [RpeEntry; 10] = [
    RpeEntry {
        rpe: 1,
        description: "Very light",
        guidance: "Barely any effort; warm-up or active recovery only",
    },
    RpeEntry {
        rpe: 2,
        description: "Light",
        guidance: "Easy movement, could continue for hours",
    },
    RpeEntry {
        rpe: 3,
        description: "Light to moderate",
        guidance: "Comfortable pace, full conversation possible",
    },
    RpeEntry {
        rpe: 4,
        description: "Moderate",
        guidance: "Breathing deeper but still conversational",
    },
    RpeEntry {
        rpe: 5,
        description: "Somewhat hard",
        guidance: "Working, around 5 reps left in the tank",
    },
    RpeEntry {
        rpe: 6,
        description: "Hard",
        guidance: "About 4 reps in reserve; technique stays crisp",
    },
    RpeEntry {
        rpe: 7,
        description: "Very hard",
        guidance: "About 3 reps in reserve; bar speed starts to slow",
    },
    RpeEntry {
        rpe: 8,
        description: "Very, very hard",
        guidance: "About 2 reps in reserve",
    },
    RpeEntry {
        rpe: 9,
        description: "Near maximal",
        guidance: "1 rep in reserve; only for top sets",
    },
    RpeEntry {
        rpe: 10,
        description: "Maximal",
        guidance: "No reps in reserve; reserve for testing days",
    },
];

/// Adjusted RPE target with its explanation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RpeGuidance {
    pub base_rpe: Decimal,
    pub adjusted_rpe: Decimal,
    pub description: &'static str,
    pub guidance: &'static str,
    pub notes: Vec<String>,
}

impl RpeGuidance {
    /// Shift `base_rpe` by the analysis' intensity adjustment
    pub fn for_analysis(base_rpe: Decimal, analysis: &ProgramAwareAnalysis) -> Result<Self> {
        Self::new(
            base_rpe,
            analysis.intensity_adjustment,
            &analysis.autoregulation_triggers,
        )
    }

    /// Shift `base_rpe` by `adjustment`, naming the triggers behind it
    ///
    /// `base_rpe` must lie within 1-10.
    pub fn new(
        base_rpe: Decimal,
        adjustment: Decimal,
        triggers: &[AutoregulationTrigger],
    ) -> Result<Self> {
        if base_rpe < MIN_RPE || base_rpe > MAX_RPE {
            return Err(CalculationError::InvalidParameter {
                calculation: "rpe_guidance".to_string(),
                parameter: "base_rpe".to_string(),
                value: base_rpe.to_string(),
            }
            .into());
        }

        let adjusted_rpe = adjusted_rpe(base_rpe, adjustment);
        let entry = rpe_entry(adjusted_rpe);

        let mut notes = Vec::new();
        if adjusted_rpe < base_rpe {
            notes.push(format!(
                "Target RPE lowered from {} to {}",
                base_rpe.normalize(),
                adjusted_rpe.normalize()
            ));
        } else if adjusted_rpe > base_rpe {
            notes.push(format!(
                "Target RPE raised from {} to {}",
                base_rpe.normalize(),
                adjusted_rpe.normalize()
            ));
        } else {
            notes.push(format!("Target RPE unchanged at {}", base_rpe.normalize()));
        }

        if base_rpe + adjustment != adjusted_rpe {
            notes.push("Adjustment limited by the 1-10 RPE scale".to_string());
        }

        if !triggers.is_empty() {
            let names: Vec<String> = triggers.iter().map(|t| t.to_string()).collect();
            notes.push(format!("Triggered by: {}", names.join(", ")));
        }

        Ok(Self {
            base_rpe,
            adjusted_rpe,
            description: entry.description,
            guidance: entry.guidance,
            notes,
        })
    }
}

/// `base + adjustment` clamped to the RPE scale
pub fn adjusted_rpe(base_rpe: Decimal, adjustment: Decimal) -> Decimal {
    (base_rpe + adjustment).clamp(MIN_RPE, MAX_RPE)
}

/// Table row for an RPE value, rounding half steps up
pub fn rpe_entry(rpe: Decimal) -> &'static RpeEntry {
    let index = rpe
        .clamp(MIN_RPE, MAX_RPE)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_usize()
        .unwrap_or(1)
        .clamp(1, RPE_TABLE.len());
    &RPE_TABLE[index - 1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AutoregError;
    use crate::models::{TrainingPhase, VolumeRecommendation};
    use proptest::prelude::*;

    fn analysis(adjustment: Decimal, triggers: Vec<AutoregulationTrigger>) -> ProgramAwareAnalysis {
        ProgramAwareAnalysis {
            current_phase: TrainingPhase::Intensification,
            volume_recommendation: VolumeRecommendation::Maintain,
            intensity_adjustment: adjustment,
            exercise_substitutions: Vec::new(),
            rest_day_recommendation: false,
            notes: Vec::new(),
            autoregulation_triggers: triggers,
        }
    }

    #[test]
    fn test_lowered_rpe() {
        let guidance = RpeGuidance::for_analysis(
            dec!(8),
            &analysis(dec!(-1.5), vec![AutoregulationTrigger::HighStrain]),
        )
        .unwrap();

        assert_eq!(guidance.adjusted_rpe, dec!(6.5));
        assert_eq!(guidance.description, "Very hard");
        assert_eq!(guidance.notes[0], "Target RPE lowered from 8 to 6.5");
        assert_eq!(guidance.notes[1], "Triggered by: high strain");
    }

    #[test]
    fn test_clamped_rpe() {
        let guidance =
            RpeGuidance::for_analysis(dec!(10), &analysis(dec!(1), Vec::new())).unwrap();
        assert_eq!(guidance.adjusted_rpe, dec!(10));
        assert_eq!(guidance.notes[0], "Target RPE unchanged at 10");
        assert!(guidance.notes[1].contains("1-10"));

        let guidance =
            RpeGuidance::for_analysis(dec!(2), &analysis(dec!(-2), Vec::new())).unwrap();
        assert_eq!(guidance.adjusted_rpe, dec!(1));
        assert_eq!(guidance.description, "Very light");
    }

    #[test]
    fn test_invalid_base_rpe() {
        let result = RpeGuidance::for_analysis(dec!(11), &analysis(dec!(0), Vec::new()));
        assert!(matches!(
            result,
            Err(AutoregError::Calculation(CalculationError::InvalidParameter { .. }))
        ));
        assert!(RpeGuidance::for_analysis(dec!(0.5), &analysis(dec!(0), Vec::new())).is_err());
    }

    #[test]
    fn test_table_is_ordered() {
        for (i, entry) in RPE_TABLE.iter().enumerate() {
            assert_eq!(entry.rpe as usize, i + 1);
        }
        assert_eq!(rpe_entry(dec!(7.5)).rpe, 8);
    }

    proptest! {
        #[test]
        fn test_adjusted_rpe_is_clamped_sum(base in 1u8..=10, halves in -4i64..=4) {
            let base = Decimal::from(base);
            let adjustment = Decimal::new(halves * 5, 1);

            let guidance = RpeGuidance::for_analysis(base, &analysis(adjustment, Vec::new())).unwrap();

            prop_assert_eq!(guidance.adjusted_rpe, (base + adjustment).clamp(dec!(1), dec!(10)));
            prop_assert!(guidance.adjusted_rpe >= MIN_RPE && guidance.adjusted_rpe <= MAX_RPE);
        }
    }
}
