//! Mesocycle phase resolution
//!
//! Maps a program week onto a training phase. With an explicit periodization
//! the mesocycle repeats every `mesocycle_length` weeks:
//!
//! ```text
//! week_in_mesocycle = ((current_week - 1) mod mesocycle_length) + 1
//! ```
//!
//! and is classified against the cumulative phase distribution
//! (accumulation, then intensification, then realization, remainder deload).
//! Without one, the whole program is treated as a single block split
//! proportionally: <50% accumulation, 50-75% intensification, 75-95%
//! realization, >95% deload.
//!
//! The resolver never reads the clock. Callers compute the program week with
//! [`program_week`] from an injected date.

use chrono::NaiveDate;

use crate::models::{PhaseDistribution, ProgramGoal, TrainingPhase};

/// Pure week → phase state machine
pub struct MesocyclePhaseResolver;

impl MesocyclePhaseResolver {
    /// Training phase for a 1-based program week. Week 0 is treated as week 1.
    pub fn phase(current_week: u32, goal: &ProgramGoal) -> TrainingPhase {
        let current_week = current_week.max(1);

        match goal.periodization {
            Some(p) if p.mesocycle_length > 0 => {
                let week = Self::week_in_mesocycle(current_week, goal);
                Self::phase_from_distribution(week, &p.phase_distribution)
            }
            _ => Self::phase_from_progress(current_week, goal.timeframe.total_weeks()),
        }
    }

    /// 1-based position inside the current mesocycle
    ///
    /// Without periodization the program is one block, so this is the program
    /// week itself.
    pub fn week_in_mesocycle(current_week: u32, goal: &ProgramGoal) -> u32 {
        let current_week = current_week.max(1);

        match goal.periodization {
            Some(p) if p.mesocycle_length > 0 => ((current_week - 1) % p.mesocycle_length) + 1,
            _ => current_week,
        }
    }

    /// Phases for weeks `1..=weeks`
    pub fn schedule(goal: &ProgramGoal, weeks: u32) -> Vec<TrainingPhase> {
        (1..=weeks).map(|week| Self::phase(week, goal)).collect()
    }

    fn phase_from_distribution(week: u32, distribution: &PhaseDistribution) -> TrainingPhase {
        let accumulation_end = distribution.accumulation;
        let intensification_end = accumulation_end.saturating_add(distribution.intensification);
        let realization_end = intensification_end.saturating_add(distribution.realization);

        if week <= accumulation_end {
            TrainingPhase::Accumulation
        } else if week <= intensification_end {
            TrainingPhase::Intensification
        } else if week <= realization_end {
            TrainingPhase::Realization
        } else {
            TrainingPhase::Deload
        }
    }

    fn phase_from_progress(current_week: u32, total_weeks: u32) -> TrainingPhase {
        if total_weeks == 0 {
            return TrainingPhase::Accumulation;
        }

        let progress = current_week as f64 / total_weeks as f64;
        if progress < 0.5 {
            TrainingPhase::Accumulation
        } else if progress < 0.75 {
            TrainingPhase::Intensification
        } else if progress <= 0.95 {
            TrainingPhase::Realization
        } else {
            TrainingPhase::Deload
        }
    }
}

/// 1-based program week containing `today`; dates before the start are week 1
pub fn program_week(start_date: NaiveDate, today: NaiveDate) -> u32 {
    let days_since_start = (today - start_date).num_days();
    u32::try_from((days_since_start / 7 + 1).max(1)).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GoalType, Periodization, TimeUnit, Timeframe};
    use proptest::prelude::*;

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    fn periodized_goal(length: u32, acc: u32, int: u32, real: u32) -> ProgramGoal {
        ProgramGoal {
            id: "meso".to_string(),
            goal_type: GoalType::MuscleGain,
            timeframe: Timeframe { value: 16, unit: TimeUnit::Weeks },
            periodization: Some(Periodization {
                mesocycle_length: length,
                phase_distribution: PhaseDistribution {
                    accumulation: acc,
                    intensification: int,
                    realization: real,
                },
            }),
            start_date: start(),
        }
    }

    fn plain_goal(weeks: u32) -> ProgramGoal {
        ProgramGoal {
            id: "plain".to_string(),
            goal_type: GoalType::Strength,
            timeframe: Timeframe { value: weeks, unit: TimeUnit::Weeks },
            periodization: None,
            start_date: start(),
        }
    }

    #[test]
    fn test_week_five_wraps_to_accumulation() {
        let goal = periodized_goal(4, 2, 1, 1);
        assert_eq!(MesocyclePhaseResolver::week_in_mesocycle(5, &goal), 1);
        assert_eq!(MesocyclePhaseResolver::phase(5, &goal), TrainingPhase::Accumulation);
    }

    #[test]
    fn test_distribution_with_deload_remainder() {
        let goal = periodized_goal(5, 2, 1, 1);
        let phases = MesocyclePhaseResolver::schedule(&goal, 5);
        assert_eq!(
            phases,
            vec![
                TrainingPhase::Accumulation,
                TrainingPhase::Accumulation,
                TrainingPhase::Intensification,
                TrainingPhase::Realization,
                TrainingPhase::Deload,
            ]
        );
    }

    #[test]
    fn test_proportional_fallback() {
        let goal = plain_goal(20);
        assert_eq!(MesocyclePhaseResolver::phase(1, &goal), TrainingPhase::Accumulation);
        assert_eq!(MesocyclePhaseResolver::phase(9, &goal), TrainingPhase::Accumulation);
        assert_eq!(MesocyclePhaseResolver::phase(10, &goal), TrainingPhase::Intensification);
        assert_eq!(MesocyclePhaseResolver::phase(15, &goal), TrainingPhase::Realization);
        assert_eq!(MesocyclePhaseResolver::phase(19, &goal), TrainingPhase::Realization);
        assert_eq!(MesocyclePhaseResolver::phase(20, &goal), TrainingPhase::Deload);
    }

    #[test]
    fn test_zero_length_mesocycle_uses_fallback() {
        let mut goal = periodized_goal(0, 2, 1, 1);
        goal.timeframe = Timeframe { value: 4, unit: TimeUnit::Weeks };
        assert_eq!(MesocyclePhaseResolver::phase(4, &goal), TrainingPhase::Deload);
    }

    #[test]
    fn test_week_zero_treated_as_first_week() {
        let goal = periodized_goal(4, 2, 1, 1);
        assert_eq!(MesocyclePhaseResolver::phase(0, &goal), TrainingPhase::Accumulation);
        assert_eq!(MesocyclePhaseResolver::week_in_mesocycle(0, &goal), 1);
    }

    #[test]
    fn test_program_week() {
        assert_eq!(program_week(start(), start()), 1);
        assert_eq!(program_week(start(), start() + chrono::Duration::days(6)), 1);
        assert_eq!(program_week(start(), start() + chrono::Duration::days(7)), 2);
        assert_eq!(program_week(start(), start() + chrono::Duration::days(30)), 5);
        assert_eq!(program_week(start(), start() - chrono::Duration::days(10)), 1);
    }

    #[test]
    fn test_extreme_distribution_does_not_overflow() {
        let goal = periodized_goal(u32::MAX, u32::MAX, u32::MAX, u32::MAX);
        assert_eq!(
            MesocyclePhaseResolver::phase(u32::MAX, &goal),
            TrainingPhase::Accumulation
        );

        let goal = periodized_goal(10, 2, u32::MAX, u32::MAX);
        assert_eq!(MesocyclePhaseResolver::phase(10, &goal), TrainingPhase::Intensification);

        let mut goal = plain_goal(0);
        goal.timeframe = Timeframe { value: u32::MAX, unit: TimeUnit::Months };
        assert_eq!(MesocyclePhaseResolver::phase(1, &goal), TrainingPhase::Accumulation);
    }

    proptest! {
        #[test]
        fn test_phase_periodic_in_mesocycle_length(
            length in 1u32..12,
            acc in 0u32..6,
            int in 0u32..4,
            real in 0u32..3,
            week in 1u32..200,
        ) {
            let goal = periodized_goal(length, acc, int, real);
            let phase = MesocyclePhaseResolver::phase(week, &goal);
            prop_assert_eq!(phase, MesocyclePhaseResolver::phase(week + length, &goal));
            prop_assert_eq!(phase, MesocyclePhaseResolver::phase(week, &goal));
        }
    }
}
