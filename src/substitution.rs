//! Movement-pattern exercise swaps under severe fatigue
//!
//! Planning is pure: it names the substitute each exercise should get. Whether
//! that substitute exists is decided afterwards against an [`ExerciseCatalog`],
//! with a fixed fallback order (isolation, then light, then the original).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::models::{Exercise, ExerciseDefinition, MovementPattern, WorkoutPrescription};
use crate::recovery::RecoveryMetrics;
use crate::sources::ExerciseCatalog;

/// Below this recovery squats and lunges move to a lighter variant
pub const LIGHT_VARIANT_RECOVERY: f64 = 40.0;
/// Below this recovery squats and hinges move to an isolation variant
pub const ISOLATION_VARIANT_RECOVERY: f64 = 35.0;
/// Recovery trend below which a deload is suggested
pub const DELOAD_TREND: f64 = -10.0;
/// Mesocycle week after which a falling trend suggests a deload
pub const DELOAD_AFTER_WEEK: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubstitutionKind {
    Light,
    Isolation,
}

impl SubstitutionKind {
    fn suffix(self) -> &'static str {
        match self {
            SubstitutionKind::Light => "_light",
            SubstitutionKind::Isolation => "_isolation",
        }
    }
}

impl std::fmt::Display for SubstitutionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubstitutionKind::Light => write!(f, "light"),
            SubstitutionKind::Isolation => write!(f, "isolation"),
        }
    }
}

/// A planned swap for one exercise
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseSubstitution {
    pub original_id: String,
    pub substitute_id: String,
    pub kind: SubstitutionKind,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubstitutionPlan {
    pub substitutions: Vec<ExerciseSubstitution>,
    pub deload_recommended: bool,
}

impl SubstitutionPlan {
    pub fn is_empty(&self) -> bool {
        self.substitutions.is_empty() && !self.deload_recommended
    }
}

/// Outcome of checking a planned swap against the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedSubstitution {
    pub original_id: String,
    /// `None` keeps the original exercise
    pub replacement: Option<ExerciseDefinition>,
    pub kind: SubstitutionKind,
    pub note: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
struct TableEntry {
    light: Option<String>,
    isolation: Option<String>,
}

/// Explicit exercise id mappings
///
/// Ids without an entry fall back to the `<id>_light` / `<id>_isolation`
/// naming convention.
#[derive(Debug, Clone, Default)]
pub struct SubstitutionTable {
    entries: HashMap<String, TableEntry>,
}

impl SubstitutionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_light(mut self, exercise_id: &str, substitute_id: &str) -> Self {
        self.entries.entry(exercise_id.to_string()).or_default().light =
            Some(substitute_id.to_string());
        self
    }

    pub fn with_isolation(mut self, exercise_id: &str, substitute_id: &str) -> Self {
        self.entries
            .entry(exercise_id.to_string())
            .or_default()
            .isolation = Some(substitute_id.to_string());
        self
    }

    /// Substitute id for an exercise, explicit mapping first
    pub fn substitute_id(&self, exercise_id: &str, kind: SubstitutionKind) -> String {
        let explicit = self.entries.get(exercise_id).and_then(|entry| match kind {
            SubstitutionKind::Light => entry.light.clone(),
            SubstitutionKind::Isolation => entry.isolation.clone(),
        });
        explicit.unwrap_or_else(|| format!("{}{}", exercise_id, kind.suffix()))
    }

    /// Plan swaps for every exercise in the prescription
    pub fn plan(
        &self,
        workout: &WorkoutPrescription,
        metrics: &RecoveryMetrics,
        week_in_mesocycle: u32,
    ) -> SubstitutionPlan {
        let substitutions = workout
            .exercises
            .iter()
            .filter_map(|exercise| {
                let kind = substitution_kind(exercise.movement_pattern, metrics.recovery)?;
                Some(ExerciseSubstitution {
                    original_id: exercise.id.clone(),
                    substitute_id: self.substitute_id(&exercise.id, kind),
                    kind,
                    reason: format!(
                        "Recovery at {:.0}%: swap {} for a {} variant",
                        metrics.recovery, exercise.name, kind
                    ),
                })
            })
            .collect();

        let deload_recommended =
            metrics.recovery_trend < DELOAD_TREND && week_in_mesocycle > DELOAD_AFTER_WEEK;

        SubstitutionPlan {
            substitutions,
            deload_recommended,
        }
    }

    /// Check each planned substitute against the catalog
    pub fn resolve(
        &self,
        plan: &SubstitutionPlan,
        catalog: &dyn ExerciseCatalog,
    ) -> Vec<ResolvedSubstitution> {
        plan.substitutions
            .iter()
            .map(|sub| self.resolve_one(sub, catalog))
            .collect()
    }

    fn resolve_one(
        &self,
        sub: &ExerciseSubstitution,
        catalog: &dyn ExerciseCatalog,
    ) -> ResolvedSubstitution {
        if let Some(definition) = catalog.lookup(&sub.substitute_id) {
            return ResolvedSubstitution {
                original_id: sub.original_id.clone(),
                note: format!("{} (using {})", sub.reason, definition.name),
                replacement: Some(definition),
                kind: sub.kind,
            };
        }

        if sub.kind == SubstitutionKind::Isolation {
            let light_id = self.substitute_id(&sub.original_id, SubstitutionKind::Light);
            if let Some(definition) = catalog.lookup(&light_id) {
                tracing::debug!(
                    exercise = %sub.original_id,
                    missing = %sub.substitute_id,
                    "Isolation variant not in catalog, using light variant"
                );
                return ResolvedSubstitution {
                    original_id: sub.original_id.clone(),
                    note: format!(
                        "No isolation variant available; using {} instead",
                        definition.name
                    ),
                    replacement: Some(definition),
                    kind: SubstitutionKind::Light,
                };
            }
        }

        tracing::debug!(
            exercise = %sub.original_id,
            missing = %sub.substitute_id,
            "No substitute in catalog, keeping original exercise"
        );
        ResolvedSubstitution {
            original_id: sub.original_id.clone(),
            replacement: None,
            kind: sub.kind,
            note: "No suitable substitute found: reduce load and stop well short of failure"
                .to_string(),
        }
    }
}

fn substitution_kind(pattern: MovementPattern, recovery: f64) -> Option<SubstitutionKind> {
    let isolation = matches!(pattern, MovementPattern::Squat | MovementPattern::Hinge);
    let light = matches!(pattern, MovementPattern::Squat | MovementPattern::Lunge);

    if isolation && recovery < ISOLATION_VARIANT_RECOVERY {
        Some(SubstitutionKind::Isolation)
    } else if light && recovery < LIGHT_VARIANT_RECOVERY {
        Some(SubstitutionKind::Light)
    } else {
        None
    }
}

/// Build a new prescription with resolved swaps applied
pub fn apply_substitutions(
    workout: &WorkoutPrescription,
    resolved: &[ResolvedSubstitution],
) -> WorkoutPrescription {
    let exercises = workout
        .exercises
        .iter()
        .map(|exercise| match resolved.iter().find(|r| r.original_id == exercise.id) {
            Some(resolution) => swap(exercise, resolution),
            None => exercise.clone(),
        })
        .collect();

    WorkoutPrescription {
        exercises,
        ..workout.clone()
    }
}

fn swap(exercise: &Exercise, resolution: &ResolvedSubstitution) -> Exercise {
    let notes = Some(match &exercise.notes {
        Some(existing) => format!("{} {}", existing, resolution.note),
        None => resolution.note.clone(),
    });

    match &resolution.replacement {
        Some(definition) => Exercise {
            id: definition.id.clone(),
            name: definition.name.clone(),
            movement_pattern: definition.movement_pattern,
            notes,
            ..exercise.clone()
        },
        None => Exercise {
            notes,
            ..exercise.clone()
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Intensity;
    use crate::sources::InMemoryCatalog;

    fn exercise(id: &str, pattern: MovementPattern) -> Exercise {
        Exercise {
            id: id.to_string(),
            name: id.replace('_', " "),
            movement_pattern: pattern,
            sets: 3,
            reps: "8-10".to_string(),
            notes: None,
        }
    }

    fn definition(id: &str, pattern: MovementPattern) -> ExerciseDefinition {
        ExerciseDefinition {
            id: id.to_string(),
            name: id.replace('_', " "),
            movement_pattern: pattern,
        }
    }

    fn leg_day() -> WorkoutPrescription {
        WorkoutPrescription {
            day: "Thursday".to_string(),
            title: "Legs".to_string(),
            description: "High intensity lower body".to_string(),
            intensity: Intensity::High,
            duration: "60 minutes".to_string(),
            workout_type: "strength".to_string(),
            exercises: vec![
                exercise("back_squat", MovementPattern::Squat),
                exercise("romanian_deadlift", MovementPattern::Hinge),
                exercise("walking_lunge", MovementPattern::Lunge),
                exercise("bench_press", MovementPattern::Push),
            ],
            adjustment_notes: Vec::new(),
        }
    }

    fn metrics(recovery: f64, trend: f64) -> RecoveryMetrics {
        let mut m = RecoveryMetrics::from_values(recovery, 10.0, 85.0, Some(55.0));
        m.recovery_trend = trend;
        m
    }

    #[test]
    fn test_plan_by_movement_pattern() {
        let table = SubstitutionTable::new();

        let plan = table.plan(&leg_day(), &metrics(38.0, 0.0), 1);
        let ids: Vec<_> = plan.substitutions.iter().map(|s| s.substitute_id.as_str()).collect();
        assert_eq!(ids, vec!["back_squat_light", "walking_lunge_light"]);

        let plan = table.plan(&leg_day(), &metrics(30.0, 0.0), 1);
        let ids: Vec<_> = plan.substitutions.iter().map(|s| s.substitute_id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "back_squat_isolation",
                "romanian_deadlift_isolation",
                "walking_lunge_light"
            ]
        );

        assert!(table.plan(&leg_day(), &metrics(60.0, 0.0), 1).is_empty());
    }

    #[test]
    fn test_explicit_table_entry_wins() {
        let table = SubstitutionTable::new().with_light("back_squat", "goblet_squat");
        assert_eq!(
            table.substitute_id("back_squat", SubstitutionKind::Light),
            "goblet_squat"
        );
        assert_eq!(
            table.substitute_id("back_squat", SubstitutionKind::Isolation),
            "back_squat_isolation"
        );
    }

    #[test]
    fn test_deload_flag() {
        let table = SubstitutionTable::new();
        assert!(table.plan(&leg_day(), &metrics(70.0, -12.0), 4).deload_recommended);
        assert!(!table.plan(&leg_day(), &metrics(70.0, -12.0), 3).deload_recommended);
        assert!(!table.plan(&leg_day(), &metrics(70.0, -8.0), 5).deload_recommended);
    }

    #[test]
    fn test_resolve_fallback_chain() {
        let table = SubstitutionTable::new().with_isolation("back_squat", "leg_extension");
        let catalog = InMemoryCatalog::new(vec![
            definition("leg_extension", MovementPattern::Squat),
            definition("romanian_deadlift_light", MovementPattern::Hinge),
        ]);

        let plan = table.plan(&leg_day(), &metrics(30.0, 0.0), 1);
        let resolved = table.resolve(&plan, &catalog);

        assert_eq!(resolved.len(), 3);
        assert_eq!(resolved[0].replacement.as_ref().unwrap().id, "leg_extension");
        assert_eq!(resolved[0].kind, SubstitutionKind::Isolation);

        assert_eq!(
            resolved[1].replacement.as_ref().unwrap().id,
            "romanian_deadlift_light"
        );
        assert_eq!(resolved[1].kind, SubstitutionKind::Light);

        assert!(resolved[2].replacement.is_none());
        assert!(resolved[2].note.contains("No suitable substitute"));
    }

    #[test]
    fn test_apply_substitutions() {
        let table = SubstitutionTable::new();
        let catalog = InMemoryCatalog::new(vec![definition(
            "back_squat_light",
            MovementPattern::Squat,
        )]);
        let original = leg_day();
        let before = original.clone();

        let plan = table.plan(&original, &metrics(38.0, 0.0), 1);
        let resolved = table.resolve(&plan, &catalog);
        let updated = apply_substitutions(&original, &resolved);

        assert_eq!(original, before);
        assert_eq!(updated.exercises[0].id, "back_squat_light");
        assert_eq!(updated.exercises[0].sets, 3);
        assert_eq!(updated.exercises[1], original.exercises[1]);
        assert_eq!(updated.exercises[2].id, "walking_lunge");
        assert!(updated.exercises[2].notes.is_some());
        assert_eq!(updated.exercises[3], original.exercises[3]);
    }
}
