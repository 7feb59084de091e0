use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Daily physiological readiness record supplied by the biometric provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecoveryRecord {
    /// Calendar day this record describes
    pub date: NaiveDate,

    /// Recovery score (0-100)
    pub score: f64,

    /// Heart rate variability in milliseconds
    pub hrv_ms: f64,

    /// Resting heart rate in beats per minute
    pub resting_heart_rate: f64,
}

/// Daily cardiovascular strain record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrainRecord {
    /// Calendar day this record describes
    pub date: NaiveDate,

    /// Strain score (0-21)
    pub score: f64,

    /// Average heart rate across the day
    pub avg_heart_rate: u16,

    /// Maximum heart rate reached
    pub max_heart_rate: u16,

    /// Energy expenditure in kilocalories
    pub calories: u32,
}

/// Nightly sleep record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SleepRecord {
    /// Date of the morning the sleep ended
    pub date: NaiveDate,

    /// Sleep efficiency percentage (0-100)
    pub efficiency: f64,

    /// Total time asleep in minutes
    pub duration_minutes: u32,
}

/// Program goal categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalType {
    MuscleGain,
    Strength,
    FatLoss,
    Endurance,
    GeneralHealth,
}

/// Unit for a program timeframe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    Days,
    Weeks,
    Months,
}

/// How long a program runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timeframe {
    pub value: u32,
    pub unit: TimeUnit,
}

impl Timeframe {
    /// Total program length in whole weeks, rounding partial weeks up
    pub fn total_weeks(&self) -> u32 {
        match self.unit {
            TimeUnit::Days => self.value.div_ceil(7),
            TimeUnit::Weeks => self.value,
            TimeUnit::Months => {
                let weeks = (u64::from(self.value) * 52).div_ceil(12);
                u32::try_from(weeks).unwrap_or(u32::MAX)
            }
        }
    }
}

/// Number of weeks spent in each loading phase of a mesocycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseDistribution {
    pub accumulation: u32,
    pub intensification: u32,
    pub realization: u32,
}

/// Mesocycle structure; weeks not covered by the distribution are deload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Periodization {
    pub mesocycle_length: u32,
    pub phase_distribution: PhaseDistribution,
}

/// A user's training goal and the program that serves it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgramGoal {
    pub id: String,
    #[serde(rename = "type")]
    pub goal_type: GoalType,
    pub timeframe: Timeframe,
    #[serde(default)]
    pub periodization: Option<Periodization>,
    pub start_date: NaiveDate,
}

/// Prescribed session intensity, ordered from easiest to hardest
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Intensity {
    #[serde(rename = "Very Low")]
    VeryLow,
    Low,
    #[serde(rename = "Medium-Low")]
    MediumLow,
    Medium,
    #[serde(rename = "Medium-High")]
    MediumHigh,
    High,
}

impl Intensity {
    /// The intensity ladder, easiest first
    pub const LADDER: [Intensity; 6] = [
        Intensity::VeryLow,
        Intensity::Low,
        Intensity::MediumLow,
        Intensity::Medium,
        Intensity::MediumHigh,
        Intensity::High,
    ];

    /// Position on the ladder (0 = Very Low)
    pub fn index(self) -> usize {
        self as usize
    }

    /// Move `steps` rungs along the ladder, saturating at either end
    pub fn step(self, steps: i32) -> Self {
        let max = (Self::LADDER.len() - 1) as i32;
        let target = (self.index() as i32 + steps).clamp(0, max);
        Self::LADDER[target as usize]
    }

    pub fn label(self) -> &'static str {
        match self {
            Intensity::VeryLow => "Very Low",
            Intensity::Low => "Low",
            Intensity::MediumLow => "Medium-Low",
            Intensity::Medium => "Medium",
            Intensity::MediumHigh => "Medium-High",
            Intensity::High => "High",
        }
    }
}

impl fmt::Display for Intensity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl std::str::FromStr for Intensity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['-', '_'], " ").as_str() {
            "very low" => Ok(Intensity::VeryLow),
            "low" => Ok(Intensity::Low),
            "medium low" => Ok(Intensity::MediumLow),
            "medium" => Ok(Intensity::Medium),
            "medium high" => Ok(Intensity::MediumHigh),
            "high" => Ok(Intensity::High),
            _ => Err(format!("Invalid intensity: {}", s)),
        }
    }
}

/// Fundamental movement pattern of an exercise
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovementPattern {
    Squat,
    Hinge,
    Lunge,
    Push,
    Pull,
    Carry,
    Core,
    Other,
}

/// An exercise slot inside a prescription
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    pub id: String,
    pub name: String,
    pub movement_pattern: MovementPattern,
    pub sets: u32,
    pub reps: String,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Exercise definition as known to the exercise catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseDefinition {
    pub id: String,
    pub name: String,
    pub movement_pattern: MovementPattern,
}

/// A day's prescribed workout. Adjustments always produce a new copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutPrescription {
    pub day: String,
    pub title: String,
    pub description: String,
    pub intensity: Intensity,
    /// "N" or "N-M minutes"; free text is tolerated
    pub duration: String,
    #[serde(rename = "type")]
    pub workout_type: String,
    #[serde(default)]
    pub exercises: Vec<Exercise>,
    /// Notes attached by the adjustment engine
    #[serde(default)]
    pub adjustment_notes: Vec<String>,
}

/// Mesocycle training phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrainingPhase {
    Accumulation,
    Intensification,
    Realization,
    Deload,
}

impl TrainingPhase {
    /// Phases where loading is already near maximal
    pub fn is_high_intensity(self) -> bool {
        matches!(
            self,
            TrainingPhase::Intensification | TrainingPhase::Realization
        )
    }
}

impl fmt::Display for TrainingPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrainingPhase::Accumulation => write!(f, "accumulation"),
            TrainingPhase::Intensification => write!(f, "intensification"),
            TrainingPhase::Realization => write!(f, "realization"),
            TrainingPhase::Deload => write!(f, "deload"),
        }
    }
}

/// Volume direction recommended by the rule engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VolumeRecommendation {
    Maintain,
    Increase,
    Decrease,
}

impl VolumeRecommendation {
    /// Signed percent change applied to working sets
    pub fn percent_change(self) -> Decimal {
        match self {
            VolumeRecommendation::Maintain => dec!(0),
            VolumeRecommendation::Increase => dec!(10),
            VolumeRecommendation::Decrease => dec!(-20),
        }
    }

    /// Volume multiplier; always strictly positive
    pub fn multiplier(self) -> Decimal {
        dec!(1) + self.percent_change() / dec!(100)
    }
}

/// Closed set of conditions that can trigger autoregulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AutoregulationTrigger {
    CriticalRecovery,
    LowRecovery,
    HighStrain,
    PoorSleep,
    DeloadPhase,
}

impl fmt::Display for AutoregulationTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AutoregulationTrigger::CriticalRecovery => write!(f, "critical recovery"),
            AutoregulationTrigger::LowRecovery => write!(f, "low recovery"),
            AutoregulationTrigger::HighStrain => write!(f, "high strain"),
            AutoregulationTrigger::PoorSleep => write!(f, "poor sleep"),
            AutoregulationTrigger::DeloadPhase => write!(f, "deload phase"),
        }
    }
}

/// Program-aware readiness analysis produced by the rule engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgramAwareAnalysis {
    pub current_phase: TrainingPhase,
    pub volume_recommendation: VolumeRecommendation,
    /// Signed intensity shift, always within [-2, +2]
    pub intensity_adjustment: Decimal,
    pub exercise_substitutions: Vec<String>,
    pub rest_day_recommendation: bool,
    pub notes: Vec<String>,
    pub autoregulation_triggers: Vec<AutoregulationTrigger>,
}

/// Kind of mutation applied to a prescription
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentType {
    Intensity,
    Duration,
    Type,
    Skip,
    AddRecovery,
}

impl fmt::Display for AdjustmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdjustmentType::Intensity => write!(f, "intensity"),
            AdjustmentType::Duration => write!(f, "duration"),
            AdjustmentType::Type => write!(f, "type"),
            AdjustmentType::Skip => write!(f, "skip"),
            AdjustmentType::AddRecovery => write!(f, "add_recovery"),
        }
    }
}

/// The readiness numbers an adjustment was based on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub recovery: f64,
    pub strain: f64,
    pub sleep_quality: f64,
    pub hrv: Option<f64>,
}

/// A concrete change to a prescription, with its justification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutAdjustment {
    pub original_workout: WorkoutPrescription,
    pub adjusted_workout: WorkoutPrescription,
    pub adjustment_reason: String,
    pub adjustment_type: AdjustmentType,
    /// Confidence in the adjustment (0.0-1.0)
    pub confidence_score: f64,
    pub metrics: MetricsSnapshot,
}

/// Progress against the program schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaceVsPlan {
    Ahead,
    OnTrack,
    Behind,
}

/// Goal progress summary supplied by the program store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalSummary {
    pub percent_complete: f64,
    pub weeks_elapsed: u32,
    pub total_weeks: u32,
    pub pace_vs_plan: PaceVsPlan,
}
