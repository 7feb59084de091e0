// Library interface for autoregrs
// The CLI binary and integration tests both build on these modules

pub mod adjustment;
pub mod autoregulation;
pub mod config;
pub mod describe;
pub mod duration;
pub mod engine;
pub mod error;
pub mod logging;
pub mod models;
pub mod periodization;
pub mod program;
pub mod recovery;
pub mod rpe;
pub mod sources;
pub mod substitution;

// Re-export commonly used types for convenience
pub use models::*;
pub use adjustment::{AdjustmentContext, AdjustmentDecision, WorkoutAdjustmentGenerator};
pub use autoregulation::AutoregulationRuleEngine;
pub use config::{AppConfig, Aggressiveness, AutoregulationConfig, MetricsSettings};
pub use engine::{Autoregulator, DailyPlan, Snapshot, WeeklyReview};
pub use periodization::MesocyclePhaseResolver;
pub use program::{ProgramPerformance, ProgramPerformanceAnalyzer};
pub use recovery::{RecoveryMetrics, RecoveryMetricsCalculator, WeeklyAverages};
pub use rpe::RpeGuidance;
pub use sources::{BiometricDataSource, Clock, ExerciseCatalog, FixedClock, ProgramStore, SystemClock};
pub use substitution::{SubstitutionPlan, SubstitutionTable};
pub use error::{AutoregError, Result};
pub use logging::{LogConfig, LogLevel, LogFormat};
