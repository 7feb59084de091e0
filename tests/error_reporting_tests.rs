//! Integration tests for error surfaces and fail-open behavior
//!
//! The engine never errors on missing readiness data; errors come only from
//! collaborators, configuration and invalid caller input.

use autoregrs::config::{AppConfig, AutoregulationConfig};
use autoregrs::engine::{Autoregulator, Snapshot};
use autoregrs::error::{AutoregError, CalculationError, ErrorSeverity, Result, SourceError};
use autoregrs::models::{Intensity, RecoveryRecord, SleepRecord, StrainRecord, WorkoutPrescription};
use autoregrs::rpe::RpeGuidance;
use autoregrs::sources::{
    BiometricDataSource, FixedClock, InMemoryCatalog, InMemoryProgramStore, StaticBiometrics,
};
use chrono::NaiveDate;
use rust_decimal_macros::dec;
use std::fs;
use tempfile::tempdir;

struct UnavailableBiometrics;

impl BiometricDataSource for UnavailableBiometrics {
    fn recovery_records(&self, _days: usize) -> Result<Vec<RecoveryRecord>> {
        Err(SourceError::BiometricsUnavailable {
            reason: "token expired".to_string(),
        }
        .into())
    }

    fn strain_records(&self, _days: usize) -> Result<Vec<StrainRecord>> {
        Ok(Vec::new())
    }

    fn sleep_records(&self, _days: usize) -> Result<Vec<SleepRecord>> {
        Ok(Vec::new())
    }
}

fn workout() -> WorkoutPrescription {
    WorkoutPrescription {
        day: "Monday".to_string(),
        title: "Conditioning".to_string(),
        description: "Medium intensity intervals".to_string(),
        intensity: Intensity::Medium,
        duration: "40".to_string(),
        workout_type: "cardio".to_string(),
        exercises: Vec::new(),
        adjustment_notes: Vec::new(),
    }
}

fn snapshot_json(day: &str) -> String {
    format!(
        r#"{{
            "date": "2024-06-14",
            "biometrics": {{
                "recovery": [
                    {{"date": "2024-06-13", "score": 70.0, "hrv_ms": 60.0, "resting_heart_rate": 50.0}}
                ]
            }},
            "goal": {{
                "id": "base",
                "type": "endurance",
                "timeframe": {{"value": 10, "unit": "weeks"}},
                "start_date": "2024-05-01"
            }},
            "summary": {{"percent_complete": 50.0, "weeks_elapsed": 6, "total_weeks": 10, "pace_vs_plan": "behind"}},
            "workout": {{
                "day": "{}",
                "title": "Tempo Run",
                "description": "Medium intensity tempo",
                "intensity": "Medium",
                "duration": "40-50 minutes",
                "type": "cardio"
            }}
        }}"#,
        day
    )
}

#[test]
fn test_biometric_source_failure_propagates() {
    let store = InMemoryProgramStore::new();
    let catalog = InMemoryCatalog::default();
    let clock = FixedClock(NaiveDate::from_ymd_opt(2024, 6, 14).unwrap());

    let engine = Autoregulator::new(
        &UnavailableBiometrics,
        &store,
        &catalog,
        &clock,
        AutoregulationConfig::default(),
    );
    let err = engine.plan_day("base", &workout()).unwrap_err();

    assert_eq!(err.severity(), ErrorSeverity::Warning);
    assert!(err.user_message().contains("Train as planned"));
}

#[test]
fn test_missing_today_is_not_an_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("snapshot.json");
    fs::write(&path, snapshot_json("Friday")).unwrap();

    let snapshot = Snapshot::load(&path).unwrap();
    let (biometrics, programs, catalog) = snapshot.sources();
    let clock = FixedClock(snapshot.date.unwrap());

    let engine = Autoregulator::new(
        &biometrics,
        &programs,
        &catalog,
        &clock,
        AutoregulationConfig::default(),
    );

    // Only yesterday's record exists
    assert!(engine.plan_day("base", &snapshot.workout).unwrap().is_none());
}

#[test]
fn test_unknown_goal_reports_goal_id() {
    let biometrics = StaticBiometrics::new(
        vec![RecoveryRecord {
            date: NaiveDate::from_ymd_opt(2024, 6, 14).unwrap(),
            score: 70.0,
            hrv_ms: 60.0,
            resting_heart_rate: 50.0,
        }],
        Vec::new(),
        Vec::new(),
    );
    let store = InMemoryProgramStore::new();
    let catalog = InMemoryCatalog::default();
    let clock = FixedClock(NaiveDate::from_ymd_opt(2024, 6, 14).unwrap());

    let engine = Autoregulator::new(
        &biometrics,
        &store,
        &catalog,
        &clock,
        AutoregulationConfig::default(),
    );
    let err = engine.plan_day("marathon", &workout()).unwrap_err();

    assert!(matches!(
        err,
        AutoregError::Source(SourceError::GoalNotFound { ref goal_id }) if goal_id == "marathon"
    ));
    assert_eq!(err.severity(), ErrorSeverity::Error);
    assert!(err.user_message().contains("marathon"));
}

#[test]
fn test_snapshot_errors() {
    let dir = tempdir().unwrap();

    let missing = Snapshot::load(dir.path().join("absent.json"));
    assert!(matches!(missing, Err(AutoregError::Io(_))));

    let blank_day = Snapshot::from_json(&snapshot_json(" "));
    assert!(matches!(blank_day, Err(AutoregError::Validation(_))));

    let truncated = Snapshot::from_json(r#"{"goal": {"id": "x"}}"#);
    assert!(matches!(truncated, Err(AutoregError::Serialization(_))));
}

#[test]
fn test_invalid_rpe_input() {
    let err = RpeGuidance::new(dec!(12), dec!(-1), &[]).unwrap_err();

    assert!(matches!(
        err,
        AutoregError::Calculation(CalculationError::InvalidParameter { .. })
    ));
    assert_eq!(err.severity(), ErrorSeverity::Warning);
    assert!(err.user_message().contains("base_rpe"));
}

#[test]
fn test_malformed_config_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "[autoregulation\nenabled = maybe").unwrap();

    let err = AppConfig::load_from_file(&path).unwrap_err();
    assert!(err.to_string().contains("Failed to parse TOML configuration"));
}

#[test]
fn test_invalid_metrics_settings_in_config_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    let mut config = AppConfig::default();
    config.metrics.window_days = 0;
    config.save_to_file(&path).unwrap();

    let loaded = AppConfig::load_from_file(&path).unwrap();
    let err = loaded.metrics.validate().unwrap_err();

    assert!(matches!(err, AutoregError::Configuration(_)));
    assert_eq!(err.severity(), ErrorSeverity::Error);
    assert!(err.user_message().contains("window_days"));
}
