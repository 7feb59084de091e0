//! Readiness metrics derived from raw biometric time series
//!
//! Input series are newest first. A trend compares the recent half of the
//! window (indices `0..n/2`) against the older half (`n/2..n`):
//!
//! ```text
//! trend = mean(recent half) - mean(older half)
//! ```
//!
//! so a positive trend means the signal has been rising lately. For resting
//! heart rate that is a bad sign; for recovery and HRV it is a good one.
//!
//! When today's record is missing the calculator substitutes neutral defaults
//! (recovery 50, strain 10, sleep efficiency 85%, 7.5 h) and records the gap in
//! [`DataAvailability`] so the caller can decide whether to act on it.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

use crate::config::MetricsSettings;
use crate::models::{MetricsSnapshot, RecoveryRecord, SleepRecord, StrainRecord};

/// Which of today's records were actually present
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataAvailability {
    pub recovery: bool,
    pub strain: bool,
    pub sleep: bool,
}

/// Today's readiness values plus trailing-window trends
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecoveryMetrics {
    /// Today's recovery score (0-100)
    pub recovery: f64,
    pub recovery_trend: f64,

    /// Today's strain (0-21)
    pub strain: f64,
    pub strain_trend: f64,

    /// Last night's sleep efficiency (0-100)
    pub sleep_quality: f64,
    pub sleep_duration_hours: f64,

    /// Today's HRV in milliseconds, if recorded
    pub hrv: Option<f64>,
    pub hrv_trend: f64,

    /// Today's resting heart rate, if recorded
    pub resting_heart_rate: Option<f64>,
    pub resting_hr_trend: f64,

    pub availability: DataAvailability,
}

impl RecoveryMetrics {
    /// Metrics for a day with explicit values and flat trends
    pub fn from_values(recovery: f64, strain: f64, sleep_quality: f64, hrv: Option<f64>) -> Self {
        Self {
            recovery,
            recovery_trend: 0.0,
            strain,
            strain_trend: 0.0,
            sleep_quality,
            sleep_duration_hours: MetricsSettings::default().fallback_sleep_hours,
            hrv,
            hrv_trend: 0.0,
            resting_heart_rate: None,
            resting_hr_trend: 0.0,
            availability: DataAvailability {
                recovery: true,
                strain: true,
                sleep: true,
            },
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            recovery: self.recovery,
            strain: self.strain,
            sleep_quality: self.sleep_quality,
            hrv: self.hrv,
        }
    }
}

/// Trailing-window means used for program-level analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyAverages {
    /// Number of recovery records the averages were drawn from
    pub days: usize,
    pub avg_recovery: f64,
    pub avg_strain: f64,
    pub avg_sleep_quality: f64,
    pub avg_hrv: Option<f64>,
}

/// Derives readiness metrics from newest-first record series
#[derive(Debug, Clone)]
pub struct RecoveryMetricsCalculator {
    settings: MetricsSettings,
}

impl Default for RecoveryMetricsCalculator {
    fn default() -> Self {
        Self::new(MetricsSettings::default())
    }
}

impl RecoveryMetricsCalculator {
    pub fn new(settings: MetricsSettings) -> Self {
        Self { settings }
    }

    pub fn window_days(&self) -> usize {
        self.settings.window_days.max(1)
    }

    /// Compute today's metrics and trends over the configured window
    pub fn calculate(
        &self,
        today: NaiveDate,
        recovery: &[RecoveryRecord],
        strain: &[StrainRecord],
        sleep: &[SleepRecord],
    ) -> RecoveryMetrics {
        let window = self.window_days();
        let recovery = up_to(recovery, today, window, |r| r.date);
        let strain = up_to(strain, today, window, |s| s.date);
        let sleep = up_to(sleep, today, window, |s| s.date);

        let today_recovery = recovery.iter().copied().find(|r| r.date == today);
        let today_strain = strain.iter().copied().find(|s| s.date == today);
        let today_sleep = sleep.iter().copied().find(|s| s.date == today);

        if today_recovery.is_none() {
            tracing::debug!(%today, "No recovery record for today, using neutral default");
        }

        let recovery_scores: Vec<f64> = recovery.iter().map(|r| r.score).collect();
        let hrv_values: Vec<f64> = recovery.iter().map(|r| r.hrv_ms).collect();
        let rhr_values: Vec<f64> = recovery.iter().map(|r| r.resting_heart_rate).collect();
        let strain_scores: Vec<f64> = strain.iter().map(|s| s.score).collect();

        RecoveryMetrics {
            recovery: today_recovery
                .map(|r| r.score)
                .unwrap_or(self.settings.fallback_recovery),
            recovery_trend: trend(&recovery_scores),
            strain: today_strain
                .map(|s| s.score)
                .unwrap_or(self.settings.fallback_strain),
            strain_trend: trend(&strain_scores),
            sleep_quality: today_sleep
                .map(|s| s.efficiency)
                .unwrap_or(self.settings.fallback_sleep_efficiency),
            sleep_duration_hours: today_sleep
                .map(|s| s.duration_minutes as f64 / 60.0)
                .unwrap_or(self.settings.fallback_sleep_hours),
            hrv: today_recovery.map(|r| r.hrv_ms),
            hrv_trend: trend(&hrv_values),
            resting_heart_rate: today_recovery.map(|r| r.resting_heart_rate),
            resting_hr_trend: trend(&rhr_values),
            availability: DataAvailability {
                recovery: today_recovery.is_some(),
                strain: today_strain.is_some(),
                sleep: today_sleep.is_some(),
            },
        }
    }

    /// Means over the window; empty series fall back to neutral defaults
    pub fn weekly_averages(
        &self,
        today: NaiveDate,
        recovery: &[RecoveryRecord],
        strain: &[StrainRecord],
        sleep: &[SleepRecord],
    ) -> WeeklyAverages {
        let window = self.window_days();
        let recovery = up_to(recovery, today, window, |r| r.date);
        let strain = up_to(strain, today, window, |s| s.date);
        let sleep = up_to(sleep, today, window, |s| s.date);

        let recovery_scores: Vec<f64> = recovery.iter().map(|r| r.score).collect();
        let hrv_values: Vec<f64> = recovery.iter().map(|r| r.hrv_ms).collect();
        let strain_scores: Vec<f64> = strain.iter().map(|s| s.score).collect();
        let sleep_scores: Vec<f64> = sleep.iter().map(|s| s.efficiency).collect();

        WeeklyAverages {
            days: recovery.len(),
            avg_recovery: mean(&recovery_scores).unwrap_or(self.settings.fallback_recovery),
            avg_strain: mean(&strain_scores).unwrap_or(self.settings.fallback_strain),
            avg_sleep_quality: mean(&sleep_scores)
                .unwrap_or(self.settings.fallback_sleep_efficiency),
            avg_hrv: mean(&hrv_values),
        }
    }
}

/// The newest `window` records dated on or before `today`
///
/// Records after `today` are skipped so replaying a past day never sees later
/// data.
fn up_to<T>(
    records: &[T],
    today: NaiveDate,
    window: usize,
    date: impl Fn(&T) -> NaiveDate,
) -> Vec<&T> {
    records
        .iter()
        .filter(|record| date(record) <= today)
        .take(window)
        .collect()
}

/// Recent-half mean minus older-half mean of a newest-first series
///
/// Fewer than two points yields a flat trend.
pub fn trend(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }

    let (recent, older) = values.split_at(values.len() / 2);
    match (mean(recent), mean(older)) {
        (Some(recent), Some(older)) => recent - older,
        _ => 0.0,
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.mean())
    }
}
