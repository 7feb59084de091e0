use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::AutoregError;
use crate::logging::LogConfig;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application metadata
    pub metadata: ConfigMetadata,

    /// Autoregulation thresholds and policy
    pub autoregulation: AutoregulationConfig,

    /// Readiness metric window and neutral fallbacks
    pub metrics: MetricsSettings,

    /// Logging setup
    pub logging: LogConfig,
}

/// Configuration metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigMetadata {
    /// Configuration format version
    pub version: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last modification timestamp
    pub updated_at: DateTime<Utc>,
}

/// How strongly the engine reacts to readiness signals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggressiveness {
    Conservative,
    Moderate,
    Aggressive,
}

impl Aggressiveness {
    /// Multiplier applied to adjustment confidence
    pub fn confidence_factor(self) -> f64 {
        match self {
            Aggressiveness::Conservative => 0.7,
            Aggressiveness::Moderate => 1.0,
            Aggressiveness::Aggressive => 1.3,
        }
    }
}

impl std::str::FromStr for Aggressiveness {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "conservative" => Ok(Aggressiveness::Conservative),
            "moderate" => Ok(Aggressiveness::Moderate),
            "aggressive" => Ok(Aggressiveness::Aggressive),
            _ => Err(format!("Invalid aggressiveness: {}", s)),
        }
    }
}

/// User-facing autoregulation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutoregulationConfig {
    /// Master switch
    pub enabled: bool,

    pub aggressiveness: Aggressiveness,

    /// Recovery score required before intense work is kept as prescribed (0-100)
    pub min_recovery_for_intense: f64,

    /// Strain above which recovery work is added (0-21)
    pub max_strain_threshold: f64,

    /// Sleep efficiency below which intensity is reduced (0-100)
    pub sleep_quality_threshold: f64,

    /// HRV in milliseconds below which intense sessions are reduced
    pub hrv_threshold: f64,

    /// Allow replacing a session with a rest day
    pub allow_skip_workouts: bool,

    /// Allow stepping intensity up on exceptional readiness
    pub allow_intensity_increase: bool,

    /// Add program pace context to adjustment notes
    pub respect_program_goals: bool,
}

impl Default for AutoregulationConfig {
    fn default() -> Self {
        AutoregulationConfig {
            enabled: true,
            aggressiveness: Aggressiveness::Moderate,
            min_recovery_for_intense: 60.0,
            max_strain_threshold: 15.0,
            sleep_quality_threshold: 75.0,
            hrv_threshold: 40.0,
            allow_skip_workouts: false,
            allow_intensity_increase: true,
            respect_program_goals: true,
        }
    }
}

impl AutoregulationConfig {
    pub const RECOVERY_RANGE: (f64, f64) = (0.0, 100.0);
    pub const STRAIN_RANGE: (f64, f64) = (0.0, 21.0);
    pub const SLEEP_RANGE: (f64, f64) = (0.0, 100.0);
    pub const HRV_RANGE: (f64, f64) = (0.0, 250.0);

    /// Sanitize settings into their valid ranges
    ///
    /// Out-of-range values are clamped to the nearest bound; non-finite values
    /// fall back to the default for that field. Rule evaluation always runs on
    /// the output of this function.
    pub fn validate_settings(&self) -> Self {
        let defaults = Self::default();

        Self {
            min_recovery_for_intense: sanitize(
                self.min_recovery_for_intense,
                Self::RECOVERY_RANGE,
                defaults.min_recovery_for_intense,
            ),
            max_strain_threshold: sanitize(
                self.max_strain_threshold,
                Self::STRAIN_RANGE,
                defaults.max_strain_threshold,
            ),
            sleep_quality_threshold: sanitize(
                self.sleep_quality_threshold,
                Self::SLEEP_RANGE,
                defaults.sleep_quality_threshold,
            ),
            hrv_threshold: sanitize(self.hrv_threshold, Self::HRV_RANGE, defaults.hrv_threshold),
            ..self.clone()
        }
    }
}

fn sanitize(value: f64, (min, max): (f64, f64), fallback: f64) -> f64 {
    if value.is_finite() {
        value.clamp(min, max)
    } else {
        tracing::warn!(value, fallback, "Non-finite autoregulation setting replaced");
        fallback
    }
}

/// Readiness metric settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSettings {
    /// Trailing window in days used for trends and averages
    pub window_days: usize,

    /// Recovery score assumed when today's record is missing
    pub fallback_recovery: f64,

    /// Strain assumed when today's record is missing
    pub fallback_strain: f64,

    /// Sleep efficiency assumed when last night's record is missing
    pub fallback_sleep_efficiency: f64,

    /// Sleep duration in hours assumed when last night's record is missing
    pub fallback_sleep_hours: f64,
}

impl Default for MetricsSettings {
    fn default() -> Self {
        MetricsSettings {
            window_days: 7,
            fallback_recovery: 50.0,
            fallback_strain: 10.0,
            fallback_sleep_efficiency: 85.0,
            fallback_sleep_hours: 7.5,
        }
    }
}

impl MetricsSettings {
    /// Reject settings the calculator cannot work with
    ///
    /// Unlike autoregulation thresholds these are not clamped: a zero window or
    /// an out-of-range fallback means the file is wrong, not merely extreme.
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.window_days == 0 {
            return Err(AutoregError::Configuration(
                "metrics.window_days must be at least 1".to_string(),
            ));
        }

        let fallbacks = [
            ("metrics.fallback_recovery", self.fallback_recovery, 100.0),
            ("metrics.fallback_strain", self.fallback_strain, 21.0),
            (
                "metrics.fallback_sleep_efficiency",
                self.fallback_sleep_efficiency,
                100.0,
            ),
            ("metrics.fallback_sleep_hours", self.fallback_sleep_hours, 24.0),
        ];
        for (name, value, max) in fallbacks {
            if !value.is_finite() || !(0.0..=max).contains(&value) {
                return Err(AutoregError::Configuration(format!(
                    "{} must be between 0 and {}, got {}",
                    name, max, value
                )));
            }
        }

        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        let now = Utc::now();

        AppConfig {
            metadata: ConfigMetadata {
                version: "1.0".to_string(),
                created_at: now,
                updated_at: now,
            },
            autoregulation: AutoregulationConfig::default(),
            metrics: MetricsSettings::default(),
            logging: LogConfig::default(),
        }
    }
}

/// Configuration management implementation
impl AppConfig {
    /// Load configuration from TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: AppConfig = toml::from_str(&content)
            .with_context(|| "Failed to parse TOML configuration")?;

        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save_to_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.metadata.updated_at = Utc::now();

        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
        }

        let toml_content = toml::to_string_pretty(self)
            .with_context(|| "Failed to serialize configuration to TOML")?;

        fs::write(&path, toml_content)
            .with_context(|| format!("Failed to write config file: {}", path.as_ref().display()))?;

        Ok(())
    }

    /// Get default configuration file path
    pub fn default_config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".autoregrs")
            .join("config.toml")
    }

    /// Load configuration with fallback to defaults
    pub fn load_or_default() -> Self {
        let config_path = Self::default_config_path();

        match Self::load_from_file(&config_path) {
            Ok(config) => config,
            Err(err) => {
                tracing::debug!(
                    path = %config_path.display(),
                    error = %err,
                    "Config file not loaded, using defaults"
                );
                Self::default()
            }
        }
    }
}
