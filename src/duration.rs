//! Parsing and scaling of prescription duration strings
//!
//! Durations arrive as free text, normally `"N"` or `"N-M minutes"`. Anything
//! else (`"Full day rest"`, `"until failure"`) is passed through untouched.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use std::fmt;

/// A parsed duration in whole minutes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DurationRange {
    pub min: u32,
    pub max: Option<u32>,
    /// Whether the source text carried a "minutes" suffix
    pub minutes_suffix: bool,
}

impl DurationRange {
    pub fn parse(text: &str) -> Option<Self> {
        let trimmed = text.trim();
        let (body, minutes_suffix) = match strip_minutes_suffix(trimmed) {
            Some(body) => (body, true),
            None => (trimmed, false),
        };

        let (min, max) = match body.split_once('-') {
            Some((low, high)) => (
                low.trim().parse::<u32>().ok()?,
                Some(high.trim().parse::<u32>().ok()?),
            ),
            None => (body.parse::<u32>().ok()?, None),
        };

        Some(Self { min, max, minutes_suffix })
    }

    /// Multiply both bounds, rounding half-minutes up
    ///
    /// `None` when a bound leaves the `u32` range.
    pub fn scale(self, factor: Decimal) -> Option<Self> {
        let scale = |minutes: u32| {
            Decimal::from(minutes)
                .checked_mul(factor)?
                .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
                .to_u32()
        };
        Some(Self {
            min: scale(self.min)?,
            max: match self.max {
                Some(max) => Some(scale(max)?),
                None => None,
            },
            ..self
        })
    }

    /// Add minutes to both bounds; `None` on overflow
    pub fn extend(self, minutes: u32) -> Option<Self> {
        Some(Self {
            min: self.min.checked_add(minutes)?,
            max: match self.max {
                Some(max) => Some(max.checked_add(minutes)?),
                None => None,
            },
            ..self
        })
    }
}

impl fmt::Display for DurationRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.max {
            Some(max) => write!(f, "{}-{}", self.min, max)?,
            None => write!(f, "{}", self.min)?,
        }
        if self.minutes_suffix {
            write!(f, " minutes")?;
        }
        Ok(())
    }
}

fn strip_minutes_suffix(text: &str) -> Option<&str> {
    ["minutes", "minute", "mins", "min"]
        .iter()
        .find_map(|suffix| text.strip_suffix(suffix))
        .map(str::trim_end)
}

/// Scale a duration string, or return it unchanged if it cannot be handled
pub fn scale_duration(text: &str, factor: Decimal) -> String {
    match DurationRange::parse(text).and_then(|range| range.scale(factor)) {
        Some(range) => range.to_string(),
        None => {
            tracing::debug!(duration = text, "Duration left unchanged");
            text.to_string()
        }
    }
}

/// Extend a duration string, or return it unchanged if it cannot be handled
pub fn extend_duration(text: &str, minutes: u32) -> String {
    match DurationRange::parse(text).and_then(|range| range.extend(minutes)) {
        Some(range) => range.to_string(),
        None => {
            tracing::debug!(duration = text, "Duration left unchanged");
            text.to_string()
        }
    }
}
