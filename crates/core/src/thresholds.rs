//! Alert threshold sets and their validation.
//!
//! Thresholds are integer percentages. Callers may supply any subset of
//! `cpu`, `memory` and `disk`; missing keys fall back to
//! [`DEFAULT_THRESHOLD`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CoreError;

/// Lowest accepted threshold percentage (inclusive).
pub const THRESHOLD_MIN: i64 = 10;
/// Highest accepted threshold percentage (inclusive).
pub const THRESHOLD_MAX: i64 = 100;
/// Value used for any threshold the caller leaves out.
pub const DEFAULT_THRESHOLD: i64 = 80;

/// A complete set of alert thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThresholdSet {
    pub cpu: i64,
    pub memory: i64,
    pub disk: i64,
}

impl Default for ThresholdSet {
    fn default() -> Self {
        Self {
            cpu: DEFAULT_THRESHOLD,
            memory: DEFAULT_THRESHOLD,
            disk: DEFAULT_THRESHOLD,
        }
    }
}

impl ThresholdSet {
    /// Check every value against `[THRESHOLD_MIN, THRESHOLD_MAX]`.
    ///
    /// Fields are checked in `cpu`, `memory`, `disk` order and the first
    /// offending field is named in the error.
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_percentage(self.cpu, "cpu")?;
        validate_percentage(self.memory, "memory")?;
        validate_percentage(self.disk, "disk")?;
        Ok(())
    }
}

/// A threshold set where any key may be missing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialThresholds {
    pub cpu: Option<i64>,
    pub memory: Option<i64>,
    pub disk: Option<i64>,
}

impl PartialThresholds {
    /// Fill missing keys with [`DEFAULT_THRESHOLD`].
    pub fn merge_defaults(&self) -> ThresholdSet {
        let defaults = ThresholdSet::default();
        ThresholdSet {
            cpu: self.cpu.unwrap_or(defaults.cpu),
            memory: self.memory.unwrap_or(defaults.memory),
            disk: self.disk.unwrap_or(defaults.disk),
        }
    }

    /// Parse thresholds from a loosely typed JSON body.
    ///
    /// Each key may be absent, `null`, an integer, or a string holding an
    /// integer (form posts send strings). Anything else is a validation
    /// error naming the field. Range checks are left to
    /// [`ThresholdSet::validate`].
    pub fn from_json(body: &Value) -> Result<Self, CoreError> {
        let object = match body {
            Value::Null => return Ok(Self::default()),
            Value::Object(map) => map,
            _ => {
                return Err(CoreError::Validation(
                    "thresholds must be a JSON object".into(),
                ))
            }
        };

        Ok(Self {
            cpu: parse_field(object.get("cpu"), "cpu")?,
            memory: parse_field(object.get("memory"), "memory")?,
            disk: parse_field(object.get("disk"), "disk")?,
        })
    }
}

impl From<ThresholdSet> for PartialThresholds {
    fn from(set: ThresholdSet) -> Self {
        Self {
            cpu: Some(set.cpu),
            memory: Some(set.memory),
            disk: Some(set.disk),
        }
    }
}

fn parse_field(value: Option<&Value>, name: &str) -> Result<Option<i64>, CoreError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => match n.as_i64() {
            Some(v) => Ok(Some(v)),
            None => match n.as_f64() {
                Some(f) if f.fract() == 0.0 && f.is_finite() => Ok(Some(f as i64)),
                _ => Err(CoreError::invalid_field(name, format!("must be an integer, got {n}"))),
            },
        },
        Some(Value::String(s)) => s.trim().parse::<i64>().map(Some).map_err(|_| {
            CoreError::invalid_field(name, format!("must be an integer, got {s:?}"))
        }),
        Some(other) => Err(CoreError::invalid_field(
            name,
            format!("must be an integer, got {other}"),
        )),
    }
}

fn validate_percentage(value: i64, name: &str) -> Result<(), CoreError> {
    if !(THRESHOLD_MIN..=THRESHOLD_MAX).contains(&value) {
        return Err(CoreError::invalid_field(
            name,
            format!("must be between {THRESHOLD_MIN} and {THRESHOLD_MAX}, got {value}"),
        ));
    }
    Ok(())
}
