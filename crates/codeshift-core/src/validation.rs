//! Validation severities and the gate that decides whether a run continues.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Severity of a validator finding. Totally ordered: `None < Warning < Error`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ValidationLevel {
    #[default]
    #[serde(alias = "NONE")]
    None,
    #[serde(alias = "WARNING")]
    Warning,
    #[serde(alias = "ERROR")]
    Error,
}

impl ValidationLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for ValidationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValidationLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "warning" => Ok(Self::Warning),
            "error" => Ok(Self::Error),
            other => Err(format!(
                "unknown validation level '{}': must be none, warning, or error",
                other
            )),
        }
    }
}

/// The outcome of one validator over one batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub level: ValidationLevel,
    /// Name of the validator that produced this result.
    pub validator: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ValidationResult {
    pub fn new(
        level: ValidationLevel,
        validator: impl Into<String>,
        message: Option<String>,
    ) -> Self {
        Self {
            level,
            validator: validator.into(),
            message,
        }
    }

    pub fn passed(validator: impl Into<String>) -> Self {
        Self::new(ValidationLevel::None, validator, None)
    }
}

/// What the gate tells the orchestrator to do after a validator ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    Continue,
    Abort(ValidationResult),
}

/// Abort iff the result's level is strictly above the allowed threshold.
pub fn check(result: ValidationResult, threshold: ValidationLevel) -> GateDecision {
    if result.level > threshold {
        GateDecision::Abort(result)
    } else {
        GateDecision::Continue
    }
}
