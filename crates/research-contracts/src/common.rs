//! Shared scalar types used across entities.

use crate::error::CoreError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Open-ended string→value bag, used for `provenance`, `parameters`,
/// `source_metadata`, `assessment_metadata`, and `payload`. Kept as a JSON
/// map rather than typed structs for the fields the spec deliberately leaves
/// schema-free; closed enumerations (scoring weights, breaker config,
/// freshness thresholds) live as typed config structs elsewhere.
pub type Bag = HashMap<String, Value>;

/// Who or what created an entity, recorded alongside every entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Provenance {
    pub created_by: String,
    pub bag: Bag,
}

impl Provenance {
    pub fn new(created_by: impl Into<String>) -> Self {
        Self {
            created_by: created_by.into(),
            bag: Bag::new(),
        }
    }

    pub fn with_entry(mut self, key: impl Into<String>, value: Value) -> Self {
        self.bag.insert(key.into(), value);
        self
    }
}

/// Clamp a dimension score into the valid `[0, 1]` range, rejecting NaN.
pub fn validate_unit_score(name: &str, value: f64) -> Result<f64, CoreError> {
    if !value.is_finite() {
        return Err(CoreError::invalid_argument(format!(
            "{name} must be a finite number, got {value}"
        )));
    }
    if !(0.0..=1.0).contains(&value) {
        return Err(CoreError::invalid_argument(format!(
            "{name} must be in [0, 1], got {value}"
        )));
    }
    Ok(value)
}

pub fn validate_non_empty(name: &str, value: &str) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        return Err(CoreError::invalid_argument(format!("{name} must not be empty")));
    }
    Ok(())
}

pub fn now() -> DateTime<Utc> {
    Utc::now()
}
