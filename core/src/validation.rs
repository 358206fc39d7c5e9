//! Field validation for create and patch payloads.
//!
//! Every payload collects all of its violations before failing.

use serde::{Deserialize, Serialize};

use crate::{ReliefError, Result};

/// A single rejected field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Implemented by every insert and patch payload.
pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub(crate) fn summarize(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Accumulates violations for one payload.
#[derive(Debug, Default)]
pub struct Violations(Vec<FieldError>);

impl Violations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.0.push(FieldError::new(field, message));
    }

    /// Text that must be present and non-blank.
    pub fn required(&mut self, field: &str, value: &str) {
        if value.trim().is_empty() {
            self.push(field, "is required");
        }
    }

    /// Text that may be omitted, but not sent blank.
    pub fn not_blank(&mut self, field: &str, value: Option<&str>) {
        if let Some(v) = value {
            self.required(field, v);
        }
    }

    pub fn latitude(&mut self, field: &str, value: Option<f64>) {
        if let Some(v) = value {
            if !v.is_finite() || !(-90.0..=90.0).contains(&v) {
                self.push(field, "must be between -90 and 90");
            }
        }
    }

    pub fn longitude(&mut self, field: &str, value: Option<f64>) {
        if let Some(v) = value {
            if !v.is_finite() || !(-180.0..=180.0).contains(&v) {
                self.push(field, "must be between -180 and 180");
            }
        }
    }

    pub fn at_least(&mut self, field: &str, value: Option<i64>, min: i64) {
        if let Some(v) = value {
            if v < min {
                self.push(field, format!("must be at least {min}"));
            }
        }
    }

    pub fn at_most(&mut self, field: &str, value: Option<i64>, max: i64) {
        if let Some(v) = value {
            if v > max {
                self.push(field, format!("must be at most {max}"));
            }
        }
    }

    pub fn non_negative_f64(&mut self, field: &str, value: Option<f64>) {
        if let Some(v) = value {
            if !v.is_finite() || v < 0.0 {
                self.push(field, "must be zero or greater");
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn finish(self) -> Result<()> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(ReliefError::Validation(self.0))
        }
    }
}

/// Patch payloads share one extra rule: they must change something.
pub(crate) fn require_changes(violations: &mut Violations, has_changes: bool) {
    if !has_changes {
        violations.push("body", "no fields to update");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_every_violation() {
        let mut v = Violations::new();
        v.required("name", "  ");
        v.latitude("latitude", Some(91.0));
        v.longitude("longitude", Some(-181.0));
        v.at_least("familySize", Some(0), 1);

        match v.finish() {
            Err(ReliefError::Validation(errors)) => {
                let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
                assert_eq!(fields, ["name", "latitude", "longitude", "familySize"]);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn absent_optionals_pass() {
        let mut v = Violations::new();
        v.not_blank("description", None);
        v.latitude("latitude", None);
        v.at_least("age", None, 0);
        assert!(v.finish().is_ok());
    }

    #[test]
    fn upper_bound_is_inclusive() {
        let mut v = Violations::new();
        v.at_most("quantity", Some(10), 10);
        assert!(v.is_empty());
        v.at_most("quantity", Some(11), 10);
        assert!(!v.is_empty());
    }

    #[test]
    fn blank_optional_text_is_rejected() {
        let mut v = Violations::new();
        v.not_blank("unit", Some(""));
        assert!(!v.is_empty());
    }

    #[test]
    fn boundary_coordinates_are_valid() {
        let mut v = Violations::new();
        v.latitude("latitude", Some(-90.0));
        v.latitude("latitude", Some(90.0));
        v.longitude("longitude", Some(180.0));
        assert!(v.finish().is_ok());
    }

    #[test]
    fn summary_joins_fields() {
        let errors = vec![
            FieldError::new("name", "is required"),
            FieldError::new("unit", "is required"),
        ];
        assert_eq!(summarize(&errors), "name: is required; unit: is required");
    }
}
