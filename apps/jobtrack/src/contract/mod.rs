//! Contracts — the accepted shape of every entity that crosses the
//! client/server boundary.
//!
//! Two directions:
//! - Outbound payloads implement [`Validate`] and are checked before any
//!   request is built. A failure is a [`ValidationError`].
//! - Inbound bodies are decoded through [`decode`] / [`decode_list`], which
//!   run serde (shape: required fields, UUID, dates, enums) and then the
//!   entity's [`Contract::violations`] (constraints serde cannot express).
//!   A failure is a [`ResponseContractError`] and no partial value escapes.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod analysis;
pub mod auth;
pub mod jobs;
pub mod resumes;
pub mod timestamp;

pub use analysis::{AnalysisResult, InterviewPrepResult, InterviewQuestion, ResumeJobRequest};
pub use auth::{AccessToken, Credentials, Identity};
pub use jobs::{JobApplication, JobApplicationCreate, JobApplicationUpdate, JobForm, JobStatus};
pub use resumes::{ResumeData, ResumeMetadata};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldViolation {
    pub field: String,
    pub reason: String,
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.reason)
    }
}

fn join_violations(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// An outbound payload failed its local contract. Never reaches the network.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid input: {}", join_violations(.violations))]
pub struct ValidationError {
    pub violations: Vec<FieldViolation>,
}

impl ValidationError {
    pub fn single(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            violations: vec![FieldViolation {
                field: field.into(),
                reason: reason.into(),
            }],
        }
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.violations.iter().any(|v| v.field == field)
    }
}

/// A server response did not match the entity contract it was expected to
/// satisfy. The body is discarded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("response does not match the {entity} contract: {}", join_violations(.violations))]
pub struct ResponseContractError {
    pub entity: &'static str,
    pub violations: Vec<FieldViolation>,
}

/// Accumulates field violations so a check reports every offending field at
/// once instead of stopping at the first.
#[derive(Debug, Default)]
pub struct Violations(Vec<FieldViolation>);

impl Violations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: impl Into<String>, reason: impl Into<String>) {
        self.0.push(FieldViolation {
            field: field.into(),
            reason: reason.into(),
        });
    }

    /// Rejects empty and whitespace-only text.
    pub fn require_text(&mut self, field: &str, value: &str) {
        if value.trim().is_empty() {
            self.push(field, "must not be empty");
        }
    }

    pub fn require_min_chars(&mut self, field: &str, value: &str, min: usize) {
        if value.chars().count() < min {
            self.push(field, format!("must be at least {min} characters"));
        }
    }

    pub fn require_range(&mut self, field: &str, value: i64, min: i64, max: i64) {
        if value < min || value > max {
            self.push(
                field,
                format!("must be between {min} and {max} inclusive, got {value}"),
            );
        }
    }

    /// Absorbs violations from a nested entity, prefixing their field names.
    pub fn nest(&mut self, prefix: &str, nested: Vec<FieldViolation>) {
        for v in nested {
            self.push(format!("{prefix}.{}", v.field), v.reason);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_vec(self) -> Vec<FieldViolation> {
        self.0
    }

    pub fn into_result(self) -> Result<(), ValidationError> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { violations: self.0 })
        }
    }
}

/// Outbound payload check, run before a request is constructed.
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError>;
}

/// Inbound entity contract.
pub trait Contract: DeserializeOwned {
    /// Entity name used in error reports.
    const ENTITY: &'static str;

    /// Constraint violations beyond what deserialization already enforces.
    fn violations(&self) -> Vec<FieldViolation> {
        Vec::new()
    }
}

/// Decodes a response body into a fully validated `T`.
pub fn decode<T: Contract>(body: &[u8]) -> Result<T, ResponseContractError> {
    let value: T = serde_json::from_slice(body).map_err(|e| shape_error(T::ENTITY, e))?;
    let violations = value.violations();
    if !violations.is_empty() {
        return Err(ResponseContractError {
            entity: T::ENTITY,
            violations,
        });
    }
    Ok(value)
}

/// Decodes a JSON array of `T`. One bad element rejects the whole list.
pub fn decode_list<T: Contract>(body: &[u8]) -> Result<Vec<T>, ResponseContractError> {
    let values: Vec<T> = serde_json::from_slice(body).map_err(|e| shape_error(T::ENTITY, e))?;
    let mut violations = Violations::new();
    for (i, value) in values.iter().enumerate() {
        violations.nest(&format!("[{i}]"), value.violations());
    }
    if !violations.is_empty() {
        return Err(ResponseContractError {
            entity: T::ENTITY,
            violations: violations.into_vec(),
        });
    }
    Ok(values)
}

fn shape_error(entity: &'static str, e: serde_json::Error) -> ResponseContractError {
    ResponseContractError {
        entity,
        violations: vec![FieldViolation {
            field: "$".to_string(),
            reason: e.to_string(),
        }],
    }
}
