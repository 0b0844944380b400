use serde::{Deserialize, Serialize};
use std::fmt;

/// One schema violation collected during header validation.
///
/// Submission-time validation reports every failing field at once rather
/// than stopping at the first, so the operator can fix the whole form in
/// one pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

impl FieldViolation {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Which declared total failed the submission count check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CountKind {
    Containers,
    Pieces,
}

impl fmt::Display for CountKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CountKind::Containers => write!(f, "container"),
            CountKind::Pieces => write!(f, "piece"),
        }
    }
}

/// Error taxonomy for the batch-entry workflow.
///
/// Every variant is transient and user-facing; nothing here represents a
/// crash. Network-facing operations convert failures into these variants
/// at the boundary where the operator action was initiated, and no retry
/// happens anywhere except by the operator repeating the action.
#[derive(Debug, thiserror::Error)]
pub enum EntryError {
    /// Candidate code failed the fixed-length/charset rule. The caller
    /// keeps the raw input so the operator can correct it.
    #[error("invalid code {0:?}: a T-code is exactly 6 alphanumeric characters")]
    Format(String),

    /// A declared container or piece target would be exceeded, or the
    /// minimum of one container would be violated.
    #[error("capacity: {0}")]
    Capacity(String),

    /// The remote lookup rejected the code, or the lookup itself failed.
    #[error("code not eligible: {0}")]
    Eligibility(String),

    /// One or more header fields missing or malformed; carries the full
    /// per-field list, never just the first failure.
    #[error("validation failed: {}", format_violations(.0))]
    Validation(Vec<FieldViolation>),

    /// Declared vs. actual totals disagree at submission time.
    #[error("{kind} count mismatch: expected {expected}, got {actual}")]
    CountMismatch {
        kind: CountKind,
        expected: u32,
        actual: u32,
    },

    /// A guarded server-side deletion failed; local state was left
    /// untouched.
    #[error("deletion failed: {0}")]
    Deletion(String),

    /// The create/update call failed; the server message is carried
    /// verbatim when one was supplied.
    #[error("submission failed: {0}")]
    Submission(String),

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl EntryError {
    pub fn capacity(msg: impl Into<String>) -> Self {
        Self::Capacity(msg.into())
    }

    pub fn eligibility(msg: impl Into<String>) -> Self {
        Self::Eligibility(msg.into())
    }

    pub fn deletion(msg: impl Into<String>) -> Self {
        Self::Deletion(msg.into())
    }

    pub fn submission(msg: impl Into<String>) -> Self {
        Self::Submission(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }
}

fn format_violations(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Flatten `validator` derive output into our per-field violation list.
pub(crate) fn collect_violations(errors: &validator::ValidationErrors) -> Vec<FieldViolation> {
    let mut out = Vec::new();
    for (field, kind) in errors.errors() {
        match kind {
            validator::ValidationErrorsKind::Field(field_errors) => {
                for err in field_errors {
                    let message = err
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("failed `{}` check", err.code));
                    out.push(FieldViolation::new(field.to_string(), message));
                }
            }
            validator::ValidationErrorsKind::Struct(nested) => {
                out.extend(collect_violations(nested));
            }
            validator::ValidationErrorsKind::List(map) => {
                for nested in map.values() {
                    out.extend(collect_violations(nested));
                }
            }
        }
    }
    out
}
