//! Errors raised by envelope assembly and wire parsing.

use thiserror::Error;

use super::validation::FieldViolation;

/// Failures surfaced by [`MessageAssembler::build_and_validate`] and the
/// wire parsers on [`MessageEnvelope`].
///
/// Serialization has no variant here: rendering an envelope to text cannot
/// fail.
///
/// [`MessageAssembler::build_and_validate`]: super::builder::MessageAssembler::build_and_validate
/// [`MessageEnvelope`]: super::envelope::MessageEnvelope
#[derive(Debug, Error)]
pub enum MessageError {
    /// A required field is missing or blank, or the accounting date is malformed.
    #[error("message validation failed: {}", describe(.violations))]
    ValidationFailed { violations: Vec<FieldViolation> },

    /// A length ceiling or field pattern is violated.
    #[error("message format validation failed: {}", describe(.violations))]
    FormatValidationFailed { violations: Vec<FieldViolation> },

    /// The wire text is not a well-formed message.
    #[error("failed to parse wire message: {0}")]
    ParseFailed(#[from] serde_json::Error),

    /// A required component (`txHeader`, `txBody`, `txEntity`) is absent.
    #[error("message is missing required component: {0}")]
    MissingComponent(&'static str),
}

impl MessageError {
    /// The violations carried by a validation failure; empty otherwise.
    pub fn violations(&self) -> &[FieldViolation] {
        match self {
            Self::ValidationFailed { violations } | Self::FormatValidationFailed { violations } => {
                violations
            }
            _ => &[],
        }
    }
}

fn describe(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
