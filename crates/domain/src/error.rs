// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use time::Date;

/// Errors that can occur while evaluating domain rules.
///
/// Malformed dates and schedule text are not errors; parsers report them
/// as `None`. These variants cover the cases a caller must handle per
/// subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A field required by the requested computation is missing or invalid.
    InvalidSubject {
        /// Identifier of the offending subject.
        subject: String,
        /// The field that failed.
        field: &'static str,
        /// Description of the failure.
        reason: String,
    },
    /// A leave period ends before it starts.
    InvalidPeriodRange {
        /// The period start.
        start: Date,
        /// The period end.
        end: Date,
    },
    /// Date arithmetic left the representable range.
    DateArithmeticOverflow {
        /// Description of the operation that failed.
        operation: String,
    },
}

impl DomainError {
    /// Builds an `InvalidSubject` error for a missing field.
    #[must_use]
    pub fn missing_field(subject: &str, field: &'static str) -> Self {
        Self::InvalidSubject {
            subject: subject.to_string(),
            field,
            reason: String::from("value is missing"),
        }
    }
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidSubject {
                subject,
                field,
                reason,
            } => {
                write!(f, "Invalid subject '{subject}': {field} {reason}")
            }
            Self::InvalidPeriodRange { start, end } => {
                write!(f, "Leave period ends ({end}) before it starts ({start})")
            }
            Self::DateArithmeticOverflow { operation } => {
                write!(f, "Date arithmetic overflow while {operation}")
            }
        }
    }
}

impl std::error::Error for DomainError {}
