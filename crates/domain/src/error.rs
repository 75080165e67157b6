// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::types::PersonStatus;
use crate::validation::FieldViolation;

/// Errors that can occur during domain validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// An identifier string does not match `TEMP<digits>` or `MEMBER<digits>`.
    InvalidIdentifier(String),
    /// The identifier's namespace disagrees with the person's status.
    IdentifierStatusMismatch {
        /// The offending identifier.
        identifier: String,
        /// The status it was paired with.
        status: PersonStatus,
    },
    /// Person status string is not recognised.
    InvalidStatus(String),
    /// Sex string is not recognised.
    InvalidSex(String),
    /// One or more check-in form fields were rejected.
    InvalidFields(Vec<FieldViolation>),
    /// Failed to parse date from string.
    DateParseError {
        /// The invalid date string.
        date_string: String,
        /// The parsing error message.
        error: String,
    },
    /// Failed to format a date.
    DateFormatError(String),
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidIdentifier(value) => write!(f, "Invalid identifier: '{value}'"),
            Self::IdentifierStatusMismatch { identifier, status } => {
                write!(
                    f,
                    "Identifier '{identifier}' does not belong to the {status} namespace"
                )
            }
            Self::InvalidStatus(value) => write!(f, "Invalid person status: '{value}'"),
            Self::InvalidSex(value) => write!(f, "Invalid sex: '{value}'"),
            Self::InvalidFields(violations) => {
                write!(f, "Invalid check-in form:")?;
                for violation in violations {
                    write!(f, " [{violation}]")?;
                }
                Ok(())
            }
            Self::DateParseError { date_string, error } => {
                write!(f, "Failed to parse date '{date_string}': {error}")
            }
            Self::DateFormatError(msg) => write!(f, "Failed to format date: {msg}"),
        }
    }
}

impl std::error::Error for DomainError {}
