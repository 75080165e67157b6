// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Error types for the API layer.

use presence::CoreError;
use presence_domain::{DomainError, FieldViolation};
use presence_persistence::{PersistenceError, UniqueField};

/// Shown when a check-in reuses another person's phone number.
pub const DUPLICATE_CONTACT_MESSAGE: &str =
    "This phone number is already registered. Please use another number.";

/// Shown when a check-in reuses another person's email address.
pub const DUPLICATE_EMAIL_MESSAGE: &str =
    "This email is already registered. Please use another email address.";

/// API-level errors.
///
/// These are distinct from domain/core/persistence errors and represent
/// the API contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The check-in form was refused.
    ValidationFailed {
        /// Every rejected field.
        violations: Vec<FieldViolation>,
    },
    /// Invalid input was provided.
    InvalidInput {
        /// The field that was invalid.
        field: String,
        /// A human-readable description of the error.
        message: String,
    },
    /// A value that must be unique is already in use.
    DuplicateValue {
        /// The conflicting field.
        field: String,
        /// A human-readable description of the conflict.
        message: String,
    },
    /// The operation's preconditions do not hold for this record.
    PreconditionFailed {
        /// The record concerned.
        identifier: String,
        /// A human-readable description of the failure.
        message: String,
    },
    /// A requested resource was not found.
    ResourceNotFound {
        /// The type of resource that was not found.
        resource_type: String,
        /// A human-readable description of what was not found.
        message: String,
    },
    /// An internal error occurred.
    Internal {
        /// A description of the internal error.
        message: String,
    },
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ValidationFailed { violations } => {
                write!(f, "Please correct the following:")?;
                for violation in violations {
                    write!(f, " {}.", violation.message)?;
                }
                Ok(())
            }
            Self::InvalidInput { field, message } => {
                write!(f, "Invalid input for field '{field}': {message}")
            }
            Self::DuplicateValue { message, .. } | Self::PreconditionFailed { message, .. } => {
                write!(f, "{message}")
            }
            Self::ResourceNotFound {
                resource_type,
                message,
            } => {
                write!(f, "{resource_type} not found: {message}")
            }
            Self::Internal { message } => {
                write!(f, "Internal error: {message}")
            }
        }
    }
}

impl std::error::Error for ApiError {}

/// Translates a domain error into an API error.
///
/// This translation is explicit and ensures domain errors are not leaked directly.
#[must_use]
pub fn translate_domain_error(err: DomainError) -> ApiError {
    match err {
        DomainError::InvalidFields(violations) => ApiError::ValidationFailed { violations },
        DomainError::InvalidIdentifier(value) => ApiError::InvalidInput {
            field: String::from("identifier"),
            message: format!("'{value}' is not a TEMP or MEMBER identifier"),
        },
        DomainError::IdentifierStatusMismatch { identifier, status } => ApiError::InvalidInput {
            field: String::from("identifier"),
            message: format!("'{identifier}' does not belong to the {status} namespace"),
        },
        DomainError::InvalidStatus(value) => ApiError::InvalidInput {
            field: String::from("status"),
            message: format!("'{value}' is not a person status (expected visitor or member)"),
        },
        DomainError::InvalidSex(value) => ApiError::InvalidInput {
            field: String::from("sex"),
            message: format!("'{value}' is not a recognised sex"),
        },
        DomainError::DateParseError { date_string, error } => ApiError::InvalidInput {
            field: String::from("date"),
            message: format!("Failed to parse date '{date_string}': {error}"),
        },
        DomainError::DateFormatError(msg) => ApiError::Internal {
            message: format!("Failed to format date: {msg}"),
        },
    }
}

/// Translates a core error into an API error.
#[must_use]
pub fn translate_core_error(err: CoreError) -> ApiError {
    let message: String = err.to_string();
    match err {
        CoreError::InvalidTransition { event, .. } => ApiError::InvalidInput {
            field: String::from(event),
            message,
        },
    }
}

/// Translates a persistence error into an API error.
///
/// Uniqueness conflicts are matched on the field they name, never on the
/// database message.
#[must_use]
pub fn translate_persistence_error(err: PersistenceError) -> ApiError {
    match err {
        PersistenceError::UniqueViolation { field } => match field {
            UniqueField::Contact => ApiError::DuplicateValue {
                field: String::from("contact"),
                message: String::from(DUPLICATE_CONTACT_MESSAGE),
            },
            UniqueField::Email => ApiError::DuplicateValue {
                field: String::from("email"),
                message: String::from(DUPLICATE_EMAIL_MESSAGE),
            },
            UniqueField::Identifier => ApiError::DuplicateValue {
                field: String::from("identifier"),
                message: String::from("The allocated identifier is already in use. Please retry."),
            },
        },
        PersistenceError::PersonNotFound(identifier) => ApiError::ResourceNotFound {
            resource_type: String::from("Person"),
            message: format!("No person with identifier {identifier}"),
        },
        PersistenceError::NotAVisitor(identifier) => ApiError::PreconditionFailed {
            message: format!("{identifier} is already a member"),
            identifier,
        },
        PersistenceError::NoAttendanceHistory(identifier) => ApiError::PreconditionFailed {
            message: format!("No attendance data found for {identifier}"),
            identifier,
        },
        PersistenceError::NotFound(msg) => ApiError::ResourceNotFound {
            resource_type: String::from("Record"),
            message: msg,
        },
        other => ApiError::Internal {
            message: other.to_string(),
        },
    }
}
