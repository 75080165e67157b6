// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use presence_domain::{DomainError, FieldViolation, FormField, PersonStatus};
use presence_persistence::{PersistenceError, UniqueField};

use crate::{
    ApiError, DUPLICATE_EMAIL_MESSAGE, parse_identifier, parse_status, translate_domain_error,
    translate_persistence_error,
};

#[test]
fn test_unique_violation_maps_by_field() {
    let error: ApiError = translate_persistence_error(PersistenceError::UniqueViolation {
        field: UniqueField::Email,
    });

    assert_eq!(
        error,
        ApiError::DuplicateValue {
            field: String::from("email"),
            message: String::from(DUPLICATE_EMAIL_MESSAGE),
        }
    );
    assert_eq!(error.to_string(), DUPLICATE_EMAIL_MESSAGE);
}

#[test]
fn test_missing_history_is_a_precondition_failure() {
    let error: ApiError =
        translate_persistence_error(PersistenceError::NoAttendanceHistory(String::from("TEMP003")));

    assert_eq!(error.to_string(), "No attendance data found for TEMP003");
}

#[test]
fn test_database_failures_are_internal() {
    let error: ApiError =
        translate_persistence_error(PersistenceError::DatabaseError(String::from("locked")));

    assert!(matches!(error, ApiError::Internal { .. }));
}

#[test]
fn test_invalid_fields_become_validation_failure() {
    let violations: Vec<FieldViolation> =
        vec![FieldViolation::new(FormField::Name, "Name is required")];

    let error: ApiError = translate_domain_error(DomainError::InvalidFields(violations.clone()));

    assert_eq!(error, ApiError::ValidationFailed { violations });
    assert_eq!(
        error.to_string(),
        "Please correct the following: Name is required."
    );
}

#[test]
fn test_parse_identifier_and_status() {
    assert_eq!(parse_identifier(" TEMP007 ").unwrap().number(), 7);
    assert!(matches!(
        parse_identifier("temp007"),
        Err(ApiError::InvalidInput { .. })
    ));
    assert_eq!(parse_status("visitor").unwrap(), PersonStatus::Visitor);
    assert!(parse_status("guest").is_err());
}
