// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API handlers.
//!
//! Handlers are synchronous and take the persistence adapter explicitly;
//! locking and scheduling belong to the server.

use presence::{FormSession, Page, SessionEvent, SubmissionOutcome, apply};
use presence_domain::{
    AttendanceRecord, CheckInInput, FieldViolation, FormField, Identifier, Person, PersonDetails,
    PersonStatus, fallback_identifier, normalize_check_in, parse_date, validate_check_in,
};
use presence_persistence::{
    AttendanceStatus, CheckInOutcome, Persistence, PersistenceError, PromotionOutcome,
};
use std::collections::BTreeMap;
use std::str::FromStr;
use time::Date;
use tracing::{debug, error, info, warn};

use crate::error::{
    ApiError, translate_core_error, translate_domain_error, translate_persistence_error,
};
use crate::request_response::{
    AttendanceHistoryResponse, CheckInRequest, CheckInResponse, CheckInStatus,
    ConfirmConversionsResponse, ConversionFailure, IdentifierAllocation, ListVisitorsResponse,
    PromoteVisitorResponse, SessionCheckIn, SessionConversions, VisitorInfo,
};

/// Parses an identifier supplied by a client.
///
/// # Errors
///
/// Returns `ApiError::InvalidInput` if the string is not an identifier.
pub fn parse_identifier(raw: &str) -> Result<Identifier, ApiError> {
    Identifier::parse(raw.trim()).map_err(translate_domain_error)
}

/// Parses a person status (`visitor` or `member`).
///
/// # Errors
///
/// Returns `ApiError::InvalidInput` if the status is unknown.
pub fn parse_status(raw: &str) -> Result<PersonStatus, ApiError> {
    PersonStatus::from_str(raw).map_err(translate_domain_error)
}

/// Parses a page name (`attendance` or `new_visitors`).
///
/// # Errors
///
/// Returns `ApiError::InvalidInput` if the page is unknown.
pub fn parse_page(raw: &str) -> Result<Page, ApiError> {
    match raw.trim() {
        "attendance" => Ok(Page::Attendance),
        "new_visitors" => Ok(Page::NewVisitors),
        other => Err(ApiError::InvalidInput {
            field: String::from("page"),
            message: format!("Unknown page '{other}'"),
        }),
    }
}

/// Turns the raw request into form input, noting an unreadable birth date.
fn to_check_in_input(request: &CheckInRequest) -> (CheckInInput, bool) {
    let raw_birth_date: Option<&str> = request
        .birth_date
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty());
    let birth_date: Option<Date> = raw_birth_date.and_then(|value| parse_date(value).ok());
    let unreadable_birth_date: bool = raw_birth_date.is_some() && birth_date.is_none();

    let input: CheckInInput = CheckInInput {
        name: request.name.clone(),
        given_names: request.given_names.clone(),
        sex: request.sex.clone(),
        birth_date,
        contact: request.contact.clone(),
        email: request.email.clone().unwrap_or_default(),
        residence: request.residence.clone(),
    };
    (input, unreadable_birth_date)
}

/// Validates a check-in form and records today's attendance.
///
/// This function:
/// - Validates every field, collecting all violations
/// - Formats the accepted input (upper-case name, `+225` phone prefix, ...)
/// - Upserts the person by name and records attendance in one transaction
///
/// # Arguments
///
/// * `persistence` - The persistence layer
/// * `request` - The submitted form
/// * `today` - The check-in date
///
/// # Returns
///
/// A response with `attendance = AlreadyPresent` if the person had already
/// checked in today. That is not an error.
///
/// # Errors
///
/// Returns an error if:
/// - Any field is invalid (`ValidationFailed`, nothing is stored)
/// - The contact or email belongs to someone else (`DuplicateValue`)
/// - The database fails (`Internal`)
pub fn check_in(
    persistence: &mut Persistence,
    request: &CheckInRequest,
    today: Date,
) -> Result<CheckInResponse, ApiError> {
    let (input, unreadable_birth_date): (CheckInInput, bool) = to_check_in_input(request);

    let mut violations: Vec<FieldViolation> = validate_check_in(&input, today);
    if unreadable_birth_date {
        for violation in &mut violations {
            if violation.field == FormField::BirthDate {
                violation.message = String::from("Birth date is incorrect");
            }
        }
    }
    if !violations.is_empty() {
        warn!(
            violations = violations.len(),
            "Rejected check-in form"
        );
        return Err(ApiError::ValidationFailed { violations });
    }

    let details: PersonDetails = normalize_check_in(&input, today).map_err(translate_domain_error)?;

    let outcome: CheckInOutcome = persistence
        .record_check_in(&details, request.first_time, today)
        .map_err(|e| {
            if matches!(e, PersistenceError::UniqueViolation { .. }) {
                warn!(error = %e, "Check-in conflicts with another person");
            } else {
                error!(error = %e, "Failed to record check-in");
            }
            translate_persistence_error(e)
        })?;

    let (attendance, message): (CheckInStatus, String) = match outcome.attendance {
        AttendanceStatus::Recorded { .. } => (
            CheckInStatus::CheckedIn,
            format!(
                "Attendance recorded for {} {} ({})",
                details.given_names, details.name, outcome.identifier
            ),
        ),
        AttendanceStatus::AlreadyPresent => (
            CheckInStatus::AlreadyPresent,
            format!(
                "{} {} is already registered today",
                details.given_names, details.name
            ),
        ),
    };

    Ok(CheckInResponse {
        identifier: outcome.identifier,
        status: outcome.status,
        person_created: outcome.person_created,
        attendance,
        message,
    })
}

/// Applies the non-fatal allocation contract to an allocator result.
#[must_use]
pub fn resolve_allocation(
    status: PersonStatus,
    result: Result<Identifier, PersistenceError>,
) -> IdentifierAllocation {
    match result {
        Ok(identifier) => IdentifierAllocation {
            identifier,
            fallback_used: false,
            error: None,
        },
        Err(e) => {
            let identifier: Identifier = fallback_identifier(status);
            warn!(
                error = %e,
                %identifier,
                "Identifier allocation failed; using fallback"
            );
            IdentifierAllocation {
                identifier,
                fallback_used: true,
                error: Some(format!("Error generating identifier: {e}")),
            }
        }
    }
}

/// Proposes the next identifier in a namespace.
///
/// Nothing is reserved; check-in allocates again inside its transaction.
/// If storage cannot be read, the namespace's first identifier is
/// returned instead, flagged as a fallback.
///
/// # Arguments
///
/// * `persistence` - The persistence layer
/// * `status` - The namespace to allocate in
#[must_use]
pub fn allocate_identifier(
    persistence: &mut Persistence,
    status: PersonStatus,
) -> IdentifierAllocation {
    resolve_allocation(status, persistence.allocate_identifier(status))
}

/// Lists visitors for the staff conversion page.
///
/// # Arguments
///
/// * `persistence` - The persistence layer
/// * `first_attendance_on` - Keep only visitors first seen on this day (or
///   with no recorded first day)
/// * `selections` - The session's "wants to stay" toggles
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_visitors(
    persistence: &mut Persistence,
    first_attendance_on: Option<Date>,
    selections: &BTreeMap<Identifier, bool>,
) -> Result<ListVisitorsResponse, ApiError> {
    let visitors: Vec<Person> = persistence
        .list_persons(PersonStatus::Visitor, first_attendance_on)
        .map_err(translate_persistence_error)?;

    let mut rows: Vec<VisitorInfo> = Vec::with_capacity(visitors.len());
    for visitor in visitors {
        let identifier: Identifier = visitor.identifier().clone();
        let wants_to_stay: bool = if let Some(selected) = selections.get(&identifier) {
            *selected
        } else {
            persistence
                .list_attendance(&identifier)
                .map_err(translate_persistence_error)?
                .first()
                .is_some_and(|record| record.wants_to_stay)
        };

        rows.push(VisitorInfo {
            identifier,
            name: visitor.name,
            given_names: visitor.given_names,
            residence: visitor.residence,
            contact: visitor.contact,
            first_attendance_date: visitor.first_attendance_date,
            wants_to_stay,
        });
    }

    debug!(count = rows.len(), "Listed visitors");
    Ok(ListVisitorsResponse { visitors: rows })
}

fn promotion_response(outcome: PromotionOutcome) -> PromoteVisitorResponse {
    let message: String = format!(
        "Visitor {} converted to member {}",
        outcome.old_identifier, outcome.new_identifier
    );
    PromoteVisitorResponse {
        old_identifier: outcome.old_identifier,
        new_identifier: outcome.new_identifier,
        records_moved: outcome.records_moved,
        message,
    }
}

/// Promotes one visitor to member.
///
/// # Errors
///
/// Returns an error if:
/// - The identifier is malformed (`InvalidInput`)
/// - Nobody has the identifier (`ResourceNotFound`)
/// - The person is a member or has no attendance (`PreconditionFailed`)
pub fn promote_visitor(
    persistence: &mut Persistence,
    identifier: &str,
) -> Result<PromoteVisitorResponse, ApiError> {
    let identifier: Identifier = parse_identifier(identifier)?;
    let outcome: PromotionOutcome = persistence.promote_visitor(&identifier).map_err(|e| {
        warn!(%identifier, error = %e, "Promotion refused");
        translate_persistence_error(e)
    })?;
    Ok(promotion_response(outcome))
}

/// Promotes every selected visitor, each in its own transaction.
///
/// A failure on one visitor does not stop the others; every failure is
/// reported in the response.
///
/// # Errors
///
/// Returns `ApiError::InvalidInput` if nothing is selected.
pub fn confirm_conversions(
    persistence: &mut Persistence,
    identifiers: &[Identifier],
) -> Result<ConfirmConversionsResponse, ApiError> {
    if identifiers.is_empty() {
        return Err(ApiError::InvalidInput {
            field: String::from("selection"),
            message: String::from("Select at least one visitor to convert"),
        });
    }

    let mut converted: Vec<PromoteVisitorResponse> = Vec::new();
    let mut failures: Vec<ConversionFailure> = Vec::new();
    for identifier in identifiers {
        match persistence.promote_visitor(identifier) {
            Ok(outcome) => converted.push(promotion_response(outcome)),
            Err(e) => {
                error!(%identifier, error = %e, "Conversion failed");
                failures.push(ConversionFailure {
                    identifier: identifier.clone(),
                    message: translate_persistence_error(e).to_string(),
                });
            }
        }
    }

    let message: String = if failures.is_empty() {
        format!("{} visitor(s) converted to members", converted.len())
    } else {
        format!(
            "{} visitor(s) converted, {} failed",
            converted.len(),
            failures.len()
        )
    };
    info!(
        converted = converted.len(),
        failed = failures.len(),
        "Confirmed conversions"
    );

    Ok(ConfirmConversionsResponse {
        converted,
        failures,
        message,
    })
}

/// Returns a person's attendance history, oldest first.
///
/// # Errors
///
/// Returns an error if the identifier is malformed, unknown, or the
/// database query fails.
pub fn get_attendance_history(
    persistence: &mut Persistence,
    identifier: &str,
) -> Result<AttendanceHistoryResponse, ApiError> {
    let identifier: Identifier = parse_identifier(identifier)?;
    let person: Person = persistence
        .get_person(&identifier)
        .map_err(translate_persistence_error)?
        .ok_or_else(|| ApiError::ResourceNotFound {
            resource_type: String::from("Person"),
            message: format!("No person with identifier {identifier}"),
        })?;
    let records: Vec<AttendanceRecord> = persistence
        .list_attendance(&identifier)
        .map_err(translate_persistence_error)?;

    Ok(AttendanceHistoryResponse {
        identifier,
        status: person.status(),
        records,
    })
}

/// Applies a session event, translating refusals.
///
/// # Errors
///
/// Returns `ApiError::InvalidInput` if the event is not allowed now.
pub fn apply_session_event(
    session: &FormSession,
    event: SessionEvent,
) -> Result<FormSession, ApiError> {
    apply(session, event).map_err(translate_core_error)
}

/// The form outcome a check-in result leaves on the session, if any.
///
/// Internal failures leave the form as it was so it can be resubmitted.
/// A clash on the allocated identifier is one of them, as no form field
/// caused it.
#[must_use]
pub fn submission_outcome(
    result: &Result<CheckInResponse, ApiError>,
) -> Option<SubmissionOutcome> {
    match result {
        Ok(response) => Some(match response.attendance {
            CheckInStatus::CheckedIn => SubmissionOutcome::CheckedIn {
                identifier: response.identifier.clone(),
            },
            CheckInStatus::AlreadyPresent => SubmissionOutcome::AlreadyPresent {
                identifier: response.identifier.clone(),
            },
        }),
        Err(ApiError::ValidationFailed { violations }) => Some(SubmissionOutcome::Rejected {
            violations: violations.clone(),
        }),
        Err(ApiError::DuplicateValue { field, message }) => {
            let form_field: FormField = match field.as_str() {
                "contact" => FormField::Contact,
                "email" => FormField::Email,
                _ => return None,
            };
            Some(SubmissionOutcome::Rejected {
                violations: vec![FieldViolation::new(form_field, message)],
            })
        }
        Err(_) => None,
    }
}

/// Submits a check-in from a session's form.
///
/// # Errors
///
/// Returns `ApiError::InvalidInput` without touching storage if the session
/// cannot submit right now (wrong page, or a finished check-in that was
/// not reset). Check-in failures are reported in `SessionCheckIn::result`.
pub fn submit_check_in(
    persistence: &mut Persistence,
    session: &FormSession,
    request: &CheckInRequest,
    today: Date,
) -> Result<SessionCheckIn, ApiError> {
    session
        .ensure_accepts_submission()
        .map_err(translate_core_error)?;

    let result: Result<CheckInResponse, ApiError> = check_in(persistence, request, today);
    let session: FormSession = match submission_outcome(&result) {
        Some(outcome) => apply_session_event(session, SessionEvent::Submitted(outcome))?,
        None => session.clone(),
    };

    Ok(SessionCheckIn { session, result })
}

/// Converts the visitors selected in a session.
///
/// Selections are cleared once at least one conversion succeeds.
///
/// # Errors
///
/// Returns `ApiError::InvalidInput` if the session is not on the visitor
/// page or nothing is selected.
pub fn confirm_session_conversions(
    persistence: &mut Persistence,
    session: &FormSession,
) -> Result<SessionConversions, ApiError> {
    // A zero-count confirmation checks the page without changing anything.
    apply_session_event(session, SessionEvent::ConversionsConfirmed { converted: 0 })?;

    let selected: Vec<Identifier> = session.selected_visitors();
    let response: ConfirmConversionsResponse = confirm_conversions(persistence, &selected)?;
    let session: FormSession = apply_session_event(
        session,
        SessionEvent::ConversionsConfirmed {
            converted: response.converted.len(),
        },
    )?;

    Ok(SessionConversions { session, response })
}
