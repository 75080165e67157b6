// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Check-in recording.

use diesel::SqliteConnection;
use presence_domain::{AttendanceRecord, Identifier, Person, PersonDetails, PersonStatus};
use time::Date;
use tracing::{debug, info};

use crate::data_models::{AttendanceStatus, CheckInOutcome};
use crate::error::PersistenceError;
use crate::mutations::attendance::insert_attendance;
use crate::mutations::persons::{insert_person, update_contact_details};
use crate::queries::{allocate_identifier, find_person_by_name, has_attendance_on};

/// Records a check-in for `today`.
///
/// An existing person (matched on name and given names) has their contact
/// details refreshed; anyone else is created as a visitor when
/// `first_time` is set and as a member otherwise. Today's attendance row is
/// then written unless one already exists.
///
/// Everything runs in one immediate transaction, so the identifier read by
/// the allocator cannot be taken by a concurrent check-in before the insert.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `details` - Validated, normalized person attributes
/// * `first_time` - Whether the attendee said this is their first visit
/// * `today` - The check-in date
///
/// # Errors
///
/// Returns `PersistenceError::UniqueViolation` if the contact or email
/// belongs to someone else. Nothing is written in that case.
pub fn record_check_in(
    conn: &mut SqliteConnection,
    details: &PersonDetails,
    first_time: bool,
    today: Date,
) -> Result<CheckInOutcome, PersistenceError> {
    conn.immediate_transaction(|conn| {
        let existing: Option<Person> =
            find_person_by_name(conn, &details.name, &details.given_names)?;

        let (identifier, status, person_created): (Identifier, PersonStatus, bool) =
            if let Some(person) = existing {
                update_contact_details(
                    conn,
                    person.identifier(),
                    &details.contact,
                    details.email.as_deref(),
                    &details.residence,
                )?;
                (person.identifier().clone(), person.status(), false)
            } else {
                let status: PersonStatus = if first_time {
                    PersonStatus::Visitor
                } else {
                    PersonStatus::Member
                };
                let identifier: Identifier = allocate_identifier(conn, status)?;
                let first_attendance_date: Option<Date> = first_time.then_some(today);
                let person: Person =
                    Person::from_details(identifier.clone(), details.clone(), first_attendance_date);
                insert_person(conn, &person)?;
                (identifier, status, true)
            };

        let attendance: AttendanceStatus = if has_attendance_on(conn, &identifier, today)? {
            debug!(%identifier, "Already checked in today");
            AttendanceStatus::AlreadyPresent
        } else {
            let record: AttendanceRecord =
                AttendanceRecord::check_in(identifier.clone(), today, first_time);
            let record_id: i64 = insert_attendance(conn, &record)?;
            AttendanceStatus::Recorded { record_id }
        };

        info!(
            %identifier,
            %status,
            person_created,
            already_present = attendance == AttendanceStatus::AlreadyPresent,
            "Recorded check-in"
        );

        Ok(CheckInOutcome {
            identifier,
            status,
            person_created,
            attendance,
        })
    })
}
