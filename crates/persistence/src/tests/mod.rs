// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]

mod check_in_tests;

use diesel::RunQueryDsl;
use presence_domain::{Identifier, PersonDetails, Sex, parse_date};
use time::Date;

use crate::{AttendanceStatus, CheckInOutcome, Persistence};

/// 2024-01-07, a Sunday.
pub fn create_test_sunday() -> Date {
    parse_date("2024-01-07").expect("Valid test date")
}

/// The Sunday after [`create_test_sunday`].
pub fn create_test_next_sunday() -> Date {
    parse_date("2024-01-14").expect("Valid test date")
}

pub fn create_test_details(name: &str, contact: &str) -> PersonDetails {
    PersonDetails {
        name: name.to_string(),
        given_names: String::from("Jean-Paul"),
        sex: Sex::Male,
        birth_date: parse_date("1990-05-17").expect("Valid test date"),
        contact: contact.to_string(),
        email: None,
        residence: String::from("Cocody"),
    }
}

pub fn create_test_identifier(raw: &str) -> Identifier {
    Identifier::parse(raw).expect("Valid test identifier")
}

/// Checks in a first-time visitor and returns the stored outcome.
pub fn check_in_visitor(
    persistence: &mut Persistence,
    name: &str,
    contact: &str,
    date: Date,
) -> CheckInOutcome {
    let outcome: CheckInOutcome = persistence
        .record_check_in(&create_test_details(name, contact), true, date)
        .expect("Check-in should succeed");
    assert!(matches!(
        outcome.attendance,
        AttendanceStatus::Recorded { .. }
    ));
    outcome
}

/// Makes every attendance insert matching `condition` abort, so a write
/// fails partway through a transaction.
pub fn fail_attendance_inserts_when(persistence: &mut Persistence, condition: &str) {
    diesel::sql_query(format!(
        "CREATE TRIGGER fail_attendance_insert BEFORE INSERT ON attendance_records \
         WHEN {condition} BEGIN SELECT RAISE(ABORT, 'attendance insert refused'); END"
    ))
    .execute(&mut persistence.conn)
    .expect("Trigger should be created");
}
