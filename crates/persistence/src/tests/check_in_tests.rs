// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use presence_domain::{AttendanceRecord, Person, PersonDetails, PersonStatus};

use crate::tests::{
    check_in_visitor, create_test_details, create_test_next_sunday, create_test_sunday,
    fail_attendance_inserts_when,
};
use crate::{AttendanceStatus, CheckInOutcome, Persistence, PersistenceError, UniqueField};

#[test]
fn test_first_time_check_in_creates_visitor() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();

    let outcome: CheckInOutcome =
        check_in_visitor(&mut persistence, "KOUASSI", "+2250102030405", create_test_sunday());

    assert_eq!(outcome.identifier.to_string(), "TEMP001");
    assert_eq!(outcome.status, PersonStatus::Visitor);
    assert!(outcome.person_created);

    let person: Person = persistence.get_person(&outcome.identifier).unwrap().unwrap();
    assert_eq!(person.first_attendance_date, Some(create_test_sunday()));

    let history: Vec<AttendanceRecord> = persistence.list_attendance(&outcome.identifier).unwrap();
    assert_eq!(history.len(), 1);
    assert!(history[0].is_new);
    assert!(history[0].is_present);
    assert!(!history[0].wants_to_stay);
}

#[test]
fn test_returning_attendee_without_record_becomes_member_directly() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();

    let outcome: CheckInOutcome = persistence
        .record_check_in(
            &create_test_details("KOUASSI", "+2250102030405"),
            false,
            create_test_sunday(),
        )
        .unwrap();

    assert_eq!(outcome.identifier.to_string(), "MEMBER00001");
    assert_eq!(outcome.status, PersonStatus::Member);
    let person: Person = persistence.get_person(&outcome.identifier).unwrap().unwrap();
    assert_eq!(person.first_attendance_date, None);
}

#[test]
fn test_same_day_check_in_is_idempotent() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let details: PersonDetails = create_test_details("KOUASSI", "+2250102030405");

    let first: CheckInOutcome = persistence
        .record_check_in(&details, true, create_test_sunday())
        .unwrap();
    let second: CheckInOutcome = persistence
        .record_check_in(&details, true, create_test_sunday())
        .unwrap();

    assert!(matches!(first.attendance, AttendanceStatus::Recorded { .. }));
    assert_eq!(second.attendance, AttendanceStatus::AlreadyPresent);
    assert_eq!(second.identifier, first.identifier);
    assert!(!second.person_created);
    assert_eq!(persistence.count_attendance(&first.identifier).unwrap(), 1);
}

#[test]
fn test_next_week_check_in_adds_a_record() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let details: PersonDetails = create_test_details("KOUASSI", "+2250102030405");

    let first: CheckInOutcome = persistence
        .record_check_in(&details, true, create_test_sunday())
        .unwrap();
    let second: CheckInOutcome = persistence
        .record_check_in(&details, false, create_test_next_sunday())
        .unwrap();

    assert_eq!(second.identifier, first.identifier);
    assert_eq!(second.status, PersonStatus::Visitor);
    assert!(persistence.has_attendance_on(&first.identifier, create_test_next_sunday()).unwrap());
    assert_eq!(persistence.count_attendance(&first.identifier).unwrap(), 2);
}

#[test]
fn test_returning_person_gets_contact_details_refreshed() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let first: CheckInOutcome =
        check_in_visitor(&mut persistence, "KOUASSI", "+2250102030405", create_test_sunday());

    let updated: PersonDetails = PersonDetails {
        contact: String::from("+2250700000000"),
        email: Some(String::from("jp@example.ci")),
        residence: String::from("Yopougon"),
        ..create_test_details("KOUASSI", "+2250102030405")
    };
    persistence
        .record_check_in(&updated, false, create_test_next_sunday())
        .unwrap();

    let person: Person = persistence.get_person(&first.identifier).unwrap().unwrap();
    assert_eq!(person.contact, "+2250700000000");
    assert_eq!(person.email.as_deref(), Some("jp@example.ci"));
    assert_eq!(person.residence, "Yopougon");
    assert_eq!(person.first_attendance_date, Some(create_test_sunday()));
}

#[test]
fn test_blank_email_on_return_keeps_stored_email() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let with_email: PersonDetails = PersonDetails {
        email: Some(String::from("jp@example.ci")),
        ..create_test_details("KOUASSI", "+2250102030405")
    };
    let first: CheckInOutcome = persistence
        .record_check_in(&with_email, true, create_test_sunday())
        .unwrap();

    let without_email: PersonDetails = PersonDetails {
        residence: String::from("Yopougon"),
        ..create_test_details("KOUASSI", "+2250102030405")
    };
    persistence
        .record_check_in(&without_email, false, create_test_next_sunday())
        .unwrap();

    let person: Person = persistence.get_person(&first.identifier).unwrap().unwrap();
    assert_eq!(person.email.as_deref(), Some("jp@example.ci"));
    assert_eq!(person.residence, "Yopougon");
}

#[test]
fn test_failed_attendance_insert_rolls_back_new_person() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    fail_attendance_inserts_when(&mut persistence, "1");

    let result: Result<CheckInOutcome, PersistenceError> = persistence.record_check_in(
        &create_test_details("KOUASSI", "+2250102030405"),
        true,
        create_test_sunday(),
    );

    assert!(matches!(result, Err(PersistenceError::DatabaseError(_))));
    assert!(persistence.list_identifiers().unwrap().is_empty());
    assert!(
        persistence
            .find_person_by_name("KOUASSI", "Jean-Paul")
            .unwrap()
            .is_none()
    );
}

#[test]
fn test_failed_attendance_insert_rolls_back_contact_refresh() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let first: CheckInOutcome =
        check_in_visitor(&mut persistence, "KOUASSI", "+2250102030405", create_test_sunday());
    fail_attendance_inserts_when(&mut persistence, "1");

    let moved: PersonDetails = PersonDetails {
        contact: String::from("+2250700000000"),
        ..create_test_details("KOUASSI", "+2250102030405")
    };
    let result: Result<CheckInOutcome, PersistenceError> =
        persistence.record_check_in(&moved, false, create_test_next_sunday());

    assert!(result.is_err());
    let person: Person = persistence.get_person(&first.identifier).unwrap().unwrap();
    assert_eq!(person.contact, "+2250102030405");
    assert_eq!(persistence.count_attendance(&first.identifier).unwrap(), 1);
}

#[test]
fn test_duplicate_contact_is_reported_and_nothing_is_written() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    check_in_visitor(&mut persistence, "KOUASSI", "+2250102030405", create_test_sunday());

    let result: Result<CheckInOutcome, PersistenceError> = persistence.record_check_in(
        &create_test_details("YAO", "+2250102030405"),
        true,
        create_test_sunday(),
    );

    assert_eq!(
        result,
        Err(PersistenceError::UniqueViolation {
            field: UniqueField::Contact
        })
    );
    assert_eq!(persistence.list_identifiers().unwrap(), vec!["TEMP001"]);
}

#[test]
fn test_duplicate_email_is_reported() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let with_email = |name: &str, contact: &str| PersonDetails {
        email: Some(String::from("shared@example.ci")),
        ..create_test_details(name, contact)
    };
    persistence
        .record_check_in(&with_email("KOUASSI", "+2250102030405"), true, create_test_sunday())
        .unwrap();

    let result: Result<CheckInOutcome, PersistenceError> = persistence.record_check_in(
        &with_email("YAO", "+2250102030406"),
        true,
        create_test_sunday(),
    );

    assert_eq!(
        result,
        Err(PersistenceError::UniqueViolation {
            field: UniqueField::Email
        })
    );
}

#[test]
fn test_returning_person_cannot_take_someone_elses_contact() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    check_in_visitor(&mut persistence, "KOUASSI", "+2250102030405", create_test_sunday());
    let yao: CheckInOutcome =
        check_in_visitor(&mut persistence, "YAO", "+2250102030406", create_test_sunday());

    let result: Result<CheckInOutcome, PersistenceError> = persistence.record_check_in(
        &create_test_details("YAO", "+2250102030405"),
        false,
        create_test_next_sunday(),
    );

    assert!(matches!(
        result,
        Err(PersistenceError::UniqueViolation {
            field: UniqueField::Contact
        })
    ));
    assert!(!persistence.has_attendance_on(&yao.identifier, create_test_next_sunday()).unwrap());
}

#[test]
fn test_missing_email_does_not_conflict() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();

    check_in_visitor(&mut persistence, "KOUASSI", "+2250102030405", create_test_sunday());
    check_in_visitor(&mut persistence, "YAO", "+2250102030406", create_test_sunday());

    assert_eq!(persistence.list_identifiers().unwrap().len(), 2);
}
