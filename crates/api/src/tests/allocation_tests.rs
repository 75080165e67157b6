// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use presence_domain::PersonStatus;
use presence_persistence::PersistenceError;

use super::helpers::{
    check_in_ok, create_test_identifier, create_test_persistence, create_test_sunday,
};
use crate::handlers::resolve_allocation;
use crate::{IdentifierAllocation, allocate_identifier};

#[test]
fn test_allocate_in_empty_database() {
    let mut persistence = create_test_persistence();

    let visitor: IdentifierAllocation =
        allocate_identifier(&mut persistence, PersonStatus::Visitor);
    let member: IdentifierAllocation = allocate_identifier(&mut persistence, PersonStatus::Member);

    assert_eq!(visitor.identifier.to_string(), "TEMP001");
    assert!(!visitor.fallback_used);
    assert_eq!(visitor.error, None);
    assert_eq!(member.identifier.to_string(), "MEMBER00001");
}

#[test]
fn test_allocate_does_not_reserve() {
    let mut persistence = create_test_persistence();

    let first: IdentifierAllocation = allocate_identifier(&mut persistence, PersonStatus::Visitor);
    let second: IdentifierAllocation =
        allocate_identifier(&mut persistence, PersonStatus::Visitor);

    assert_eq!(first.identifier, second.identifier);
}

#[test]
fn test_allocate_after_check_ins() {
    let mut persistence = create_test_persistence();
    check_in_ok(
        &mut persistence,
        "kouassi",
        "0701020304",
        true,
        create_test_sunday(),
    );
    check_in_ok(
        &mut persistence,
        "yao",
        "0505050505",
        true,
        create_test_sunday(),
    );

    let allocation: IdentifierAllocation =
        allocate_identifier(&mut persistence, PersonStatus::Visitor);

    assert_eq!(allocation.identifier, create_test_identifier("TEMP003"));
}

#[test]
fn test_storage_failure_falls_back_to_first_identifier() {
    let allocation: IdentifierAllocation = resolve_allocation(
        PersonStatus::Member,
        Err(PersistenceError::QueryFailed(String::from("disk I/O error"))),
    );

    assert!(allocation.fallback_used);
    assert_eq!(allocation.identifier.to_string(), "MEMBER00001");
    assert_eq!(
        allocation.error.as_deref(),
        Some("Error generating identifier: Query failed: disk I/O error")
    );
}
