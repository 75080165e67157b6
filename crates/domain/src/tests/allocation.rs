// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{Identifier, PersonStatus, fallback_identifier, next_identifier};

#[test]
fn test_next_visitor_identifier_follows_existing() {
    let existing: Vec<&str> = vec!["TEMP001", "TEMP002"];

    let next: Identifier = next_identifier(PersonStatus::Visitor, existing);

    assert_eq!(next.to_string(), "TEMP003");
}

#[test]
fn test_first_member_identifier_when_none_exist() {
    let existing: Vec<&str> = vec!["TEMP001", "TEMP002", "TEMP003"];

    let next: Identifier = next_identifier(PersonStatus::Member, existing);

    assert_eq!(next.to_string(), "MEMBER00001");
}

#[test]
fn test_allocation_skips_gaps_instead_of_counting() {
    // TEMP002 was promoted away; counting would reissue TEMP003.
    let existing: Vec<&str> = vec!["TEMP001", "TEMP003", "MEMBER00001"];

    let next: Identifier = next_identifier(PersonStatus::Visitor, existing);

    assert_eq!(next.to_string(), "TEMP004");
}

#[test]
fn test_allocation_reads_historical_widths() {
    let existing: Vec<&str> = vec!["MEMBER001", "MEMBER000007", "MEMBER00003"];

    let next: Identifier = next_identifier(PersonStatus::Member, existing);

    assert_eq!(next.to_string(), "MEMBER00008");
}

#[test]
fn test_allocation_ignores_malformed_identifiers() {
    let existing: Vec<&str> = vec!["TEMP", "TEMPXYZ", "temp009", "", "TEMP002"];

    let next: Identifier = next_identifier(PersonStatus::Visitor, existing);

    assert_eq!(next.to_string(), "TEMP003");
}

#[test]
fn test_allocation_never_returns_an_existing_identifier() {
    let existing: Vec<String> = (1..=250)
        .filter(|n| n % 7 != 0)
        .map(|n| Identifier::new(PersonStatus::Visitor, n).to_string())
        .collect();

    let next: Identifier =
        next_identifier(PersonStatus::Visitor, existing.iter().map(String::as_str));

    assert!(!existing.contains(&next.to_string()));
    assert_eq!(next.number(), 251);
}

#[test]
fn test_identifier_wider_than_padding_is_printed_in_full() {
    let existing: Vec<&str> = vec!["TEMP999"];

    let next: Identifier = next_identifier(PersonStatus::Visitor, existing);

    assert_eq!(next.to_string(), "TEMP1000");
}

#[test]
fn test_fallback_identifiers_are_first_in_sequence() {
    assert_eq!(fallback_identifier(PersonStatus::Visitor).to_string(), "TEMP001");
    assert_eq!(
        fallback_identifier(PersonStatus::Member).to_string(),
        "MEMBER00001"
    );
}
