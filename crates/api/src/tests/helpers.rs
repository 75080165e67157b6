// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Test helper functions and fixtures.

use presence_domain::{Identifier, parse_date};
use presence_persistence::Persistence;
use time::Date;

use crate::{CheckInRequest, CheckInResponse, check_in};

pub fn create_test_persistence() -> Persistence {
    Persistence::new_in_memory().expect("Failed to create in-memory persistence")
}

/// 2024-01-07, a Sunday.
pub fn create_test_sunday() -> Date {
    parse_date("2024-01-07").expect("Valid test date")
}

/// The Sunday after [`create_test_sunday`].
pub fn create_test_next_sunday() -> Date {
    parse_date("2024-01-14").expect("Valid test date")
}

pub fn create_test_identifier(raw: &str) -> Identifier {
    Identifier::parse(raw).expect("Valid test identifier")
}

/// A form as typed at the door: lower-case, local phone number.
pub fn create_test_request(name: &str, contact: &str, first_time: bool) -> CheckInRequest {
    CheckInRequest {
        name: name.to_string(),
        given_names: String::from("marie claire"),
        sex: String::from("Féminin"),
        birth_date: Some(String::from("1988-03-21")),
        contact: contact.to_string(),
        email: None,
        residence: String::from("yopougon"),
        first_time,
    }
}

/// Checks in through the API and returns the response.
pub fn check_in_ok(
    persistence: &mut Persistence,
    name: &str,
    contact: &str,
    first_time: bool,
    today: Date,
) -> CheckInResponse {
    check_in(
        persistence,
        &create_test_request(name, contact, first_time),
        today,
    )
    .expect("Check-in should succeed")
}
