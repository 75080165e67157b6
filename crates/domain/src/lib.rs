// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Domain types and rules for the attendance check-in system.
//!
//! Everything in this crate is pure: no storage, no clocks. Callers pass
//! "today" explicitly wherever a rule depends on the current date.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod allocation;
pub mod dates;
mod error;
mod types;
mod validation;

#[cfg(test)]
mod tests;

pub use allocation::{fallback_identifier, next_identifier};
pub use dates::{format_date, parse_date};
pub use error::DomainError;
pub use types::{AttendanceRecord, Identifier, Person, PersonDetails, PersonStatus, Sex};
pub use validation::{
    CheckInInput, FieldViolation, FormField, format_phone_number, is_valid_email, is_valid_phone,
    normalize_check_in, title_case, validate_check_in,
};
