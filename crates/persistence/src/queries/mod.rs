// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Read-only queries.
//!
//! - `persons` — person lookups, listings and identifier allocation
//! - `attendance` — attendance history lookups
//!
//! Every function takes a plain connection so the mutations can call them
//! inside their own transactions.

pub mod attendance;
pub mod persons;

pub use attendance::{count_attendance, has_attendance_on, list_attendance};
pub use persons::{
    allocate_identifier, contact_taken, email_taken, find_person_by_name, get_person,
    identifier_taken, list_identifiers, list_persons, storage_key,
};
