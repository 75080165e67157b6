// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::prelude::*;
use presence_domain::{Identifier, PersonStatus};

use crate::diesel_schema::{attendance_records, persons};

/// What happened to today's attendance during a check-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttendanceStatus {
    /// A new attendance row was written.
    Recorded {
        /// The storage-assigned row id.
        record_id: i64,
    },
    /// The person already had a row for today; nothing was written.
    AlreadyPresent,
}

/// Result of a check-in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckInOutcome {
    pub identifier: Identifier,
    pub status: PersonStatus,
    /// `true` if the person did not exist before this check-in.
    pub person_created: bool,
    pub attendance: AttendanceStatus,
}

/// Result of promoting a visitor to member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromotionOutcome {
    pub old_identifier: Identifier,
    pub new_identifier: Identifier,
    /// Number of attendance records relinked to the new identifier.
    pub records_moved: usize,
}

/// Insertable person row.
#[derive(Insertable)]
#[diesel(table_name = persons)]
pub struct NewPerson {
    pub identifier: String,
    pub status: String,
    pub name: String,
    pub given_names: String,
    pub sex: String,
    pub birth_date: String,
    pub contact: String,
    pub email: Option<String>,
    pub residence: String,
    pub first_attendance_date: Option<String>,
}

/// Insertable attendance row. `record_id` is left to the database.
#[derive(Insertable)]
#[diesel(table_name = attendance_records)]
pub struct NewAttendanceRecord {
    pub person_identifier: String,
    pub attendance_date: String,
    pub is_new: i32,
    pub is_present: i32,
    pub wants_to_stay: i32,
}

/// Contact fields refreshed on a returning check-in. A `None` email leaves
/// the stored one untouched.
#[derive(AsChangeset)]
#[diesel(table_name = persons)]
pub struct ContactUpdate<'a> {
    pub contact: &'a str,
    pub email: Option<&'a str>,
    pub residence: &'a str,
}
