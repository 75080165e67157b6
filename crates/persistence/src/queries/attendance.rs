// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Attendance history queries.

use diesel::SqliteConnection;
use diesel::dsl::count_star;
use diesel::prelude::*;
use diesel::sqlite::Sqlite;
use presence_domain::{AttendanceRecord, Identifier, format_date, parse_date};
use time::Date;
use tracing::debug;

use crate::diesel_schema::attendance_records;
use crate::error::PersistenceError;
use crate::queries::persons::storage_key;

/// Diesel Queryable struct for attendance rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = attendance_records)]
#[diesel(check_for_backend(Sqlite))]
struct AttendanceRow {
    person_identifier: String,
    attendance_date: String,
    is_new: i32,
    is_present: i32,
    wants_to_stay: i32,
}

impl TryFrom<AttendanceRow> for AttendanceRecord {
    type Error = PersistenceError;

    fn try_from(row: AttendanceRow) -> Result<Self, Self::Error> {
        Ok(Self {
            person_identifier: Identifier::parse(&row.person_identifier)?,
            date: parse_date(&row.attendance_date)?,
            is_new: row.is_new != 0,
            is_present: row.is_present != 0,
            wants_to_stay: row.wants_to_stay != 0,
        })
    }
}

/// Lists a person's attendance records, oldest first.
///
/// # Errors
///
/// Returns an error if the database query fails or a row is invalid.
pub fn list_attendance(
    conn: &mut SqliteConnection,
    identifier: &Identifier,
) -> Result<Vec<AttendanceRecord>, PersistenceError> {
    debug!(%identifier, "Loading attendance history");

    let key: String = storage_key(conn, identifier)?;
    let rows: Vec<AttendanceRow> = attendance_records::table
        .filter(attendance_records::person_identifier.eq(key))
        .order(attendance_records::attendance_date.asc())
        .select(AttendanceRow::as_select())
        .load(conn)?;
    rows.into_iter()
        .map(AttendanceRecord::try_from)
        .collect()
}

/// Whether the person already has an attendance row for `date`.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn has_attendance_on(
    conn: &mut SqliteConnection,
    identifier: &Identifier,
    date: Date,
) -> Result<bool, PersistenceError> {
    let key: String = storage_key(conn, identifier)?;
    let count: i64 = attendance_records::table
        .filter(attendance_records::person_identifier.eq(key))
        .filter(attendance_records::attendance_date.eq(format_date(date)?))
        .select(count_star())
        .first(conn)?;
    Ok(count > 0)
}

/// Counts a person's attendance rows.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn count_attendance(
    conn: &mut SqliteConnection,
    identifier: &Identifier,
) -> Result<i64, PersistenceError> {
    let key: String = storage_key(conn, identifier)?;
    Ok(attendance_records::table
        .filter(attendance_records::person_identifier.eq(key))
        .select(count_star())
        .first(conn)?)
}
