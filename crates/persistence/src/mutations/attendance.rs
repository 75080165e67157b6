// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::SqliteConnection;
use diesel::prelude::*;
use presence_domain::{AttendanceRecord, Identifier, format_date};

use crate::backend::sqlite::get_last_insert_rowid;
use crate::data_models::NewAttendanceRecord;
use crate::diesel_schema::attendance_records;
use crate::error::PersistenceError;
use crate::queries::storage_key;

fn to_row(
    record: &AttendanceRecord,
    person_identifier: String,
) -> Result<NewAttendanceRecord, PersistenceError> {
    Ok(NewAttendanceRecord {
        person_identifier,
        attendance_date: format_date(record.date)?,
        is_new: i32::from(record.is_new),
        is_present: i32::from(record.is_present),
        wants_to_stay: i32::from(record.wants_to_stay),
    })
}

/// Inserts one attendance record and returns its row id.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn insert_attendance(
    conn: &mut SqliteConnection,
    record: &AttendanceRecord,
) -> Result<i64, PersistenceError> {
    let key: String = storage_key(conn, &record.person_identifier)?;
    diesel::insert_into(attendance_records::table)
        .values(&to_row(record, key)?)
        .execute(conn)?;
    get_last_insert_rowid(conn)
}

/// Inserts several attendance records with fresh row ids.
///
/// The records must reference canonical identifiers, as written by
/// promotion.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn insert_attendance_batch(
    conn: &mut SqliteConnection,
    records: &[AttendanceRecord],
) -> Result<usize, PersistenceError> {
    let rows: Vec<NewAttendanceRecord> = records
        .iter()
        .map(|record| to_row(record, record.person_identifier.to_string()))
        .collect::<Result<_, _>>()?;
    Ok(diesel::insert_into(attendance_records::table)
        .values(&rows)
        .execute(conn)?)
}

/// Deletes every attendance record of a person.
///
/// # Errors
///
/// Returns an error if the delete fails.
pub fn delete_attendance_for(
    conn: &mut SqliteConnection,
    identifier: &Identifier,
) -> Result<usize, PersistenceError> {
    let key: String = storage_key(conn, identifier)?;
    Ok(diesel::delete(
        attendance_records::table.filter(attendance_records::person_identifier.eq(key)),
    )
    .execute(conn)?)
}
