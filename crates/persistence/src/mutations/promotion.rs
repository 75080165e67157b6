// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Visitor-to-member promotion.

use diesel::SqliteConnection;
use presence_domain::{AttendanceRecord, Identifier, Person, PersonStatus};
use tracing::info;

use crate::data_models::PromotionOutcome;
use crate::error::PersistenceError;
use crate::mutations::attendance::{delete_attendance_for, insert_attendance_batch};
use crate::mutations::persons::reassign_identifier;
use crate::queries::{allocate_identifier, get_person, list_attendance};

/// Promotes a visitor to member, carrying their attendance history over.
///
/// The history is read, a member identifier is allocated, the old rows are
/// deleted, the person is renamed, and the rows are re-inserted under the
/// new identifier with `wants_to_stay` set and fresh row ids. All of it
/// happens in one immediate transaction: any failure rolls every step back.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `old` - The visitor's current identifier
///
/// # Errors
///
/// Returns, before any write:
/// - `PersistenceError::PersonNotFound` if nobody has `old`
/// - `PersistenceError::NotAVisitor` if the person is already a member
/// - `PersistenceError::NoAttendanceHistory` if there is nothing to carry over
pub fn promote_visitor(
    conn: &mut SqliteConnection,
    old: &Identifier,
) -> Result<PromotionOutcome, PersistenceError> {
    conn.immediate_transaction(|conn| {
        let person: Person =
            get_person(conn, old)?.ok_or_else(|| PersistenceError::PersonNotFound(old.to_string()))?;
        if !person.is_visitor() {
            return Err(PersistenceError::NotAVisitor(old.to_string()));
        }

        let history: Vec<AttendanceRecord> = list_attendance(conn, old)?;
        if history.is_empty() {
            return Err(PersistenceError::NoAttendanceHistory(old.to_string()));
        }

        let new: Identifier = allocate_identifier(conn, PersonStatus::Member)?;

        delete_attendance_for(conn, old)?;
        reassign_identifier(conn, old, &new)?;

        let moved: Vec<AttendanceRecord> = history
            .iter()
            .map(|record| record.reassigned_to(&new))
            .collect();
        let records_moved: usize = insert_attendance_batch(conn, &moved)?;

        info!(
            old_identifier = %old,
            new_identifier = %new,
            records_moved,
            "Promoted visitor to member"
        );

        Ok(PromotionOutcome {
            old_identifier: old.clone(),
            new_identifier: new,
            records_moved,
        })
    })
}
