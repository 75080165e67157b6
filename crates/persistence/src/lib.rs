// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Persistence layer for the attendance check-in system.
//!
//! Two tables, `persons` and `attendance_records`, stored in `SQLite` through
//! Diesel. The schema is created by embedded migrations when a connection is
//! opened.
//!
//! ## Atomicity
//!
//! Check-in and promotion each run in a single immediate (write-locked)
//! transaction. Identifier allocation therefore cannot race with another
//! writer, and a failed promotion never strands attendance history.
//!
//! ## Testing
//!
//! Tests use [`Persistence::new_in_memory`], which hands out a uniquely
//! named shared in-memory database per call.

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
#![allow(clippy::multiple_crate_versions)]

use diesel::SqliteConnection;
use presence_domain::{AttendanceRecord, Identifier, Person, PersonDetails, PersonStatus};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use time::Date;

// Links the bundled SQLite library used by diesel's sqlite backend.
use libsqlite3_sys as _;

/// Atomic counter for generating unique in-memory database names.
static DB_COUNTER: AtomicU64 = AtomicU64::new(0);

mod backend;
mod data_models;
mod diesel_schema;
mod error;
mod mutations;
mod queries;

#[cfg(test)]
mod tests;

pub use data_models::{AttendanceStatus, CheckInOutcome, PromotionOutcome};
pub use error::{PersistenceError, UniqueField};

/// Persistence adapter for persons and attendance.
pub struct Persistence {
    pub(crate) conn: SqliteConnection,
}

impl Persistence {
    /// Creates a new persistence adapter with an in-memory `SQLite` database.
    ///
    /// Each call receives its own database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn new_in_memory() -> Result<Self, PersistenceError> {
        let db_id: u64 = DB_COUNTER.fetch_add(1, Ordering::SeqCst);
        let shared_memory_url: String = format!("file:memdb_presence_{db_id}?mode=memory&cache=shared");

        let mut conn: SqliteConnection = backend::sqlite::initialize_database(&shared_memory_url)?;
        backend::sqlite::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self { conn })
    }

    /// Creates a new persistence adapter with a file-based `SQLite` database.
    ///
    /// # Arguments
    ///
    /// * `path` - The path to the `SQLite` database file
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn new_with_file<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        let path_str: &str = path.as_ref().to_str().ok_or_else(|| {
            PersistenceError::InitializationError("Invalid database path".to_string())
        })?;

        let mut conn: SqliteConnection = backend::sqlite::initialize_database(path_str)?;
        backend::sqlite::enable_wal_mode(&mut conn)?;
        backend::sqlite::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self { conn })
    }

    /// Creates a persistence adapter from a store URL.
    ///
    /// `:memory:` (or an empty string) opens a private in-memory database;
    /// `sqlite://<path>` and bare paths open a file database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn new_with_url(database_url: &str) -> Result<Self, PersistenceError> {
        let trimmed: &str = database_url.trim();
        if trimmed.is_empty() || trimmed == ":memory:" {
            return Self::new_in_memory();
        }
        let path: &str = trimmed.strip_prefix("sqlite://").unwrap_or(trimmed);
        Self::new_with_file(path)
    }

    /// Verifies that foreign key enforcement is enabled.
    ///
    /// # Errors
    ///
    /// Returns an error if foreign key enforcement is not enabled.
    pub fn verify_foreign_key_enforcement(&mut self) -> Result<(), PersistenceError> {
        backend::sqlite::verify_foreign_key_enforcement(&mut self.conn)
    }

    // ========================================================================
    // Identifiers
    // ========================================================================

    /// Lists every stored identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn list_identifiers(&mut self) -> Result<Vec<String>, PersistenceError> {
        queries::list_identifiers(&mut self.conn)
    }

    /// Computes the next free identifier in a namespace without reserving it.
    ///
    /// # Errors
    ///
    /// Returns an error if the identifiers cannot be read.
    pub fn allocate_identifier(
        &mut self,
        status: PersonStatus,
    ) -> Result<Identifier, PersistenceError> {
        queries::allocate_identifier(&mut self.conn, status)
    }

    // ========================================================================
    // Persons
    // ========================================================================

    /// Looks up a person by normalized family name and given names.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn find_person_by_name(
        &mut self,
        name: &str,
        given_names: &str,
    ) -> Result<Option<Person>, PersistenceError> {
        queries::find_person_by_name(&mut self.conn, name, given_names)
    }

    /// Retrieves a person by identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_person(
        &mut self,
        identifier: &Identifier,
    ) -> Result<Option<Person>, PersistenceError> {
        queries::get_person(&mut self.conn, identifier)
    }

    /// Lists persons with `status`, optionally limited to those whose first
    /// attendance was on `first_attendance_on` or is unknown.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn list_persons(
        &mut self,
        status: PersonStatus,
        first_attendance_on: Option<Date>,
    ) -> Result<Vec<Person>, PersistenceError> {
        queries::list_persons(&mut self.conn, status, first_attendance_on)
    }

    // ========================================================================
    // Attendance
    // ========================================================================

    /// Lists a person's attendance records, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn list_attendance(
        &mut self,
        identifier: &Identifier,
    ) -> Result<Vec<AttendanceRecord>, PersistenceError> {
        queries::list_attendance(&mut self.conn, identifier)
    }

    /// Whether the person has an attendance record on `date`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn has_attendance_on(
        &mut self,
        identifier: &Identifier,
        date: Date,
    ) -> Result<bool, PersistenceError> {
        queries::has_attendance_on(&mut self.conn, identifier, date)
    }

    /// Counts a person's attendance records.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn count_attendance(&mut self, identifier: &Identifier) -> Result<i64, PersistenceError> {
        queries::count_attendance(&mut self.conn, identifier)
    }

    // ========================================================================
    // Check-in & Promotion
    // ========================================================================

    /// Records a check-in atomically: upserts the person by name, then
    /// writes today's attendance unless it already exists.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::UniqueViolation` on a contact or email
    /// conflict, or an error if the transaction fails.
    pub fn record_check_in(
        &mut self,
        details: &PersonDetails,
        first_time: bool,
        today: Date,
    ) -> Result<CheckInOutcome, PersistenceError> {
        mutations::record_check_in(&mut self.conn, details, first_time, today)
    }

    /// Promotes a visitor to member atomically.
    ///
    /// # Errors
    ///
    /// Returns `PersonNotFound`, `NotAVisitor` or `NoAttendanceHistory`
    /// without writing anything, or an error if the transaction fails.
    pub fn promote_visitor(
        &mut self,
        identifier: &Identifier,
    ) -> Result<PromotionOutcome, PersistenceError> {
        mutations::promote_visitor(&mut self.conn, identifier)
    }
}
