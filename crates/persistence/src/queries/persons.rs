// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Person queries.

use diesel::prelude::*;
use diesel::sqlite::Sqlite;
use diesel::{SqliteConnection, dsl::count_star};
use presence_domain::{
    Identifier, Person, PersonDetails, PersonStatus, Sex, format_date, next_identifier,
    parse_date,
};
use std::str::FromStr;
use time::Date;
use tracing::{debug, warn};

use crate::diesel_schema::persons;
use crate::error::PersistenceError;

/// Diesel Queryable struct for person rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = persons)]
#[diesel(check_for_backend(Sqlite))]
struct PersonRow {
    identifier: String,
    status: String,
    name: String,
    given_names: String,
    sex: String,
    birth_date: String,
    contact: String,
    email: Option<String>,
    residence: String,
    first_attendance_date: Option<String>,
}

impl TryFrom<PersonRow> for Person {
    type Error = PersistenceError;

    fn try_from(row: PersonRow) -> Result<Self, Self::Error> {
        let identifier: Identifier = Identifier::parse(&row.identifier)?;
        let status: PersonStatus = PersonStatus::from_str(&row.status)?;
        let details: PersonDetails = PersonDetails {
            name: row.name,
            given_names: row.given_names,
            sex: Sex::from_str(&row.sex)?,
            birth_date: parse_date(&row.birth_date)?,
            contact: row.contact,
            email: row.email,
            residence: row.residence,
        };
        let first_attendance_date: Option<Date> = row
            .first_attendance_date
            .as_deref()
            .map(parse_date)
            .transpose()?;

        Ok(Self::with_status(
            identifier,
            status,
            details,
            first_attendance_date,
        )?)
    }
}

/// Lists every stored identifier, in both namespaces.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_identifiers(conn: &mut SqliteConnection) -> Result<Vec<String>, PersistenceError> {
    Ok(persons::table.select(persons::identifier).load(conn)?)
}

/// Computes the next free identifier in `status`'s namespace.
///
/// Reads all identifiers and takes one past the highest suffix. Call this
/// inside a write transaction when the result is about to be inserted.
///
/// # Errors
///
/// Returns an error if the identifiers cannot be read.
pub fn allocate_identifier(
    conn: &mut SqliteConnection,
    status: PersonStatus,
) -> Result<Identifier, PersistenceError> {
    let existing: Vec<String> = list_identifiers(conn)?;
    let identifier: Identifier = next_identifier(status, existing.iter().map(String::as_str));
    debug!(%identifier, existing = existing.len(), "Allocated identifier");
    Ok(identifier)
}

/// Looks up a person by family name and given names.
///
/// Names are compared exactly as stored, so callers pass the normalized
/// forms produced by check-in validation.
///
/// # Errors
///
/// Returns an error if the database query fails or a row is invalid.
/// Returns `Ok(None)` if nobody matches.
pub fn find_person_by_name(
    conn: &mut SqliteConnection,
    name: &str,
    given_names: &str,
) -> Result<Option<Person>, PersistenceError> {
    let rows: Vec<PersonRow> = persons::table
        .filter(persons::name.eq(name))
        .filter(persons::given_names.eq(given_names))
        .order(persons::identifier.asc())
        .select(PersonRow::as_select())
        .load(conn)?;

    if rows.len() > 1 {
        warn!(
            name,
            given_names,
            matches = rows.len(),
            "Several persons share this name; using the first"
        );
    }

    rows.into_iter().next().map(Person::try_from).transpose()
}

/// Retrieves a person by identifier.
///
/// # Errors
///
/// Returns an error if the database query fails or the row is invalid.
/// Returns `Ok(None)` if the person does not exist.
pub fn get_person(
    conn: &mut SqliteConnection,
    identifier: &Identifier,
) -> Result<Option<Person>, PersistenceError> {
    let Some(key) = stored_identifier(conn, identifier)? else {
        return Ok(None);
    };

    let result: Result<PersonRow, diesel::result::Error> = persons::table
        .find(key)
        .select(PersonRow::as_select())
        .first(conn);

    match result {
        Ok(row) => Ok(Some(Person::try_from(row)?)),
        Err(diesel::result::Error::NotFound) => Ok(None),
        Err(e) => Err(PersistenceError::from(e)),
    }
}

/// Finds the stored text of `identifier`.
///
/// Rows written here always carry the canonical width, but rows loaded from
/// elsewhere may not (`MEMBER001` for `MEMBER00001`). Those are matched on
/// their parsed value.
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if no stored identifier matches.
pub fn stored_identifier(
    conn: &mut SqliteConnection,
    identifier: &Identifier,
) -> Result<Option<String>, PersistenceError> {
    let canonical: String = identifier.to_string();
    let exact: i64 = persons::table
        .filter(persons::identifier.eq(canonical.as_str()))
        .select(count_star())
        .first(conn)?;
    if exact > 0 {
        return Ok(Some(canonical));
    }

    let candidates: Vec<String> = persons::table
        .filter(persons::identifier.like(format!("{}%", identifier.status().prefix())))
        .select(persons::identifier)
        .load(conn)?;
    let found: Option<String> = candidates
        .into_iter()
        .find(|stored| Identifier::parse(stored).is_ok_and(|parsed| parsed == *identifier));
    if let Some(stored) = &found {
        debug!(%identifier, stored = %stored, "Matched non-canonical identifier");
    }
    Ok(found)
}

/// The text to filter rows of `identifier` on: the stored form when the
/// person exists, the canonical form otherwise.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn storage_key(
    conn: &mut SqliteConnection,
    identifier: &Identifier,
) -> Result<String, PersistenceError> {
    Ok(stored_identifier(conn, identifier)?.unwrap_or_else(|| identifier.to_string()))
}

/// Lists persons with the given status, ordered by identifier.
///
/// With `first_attendance_on`, only persons whose first attendance date is
/// that day or unknown are kept.
///
/// # Errors
///
/// Returns an error if the database query fails or a row is invalid.
pub fn list_persons(
    conn: &mut SqliteConnection,
    status: PersonStatus,
    first_attendance_on: Option<Date>,
) -> Result<Vec<Person>, PersistenceError> {
    let mut query = persons::table
        .filter(persons::status.eq(status.as_str()))
        .select(PersonRow::as_select())
        .into_boxed();

    if let Some(date) = first_attendance_on {
        let date_text: String = format_date(date)?;
        query = query.filter(
            persons::first_attendance_date
                .eq(date_text)
                .or(persons::first_attendance_date.is_null()),
        );
    }

    let rows: Vec<PersonRow> = query.load(conn)?;
    let mut people: Vec<Person> = rows
        .into_iter()
        .map(Person::try_from)
        .collect::<Result<_, _>>()?;
    people.sort_by(|a, b| a.identifier().cmp(b.identifier()));
    Ok(people)
}

/// Whether `identifier` is already stored, at any width.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn identifier_taken(
    conn: &mut SqliteConnection,
    identifier: &Identifier,
) -> Result<bool, PersistenceError> {
    Ok(stored_identifier(conn, identifier)?.is_some())
}

/// Whether another person already uses `contact`.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn contact_taken(
    conn: &mut SqliteConnection,
    contact: &str,
    except: Option<&Identifier>,
) -> Result<bool, PersistenceError> {
    let mut query = persons::table
        .filter(persons::contact.eq(contact))
        .select(count_star())
        .into_boxed();
    if let Some(identifier) = except {
        query = query.filter(persons::identifier.ne(storage_key(conn, identifier)?));
    }
    let count: i64 = query.first(conn)?;
    Ok(count > 0)
}

/// Whether another person already uses `email`.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn email_taken(
    conn: &mut SqliteConnection,
    email: &str,
    except: Option<&Identifier>,
) -> Result<bool, PersistenceError> {
    let mut query = persons::table
        .filter(persons::email.eq(email))
        .select(count_star())
        .into_boxed();
    if let Some(identifier) = except {
        query = query.filter(persons::identifier.ne(storage_key(conn, identifier)?));
    }
    let count: i64 = query.first(conn)?;
    Ok(count > 0)
}
