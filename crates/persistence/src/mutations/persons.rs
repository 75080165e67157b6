// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::SqliteConnection;
use diesel::prelude::*;
use presence_domain::{Identifier, Person, PersonStatus, format_date};
use tracing::debug;

use crate::data_models::{ContactUpdate, NewPerson};
use crate::diesel_schema::persons;
use crate::error::{PersistenceError, UniqueField};
use crate::queries::{contact_taken, email_taken, identifier_taken, storage_key};

/// Fails with `UniqueViolation` if `contact` or `email` belongs to someone
/// other than `except`.
///
/// # Errors
///
/// Returns `PersistenceError::UniqueViolation` naming the conflicting field,
/// or an error if a lookup fails.
pub fn ensure_contact_details_free(
    conn: &mut SqliteConnection,
    contact: &str,
    email: Option<&str>,
    except: Option<&Identifier>,
) -> Result<(), PersistenceError> {
    if contact_taken(conn, contact, except)? {
        return Err(PersistenceError::UniqueViolation {
            field: UniqueField::Contact,
        });
    }
    if let Some(email) = email
        && email_taken(conn, email, except)?
    {
        return Err(PersistenceError::UniqueViolation {
            field: UniqueField::Email,
        });
    }
    Ok(())
}

/// Inserts a new person.
///
/// # Errors
///
/// Returns `PersistenceError::UniqueViolation` if the identifier, contact or
/// email is already stored, or an error if the insert fails.
pub fn insert_person(conn: &mut SqliteConnection, person: &Person) -> Result<(), PersistenceError> {
    if identifier_taken(conn, person.identifier())? {
        return Err(PersistenceError::UniqueViolation {
            field: UniqueField::Identifier,
        });
    }
    ensure_contact_details_free(conn, &person.contact, person.email.as_deref(), None)?;

    let row: NewPerson = NewPerson {
        identifier: person.identifier().to_string(),
        status: person.status().as_str().to_string(),
        name: person.name.clone(),
        given_names: person.given_names.clone(),
        sex: person.sex.as_str().to_string(),
        birth_date: format_date(person.birth_date)?,
        contact: person.contact.clone(),
        email: person.email.clone(),
        residence: person.residence.clone(),
        first_attendance_date: person.first_attendance_date.map(format_date).transpose()?,
    };

    diesel::insert_into(persons::table)
        .values(&row)
        .execute(conn)?;

    debug!(identifier = %person.identifier(), "Inserted person");
    Ok(())
}

/// Refreshes the contact fields of an existing person.
///
/// A missing `email` keeps the one already stored.
///
/// # Errors
///
/// Returns `PersistenceError::UniqueViolation` if the new contact or email
/// belongs to someone else, or an error if the update fails.
pub fn update_contact_details(
    conn: &mut SqliteConnection,
    identifier: &Identifier,
    contact: &str,
    email: Option<&str>,
    residence: &str,
) -> Result<(), PersistenceError> {
    ensure_contact_details_free(conn, contact, email, Some(identifier))?;

    let key: String = storage_key(conn, identifier)?;
    let changes: ContactUpdate<'_> = ContactUpdate {
        contact,
        email,
        residence,
    };
    diesel::update(persons::table.find(key))
        .set(&changes)
        .execute(conn)?;

    debug!(%identifier, "Updated contact details");
    Ok(())
}

/// Renames a person's identifier and sets the matching status.
///
/// Attendance rows must already have been detached, as they reference the
/// old identifier.
///
/// # Errors
///
/// Returns `PersistenceError::UniqueViolation` if `new` is taken, or an
/// error if the update fails.
pub fn reassign_identifier(
    conn: &mut SqliteConnection,
    old: &Identifier,
    new: &Identifier,
) -> Result<(), PersistenceError> {
    if identifier_taken(conn, new)? {
        return Err(PersistenceError::UniqueViolation {
            field: UniqueField::Identifier,
        });
    }

    let status: PersonStatus = new.status();
    let key: String = storage_key(conn, old)?;
    let updated: usize = diesel::update(persons::table.find(key))
        .set((
            persons::identifier.eq(new.to_string()),
            persons::status.eq(status.as_str()),
        ))
        .execute(conn)?;

    if updated == 0 {
        return Err(PersistenceError::PersonNotFound(old.to_string()));
    }
    Ok(())
}
