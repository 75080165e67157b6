// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use time::Date;

/// Whether an attendee is a transient visitor or a permanent member.
///
/// The status also selects the identifier namespace: visitors carry
/// `TEMP###` identifiers, members carry `MEMBER#####`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PersonStatus {
    /// First-time or non-member attendee.
    Visitor,
    /// Attendee with permanent status.
    Member,
}

impl PersonStatus {
    /// Converts this status to its stored string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Visitor => "VISITOR",
            Self::Member => "MEMBER",
        }
    }

    /// The identifier prefix for this namespace.
    #[must_use]
    pub const fn prefix(&self) -> &'static str {
        match self {
            Self::Visitor => "TEMP",
            Self::Member => "MEMBER",
        }
    }

    /// The zero-padded width of the numeric suffix.
    #[must_use]
    pub const fn width(&self) -> usize {
        match self {
            Self::Visitor => 3,
            Self::Member => 5,
        }
    }
}

impl FromStr for PersonStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "VISITOR" => Ok(Self::Visitor),
            "MEMBER" => Ok(Self::Member),
            _ => Err(DomainError::InvalidStatus(s.to_string())),
        }
    }
}

impl std::fmt::Display for PersonStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A human-readable person identifier such as `TEMP003` or `MEMBER00002`.
///
/// The namespace and the numeric suffix are kept separately so that
/// historical widths (`MEMBER001`, `MEMBER000001`) compare by number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Identifier {
    status: PersonStatus,
    number: u32,
}

impl Identifier {
    /// Creates an identifier in the given namespace.
    #[must_use]
    pub const fn new(status: PersonStatus, number: u32) -> Self {
        Self { status, number }
    }

    /// Parses `<prefix><digits>`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidIdentifier` if the prefix is unknown or
    /// the suffix is empty, non-numeric, or out of range.
    pub fn parse(value: &str) -> Result<Self, DomainError> {
        for status in [PersonStatus::Member, PersonStatus::Visitor] {
            let Some(digits) = value.strip_prefix(status.prefix()) else {
                continue;
            };
            if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                break;
            }
            return digits
                .parse::<u32>()
                .map(|number| Self::new(status, number))
                .map_err(|_| DomainError::InvalidIdentifier(value.to_string()));
        }
        Err(DomainError::InvalidIdentifier(value.to_string()))
    }

    /// The namespace this identifier belongs to.
    #[must_use]
    pub const fn status(&self) -> PersonStatus {
        self.status
    }

    /// The numeric suffix.
    #[must_use]
    pub const fn number(&self) -> u32 {
        self.number
    }
}

impl std::fmt::Display for Identifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}{:0width$}",
            self.status.prefix(),
            self.number,
            width = self.status.width()
        )
    }
}

impl FromStr for Identifier {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Identifier {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Identifier> for String {
    fn from(value: Identifier) -> Self {
        value.to_string()
    }
}

/// Sex as collected on the check-in form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    /// Converts this value to its stored string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Male => "MALE",
            Self::Female => "FEMALE",
        }
    }
}

impl FromStr for Sex {
    type Err = DomainError;

    /// Accepts the stored form as well as the form's French labels.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "male" | "m" | "masculin" => Ok(Self::Male),
            "female" | "f" | "féminin" | "feminin" => Ok(Self::Female),
            _ => Err(DomainError::InvalidSex(s.to_string())),
        }
    }
}

impl std::fmt::Display for Sex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Normalized person attributes produced by check-in validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonDetails {
    /// Family name, upper-cased.
    pub name: String,
    /// Given names, title-cased.
    pub given_names: String,
    pub sex: Sex,
    pub birth_date: Date,
    /// Phone number in `+<digits>` form.
    pub contact: String,
    /// Lower-cased email, absent when not provided.
    pub email: Option<String>,
    /// Place of residence, title-cased.
    pub residence: String,
}

/// One row per attendee.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Person {
    identifier: Identifier,
    pub name: String,
    pub given_names: String,
    pub sex: Sex,
    pub birth_date: Date,
    pub contact: String,
    pub email: Option<String>,
    pub residence: String,
    pub first_attendance_date: Option<Date>,
}

impl Person {
    /// Builds a person from validated details.
    ///
    /// The status is implied by the identifier's namespace, so the
    /// identifier/status invariant holds by construction.
    #[must_use]
    pub fn from_details(
        identifier: Identifier,
        details: PersonDetails,
        first_attendance_date: Option<Date>,
    ) -> Self {
        Self {
            identifier,
            name: details.name,
            given_names: details.given_names,
            sex: details.sex,
            birth_date: details.birth_date,
            contact: details.contact,
            email: details.email,
            residence: details.residence,
            first_attendance_date,
        }
    }

    /// Rebuilds a person from a stored identifier/status pair.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::IdentifierStatusMismatch` if the stored status
    /// does not match the identifier prefix.
    pub fn with_status(
        identifier: Identifier,
        status: PersonStatus,
        details: PersonDetails,
        first_attendance_date: Option<Date>,
    ) -> Result<Self, DomainError> {
        if identifier.status() != status {
            return Err(DomainError::IdentifierStatusMismatch {
                identifier: identifier.to_string(),
                status,
            });
        }
        Ok(Self::from_details(identifier, details, first_attendance_date))
    }

    #[must_use]
    pub const fn identifier(&self) -> &Identifier {
        &self.identifier
    }

    #[must_use]
    pub const fn status(&self) -> PersonStatus {
        self.identifier.status()
    }

    /// Whether this person is still a visitor.
    #[must_use]
    pub fn is_visitor(&self) -> bool {
        self.status() == PersonStatus::Visitor
    }
}

/// One row per person per date attended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub person_identifier: Identifier,
    #[serde(with = "crate::dates::iso_date")]
    pub date: Date,
    pub is_new: bool,
    pub is_present: bool,
    /// Only meaningful for visitors.
    pub wants_to_stay: bool,
}

impl AttendanceRecord {
    /// The record written by a check-in on `date`.
    #[must_use]
    pub const fn check_in(person_identifier: Identifier, date: Date, first_time: bool) -> Self {
        Self {
            person_identifier,
            date,
            is_new: first_time,
            is_present: true,
            wants_to_stay: false,
        }
    }

    /// A copy relinked to `identifier` with `wants_to_stay` set, as written
    /// when a visitor is promoted.
    #[must_use]
    pub fn reassigned_to(&self, identifier: &Identifier) -> Self {
        Self {
            person_identifier: identifier.clone(),
            wants_to_stay: true,
            ..self.clone()
        }
    }
}
