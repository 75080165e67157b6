// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Check-in form validation and formatting.
//!
//! Validation collects every failing field so the form can show all
//! problems at once; formatting only runs on input that passed.

use crate::error::DomainError;
use crate::types::{PersonDetails, Sex};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::LazyLock;
use thiserror::Error;
use time::{Date, Month};

/// Oldest accepted age, in 365-day years.
const MAX_AGE_YEARS: i64 = 120;

#[allow(clippy::expect_used)]
static PHONE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[0-9]{8,15}$").expect("literal pattern"));

#[allow(clippy::expect_used)]
static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("literal pattern")
});

/// A field of the check-in form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormField {
    Name,
    GivenNames,
    Sex,
    BirthDate,
    Contact,
    Email,
    Residence,
}

impl FormField {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::GivenNames => "given_names",
            Self::Sex => "sex",
            Self::BirthDate => "birth_date",
            Self::Contact => "contact",
            Self::Email => "email",
            Self::Residence => "residence",
        }
    }
}

impl std::fmt::Display for FormField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single rejected form field.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{field}: {message}")]
pub struct FieldViolation {
    /// The field that was rejected.
    pub field: FormField,
    /// A user-facing description of the problem.
    pub message: String,
}

impl FieldViolation {
    /// Creates a violation for `field`.
    #[must_use]
    pub fn new(field: FormField, message: &str) -> Self {
        Self {
            field,
            message: message.to_string(),
        }
    }
}

/// Raw check-in form input, exactly as typed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CheckInInput {
    pub name: String,
    pub given_names: String,
    pub sex: String,
    pub birth_date: Option<Date>,
    pub contact: String,
    /// Optional; an empty string means "not provided".
    pub email: String,
    pub residence: String,
}

/// Returns `true` if the phone number is `+?` followed by 8 to 15 digits
/// once spaces, dashes, dots and parentheses are removed.
#[must_use]
pub fn is_valid_phone(phone: &str) -> bool {
    PHONE_PATTERN.is_match(&strip_phone_separators(phone))
}

/// Returns `true` for an empty string or a plausible email address.
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    email.is_empty() || EMAIL_PATTERN.is_match(email)
}

/// Normalizes a phone number to `+<digits>`.
///
/// Local 10-digit numbers get the `+225` country prefix; anything else
/// without a leading `+` just gets the `+`.
#[must_use]
pub fn format_phone_number(phone: &str) -> String {
    let cleaned: String = strip_phone_separators(phone);
    if cleaned.starts_with('+') {
        cleaned
    } else if cleaned.len() == 10 {
        format!("+225{cleaned}")
    } else {
        format!("+{cleaned}")
    }
}

/// Upper-cases every letter that does not follow another letter and
/// lower-cases the rest (`"jean-paul"` becomes `"Jean-Paul"`).
#[must_use]
pub fn title_case(value: &str) -> String {
    let mut out: String = String::with_capacity(value.len());
    let mut previous_is_letter: bool = false;
    for c in value.chars() {
        if c.is_alphabetic() {
            if previous_is_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            previous_is_letter = true;
        } else {
            out.push(c);
            previous_is_letter = false;
        }
    }
    out
}

fn strip_phone_separators(phone: &str) -> String {
    phone
        .trim()
        .chars()
        .filter(|c| !(c.is_whitespace() || matches!(c, '-' | '(' | ')' | '.')))
        .collect()
}

fn validate_birth_date(birth_date: Option<Date>, today: Date) -> Option<FieldViolation> {
    let Some(birth_date) = birth_date else {
        return Some(FieldViolation::new(
            FormField::BirthDate,
            "Birth date is required",
        ));
    };

    let earliest: Option<Date> = Date::from_calendar_date(1900, Month::January, 1).ok();
    let too_early: bool = earliest.is_some_and(|earliest| birth_date < earliest);
    let too_old: bool = (today - birth_date).whole_days() / 365 > MAX_AGE_YEARS;

    if birth_date > today || too_early || too_old {
        return Some(FieldViolation::new(
            FormField::BirthDate,
            "Birth date is incorrect",
        ));
    }
    None
}

/// Checks every field of the check-in form.
///
/// # Arguments
///
/// * `input` - The raw form input
/// * `today` - The current calendar date
///
/// # Returns
///
/// All violations found, in form order. Empty means the input is valid.
#[must_use]
pub fn validate_check_in(input: &CheckInInput, today: Date) -> Vec<FieldViolation> {
    let mut violations: Vec<FieldViolation> = Vec::new();

    if input.name.trim().is_empty() {
        violations.push(FieldViolation::new(FormField::Name, "Name is required"));
    }
    if input.given_names.trim().is_empty() {
        violations.push(FieldViolation::new(
            FormField::GivenNames,
            "Given names are required",
        ));
    }
    if input.sex.trim().is_empty() {
        violations.push(FieldViolation::new(FormField::Sex, "Sex is required"));
    } else if Sex::from_str(&input.sex).is_err() {
        violations.push(FieldViolation::new(
            FormField::Sex,
            "Sex must be male or female",
        ));
    }
    if let Some(violation) = validate_birth_date(input.birth_date, today) {
        violations.push(violation);
    }

    let contact: &str = input.contact.trim();
    if contact.is_empty() {
        violations.push(FieldViolation::new(
            FormField::Contact,
            "Contact is required",
        ));
    } else if !is_valid_phone(contact) {
        violations.push(FieldViolation::new(
            FormField::Contact,
            "Invalid phone number format",
        ));
    }

    let email: String = input.email.trim().to_lowercase();
    if !is_valid_email(&email) {
        violations.push(FieldViolation::new(
            FormField::Email,
            "Invalid email format",
        ));
    }

    if input.residence.trim().is_empty() {
        violations.push(FieldViolation::new(
            FormField::Residence,
            "Place of residence is required",
        ));
    }

    violations
}

/// Validates and formats check-in input into `PersonDetails`.
///
/// # Errors
///
/// Returns `DomainError::InvalidFields` carrying every violation if any
/// field is rejected.
pub fn normalize_check_in(input: &CheckInInput, today: Date) -> Result<PersonDetails, DomainError> {
    let violations: Vec<FieldViolation> = validate_check_in(input, today);
    if !violations.is_empty() {
        return Err(DomainError::InvalidFields(violations));
    }

    // Checked by validate_check_in.
    let sex: Sex = Sex::from_str(&input.sex)?;
    let birth_date: Date = input.birth_date.ok_or_else(|| {
        DomainError::InvalidFields(vec![FieldViolation::new(
            FormField::BirthDate,
            "Birth date is required",
        )])
    })?;

    let email: String = input.email.trim().to_lowercase();

    Ok(PersonDetails {
        name: input.name.trim().to_uppercase(),
        given_names: title_case(input.given_names.trim()),
        sex,
        birth_date,
        contact: format_phone_number(input.contact.trim()),
        email: if email.is_empty() { None } else { Some(email) },
        residence: title_case(input.residence.trim()),
    })
}
