// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Calendar dates as `YYYY-MM-DD` text, for storage and JSON.

use time::Date;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

use crate::error::DomainError;

const ISO_DATE: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// Formats a date as `YYYY-MM-DD`.
///
/// # Errors
///
/// Returns an error if the date cannot be formatted.
pub fn format_date(date: Date) -> Result<String, DomainError> {
    date.format(ISO_DATE)
        .map_err(|e| DomainError::DateFormatError(e.to_string()))
}

/// Parses a `YYYY-MM-DD` date.
///
/// # Errors
///
/// Returns an error if the string is not a valid calendar date.
pub fn parse_date(value: &str) -> Result<Date, DomainError> {
    Date::parse(value, ISO_DATE).map_err(|e| DomainError::DateParseError {
        date_string: value.to_string(),
        error: e.to_string(),
    })
}

/// Serde adapter for `Date` fields (`#[serde(with = "presence_domain::dates::iso_date")]`).
pub mod iso_date {
    use serde::{Deserialize, Deserializer, Serializer, de::Error as _, ser::Error as _};
    use time::Date;

    /// Serializes a date as `YYYY-MM-DD`.
    ///
    /// # Errors
    ///
    /// Returns an error if the date cannot be formatted.
    pub fn serialize<S: Serializer>(date: &Date, serializer: S) -> Result<S::Ok, S::Error> {
        let text: String = super::format_date(*date).map_err(S::Error::custom)?;
        serializer.serialize_str(&text)
    }

    /// Deserializes a `YYYY-MM-DD` date.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not a valid date string.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Date, D::Error> {
        let text: String = String::deserialize(deserializer)?;
        super::parse_date(&text).map_err(D::Error::custom)
    }

    /// Same adapter for `Option<Date>`.
    pub mod option {
        use serde::{Deserialize, Deserializer, Serializer, de::Error as _, ser::Error as _};
        use time::Date;

        /// Serializes an optional date as `YYYY-MM-DD` or `null`.
        ///
        /// # Errors
        ///
        /// Returns an error if the date cannot be formatted.
        #[allow(clippy::ref_option)]
        pub fn serialize<S: Serializer>(
            date: &Option<Date>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match date {
                Some(date) => {
                    let text: String =
                        crate::dates::format_date(*date).map_err(S::Error::custom)?;
                    serializer.serialize_some(&text)
                }
                None => serializer.serialize_none(),
            }
        }

        /// Deserializes an optional `YYYY-MM-DD` date.
        ///
        /// # Errors
        ///
        /// Returns an error if a present value is not a valid date string.
        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<Date>, D::Error> {
            let text: Option<String> = Option::deserialize(deserializer)?;
            text.map(|value| crate::dates::parse_date(&value).map_err(D::Error::custom))
                .transpose()
        }
    }
}
