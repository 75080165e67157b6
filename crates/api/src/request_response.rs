// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API request and response data transfer objects.

use presence::{FormPhase, FormSession};
use presence_domain::{AttendanceRecord, FieldViolation, Identifier, PersonStatus};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use time::Date;

/// API request carrying a filled-in check-in form.
///
/// Text fields are taken as typed; validation and formatting happen in
/// the handler. Missing fields deserialize as empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckInRequest {
    pub name: String,
    pub given_names: String,
    /// `male`/`female` (the form's `Masculin`/`Féminin` labels are accepted too).
    pub sex: String,
    /// `YYYY-MM-DD`.
    pub birth_date: Option<String>,
    pub contact: String,
    pub email: Option<String>,
    pub residence: String,
    /// The "first time here" box.
    pub first_time: bool,
}

/// Whether the check-in wrote a new attendance record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckInStatus {
    CheckedIn,
    AlreadyPresent,
}

/// API response for a processed check-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckInResponse {
    pub identifier: Identifier,
    pub status: PersonStatus,
    /// `true` if this check-in created the person.
    pub person_created: bool,
    pub attendance: CheckInStatus,
    pub message: String,
}

/// The outcome of the standalone identifier allocator.
///
/// Allocation never fails outright: if storage cannot be read, the first
/// identifier of the namespace is returned with `fallback_used` set and
/// the error message, and that identifier may already be taken.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentifierAllocation {
    pub identifier: Identifier,
    pub fallback_used: bool,
    pub error: Option<String>,
}

/// One row of the staff visitor list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitorInfo {
    pub identifier: Identifier,
    pub name: String,
    pub given_names: String,
    pub residence: String,
    pub contact: String,
    #[serde(with = "presence_domain::dates::iso_date::option")]
    pub first_attendance_date: Option<Date>,
    /// The session's toggle if set, otherwise the stored flag.
    pub wants_to_stay: bool,
}

/// API response listing visitors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListVisitorsResponse {
    pub visitors: Vec<VisitorInfo>,
}

/// API response for a successful promotion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromoteVisitorResponse {
    pub old_identifier: Identifier,
    pub new_identifier: Identifier,
    pub records_moved: usize,
    pub message: String,
}

/// A selected visitor that could not be converted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionFailure {
    pub identifier: Identifier,
    pub message: String,
}

/// API response for a batch of conversions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmConversionsResponse {
    pub converted: Vec<PromoteVisitorResponse>,
    pub failures: Vec<ConversionFailure>,
    pub message: String,
}

/// API response with a person's attendance history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceHistoryResponse {
    pub identifier: Identifier,
    pub status: PersonStatus,
    /// Oldest first.
    pub records: Vec<AttendanceRecord>,
}

/// API request to move a session to another page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigateRequest {
    /// `attendance` or `new_visitors`.
    pub page: String,
}

/// API request to toggle a visitor's "wants to stay" box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToggleVisitorRequest {
    pub wants_to_stay: bool,
}

/// A session as shown to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionResponse {
    pub session_key: String,
    pub page: String,
    /// `editing`, `rejected`, `checked_in` or `already_present`.
    pub phase: String,
    /// Changes whenever the form must be cleared.
    pub form_generation: u64,
    /// Set after a finished check-in.
    pub identifier: Option<Identifier>,
    /// Set after a rejected check-in.
    pub violations: Vec<FieldViolation>,
    pub selections: BTreeMap<Identifier, bool>,
}

impl SessionResponse {
    /// Builds the client view of `session`.
    #[must_use]
    pub fn from_session(session_key: &str, session: &FormSession) -> Self {
        let (identifier, violations): (Option<Identifier>, Vec<FieldViolation>) =
            match &session.phase {
                FormPhase::Editing => (None, Vec::new()),
                FormPhase::Rejected { violations } => (None, violations.clone()),
                FormPhase::CheckedIn { identifier } | FormPhase::AlreadyPresent { identifier } => {
                    (Some(identifier.clone()), Vec::new())
                }
            };

        Self {
            session_key: session_key.to_string(),
            page: session.page.as_str().to_string(),
            phase: session.phase.name().to_string(),
            form_generation: session.form_generation,
            identifier,
            violations,
            selections: session.selections.clone(),
        }
    }
}

/// A session after a check-in attempt, together with the attempt's result.
///
/// The session is updated even when the check-in was refused, so the
/// client can show the problems.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionCheckIn {
    pub session: FormSession,
    pub result: Result<CheckInResponse, crate::ApiError>,
}

/// A session after confirming its selected conversions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConversions {
    pub session: FormSession,
    pub response: ConfirmConversionsResponse,
}
