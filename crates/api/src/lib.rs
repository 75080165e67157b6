// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The check-in API.
//!
//! Every operation validates its input, calls the persistence layer and
//! translates failures into [`ApiError`]. Session-aware variants also
//! drive the form session through `presence::apply`.

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

mod error;
mod handlers;
mod request_response;

#[cfg(test)]
mod tests;

pub use error::{
    ApiError, DUPLICATE_CONTACT_MESSAGE, DUPLICATE_EMAIL_MESSAGE, translate_core_error,
    translate_domain_error, translate_persistence_error,
};
pub use handlers::{
    allocate_identifier, apply_session_event, check_in, confirm_conversions,
    confirm_session_conversions, get_attendance_history, list_visitors, parse_identifier,
    parse_page, parse_status, promote_visitor, submit_check_in,
};
pub use request_response::{
    AttendanceHistoryResponse, CheckInRequest, CheckInResponse, CheckInStatus,
    ConfirmConversionsResponse, ConversionFailure, IdentifierAllocation, ListVisitorsResponse,
    NavigateRequest, PromoteVisitorResponse, SessionCheckIn, SessionConversions, SessionResponse,
    ToggleVisitorRequest, VisitorInfo,
};
