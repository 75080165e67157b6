// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Per-session state for the check-in form and the staff visitor page.
//!
//! A session is an explicit value held by the server under a session key.
//! It only changes through [`apply`], one [`SessionEvent`] at a time.

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

mod apply;
mod error;
mod event;
mod state;

#[cfg(test)]
mod tests;

pub use apply::apply;
pub use error::CoreError;
pub use event::{SessionEvent, SubmissionOutcome};
pub use state::{FormPhase, FormSession, Page};
