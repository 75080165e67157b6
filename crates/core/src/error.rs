// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::state::Page;

/// Errors that can occur during session transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// The event is not accepted in the session's current page or phase.
    InvalidTransition {
        /// The rejected event.
        event: &'static str,
        /// The page the session was on.
        page: Page,
        /// The form phase the session was in.
        phase: &'static str,
    },
}

impl std::fmt::Display for CoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidTransition { event, page, phase } => {
                write!(
                    f,
                    "Event '{event}' is not allowed on the {page} page while the form is {phase}"
                )
            }
        }
    }
}

impl std::error::Error for CoreError {}
