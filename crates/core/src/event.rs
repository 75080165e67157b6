// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::state::Page;
use presence_domain::{FieldViolation, Identifier};

/// What happened to a submitted check-in form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    /// The form was refused; nothing was stored.
    Rejected {
        /// Every field that needs correcting.
        violations: Vec<FieldViolation>,
    },
    /// Today's attendance was recorded.
    CheckedIn {
        /// The person who checked in.
        identifier: Identifier,
    },
    /// The person had already checked in today.
    AlreadyPresent {
        /// The person who checked in.
        identifier: Identifier,
    },
}

/// An event represents user intent as data only.
///
/// Events are the only way to change a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// The check-in form was submitted and processed.
    Submitted(SubmissionOutcome),
    /// Clear the form for the next attendee.
    Reset,
    /// Switch to another page.
    Navigate(Page),
    /// Staff toggled the "wants to stay" box for a visitor.
    ToggleVisitor {
        /// The visitor row.
        identifier: Identifier,
        /// The new checkbox value.
        wants_to_stay: bool,
    },
    /// Staff confirmed the selected conversions.
    ConversionsConfirmed {
        /// How many visitors were promoted.
        converted: usize,
    },
}

impl SessionEvent {
    /// The event name used in errors and logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Submitted(_) => "Submitted",
            Self::Reset => "Reset",
            Self::Navigate(_) => "Navigate",
            Self::ToggleVisitor { .. } => "ToggleVisitor",
            Self::ConversionsConfirmed { .. } => "ConversionsConfirmed",
        }
    }
}
