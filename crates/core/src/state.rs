// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::CoreError;
use presence_domain::{FieldViolation, Identifier};
use std::collections::BTreeMap;

/// The two pages of the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Page {
    /// The self-service check-in form.
    Attendance,
    /// The staff list of visitors awaiting conversion.
    NewVisitors,
}

impl Page {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Attendance => "attendance",
            Self::NewVisitors => "new_visitors",
        }
    }
}

impl std::fmt::Display for Page {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Where the check-in form stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormPhase {
    /// Waiting for input.
    Editing,
    /// The last submission was refused and can be corrected.
    Rejected {
        /// Every field that needs correcting.
        violations: Vec<FieldViolation>,
    },
    /// Attendance was recorded; the form must be reset before reuse.
    CheckedIn {
        /// The person who checked in.
        identifier: Identifier,
    },
    /// The person was already present today; the form must be reset before reuse.
    AlreadyPresent {
        /// The person who checked in.
        identifier: Identifier,
    },
}

impl FormPhase {
    /// Short phase name used in errors and logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Editing => "editing",
            Self::Rejected { .. } => "rejected",
            Self::CheckedIn { .. } => "checked_in",
            Self::AlreadyPresent { .. } => "already_present",
        }
    }

    /// Whether a new submission is accepted.
    #[must_use]
    pub const fn accepts_submission(&self) -> bool {
        matches!(self, Self::Editing | Self::Rejected { .. })
    }
}

/// The state of one user's session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormSession {
    /// The page being shown.
    pub page: Page,
    /// The check-in form phase.
    pub phase: FormPhase,
    /// Bumped on every reset so the client renders an empty form.
    pub form_generation: u64,
    /// Staff "wants to stay" toggles, by visitor.
    pub selections: BTreeMap<Identifier, bool>,
}

impl FormSession {
    /// Creates a session on the attendance page with an empty form.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            page: Page::Attendance,
            phase: FormPhase::Editing,
            form_generation: 0,
            selections: BTreeMap::new(),
        }
    }

    /// Checks that a check-in form may be submitted now.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidTransition` off the attendance page or
    /// after a finished check-in that has not been reset.
    pub const fn ensure_accepts_submission(&self) -> Result<(), CoreError> {
        if matches!(self.page, Page::Attendance) && self.phase.accepts_submission() {
            return Ok(());
        }
        Err(CoreError::InvalidTransition {
            event: "Submitted",
            page: self.page,
            phase: self.phase.name(),
        })
    }

    /// Visitors currently toggled on, in identifier order.
    #[must_use]
    pub fn selected_visitors(&self) -> Vec<Identifier> {
        self.selections
            .iter()
            .filter(|(_, selected)| **selected)
            .map(|(identifier, _)| identifier.clone())
            .collect()
    }
}

impl Default for FormSession {
    fn default() -> Self {
        Self::new()
    }
}
