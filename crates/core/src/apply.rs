// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::CoreError;
use crate::event::{SessionEvent, SubmissionOutcome};
use crate::state::{FormPhase, FormSession, Page};

/// Applies an event to a session, producing the next session.
///
/// # Arguments
///
/// * `session` - The current session (immutable)
/// * `event` - The event to apply
///
/// # Returns
///
/// * `Ok(FormSession)` with the transition applied
/// * `Err(CoreError)` if the event is not allowed in the current state
///
/// # Errors
///
/// Returns `CoreError::InvalidTransition` if:
/// - A form is submitted off the attendance page, or after a finished check-in
/// - Visitor toggles or conversions arrive off the new-visitors page
pub fn apply(session: &FormSession, event: SessionEvent) -> Result<FormSession, CoreError> {
    let invalid = |event: &SessionEvent| CoreError::InvalidTransition {
        event: event.name(),
        page: session.page,
        phase: session.phase.name(),
    };

    match event {
        SessionEvent::Submitted(outcome) => {
            session.ensure_accepts_submission()?;
            let phase: FormPhase = match outcome {
                SubmissionOutcome::Rejected { violations } => FormPhase::Rejected { violations },
                SubmissionOutcome::CheckedIn { identifier } => FormPhase::CheckedIn { identifier },
                SubmissionOutcome::AlreadyPresent { identifier } => {
                    FormPhase::AlreadyPresent { identifier }
                }
            };
            Ok(FormSession {
                phase,
                ..session.clone()
            })
        }
        SessionEvent::Reset => Ok(FormSession {
            phase: FormPhase::Editing,
            form_generation: session.form_generation.wrapping_add(1),
            ..session.clone()
        }),
        SessionEvent::Navigate(page) => Ok(FormSession {
            page,
            ..session.clone()
        }),
        SessionEvent::ToggleVisitor {
            identifier,
            wants_to_stay,
        } => {
            if session.page != Page::NewVisitors {
                return Err(invalid(&SessionEvent::ToggleVisitor {
                    identifier,
                    wants_to_stay,
                }));
            }
            let mut next: FormSession = session.clone();
            next.selections.insert(identifier, wants_to_stay);
            Ok(next)
        }
        SessionEvent::ConversionsConfirmed { converted } => {
            if session.page != Page::NewVisitors {
                return Err(invalid(&SessionEvent::ConversionsConfirmed { converted }));
            }
            let mut next: FormSession = session.clone();
            // Keep the toggles when nothing went through so the batch can be retried.
            if converted > 0 {
                next.selections.clear();
            }
            Ok(next)
        }
    }
}
