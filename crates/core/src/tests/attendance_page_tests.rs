// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::tests::helpers::{create_test_identifier, create_test_violation};
use crate::{CoreError, FormPhase, FormSession, Page, SessionEvent, SubmissionOutcome, apply};

fn checked_in() -> SessionEvent {
    SessionEvent::Submitted(SubmissionOutcome::CheckedIn {
        identifier: create_test_identifier("TEMP001"),
    })
}

#[test]
fn test_new_session_starts_editing_on_attendance_page() {
    let session: FormSession = FormSession::new();

    assert_eq!(session.page, Page::Attendance);
    assert_eq!(session.phase, FormPhase::Editing);
    assert_eq!(session.form_generation, 0);
    assert!(session.selections.is_empty());
}

#[test]
fn test_successful_submission_moves_to_checked_in() {
    let session: FormSession = FormSession::new();

    let next: FormSession = apply(&session, checked_in()).unwrap();

    assert_eq!(
        next.phase,
        FormPhase::CheckedIn {
            identifier: create_test_identifier("TEMP001")
        }
    );
    assert_eq!(next.form_generation, session.form_generation);
}

#[test]
fn test_already_present_submission_is_its_own_phase() {
    let event: SessionEvent = SessionEvent::Submitted(SubmissionOutcome::AlreadyPresent {
        identifier: create_test_identifier("MEMBER00004"),
    });

    let next: FormSession = apply(&FormSession::new(), event).unwrap();

    assert!(matches!(next.phase, FormPhase::AlreadyPresent { .. }));
}

#[test]
fn test_rejected_submission_can_be_corrected_and_resubmitted() {
    let rejected: SessionEvent = SessionEvent::Submitted(SubmissionOutcome::Rejected {
        violations: vec![create_test_violation()],
    });

    let after_reject: FormSession = apply(&FormSession::new(), rejected).unwrap();
    let after_retry: FormSession = apply(&after_reject, checked_in()).unwrap();

    assert_eq!(
        after_reject.phase,
        FormPhase::Rejected {
            violations: vec![create_test_violation()]
        }
    );
    assert!(matches!(after_retry.phase, FormPhase::CheckedIn { .. }));
}

#[test]
fn test_second_submission_after_check_in_requires_reset() {
    let session: FormSession = apply(&FormSession::new(), checked_in()).unwrap();

    let result: Result<FormSession, CoreError> = apply(&session, checked_in());

    assert_eq!(
        result,
        Err(CoreError::InvalidTransition {
            event: "Submitted",
            page: Page::Attendance,
            phase: "checked_in",
        })
    );
}

#[test]
fn test_reset_clears_phase_and_bumps_generation() {
    let session: FormSession = apply(&FormSession::new(), checked_in()).unwrap();

    let reset: FormSession = apply(&session, SessionEvent::Reset).unwrap();
    let again: FormSession = apply(&reset, checked_in()).unwrap();

    assert_eq!(reset.phase, FormPhase::Editing);
    assert_eq!(reset.form_generation, 1);
    assert!(matches!(again.phase, FormPhase::CheckedIn { .. }));
}

#[test]
fn test_reset_while_editing_still_renews_form() {
    let reset: FormSession = apply(&FormSession::new(), SessionEvent::Reset).unwrap();

    assert_eq!(reset.phase, FormPhase::Editing);
    assert_eq!(reset.form_generation, 1);
}

#[test]
fn test_submission_off_attendance_page_is_rejected() {
    let session: FormSession =
        apply(&FormSession::new(), SessionEvent::Navigate(Page::NewVisitors)).unwrap();

    let result: Result<FormSession, CoreError> = apply(&session, checked_in());

    assert!(matches!(
        result,
        Err(CoreError::InvalidTransition {
            page: Page::NewVisitors,
            ..
        })
    ));
}

#[test]
fn test_navigation_keeps_form_phase() {
    let session: FormSession = apply(&FormSession::new(), checked_in()).unwrap();

    let away: FormSession = apply(&session, SessionEvent::Navigate(Page::NewVisitors)).unwrap();
    let back: FormSession = apply(&away, SessionEvent::Navigate(Page::Attendance)).unwrap();

    assert_eq!(back.phase, session.phase);
    assert_eq!(back.page, Page::Attendance);
}

#[test]
fn test_apply_does_not_modify_input_session() {
    let session: FormSession = FormSession::new();

    let _next: FormSession = apply(&session, checked_in()).unwrap();

    assert_eq!(session, FormSession::new());
}
