// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{FormSession, Page, SessionEvent, apply};
use presence_domain::{FieldViolation, FormField, Identifier};

pub fn create_test_identifier(raw: &str) -> Identifier {
    Identifier::parse(raw).expect("Valid test identifier")
}

pub fn create_test_violation() -> FieldViolation {
    FieldViolation::new(FormField::Contact, "Invalid phone number format")
}

pub fn create_visitor_page_session() -> FormSession {
    apply(&FormSession::new(), SessionEvent::Navigate(Page::NewVisitors)).unwrap()
}
