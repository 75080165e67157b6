// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]

mod allocation;

use time::{Date, Month};

/// 2024-01-07, the Sunday used throughout the examples.
pub fn create_test_sunday() -> Date {
    Date::from_calendar_date(2024, Month::January, 7).expect("Valid test date")
}
