// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! State-changing operations.
//!
//! - `persons` — single-row person inserts and updates
//! - `attendance` — attendance inserts and deletes
//! - `check_in` — the check-in flow, in one transaction
//! - `promotion` — visitor-to-member promotion, in one transaction
//!
//! Only `check_in` and `promotion` open transactions; the row-level helpers
//! expect to run inside one.

pub mod attendance;
pub mod check_in;
pub mod persons;
pub mod promotion;

pub use check_in::record_check_in;
pub use promotion::promote_visitor;
