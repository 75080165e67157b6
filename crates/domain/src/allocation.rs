// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::types::{Identifier, PersonStatus};

/// Computes the next unused identifier in `status`'s namespace.
///
/// The result is one past the highest numeric suffix already present, so
/// gaps left by promoted visitors are never refilled and a retired
/// identifier is never reissued. Strings from the other namespace or that
/// do not parse as identifiers are ignored.
///
/// # Arguments
///
/// * `status` - The namespace to allocate in
/// * `existing` - Every identifier currently in storage
#[must_use]
pub fn next_identifier<'a, I>(status: PersonStatus, existing: I) -> Identifier
where
    I: IntoIterator<Item = &'a str>,
{
    let highest: u32 = existing
        .into_iter()
        .filter_map(|raw| Identifier::parse(raw).ok())
        .filter(|identifier| identifier.status() == status)
        .map(|identifier| identifier.number())
        .max()
        .unwrap_or(0);

    Identifier::new(status, highest.saturating_add(1))
}

/// The first identifier in a namespace (`TEMP001`, `MEMBER00001`).
///
/// Handed out when storage cannot be read; it may collide with an
/// existing row.
#[must_use]
pub const fn fallback_identifier(status: PersonStatus) -> Identifier {
    Identifier::new(status, 1)
}
