// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Stowgate Contributors

//! Role-based authorization over decoded sessions.

use serde_json::Value;

use super::claims::extract_claim;
use super::error::AuthError;

/// Assert that the session's role claim contains `required_role`.
///
/// The role claim is read at `claim_path`; an absent claim, a non-array
/// value, an empty list, or a list without the role all deny. Membership is
/// an exact, case-sensitive string comparison — no hierarchy, no wildcards.
/// On success the session is returned unchanged so checks compose.
pub fn require_role<'a>(
    session: &'a Value,
    claim_path: &str,
    required_role: &str,
) -> Result<&'a Value, AuthError> {
    let allowed = extract_claim(session, claim_path)
        .and_then(Value::as_array)
        .map(|roles| roles.iter().any(|role| role.as_str() == Some(required_role)))
        .unwrap_or(false);

    if !allowed {
        return Err(AuthError::PermissionDenied(required_role.to_string()));
    }

    Ok(session)
}
