//! Identifier sanitization.
//!
//! Every collection name and record id passes through [`sanitize`] before
//! it is used as a path component. The sanitizer keeps alphanumerics and
//! `.`, `_`, `-`; everything else (path separators, NUL bytes, whitespace)
//! becomes `_`, so a hostile id like `../../etc/passwd` collapses to a
//! harmless literal filename instead of traversing out of the base
//! directory.

use crate::error::{StoreError, StoreResult};

/// Returns true for characters allowed in a path component.
fn is_safe(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '.' || c == '_' || c == '-'
}

/// Sanitizes a collection name or record id into a safe path component.
///
/// Substitution is deterministic and idempotent: sanitizing an already
/// sanitized name returns it unchanged, so two raw names that collapse to
/// the same safe string always address the same collection or record.
///
/// # Errors
///
/// Returns [`StoreError::InvalidName`] if the result is empty or consists
/// solely of dots (`.` and `..` must never become a path component).
pub fn sanitize(raw: &str) -> StoreResult<String> {
    let safe: String = raw
        .chars()
        .map(|c| if is_safe(c) { c } else { '_' })
        .collect();

    if safe.is_empty() || safe.bytes().all(|b| b == b'.') {
        return Err(StoreError::invalid_name(raw));
    }

    Ok(safe)
}
