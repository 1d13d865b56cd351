//! Record id generation.
//!
//! Ids combine a millisecond timestamp with a cryptographically random
//! suffix: `{unix_millis}-{8 hex chars}`. The timestamp prefix keeps
//! directory listings roughly sorted by creation time; the random suffix
//! makes collisions between uncoordinated concurrent writers statistically
//! negligible. Uniqueness is not enforced — callers that need a strict
//! guarantee should pair this with an existence check.

use rand::rngs::OsRng;
use rand::RngCore;
use std::time::{SystemTime, UNIX_EPOCH};

/// Generates a new record id.
///
/// The result contains only characters from the sanitizer's safe set, so
/// it can be used as a filename without further transformation.
#[must_use]
pub fn generate() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis();

    format!("{millis}-{:08x}", OsRng.next_u32())
}
