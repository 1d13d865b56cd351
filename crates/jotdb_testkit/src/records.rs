//! Record builders for common study-app shapes.

use jotdb_core::Fields;
use serde_json::json;

/// Converts a `serde_json::json!` object literal into [`Fields`].
///
/// # Panics
///
/// Panics if `value` is not a JSON object.
pub fn obj(value: serde_json::Value) -> Fields {
    value
        .as_object()
        .expect("record builder requires a JSON object")
        .clone()
}

/// A note record with a title and body.
pub fn note(title: &str, body: &str) -> Fields {
    obj(json!({ "title": title, "body": body }))
}

/// A task record with a status and point weight.
pub fn task(status: &str, points: i64) -> Fields {
    obj(json!({ "status": status, "points": points }))
}

/// A flashcard deck record with a subject and tag list.
pub fn deck(subject: &str, tags: &[&str]) -> Fields {
    obj(json!({ "subject": subject, "tags": tags }))
}
