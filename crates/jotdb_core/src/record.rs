//! Record representation and reserved metadata fields.
//!
//! A record is a schema-less, insertion-ordered JSON object. The store
//! injects three reserved fields on every write:
//!
//! - [`FIELD_ID`]: the record id, always equal to the filename stem
//! - [`FIELD_CREATED_AT`]: ISO-8601 timestamp, set once and preserved
//! - [`FIELD_UPDATED_AT`]: ISO-8601 timestamp, refreshed on every write
//!
//! Search results additionally carry [`FIELD_RELEVANCE`], which is never
//! persisted.

use chrono::{SecondsFormat, Utc};
use serde_json::Value;

/// An insertion-ordered map of field names to JSON values.
pub type Fields = serde_json::Map<String, Value>;

/// A stored record. Identical shape to [`Fields`]; the distinction is
/// documentation: a `Record` has passed through the store and carries the
/// reserved metadata fields.
pub type Record = Fields;

/// Reserved field: record identifier.
pub const FIELD_ID: &str = "_id";
/// Reserved field: creation timestamp, immutable once set.
pub const FIELD_CREATED_AT: &str = "_created_at";
/// Reserved field: last-write timestamp.
pub const FIELD_UPDATED_AT: &str = "_updated_at";
/// Reserved field: search relevance score. Never persisted.
pub const FIELD_RELEVANCE: &str = "_relevance";

/// Returns the current time as an ISO-8601 UTC string with millisecond
/// precision.
#[must_use]
pub fn now_iso8601() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Stamps the reserved metadata fields onto `fields`.
///
/// `_id` and `_updated_at` are always overwritten; `_created_at` is taken
/// from `existing` if the record was already on disk, otherwise set to now.
pub fn stamp(fields: &mut Fields, id: &str, existing: Option<&Record>) {
    let now = now_iso8601();

    let created_at = existing
        .and_then(|r| r.get(FIELD_CREATED_AT))
        .and_then(Value::as_str)
        .map_or_else(|| now.clone(), str::to_string);

    fields.insert(FIELD_ID.to_string(), Value::String(id.to_string()));
    fields.insert(FIELD_CREATED_AT.to_string(), Value::String(created_at));
    fields.insert(FIELD_UPDATED_AT.to_string(), Value::String(now));
}
