//! One-shot field indexing.
//!
//! An index is a derived, request-scoped view: one full scan producing a
//! map from a field's stringified value to the records holding it. Nothing
//! is persisted; callers rebuild per request, which keeps the index
//! trivially consistent with concurrent writers.

use crate::error::StoreResult;
use crate::record::Record;
use crate::store::Store;
use serde_json::Value;
use std::collections::BTreeMap;

/// Stringifies a scalar value for use as an index key. Strings index under
/// their content; other scalars under their JSON rendering.
fn index_key(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl Store {
    /// Builds a mapping from each value of `field` to the records holding
    /// that value.
    ///
    /// Array-valued fields fan out: the record is filed under every
    /// element's key, which supports "all records tagged X" lookups.
    /// Records missing the field are excluded entirely — they are not
    /// filed under a null or empty key.
    pub fn index(
        &self,
        collection: &str,
        field: &str,
    ) -> StoreResult<BTreeMap<String, Vec<Record>>> {
        let mut index: BTreeMap<String, Vec<Record>> = BTreeMap::new();

        for record in self.all(collection)? {
            match record.get(field) {
                None => {}
                Some(Value::Array(items)) => {
                    for item in items {
                        index
                            .entry(index_key(item))
                            .or_default()
                            .push(record.clone());
                    }
                }
                Some(value) => {
                    let key = index_key(value);
                    index.entry(key).or_default().push(record);
                }
            }
        }

        Ok(index)
    }
}
