//! Relevance-ranked substring search.

use crate::error::StoreResult;
use crate::record::{Record, FIELD_RELEVANCE};
use crate::store::Store;
use serde_json::Value;

/// Flattens a field value to searchable text. Arrays join their flattened
/// elements with a space; other non-string values use their JSON rendering.
fn flatten(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(flatten)
            .collect::<Vec<_>>()
            .join(" "),
        other => other.to_string(),
    }
}

impl Store {
    /// Searches `fields` of every record for a case-insensitive substring.
    ///
    /// A record's relevance is the number of requested fields whose
    /// flattened value contains `query`; records with zero matches are
    /// excluded, and an empty query matches nothing. Matching records are
    /// returned with a `_relevance` field injected (never persisted),
    /// sorted by descending relevance. Ties keep scan order.
    pub fn search(
        &self,
        collection: &str,
        query: &str,
        fields: &[&str],
    ) -> StoreResult<Vec<Record>> {
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let needle = query.to_lowercase();
        let mut results = Vec::new();

        for mut record in self.all(collection)? {
            let relevance = fields
                .iter()
                .filter_map(|field| record.get(*field))
                .filter(|value| flatten(value).to_lowercase().contains(&needle))
                .count();

            if relevance > 0 {
                record.insert(
                    FIELD_RELEVANCE.to_string(),
                    Value::Number(serde_json::Number::from(relevance)),
                );
                results.push(record);
            }
        }

        // Stable sort keeps scan order for equal relevance.
        results.sort_by_key(|record| {
            std::cmp::Reverse(
                record
                    .get(FIELD_RELEVANCE)
                    .and_then(Value::as_u64)
                    .unwrap_or(0),
            )
        });

        Ok(results)
    }
}
