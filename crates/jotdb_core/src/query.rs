//! In-memory querying over full collection scans.
//!
//! There is no query DSL: filtering is either an exact field/value match
//! or an arbitrary host-language predicate. Every query scans the whole
//! collection, which is deliberate — collections are small and file-count
//! bounded, and a fresh disk read per query keeps cross-process views
//! consistent without a cache layer.

use crate::error::StoreResult;
use crate::record::{Fields, Record};
use crate::store::Store;

impl Store {
    /// Returns records whose fields exactly match every entry in `filter`.
    ///
    /// A record matches only if each filter field is present and equal;
    /// records missing a filter field are excluded. An empty filter
    /// matches every record. Result order is directory iteration order.
    pub fn find(&self, collection: &str, filter: &Fields) -> StoreResult<Vec<Record>> {
        self.find_where(collection, |record| {
            filter
                .iter()
                .all(|(field, expected)| record.get(field) == Some(expected))
        })
    }

    /// Returns records satisfying an arbitrary predicate.
    pub fn find_where<F>(&self, collection: &str, predicate: F) -> StoreResult<Vec<Record>>
    where
        F: Fn(&Record) -> bool,
    {
        let mut records = self.all(collection)?;
        records.retain(|record| predicate(record));
        Ok(records)
    }
}
