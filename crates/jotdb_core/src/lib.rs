//! # jotdb
//!
//! A file-per-record JSON document store.
//!
//! Records are schema-less JSON objects stored one per file inside named
//! collection directories. The engine provides:
//! - CRUD with atomic temp-file-then-rename writes
//! - Shared/exclusive advisory locking for torn-read-free concurrent access
//! - Full-scan querying by exact match or predicate
//! - One-shot field indexing with array fan-out
//! - Case-insensitive, relevance-ranked substring search
//! - Verbatim timestamped collection backups
//! - Collision-resistant, roughly creation-ordered record ids
//!
//! There are no background threads, no caches, and no cross-record
//! transactions: every operation is a synchronous filesystem interaction,
//! which makes the store safe to share between processes on one host.
//!
//! ## Example
//!
//! ```rust,ignore
//! use jotdb_core::{Store, StoreConfig};
//! use serde_json::json;
//!
//! let store = Store::open(StoreConfig::new("data"))?;
//!
//! let id = store.generate_id();
//! let mut fields = jotdb_core::Fields::new();
//! fields.insert("title".into(), json!("Biology revision"));
//! store.put("notes", &id, fields)?;
//!
//! let hits = store.search("notes", "bio", &["title"])?;
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backup;
mod config;
mod error;
mod id;
mod index;
mod io;
mod name;
mod query;
mod record;
mod search;
mod store;

pub use backup::{read_manifest, BackupManifest};
pub use config::StoreConfig;
pub use error::{StoreError, StoreResult};
pub use name::sanitize;
pub use record::{
    now_iso8601, Fields, Record, FIELD_CREATED_AT, FIELD_ID, FIELD_RELEVANCE, FIELD_UPDATED_AT,
};
pub use store::Store;

pub use serde_json::Value;
