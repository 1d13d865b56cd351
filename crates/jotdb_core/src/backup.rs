//! Collection backup snapshots.
//!
//! A backup copies every record file of a collection, byte for byte, into
//! a fresh timestamp-named directory under the reserved `_backups` root,
//! alongside a small manifest describing the snapshot:
//!
//! ```text
//! {base_dir}/_backups/{collection}/{timestamp}/
//! ├─ {id}.json ...      # verbatim copies
//! └─ _manifest.json     # {collection, timestamp, file_count, created_at}
//! ```
//!
//! Verbatim copies deliberately skip re-serialization so a snapshot
//! preserves exact historical bytes even if the live encoding changes
//! later. Snapshots are immutable; repeated calls create sibling
//! directories under new timestamps.

use crate::error::{StoreError, StoreResult};
use crate::io::write_atomic;
use crate::name::sanitize;
use crate::record::now_iso8601;
use crate::store::{create_dir_all_with_mode, record_stem, Store};
use chrono::Utc;
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::PathBuf;
use tracing::debug;

/// Directory under the base dir that holds all snapshots.
const BACKUP_ROOT: &str = "_backups";
/// Manifest filename within a snapshot directory.
const MANIFEST_FILE: &str = "_manifest.json";

/// Metadata describing one backup snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupManifest {
    /// The collection that was snapshotted.
    pub collection: String,
    /// The snapshot's directory key.
    pub timestamp: String,
    /// Number of record files copied.
    pub file_count: usize,
    /// ISO-8601 creation time of the snapshot.
    pub created_at: String,
}

/// Reads the manifest of a snapshot directory.
pub fn read_manifest(snapshot_dir: &std::path::Path) -> StoreResult<BackupManifest> {
    let bytes = fs::read(snapshot_dir.join(MANIFEST_FILE))?;
    serde_json::from_slice(&bytes)
        .map_err(|source| StoreError::corrupt(BACKUP_ROOT, MANIFEST_FILE, source))
}

/// Snapshot directory key: millisecond timestamp plus a short random
/// disambiguator, so same-instant snapshots still get distinct names.
fn snapshot_key() -> String {
    format!(
        "{}-{:04x}",
        Utc::now().format("%Y%m%dT%H%M%S%3f"),
        OsRng.next_u32() & 0xffff
    )
}

impl Store {
    /// Snapshots a collection into a fresh timestamped backup directory.
    ///
    /// Returns the snapshot directory path. Fails with
    /// [`StoreError::CollectionNotFound`] if the collection directory does
    /// not exist; an empty-but-existing collection produces a valid empty
    /// snapshot.
    pub fn backup(&self, collection: &str) -> StoreResult<PathBuf> {
        let collection = sanitize(collection)?;
        let source_dir = self.collection_dir(&collection);

        if !source_dir.is_dir() {
            return Err(StoreError::collection_not_found(collection));
        }

        let key = snapshot_key();
        let snapshot_dir = self
            .base_dir()
            .join(BACKUP_ROOT)
            .join(&collection)
            .join(&key);
        create_dir_all_with_mode(&snapshot_dir, self.config().dir_mode)?;

        let mut file_count = 0;
        for entry in fs::read_dir(&source_dir)? {
            let path = entry?.path();
            if record_stem(&path).is_none() {
                continue;
            }
            let Some(file_name) = path.file_name() else {
                continue;
            };
            fs::copy(&path, snapshot_dir.join(file_name))?;
            file_count += 1;
        }

        let manifest = BackupManifest {
            collection: collection.clone(),
            timestamp: key,
            file_count,
            created_at: now_iso8601(),
        };
        let bytes =
            serde_json::to_vec_pretty(&manifest).map_err(StoreError::Serialize)?;
        write_atomic(
            &snapshot_dir.join(MANIFEST_FILE),
            &bytes,
            self.config().file_mode,
        )?;

        debug!(collection = %collection, files = file_count, dir = %snapshot_dir.display(), "backup created");
        Ok(snapshot_dir)
    }

    /// Lists a collection's snapshot directories, oldest first.
    ///
    /// Snapshot keys are timestamp-prefixed, so name order is creation
    /// order. A collection with no backups yields an empty vector.
    pub fn list_backups(&self, collection: &str) -> StoreResult<Vec<PathBuf>> {
        let collection = sanitize(collection)?;
        let root = self.base_dir().join(BACKUP_ROOT).join(&collection);

        let entries = match fs::read_dir(&root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut snapshots: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_dir())
            .collect();
        snapshots.sort();

        Ok(snapshots)
    }
}
