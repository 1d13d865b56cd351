//! The collection store facade.
//!
//! [`Store`] is the public surface of the engine. It owns the base
//! directory and is the only component that touches the filesystem,
//! delegating the actual byte movement to [`crate::io`]. Collections are
//! directories created lazily on first write; records are individual
//! `.json` files named after their id.

use crate::config::StoreConfig;
use crate::error::{StoreError, StoreResult};
use crate::id;
use crate::io::{read_record, write_atomic};
use crate::name::sanitize;
use crate::record::{stamp, Fields, Record, FIELD_ID, FIELD_UPDATED_AT};
use serde_json::Value;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// File extension for record files.
pub(crate) const RECORD_EXT: &str = "json";

/// A file-per-record JSON document store.
///
/// Every operation is synchronous and stateless between calls; concurrency
/// safety comes entirely from the atomic write protocol and advisory file
/// locks, which makes the store safe for multiple processes sharing one
/// base directory.
///
/// # Example
///
/// ```rust,ignore
/// use jotdb_core::{Store, StoreConfig};
///
/// let store = Store::open(StoreConfig::new("data"))?;
/// let id = store.generate_id();
/// store.put("notes", &id, fields)?;
/// let note = store.get("notes", &id)?;
/// ```
#[derive(Debug)]
pub struct Store {
    config: StoreConfig,
}

impl Store {
    /// Opens a store rooted at the configured base directory, creating the
    /// directory if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Bootstrap`] if the base directory cannot be
    /// created. This is fatal: no store handle is produced.
    pub fn open(config: StoreConfig) -> StoreResult<Self> {
        create_dir_all_with_mode(&config.base_dir, config.dir_mode).map_err(|source| {
            StoreError::Bootstrap {
                path: config.base_dir.clone(),
                source,
            }
        })?;

        Ok(Self { config })
    }

    /// Returns the base directory.
    #[must_use]
    pub fn base_dir(&self) -> &Path {
        &self.config.base_dir
    }

    /// Returns the store configuration.
    #[must_use]
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Generates a new collision-resistant record id.
    #[must_use]
    pub fn generate_id(&self) -> String {
        id::generate()
    }

    /// Reads one record. Returns `None` if it does not exist.
    pub fn get(&self, collection: &str, id: &str) -> StoreResult<Option<Record>> {
        let collection = sanitize(collection)?;
        let id = sanitize(id)?;
        read_record(&self.record_path(&collection, &id), &collection, &id)
    }

    /// Reads every record in a collection.
    ///
    /// A missing or empty collection yields an empty vector, not an error.
    /// Result order is directory iteration order and is not guaranteed to
    /// be sorted; callers needing a stable order must sort downstream.
    pub fn all(&self, collection: &str) -> StoreResult<Vec<Record>> {
        let collection = sanitize(collection)?;
        let dir = self.collection_dir(&collection);

        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut records = Vec::new();
        for entry in entries {
            let path = entry?.path();
            let Some(id) = record_stem(&path) else {
                continue;
            };
            // A record deleted between listing and read is skipped.
            if let Some(record) = read_record(&path, &collection, id)? {
                records.push(record);
            }
        }

        Ok(records)
    }

    /// Writes a record, replacing any previous content.
    ///
    /// The collection directory is created on first write. The reserved
    /// fields are stamped before serialization: `_id` always equals the
    /// sanitized id, `_created_at` is preserved from an existing record or
    /// set to now, and `_updated_at` is set to now. Returns the record as
    /// persisted.
    ///
    /// # Errors
    ///
    /// Serialization and filesystem failures are surfaced; a failed write
    /// never reports success and never leaves a partial file behind.
    pub fn put(&self, collection: &str, id: &str, fields: Fields) -> StoreResult<Record> {
        let collection = sanitize(collection)?;
        let id = sanitize(id)?;

        create_dir_all_with_mode(&self.collection_dir(&collection), self.config.dir_mode)?;

        let existing = read_record(&self.record_path(&collection, &id), &collection, &id)?;
        let mut record = fields;
        stamp(&mut record, &id, existing.as_ref());

        let bytes = self.encode(&record)?;
        write_atomic(
            &self.record_path(&collection, &id),
            &bytes,
            self.config.file_mode,
        )?;

        debug!(collection = %collection, id = %id, bytes = bytes.len(), "record written");
        Ok(record)
    }

    /// Shallow-merges `patch` over an existing record and writes it back.
    ///
    /// Keys present in `patch` override the stored values; all other keys
    /// are preserved. Fails with [`StoreError::RecordNotFound`] if the
    /// record does not exist.
    ///
    /// The read and the subsequent write are not serialized against other
    /// writers: a concurrent commit landing in between is silently
    /// overwritten (last write wins). Use [`Store::update_checked`] when
    /// that race matters.
    pub fn update(&self, collection: &str, id: &str, patch: Fields) -> StoreResult<Record> {
        let existing = self
            .get(collection, id)?
            .ok_or_else(|| StoreError::record_not_found(collection, id))?;

        self.put(collection, id, merged(existing, patch))
    }

    /// Compare-and-swap variant of [`Store::update`].
    ///
    /// Fails with [`StoreError::WriteConflict`] if the stored record's
    /// `_updated_at` no longer equals `expected_updated_at`, leaving the
    /// record untouched. This narrows the read-modify-write window to the
    /// check itself; it is an opt-in mitigation, not a transaction.
    pub fn update_checked(
        &self,
        collection: &str,
        id: &str,
        patch: Fields,
        expected_updated_at: &str,
    ) -> StoreResult<Record> {
        let existing = self
            .get(collection, id)?
            .ok_or_else(|| StoreError::record_not_found(collection, id))?;

        let current = existing
            .get(FIELD_UPDATED_AT)
            .and_then(Value::as_str)
            .unwrap_or_default();
        if current != expected_updated_at {
            return Err(StoreError::write_conflict(collection, id));
        }

        self.put(collection, id, merged(existing, patch))
    }

    /// Appends `value` to the array field `field` of an existing record.
    ///
    /// The field is created as an empty array if absent. Fails with
    /// [`StoreError::RecordNotFound`] if the record does not exist and
    /// [`StoreError::FieldNotAppendable`] if the field holds a non-array
    /// value. Subject to the same read-modify-write caveat as
    /// [`Store::update`].
    pub fn append(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        value: Value,
    ) -> StoreResult<Record> {
        let mut record = self
            .get(collection, id)?
            .ok_or_else(|| StoreError::record_not_found(collection, id))?;

        match record.get_mut(field) {
            Some(Value::Array(items)) => items.push(value),
            Some(_) => return Err(StoreError::field_not_appendable(field)),
            None => {
                record.insert(field.to_string(), Value::Array(vec![value]));
            }
        }

        self.put(collection, id, record)
    }

    /// Deletes a record. Returns whether a record existed and was removed.
    ///
    /// Deleting an already absent record is not an error; any other
    /// filesystem failure (for example permission denied) is surfaced.
    pub fn remove(&self, collection: &str, id: &str) -> StoreResult<bool> {
        let collection = sanitize(collection)?;
        let id = sanitize(id)?;

        match fs::remove_file(self.record_path(&collection, &id)) {
            Ok(()) => {
                debug!(collection = %collection, id = %id, "record deleted");
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Checks whether a record exists, without reading its content.
    pub fn exists(&self, collection: &str, id: &str) -> StoreResult<bool> {
        let collection = sanitize(collection)?;
        let id = sanitize(id)?;
        match fs::metadata(self.record_path(&collection, &id)) {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Counts records in a collection.
    ///
    /// Without a filter this is a directory-entry count and reads no file
    /// content. With a filter it is equivalent to `find(...).len()`.
    pub fn count(&self, collection: &str, filter: Option<&Fields>) -> StoreResult<usize> {
        if let Some(filter) = filter {
            return Ok(self.find(collection, filter)?.len());
        }

        let collection = sanitize(collection)?;
        let entries = match fs::read_dir(self.collection_dir(&collection)) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e.into()),
        };

        let mut count = 0;
        for entry in entries {
            if record_stem(&entry?.path()).is_some() {
                count += 1;
            }
        }
        Ok(count)
    }

    /// Checks whether `value` is unique for `field` across a collection.
    ///
    /// Returns `false` if any record other than `exclude_id` already holds
    /// `value` in `field`. Used by external validation layers for
    /// "no duplicate title" style checks.
    pub fn is_unique(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
        exclude_id: Option<&str>,
    ) -> StoreResult<bool> {
        // Stored `_id` values are sanitized, so the exclusion must be too,
        // or a raw spelling would fail to match its own record.
        let exclude_id = exclude_id.map(sanitize).transpose()?;

        let mut filter = Fields::new();
        filter.insert(field.to_string(), value.clone());

        let taken = self.find(collection, &filter)?.into_iter().any(|record| {
            match (
                record.get(FIELD_ID).and_then(Value::as_str),
                exclude_id.as_deref(),
            ) {
                (Some(id), Some(excluded)) => id != excluded,
                _ => true,
            }
        });

        Ok(!taken)
    }

    /// Serializes a record according to the configured encoding.
    pub(crate) fn encode(&self, record: &Record) -> StoreResult<Vec<u8>> {
        let mut bytes = if self.config.pretty {
            serde_json::to_vec_pretty(record).map_err(StoreError::Serialize)?
        } else {
            serde_json::to_vec(record).map_err(StoreError::Serialize)?
        };
        bytes.push(b'\n');
        Ok(bytes)
    }

    /// Path of a collection directory. Expects a sanitized name.
    pub(crate) fn collection_dir(&self, collection: &str) -> PathBuf {
        self.config.base_dir.join(collection)
    }

    /// Path of a record file. Expects sanitized components.
    pub(crate) fn record_path(&self, collection: &str, id: &str) -> PathBuf {
        self.collection_dir(collection)
            .join(format!("{id}.{RECORD_EXT}"))
    }
}

/// Shallow merge: `patch` keys override, everything else is preserved.
fn merged(mut base: Fields, patch: Fields) -> Fields {
    for (key, value) in patch {
        base.insert(key, value);
    }
    base
}

/// Returns the record id for a path that looks like a record file, or
/// `None` for temp files and foreign extensions.
pub(crate) fn record_stem(path: &Path) -> Option<&str> {
    if path.extension()? != RECORD_EXT {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    if stem.is_empty() {
        return None;
    }
    Some(stem)
}

/// Recursively creates a directory with the given permission bits.
#[cfg(unix)]
pub(crate) fn create_dir_all_with_mode(path: &Path, mode: u32) -> io::Result<()> {
    use std::os::unix::fs::DirBuilderExt;
    fs::DirBuilder::new().recursive(true).mode(mode).create(path)
}

#[cfg(not(unix))]
pub(crate) fn create_dir_all_with_mode(path: &Path, _mode: u32) -> io::Result<()> {
    fs::create_dir_all(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{FIELD_CREATED_AT, FIELD_ID, FIELD_UPDATED_AT};
    use serde_json::json;
    use tempfile::tempdir;

    fn test_store() -> (tempfile::TempDir, Store) {
        let dir = tempdir().unwrap();
        let store = Store::open(StoreConfig::new(dir.path().join("db"))).unwrap();
        (dir, store)
    }

    fn fields(value: serde_json::Value) -> Fields {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn open_creates_base_dir() {
        let dir = tempdir().unwrap();
        let base = dir.path().join("nested").join("db");

        let store = Store::open(StoreConfig::new(&base)).unwrap();
        assert!(base.is_dir());
        assert_eq!(store.base_dir(), base);
    }

    #[test]
    fn put_then_get_round_trips() {
        let (_dir, store) = test_store();

        let written = store
            .put("notes", "n1", fields(json!({"title": "Biology", "pinned": true})))
            .unwrap();
        let read = store.get("notes", "n1").unwrap().unwrap();

        assert_eq!(read, written);
        assert_eq!(read["title"], json!("Biology"));
        assert_eq!(read[FIELD_ID], json!("n1"));
        assert!(read.contains_key(FIELD_CREATED_AT));
        assert!(read.contains_key(FIELD_UPDATED_AT));
    }

    #[test]
    fn collection_dir_is_created_lazily() {
        let (_dir, store) = test_store();

        assert!(!store.base_dir().join("notes").exists());
        store.put("notes", "n1", Fields::new()).unwrap();
        assert!(store.base_dir().join("notes").is_dir());
    }

    #[test]
    fn rewrite_preserves_created_at_and_advances_updated_at() {
        let (_dir, store) = test_store();

        let first = store.put("notes", "n1", fields(json!({"v": 1}))).unwrap();
        std::thread::sleep(std::time::Duration::from_millis(5));
        let second = store.put("notes", "n1", fields(json!({"v": 2}))).unwrap();

        assert_eq!(first[FIELD_CREATED_AT], second[FIELD_CREATED_AT]);
        assert_eq!(first[FIELD_ID], second[FIELD_ID]);
        assert!(
            second[FIELD_UPDATED_AT].as_str().unwrap() > first[FIELD_UPDATED_AT].as_str().unwrap()
        );
    }

    #[test]
    fn get_missing_record_is_none() {
        let (_dir, store) = test_store();
        assert!(store.get("notes", "missing").unwrap().is_none());
    }

    #[test]
    fn all_on_missing_collection_is_empty() {
        let (_dir, store) = test_store();
        assert!(store.all("nothing_here").unwrap().is_empty());
    }

    #[test]
    fn all_returns_every_record() {
        let (_dir, store) = test_store();
        for i in 0..5 {
            store
                .put("notes", &format!("n{i}"), fields(json!({"i": i})))
                .unwrap();
        }

        let records = store.all("notes").unwrap();
        assert_eq!(records.len(), 5);
    }

    #[test]
    fn all_ignores_temp_and_foreign_files() {
        let (_dir, store) = test_store();
        store.put("notes", "n1", Fields::new()).unwrap();

        let dir = store.base_dir().join("notes");
        fs::write(dir.join(".n2.json.deadbeef.tmp"), b"{ partial").unwrap();
        fs::write(dir.join("README.txt"), b"not a record").unwrap();

        assert_eq!(store.all("notes").unwrap().len(), 1);
        assert_eq!(store.count("notes", None).unwrap(), 1);
    }

    #[test]
    fn update_merges_shallowly() {
        let (_dir, store) = test_store();
        store
            .put("notes", "n1", fields(json!({"title": "Bio", "status": "draft"})))
            .unwrap();

        let updated = store
            .update("notes", "n1", fields(json!({"status": "done"})))
            .unwrap();

        assert_eq!(updated["title"], json!("Bio"));
        assert_eq!(updated["status"], json!("done"));
    }

    #[test]
    fn update_missing_record_fails() {
        let (_dir, store) = test_store();
        let result = store.update("notes", "ghost", Fields::new());
        assert!(matches!(result, Err(StoreError::RecordNotFound { .. })));
    }

    #[test]
    fn update_checked_detects_stale_timestamp() {
        let (_dir, store) = test_store();
        let original = store.put("notes", "n1", fields(json!({"v": 1}))).unwrap();
        let seen = original[FIELD_UPDATED_AT].as_str().unwrap().to_string();

        // Another writer commits in between.
        std::thread::sleep(std::time::Duration::from_millis(5));
        store.put("notes", "n1", fields(json!({"v": 2}))).unwrap();

        let result = store.update_checked("notes", "n1", fields(json!({"v": 3})), &seen);
        assert!(matches!(result, Err(StoreError::WriteConflict { .. })));

        // The record is untouched by the failed update.
        assert_eq!(store.get("notes", "n1").unwrap().unwrap()["v"], json!(2));
    }

    #[test]
    fn update_checked_succeeds_with_current_timestamp() {
        let (_dir, store) = test_store();
        let original = store.put("notes", "n1", fields(json!({"v": 1}))).unwrap();
        let seen = original[FIELD_UPDATED_AT].as_str().unwrap();

        let updated = store
            .update_checked("notes", "n1", fields(json!({"v": 2})), seen)
            .unwrap();
        assert_eq!(updated["v"], json!(2));
    }

    #[test]
    fn append_creates_missing_field() {
        let (_dir, store) = test_store();
        store.put("decks", "d1", Fields::new()).unwrap();

        let updated = store.append("decks", "d1", "cards", json!("c1")).unwrap();
        assert_eq!(updated["cards"], json!(["c1"]));
    }

    #[test]
    fn append_extends_existing_array() {
        let (_dir, store) = test_store();
        store
            .put("decks", "d1", fields(json!({"cards": ["c1"]})))
            .unwrap();

        let updated = store.append("decks", "d1", "cards", json!("c2")).unwrap();
        assert_eq!(updated["cards"], json!(["c1", "c2"]));
    }

    #[test]
    fn append_to_non_array_fails() {
        let (_dir, store) = test_store();
        store
            .put("decks", "d1", fields(json!({"cards": "not an array"})))
            .unwrap();

        let result = store.append("decks", "d1", "cards", json!("c2"));
        assert!(matches!(result, Err(StoreError::FieldNotAppendable { .. })));
    }

    #[test]
    fn append_to_missing_record_fails() {
        let (_dir, store) = test_store();
        let result = store.append("decks", "ghost", "cards", json!("c1"));
        assert!(matches!(result, Err(StoreError::RecordNotFound { .. })));
    }

    #[test]
    fn remove_semantics() {
        let (_dir, store) = test_store();
        store.put("notes", "n1", Fields::new()).unwrap();

        assert!(store.remove("notes", "n1").unwrap());
        assert!(!store.exists("notes", "n1").unwrap());
        // Already absent: false, not an error.
        assert!(!store.remove("notes", "n1").unwrap());
    }

    #[test]
    fn exists_does_not_create_anything() {
        let (_dir, store) = test_store();
        assert!(!store.exists("notes", "n1").unwrap());
        assert!(!store.base_dir().join("notes").exists());
    }

    #[test]
    fn count_without_filter() {
        let (_dir, store) = test_store();
        assert_eq!(store.count("notes", None).unwrap(), 0);

        store.put("notes", "a", Fields::new()).unwrap();
        store.put("notes", "b", Fields::new()).unwrap();
        assert_eq!(store.count("notes", None).unwrap(), 2);
    }

    #[test]
    fn count_with_filter() {
        let (_dir, store) = test_store();
        store
            .put("tasks", "t1", fields(json!({"status": "done"})))
            .unwrap();
        store
            .put("tasks", "t2", fields(json!({"status": "open"})))
            .unwrap();

        let filter = fields(json!({"status": "done"}));
        assert_eq!(store.count("tasks", Some(&filter)).unwrap(), 1);
    }

    #[test]
    fn hostile_ids_stay_inside_base_dir() {
        let (_dir, store) = test_store();

        let record = store
            .put("notes", "../../etc/passwd", fields(json!({"x": 1})))
            .unwrap();

        assert_eq!(record[FIELD_ID], json!(".._.._etc_passwd"));
        let stored = store.base_dir().join("notes").join(".._.._etc_passwd.json");
        assert!(stored.is_file());
        // Nothing escaped the base directory.
        assert!(store.get("notes", "../../etc/passwd").unwrap().is_some());
    }

    #[test]
    fn equivalent_raw_names_address_the_same_record() {
        let (_dir, store) = test_store();

        store.put("my notes", "a b", fields(json!({"v": 1}))).unwrap();
        let read = store.get("my_notes", "a_b").unwrap().unwrap();
        assert_eq!(read["v"], json!(1));
    }

    #[test]
    fn invalid_names_rejected_before_filesystem_access() {
        let (_dir, store) = test_store();

        assert!(matches!(
            store.put("..", "x", Fields::new()),
            Err(StoreError::InvalidName { .. })
        ));
        assert!(matches!(
            store.get("notes", ""),
            Err(StoreError::InvalidName { .. })
        ));
    }

    #[test]
    fn is_unique_checks() {
        let (_dir, store) = test_store();
        store
            .put("subjects", "s1", fields(json!({"name": "Biology"})))
            .unwrap();

        assert!(!store
            .is_unique("subjects", "name", &json!("Biology"), None)
            .unwrap());
        assert!(store
            .is_unique("subjects", "name", &json!("Chemistry"), None)
            .unwrap());
        // Excluding the record that holds the value makes it unique again.
        assert!(store
            .is_unique("subjects", "name", &json!("Biology"), Some("s1"))
            .unwrap());
    }

    #[test]
    fn is_unique_excludes_the_raw_spelling_of_an_id() {
        let (_dir, store) = test_store();
        store
            .put("subjects", "a b", fields(json!({"name": "Biology"})))
            .unwrap();

        // The record landed under the sanitized id; both spellings must
        // exclude it, like every other id-taking operation.
        assert!(store
            .is_unique("subjects", "name", &json!("Biology"), Some("a b"))
            .unwrap());
        assert!(store
            .is_unique("subjects", "name", &json!("Biology"), Some("a_b"))
            .unwrap());
        assert!(matches!(
            store.is_unique("subjects", "name", &json!("Biology"), Some("")),
            Err(StoreError::InvalidName { .. })
        ));
    }

    // ENOTDIR is Unix; Windows folds it into path-not-found.
    #[cfg(unix)]
    #[test]
    fn exists_surfaces_metadata_errors() {
        let (_dir, store) = test_store();
        // A foreign file squatting on the collection path is an I/O
        // failure, not an absent record.
        fs::write(store.base_dir().join("notes"), b"not a directory").unwrap();

        assert!(matches!(
            store.exists("notes", "n1"),
            Err(StoreError::Io(_))
        ));
    }

    #[test]
    fn compact_encoding_is_honored() {
        let dir = tempdir().unwrap();
        let store = Store::open(StoreConfig::new(dir.path().join("db")).pretty(false)).unwrap();

        store.put("notes", "n1", fields(json!({"a": 1}))).unwrap();
        let raw = fs::read_to_string(store.base_dir().join("notes").join("n1.json")).unwrap();
        assert_eq!(raw.lines().count(), 1);
    }

    #[test]
    fn pretty_encoding_preserves_unicode_and_slashes() {
        let (_dir, store) = test_store();
        store
            .put("notes", "n1", fields(json!({"title": "数学 / Ανάλυση"})))
            .unwrap();

        let raw = fs::read_to_string(store.base_dir().join("notes").join("n1.json")).unwrap();
        assert!(raw.contains("数学 / Ανάλυση"));
        assert!(!raw.contains("\\/"));
        assert!(!raw.contains("\\u"));
    }
}
