//! Locked record reads.

use crate::error::{StoreError, StoreResult};
use crate::record::Record;
use fs2::FileExt;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Reads and deserializes the record at `path`.
///
/// The file is read in full under a shared advisory lock, so concurrent
/// readers proceed in parallel while an in-progress exclusive write to the
/// same handle is excluded. Since writers only ever rename a fully-written
/// temp file into place, a reader never observes a torn record.
///
/// A missing file is a legitimate outcome and returns `Ok(None)`. Content
/// that fails to deserialize indicates corruption and is surfaced as a
/// hard error, never as "not found".
pub fn read_record(path: &Path, collection: &str, id: &str) -> StoreResult<Option<Record>> {
    let mut file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    FileExt::lock_shared(&file)?;
    let mut buf = Vec::new();
    let read_result = file.read_to_end(&mut buf);
    let _ = FileExt::unlock(&file);
    drop(file);
    read_result?;

    match serde_json::from_slice::<Record>(&buf) {
        Ok(record) => Ok(Some(record)),
        Err(source) => Err(StoreError::corrupt(collection, id, source)),
    }
}
