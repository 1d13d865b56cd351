//! Atomic record writes.

use crate::error::StoreResult;
use fs2::FileExt;
use rand::rngs::OsRng;
use rand::RngCore;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Removes the temp file on drop unless the write committed.
///
/// Every exit path after temp-file creation goes through this guard, so a
/// failed write never leaves a straggler behind and never publishes a
/// partially-written file.
struct TempGuard {
    path: PathBuf,
    armed: bool,
}

impl TempGuard {
    fn new(path: PathBuf) -> Self {
        Self { path, armed: true }
    }

    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for TempGuard {
    fn drop(&mut self) {
        if self.armed {
            let _ = fs::remove_file(&self.path);
        }
    }
}

/// Writes `bytes` to `target` atomically.
///
/// The payload lands in a uniquely-named temp file in the same directory
/// as `target` (same filesystem, so the final rename is atomic), under an
/// exclusive advisory lock that is held until the payload is flushed. The
/// configured permission bits are applied to the temp file before it is
/// renamed into place. Concurrent readers of `target` only ever observe
/// the previous or the new version.
///
/// # Errors
///
/// Any I/O failure is surfaced after the temp file has been removed.
pub fn write_atomic(target: &Path, bytes: &[u8], file_mode: u32) -> StoreResult<()> {
    let dir = target.parent().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("target has no parent directory: {}", target.display()),
        )
    })?;
    let file_name = target.file_name().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("target has no file name: {}", target.display()),
        )
    })?;

    let temp_path = dir.join(format!(
        ".{}.{:08x}.tmp",
        file_name.to_string_lossy(),
        OsRng.next_u32()
    ));

    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&temp_path)?;
    let mut guard = TempGuard::new(temp_path.clone());

    FileExt::lock_exclusive(&file)?;
    file.write_all(bytes)?;
    file.flush()?;
    file.sync_all()?;
    apply_mode(&file, file_mode)?;
    FileExt::unlock(&file)?;
    drop(file);

    fs::rename(&temp_path, target)?;
    guard.disarm();

    Ok(())
}

#[cfg(unix)]
fn apply_mode(file: &fs::File, mode: u32) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    file.set_permissions(fs::Permissions::from_mode(mode))
}

#[cfg(not(unix))]
fn apply_mode(_file: &fs::File, _mode: u32) -> io::Result<()> {
    // Permission bits are a Unix concept; other platforms keep defaults.
    Ok(())
}
