//! Store configuration.

use std::path::PathBuf;

/// Configuration for opening a store.
///
/// All state is explicit; there are no process-wide defaults beyond the
/// values below.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Directory under which all collections live.
    pub base_dir: PathBuf,

    /// Permission bits applied to record files (Unix only).
    pub file_mode: u32,

    /// Permission bits applied to collection directories (Unix only).
    pub dir_mode: u32,

    /// Whether record files are pretty-printed. Disabling this produces
    /// compact single-line JSON.
    pub pretty: bool,
}

impl StoreConfig {
    /// Creates a configuration rooted at the given base directory.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            file_mode: 0o640,
            dir_mode: 0o750,
            pretty: true,
        }
    }

    /// Sets the permission bits for record files.
    #[must_use]
    pub const fn file_mode(mut self, mode: u32) -> Self {
        self.file_mode = mode;
        self
    }

    /// Sets the permission bits for collection directories.
    #[must_use]
    pub const fn dir_mode(mut self, mode: u32) -> Self {
        self.dir_mode = mode;
        self
    }

    /// Sets whether record files are pretty-printed.
    #[must_use]
    pub const fn pretty(mut self, value: bool) -> Self {
        self.pretty = value;
        self
    }
}
