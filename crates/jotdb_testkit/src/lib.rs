//! # jotdb Testkit
//!
//! Test utilities for jotdb.
//!
//! This crate provides:
//! - Temp-directory store fixtures with automatic cleanup
//! - Record builders for common study-app shapes
//!
//! The workspace's integration suites (concurrency, atomicity, backup
//! fidelity, path safety) live in this crate's `tests/` directory.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use jotdb_testkit::prelude::*;
//!
//! #[test]
//! fn test_with_store() {
//!     with_temp_store(|store| {
//!         store.put("notes", "n1", note("Biology", "cell structure")).unwrap();
//!     });
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod records;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::records::*;
}

pub use fixtures::*;
pub use records::*;
