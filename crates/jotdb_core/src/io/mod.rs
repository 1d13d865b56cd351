//! File I/O primitives: atomic writes and locked reads.
//!
//! The writer and reader together give the store its core safety property:
//! a reader always observes either the fully-previous or the fully-new
//! version of a record file, never a torn intermediate state. Writes land
//! in a uniquely-named temp file in the target's directory and are
//! published by a single `rename`; reads take a shared advisory lock for
//! the duration of the read.

mod reader;
mod writer;

pub use reader::read_record;
pub use writer::write_atomic;
