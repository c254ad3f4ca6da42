//! `rowkit_io_fs` v1:
//! Scoped temporary resources used to spool row documents to disk.
//!
//! Modules:
//! - `spec` : options and errors
//! - `temp` : temp directory + file container with exactly-once cleanup

pub mod spec;
pub mod temp;

pub use spec::{SpecTempResourceOptions, TempResourceError};
pub use temp::TempResourceContainer;
