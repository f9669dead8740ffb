//! High-level archive operations on the file system
//!
//! These wrap [`FjsysReader`](crate::archive::FjsysReader) and
//! [`FjsysWriter`](crate::archive::FjsysWriter) for the common cases: unpack
//! an archive into a directory, pack a directory into an archive, and
//! summarise an archive.
//!
//! # Example
//! ```no_run
//! use fjsys::codec::CodecRegistry;
//! use fjsys::operations::FjsysOperations;
//! use fjsys::options::UnpackOptions;
//!
//! let codecs = CodecRegistry::default();
//! FjsysOperations::extract_with_progress(
//!     "data.bin",
//!     "data",
//!     &codecs,
//!     &UnpackOptions::default(),
//!     &|progress| {
//!         if let Some(file) = &progress.current_file {
//!             println!("{}/{}: {file}", progress.current, progress.total);
//!         }
//!     },
//! )?;
//! # Ok::<(), fjsys::Error>(())
//! ```

mod create;
mod extract;
mod helpers;
mod inspect;

pub use crate::archive::ProgressCallback;
pub use inspect::ArchiveInfo;

/// Stateless namespace for archive operations.
pub struct FjsysOperations;
