//! # Fjsys
//!
//! A pure-Rust library for the FJSYS archive format used by visual novel
//! engines, together with the MGD image container and MSD script
//! encryption found inside those archives.
//!
//! ## Supported Formats
//!
//! - **FJSYS archives** - Unpack, pack, list and inspect
//! - **MGD images** - PNG payloads are unwrapped on unpack and wrapped on pack
//! - **MSD scripts** - Decrypted with a named or raw key
//!
//! ## Quick Start
//!
//! ```no_run
//! use fjsys::prelude::*;
//!
//! let codecs = CodecRegistry::default();
//!
//! // Unpack an archive into a directory
//! FjsysOperations::extract("scripts.bin", "scripts", &codecs, &UnpackOptions::default())?;
//!
//! // And pack it back up; the table is sorted the way the engine expects
//! FjsysOperations::create("scripts", "scripts_new.bin", &codecs, &PackOptions::default())?;
//! # Ok::<(), fjsys::Error>(())
//! ```
//!
//! ### Working with streams
//!
//! ```
//! use std::io::Cursor;
//! use fjsys::prelude::*;
//!
//! let codecs = CodecRegistry::default();
//! let mut archive = Cursor::new(Vec::new());
//! pack(
//!     &mut archive,
//!     vec![ArchiveFile::new("b.txt", "two"), ArchiveFile::new("a.txt", "one")],
//!     &codecs,
//!     &PackOptions::default(),
//! )?;
//!
//! archive.set_position(0);
//! let mut reader = FjsysReader::open(archive)?;
//! let options = UnpackOptions::default();
//! let names: Vec<String> = reader
//!     .unpack(&codecs, &options)?
//!     .map(|file| file.map(|f| f.name_lossy()))
//!     .collect::<fjsys::Result<_>>()?;
//! assert_eq!(names, ["a.txt", "b.txt"]);
//! # Ok::<(), fjsys::Error>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` - Enables the `fjsys` command-line binary

pub mod archive;
pub mod codec;
pub mod error;
pub mod operations;
pub mod options;

// Re-exports for convenience
pub use error::{Error, Result};

/// Prelude module for common imports
pub mod prelude {
    pub use crate::archive::{
        ArchiveFile, ArchivePhase, ArchiveProgress, Collation, FjsysHeader, FjsysReader,
        FjsysWriter, TableEntry, is_fjsys, pack,
    };
    pub use crate::codec::{CodecRegistry, KeyRegistry, MgdCodec, MsdCodec};
    pub use crate::error::{Error, Result};
    pub use crate::operations::{ArchiveInfo, FjsysOperations};
    pub use crate::options::{PackOptions, UnpackOptions};
}

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// CLI module (feature-gated)
#[cfg(feature = "cli")]
pub mod cli;
