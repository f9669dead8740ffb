//! FJSYS archive format reader/writer
//!
//! FJSYS bundles the images and scripts of a title into one file. The engine
//! addresses assets by their position in the file table rather than by name,
//! so the writer must reproduce the table order the original tooling used.
//!
//! | Offset | Size | Field |
//! |---|---|---|
//! | 0 | 8 | magic `"FJSYS\0\0\0"` |
//! | 8 | 4 | header size (table + name blob, counted from offset 0) |
//! | 12 | 4 | name blob size |
//! | 16 | 4 | file count |
//! | 20 | 64 | reserved |
//! | 84 | 16 × count | table records |
//! | header size − name blob size | name blob size | NUL-terminated names |
//! | header size | … | data blocks |

mod cursor;
mod order;
mod reader;
mod types;
mod writer;

pub use order::{Collation, engine_collation_key};
pub(crate) use reader::read_entry_data;
pub use reader::{FjsysReader, Unpack, is_fjsys};
pub use types::*;
pub use writer::{FjsysWriter, pack};

/// FJSYS magic bytes
pub const MAGIC: [u8; 8] = *b"FJSYS\0\0\0";

/// Bytes of the header record left reserved
pub const RESERVED_SIZE: usize = 64;

/// Size of the fixed header record following the magic
pub const HEADER_RECORD_SIZE: usize = 12 + RESERVED_SIZE;

/// Offset of the first table record (magic + header record)
pub const TABLE_START: u64 = 0x54;

/// Size of one on-disk table record
pub const TABLE_ENTRY_SIZE: usize = 16;

/// Progress callback for archive operations.
///
/// Must be `Sync + Send` since it is called from rayon workers.
pub type ProgressCallback<'a> = &'a (dyn Fn(&ArchiveProgress) + Sync + Send);
