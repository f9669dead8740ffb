//! Error types for `Fjsys`

use thiserror::Error;

use crate::codec::CodecError;

/// The error type for `Fjsys` operations.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum Error {
    // ==================== IO Errors ====================
    /// IO error from the underlying stream or file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ==================== FJSYS Format Errors ====================
    /// The stream does not start with the FJSYS signature.
    #[error("invalid FJSYS magic: found {found:02x?}")]
    InvalidMagic {
        /// The eight bytes found where the signature was expected.
        found: [u8; 8],
    },

    /// The stream ended before the full header record could be read.
    #[error("truncated FJSYS header")]
    TruncatedHeader,

    /// The name blob is larger than the header region that should contain it.
    #[error("name blob of {file_names_size} bytes does not fit header size {header_size}")]
    InvalidHeader {
        /// Header size field.
        header_size: u32,
        /// Name blob size field.
        file_names_size: u32,
    },

    /// The stream ended inside a table record.
    #[error("truncated table record at index {index}")]
    TruncatedTable {
        /// Table index of the record being read.
        index: u32,
    },

    /// A file name ran to the end of the stream without a NUL terminator.
    #[error("file name for table index {index} has no NUL terminator")]
    UnterminatedName {
        /// Table index of the entry owning the name.
        index: u32,
    },

    /// The stream ended before an entry's data block was complete.
    #[error("truncated data block at index {index}: expected {expected} bytes")]
    TruncatedData {
        /// Table index of the entry owning the data.
        index: u32,
        /// Size recorded in the table.
        expected: u32,
    },

    // ==================== Packing Limits ====================
    /// A file name contains a NUL byte and cannot be stored in the name blob.
    #[error("file name contains a NUL byte: {name}")]
    NameContainsNul {
        /// Lossy rendering of the offending name.
        name: String,
    },

    /// An encoded entry does not fit the 32-bit size field.
    #[error("entry {name} is too large: {size} bytes")]
    EntryTooLarge {
        /// Lossy rendering of the entry name.
        name: String,
        /// Encoded size in bytes.
        size: usize,
    },

    /// More entries than the 32-bit count field can describe.
    #[error("too many entries: {count}")]
    TooManyEntries {
        /// Number of entries supplied.
        count: usize,
    },

    /// The table plus name blob exceeds the 32-bit header size field.
    #[error("archive header region too large: {size} bytes")]
    HeaderTooLarge {
        /// Required header region size.
        size: u64,
    },

    // ==================== Codec Errors ====================
    /// Error surfaced unchanged from the image or script codec.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    // ==================== Key Registry / Config Errors ====================
    /// The requested script key name is not in the registry.
    #[error("unknown script key '{name}' (known: {})", .known.join(", "))]
    UnknownScriptKey {
        /// The name that was requested.
        name: String,
        /// Names available in the registry.
        known: Vec<String>,
    },

    /// The key registry document could not be parsed.
    #[error("invalid key registry: {0}")]
    KeyConfig(#[from] toml::de::Error),

    // ==================== File System Errors ====================
    /// Invalid file path, or an entry name that would escape the output directory.
    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// Directory traversal error.
    #[error("directory walk error: {0}")]
    WalkDirError(String),
}

impl Error {
    /// Returns true for structural FJSYS format errors (bad magic, truncation,
    /// missing NUL terminator).
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            Error::InvalidMagic { .. }
                | Error::TruncatedHeader
                | Error::InvalidHeader { .. }
                | Error::TruncatedTable { .. }
                | Error::UnterminatedName { .. }
                | Error::TruncatedData { .. }
        )
    }
}

impl From<walkdir::Error> for Error {
    fn from(err: walkdir::Error) -> Self {
        Error::WalkDirError(err.to_string())
    }
}

/// A specialized Result type for `Fjsys` operations.
pub type Result<T> = std::result::Result<T, Error>;
