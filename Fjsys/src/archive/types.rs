//! FJSYS archive types

use byteorder::{ByteOrder, LittleEndian};

use super::{HEADER_RECORD_SIZE, TABLE_ENTRY_SIZE, TABLE_START};

/// Fixed header record of an FJSYS archive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FjsysHeader {
    /// Bytes spanned by magic, header, table and name blob
    pub header_size: u32,
    /// Bytes in the name blob, terminators included
    pub file_names_size: u32,
    /// Number of table records
    pub file_count: u32,
}

impl FjsysHeader {
    pub(crate) fn parse(bytes: &[u8; HEADER_RECORD_SIZE]) -> Self {
        Self {
            header_size: LittleEndian::read_u32(&bytes[0..4]),
            file_names_size: LittleEndian::read_u32(&bytes[4..8]),
            file_count: LittleEndian::read_u32(&bytes[8..12]),
        }
    }

    /// Header record bytes; the reserved tail is always zero.
    pub(crate) fn to_bytes(self) -> [u8; HEADER_RECORD_SIZE] {
        let mut bytes = [0u8; HEADER_RECORD_SIZE];
        LittleEndian::write_u32(&mut bytes[0..4], self.header_size);
        LittleEndian::write_u32(&mut bytes[4..8], self.file_names_size);
        LittleEndian::write_u32(&mut bytes[8..12], self.file_count);
        bytes
    }

    /// Offset of the name blob, or `None` if the name blob claims to be
    /// larger than the whole header region.
    pub fn file_names_start(&self) -> Option<u64> {
        self.header_size
            .checked_sub(self.file_names_size)
            .map(u64::from)
    }

    /// Where the name blob must start for a table of `file_count` records.
    pub fn expected_file_names_start(&self) -> u64 {
        u64::from(self.file_count) * TABLE_ENTRY_SIZE as u64 + TABLE_START
    }

    /// Whether the name blob directly follows the table, as every writer
    /// produces it.
    pub fn is_consistent(&self) -> bool {
        self.file_names_start() == Some(self.expected_file_names_start())
    }
}

/// One on-disk table record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableRecord {
    /// Name offset relative to the start of the name blob
    pub name_origin: u32,
    /// Size of the data block
    pub data_size: u32,
    /// Absolute offset of the data block
    pub data_origin: u64,
}

impl TableRecord {
    pub(crate) fn parse(bytes: &[u8; TABLE_ENTRY_SIZE]) -> Self {
        Self {
            name_origin: LittleEndian::read_u32(&bytes[0..4]),
            data_size: LittleEndian::read_u32(&bytes[4..8]),
            data_origin: LittleEndian::read_u64(&bytes[8..16]),
        }
    }

    pub(crate) fn to_bytes(self) -> [u8; TABLE_ENTRY_SIZE] {
        let mut bytes = [0u8; TABLE_ENTRY_SIZE];
        LittleEndian::write_u32(&mut bytes[0..4], self.name_origin);
        LittleEndian::write_u32(&mut bytes[4..8], self.data_size);
        LittleEndian::write_u64(&mut bytes[8..16], self.data_origin);
        bytes
    }
}

/// A table record resolved against the name blob
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableEntry {
    /// Position in the table; this is how the engine refers to the asset
    pub index: u32,
    /// Raw file name, without the terminator
    pub name: Vec<u8>,
    pub name_origin: u32,
    pub data_size: u32,
    pub data_origin: u64,
}

impl TableEntry {
    /// File name for display and file-system paths
    pub fn name_lossy(&self) -> String {
        String::from_utf8_lossy(&self.name).into_owned()
    }
}

/// A named asset going into or coming out of an archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveFile {
    /// Raw file name; must not contain NUL
    pub name: Vec<u8>,
    /// Decoded contents on unpack, plain contents on pack
    pub data: Vec<u8>,
}

impl ArchiveFile {
    pub fn new(name: impl Into<Vec<u8>>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
        }
    }

    /// File name for display and file-system paths
    pub fn name_lossy(&self) -> String {
        String::from_utf8_lossy(&self.name).into_owned()
    }
}

/// Progress information during archive operations
#[derive(Debug, Clone)]
pub struct ArchiveProgress {
    /// Current operation phase
    pub phase: ArchivePhase,
    /// Current item number (1-indexed)
    pub current: usize,
    /// Total number of items
    pub total: usize,
    /// Current file being processed (if applicable)
    pub current_file: Option<String>,
}

impl ArchiveProgress {
    /// Create a new progress update
    #[must_use]
    pub fn new(phase: ArchivePhase, current: usize, total: usize) -> Self {
        Self {
            phase,
            current,
            total,
            current_file: None,
        }
    }

    /// Create a progress update with a file name
    #[must_use]
    pub fn with_file(
        phase: ArchivePhase,
        current: usize,
        total: usize,
        file: impl Into<String>,
    ) -> Self {
        Self {
            phase,
            current,
            total,
            current_file: Some(file.into()),
        }
    }

    /// Get the progress percentage (0.0 - 1.0)
    #[must_use]
    pub fn percentage(&self) -> f32 {
        if self.total == 0 {
            1.0
        } else {
            self.current as f32 / self.total as f32
        }
    }
}

/// Phase of an archive operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchivePhase {
    /// Reading header and file table
    ReadingTable,
    /// Decoding entries (during extraction)
    DecodingFiles,
    /// Writing data blocks (during creation)
    WritingFiles,
    /// Scanning files in a directory (during creation)
    ScanningFiles,
    /// Encoding entries (during creation)
    EncodingFiles,
    /// Writing table and name blob
    WritingTable,
    /// Operation complete
    Complete,
}

impl ArchivePhase {
    /// Get a human-readable description of this phase
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ReadingTable => "Reading file table",
            Self::DecodingFiles => "Decoding files",
            Self::WritingFiles => "Writing files",
            Self::ScanningFiles => "Scanning files",
            Self::EncodingFiles => "Encoding files",
            Self::WritingTable => "Writing file table",
            Self::Complete => "Complete",
        }
    }
}
