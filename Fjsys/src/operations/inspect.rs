//! Listing and summaries

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::Serialize;

use super::FjsysOperations;
use crate::archive::{FjsysHeader, FjsysReader, TableEntry};
use crate::codec::{CodecRegistry, Handler};
use crate::error::Result;

/// Summary of an archive, computed from its header and table only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArchiveInfo {
    pub file_count: u32,
    pub header_size: u32,
    pub file_names_size: u32,
    /// Whether the name blob directly follows the table
    pub consistent: bool,
    /// Sum of all data block sizes
    pub data_size: u64,
    /// Size of the archive file on disk
    pub archive_size: u64,
    /// Entries the image codec would handle, judged by name
    pub image_count: usize,
    /// Entries the script codec would handle, judged by name
    pub script_count: usize,
}

impl ArchiveInfo {
    fn new(
        header: &FjsysHeader,
        entries: &[TableEntry],
        archive_size: u64,
        codecs: &CodecRegistry,
    ) -> Self {
        let mut image_count = 0;
        let mut script_count = 0;
        for entry in entries {
            match codecs.encode_handler(&entry.name, &[]) {
                Some(Handler::Image) => image_count += 1,
                Some(Handler::Script) => script_count += 1,
                None => {}
            }
        }

        Self {
            file_count: header.file_count,
            header_size: header.header_size,
            file_names_size: header.file_names_size,
            consistent: header.is_consistent(),
            data_size: entries.iter().map(|e| u64::from(e.data_size)).sum(),
            archive_size,
            image_count,
            script_count,
        }
    }
}

impl FjsysOperations {
    /// List the table of an archive without reading any data blocks.
    ///
    /// # Errors
    /// Returns an IO error if the file cannot be opened, or a format error
    /// for a malformed archive.
    pub fn list<P: AsRef<Path>>(archive: P) -> Result<Vec<TableEntry>> {
        let mut reader = FjsysReader::open(BufReader::new(File::open(archive.as_ref())?))?;
        reader.list()
    }

    /// Summarise an archive.
    ///
    /// # Errors
    /// Same as [`list`](Self::list).
    pub fn info<P: AsRef<Path>>(archive: P, codecs: &CodecRegistry) -> Result<ArchiveInfo> {
        let file = File::open(archive.as_ref())?;
        let archive_size = file.metadata()?.len();
        let mut reader = FjsysReader::open(BufReader::new(file))?;
        let entries = reader.list()?;
        Ok(ArchiveInfo::new(reader.header(), &entries, archive_size, codecs))
    }
}
