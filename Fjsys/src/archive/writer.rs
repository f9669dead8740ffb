//! SPDX-FileCopyrightText: 2025 CyberDeco
//! SPDX-License-Identifier: MIT
//!
//! FJSYS archive writer

use std::io::{self, Read, Seek, SeekFrom, Write};
use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;

use super::{
    ArchiveFile, ArchivePhase, ArchiveProgress, FjsysHeader, MAGIC, ProgressCallback,
    TABLE_ENTRY_SIZE, TABLE_START, TableRecord,
};
use crate::codec::CodecRegistry;
use crate::error::{Error, Result};
use crate::options::PackOptions;

/// Pack `files` into `sink` with the given options.
///
/// Shorthand for building an [`FjsysWriter`] and calling
/// [`FjsysWriter::write`].
///
/// # Errors
/// See [`FjsysWriter::write`].
pub fn pack<W, I>(
    sink: &mut W,
    files: I,
    codecs: &CodecRegistry,
    options: &PackOptions,
) -> Result<FjsysHeader>
where
    W: Write + Seek,
    I: IntoIterator<Item = ArchiveFile>,
{
    FjsysWriter::with_options(*options)
        .add_files(files)
        .write(sink, codecs)
}

/// A data block that has been written, waiting for its table record.
struct WrittenEntry {
    name: Vec<u8>,
    data_size: u32,
    data_origin: u64,
}

/// FJSYS archive writer
///
/// Files are kept in insertion order until [`write`](Self::write), which
/// lays data blocks out in that order and sorts only the table.
#[derive(Debug, Default)]
pub struct FjsysWriter {
    files: Vec<ArchiveFile>,
    options: PackOptions,
}

impl FjsysWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: PackOptions) -> Self {
        Self {
            files: Vec::new(),
            options,
        }
    }

    /// Queue a file.
    #[must_use]
    pub fn add_file(mut self, file: ArchiveFile) -> Self {
        self.files.push(file);
        self
    }

    /// Queue several files.
    #[must_use]
    pub fn add_files(mut self, files: impl IntoIterator<Item = ArchiveFile>) -> Self {
        self.files.extend(files);
        self
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// Encode every queued file and write the archive to `sink`, starting at
    /// offset 0. The sink is left positioned at the end of the archive.
    ///
    /// Encoding runs in parallel before anything is written, so a codec
    /// failure leaves the sink untouched. A failure while writing can leave a
    /// partial archive behind.
    ///
    /// # Errors
    /// Returns an error if a name contains NUL, a size does not fit its
    /// 32-bit field, a codec fails, or the sink fails.
    pub fn write<W: Write + Seek>(
        self,
        sink: &mut W,
        codecs: &CodecRegistry,
    ) -> Result<FjsysHeader> {
        self.write_with_progress(sink, codecs, &|_| {})
    }

    /// Write the archive, reporting progress.
    ///
    /// # Errors
    /// See [`write`](Self::write).
    pub fn write_with_progress<W: Write + Seek>(
        self,
        sink: &mut W,
        codecs: &CodecRegistry,
        progress: ProgressCallback,
    ) -> Result<FjsysHeader> {
        let Self { files, options } = self;
        let header = plan_header(&files)?;
        let file_names_start = header.expected_file_names_start();
        let total = files.len();

        tracing::info!(
            "Packing {} files (header size {:#x})",
            header.file_count,
            header.header_size
        );

        let processed = AtomicUsize::new(0);
        let encoded = files
            .into_par_iter()
            .map(|file| {
                let current = processed.fetch_add(1, Ordering::SeqCst) + 1;
                progress(&ArchiveProgress::with_file(
                    ArchivePhase::EncodingFiles,
                    current,
                    total,
                    file.name_lossy(),
                ));
                let data = codecs.encode(&file.name, file.data)?;
                Ok((file.name, data))
            })
            .collect::<Result<Vec<_>>>()?;

        sink.seek(SeekFrom::Start(0))?;
        sink.write_all(&MAGIC)?;
        sink.write_all(&header.to_bytes())?;
        let fill = u64::from(header.header_size) - TABLE_START;
        io::copy(&mut io::repeat(0).take(fill), sink)?;

        let mut written = Vec::with_capacity(encoded.len());
        for (index, (name, data)) in encoded.into_iter().enumerate() {
            progress(&ArchiveProgress::with_file(
                ArchivePhase::WritingFiles,
                index + 1,
                total,
                String::from_utf8_lossy(&name),
            ));
            let data_size = u32::try_from(data.len()).map_err(|_| Error::EntryTooLarge {
                name: String::from_utf8_lossy(&name).into_owned(),
                size: data.len(),
            })?;
            let data_origin = sink.stream_position()?;
            sink.write_all(&data)?;

            tracing::debug!(
                "Wrote {} at {data_origin:#x} ({data_size} bytes)",
                String::from_utf8_lossy(&name)
            );
            written.push(WrittenEntry {
                name,
                data_size,
                data_origin,
            });
        }

        progress(&ArchiveProgress::new(ArchivePhase::WritingTable, total, total));
        options.collation.sort(&mut written, |entry| entry.name.as_slice());

        sink.seek(SeekFrom::Start(file_names_start))?;
        let mut records = Vec::with_capacity(written.len());
        let mut name_origin = 0u32;
        for entry in &written {
            sink.write_all(&entry.name)?;
            sink.write_all(&[0])?;
            records.push(TableRecord {
                name_origin,
                data_size: entry.data_size,
                data_origin: entry.data_origin,
            });
            // Fits: the whole blob was checked against u32 in `plan_header`
            name_origin += entry.name.len() as u32 + 1;
        }

        sink.seek(SeekFrom::Start(TABLE_START))?;
        for record in &records {
            sink.write_all(&record.to_bytes())?;
        }

        sink.seek(SeekFrom::End(0))?;
        sink.flush()?;

        progress(&ArchiveProgress::new(ArchivePhase::Complete, total, total));
        tracing::info!("Packed {} files", header.file_count);
        Ok(header)
    }
}

/// Validate names and work out the header fields.
fn plan_header(files: &[ArchiveFile]) -> Result<FjsysHeader> {
    let file_count = u32::try_from(files.len()).map_err(|_| Error::TooManyEntries {
        count: files.len(),
    })?;

    let mut file_names_size = 0u64;
    for file in files {
        if file.name.contains(&0) {
            return Err(Error::NameContainsNul {
                name: file.name_lossy(),
            });
        }
        file_names_size += file.name.len() as u64 + 1;
    }

    let table_end = TABLE_START + u64::from(file_count) * TABLE_ENTRY_SIZE as u64;
    let header_size = table_end + file_names_size;
    let too_large = || Error::HeaderTooLarge { size: header_size };

    Ok(FjsysHeader {
        header_size: u32::try_from(header_size).map_err(|_| too_large())?,
        file_names_size: u32::try_from(file_names_size).map_err(|_| too_large())?,
        file_count,
    })
}
