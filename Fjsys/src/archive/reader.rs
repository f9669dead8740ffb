//! SPDX-FileCopyrightText: 2025 CyberDeco
//! SPDX-License-Identifier: MIT
//!
//! FJSYS archive reader

use std::io::{Read, Seek, SeekFrom};
use std::iter::FusedIterator;

use rayon::prelude::*;

use super::cursor::{Peek, read_block, read_exact_or, read_until_nul};
use super::{
    ArchiveFile, FjsysHeader, HEADER_RECORD_SIZE, MAGIC, TABLE_ENTRY_SIZE, TABLE_START,
    TableEntry, TableRecord,
};
use crate::codec::CodecRegistry;
use crate::error::{Error, Result};
use crate::options::UnpackOptions;

/// Check whether a stream starts with the FJSYS signature.
///
/// The stream position is left unchanged.
pub fn is_fjsys<R: Read + Seek>(reader: &mut R) -> Result<bool> {
    reader.peek(0, |r| -> Result<bool> {
        let mut magic = [0u8; MAGIC.len()];
        match read_exact_or(r, &mut magic, || Error::TruncatedHeader) {
            Ok(()) => Ok(magic == MAGIC),
            Err(Error::TruncatedHeader) => Ok(false),
            Err(err) => Err(err),
        }
    })
}

/// FJSYS archive reader
///
/// Construction validates the magic and reads the header record; the table
/// and data are only touched when listing or unpacking.
pub struct FjsysReader<R: Read + Seek> {
    reader: R,
    header: FjsysHeader,
}

impl<R: Read + Seek> FjsysReader<R> {
    /// Open an archive positioned at its first byte.
    ///
    /// Exactly eight bytes are consumed before a bad signature is reported.
    ///
    /// # Errors
    /// Returns [`Error::InvalidMagic`] for anything that is not an FJSYS
    /// archive, or a truncation error if the header record is incomplete.
    pub fn open(mut reader: R) -> Result<Self> {
        let mut magic = [0u8; MAGIC.len()];
        read_exact_or(&mut reader, &mut magic, || Error::InvalidMagic { found: [0; 8] })?;
        if magic != MAGIC {
            return Err(Error::InvalidMagic { found: magic });
        }

        let mut record = [0u8; HEADER_RECORD_SIZE];
        read_exact_or(&mut reader, &mut record, || Error::TruncatedHeader)?;
        let header = FjsysHeader::parse(&record);

        let Some(file_names_start) = header.file_names_start() else {
            return Err(Error::InvalidHeader {
                header_size: header.header_size,
                file_names_size: header.file_names_size,
            });
        };
        if !header.is_consistent() {
            tracing::warn!(
                "Name blob starts at {file_names_start:#x}, expected {:#x} for {} entries",
                header.expected_file_names_start(),
                header.file_count
            );
        }

        tracing::debug!(
            "FJSYS header: {} files, header size {:#x}, names {:#x}..{:#x}",
            header.file_count,
            header.header_size,
            file_names_start,
            header.header_size
        );

        Ok(Self { reader, header })
    }

    /// The parsed header record.
    pub fn header(&self) -> &FjsysHeader {
        &self.header
    }

    pub fn file_count(&self) -> u32 {
        self.header.file_count
    }

    /// Read the whole table, resolving every name.
    ///
    /// # Errors
    /// Returns a format error for a truncated table or an unterminated name.
    pub fn list(&mut self) -> Result<Vec<TableEntry>> {
        self.reader.seek(SeekFrom::Start(TABLE_START))?;
        let file_names_start = self.file_names_start();

        let mut entries = Vec::with_capacity(self.header.file_count.min(4096) as usize);
        for index in 0..self.header.file_count {
            entries.push(read_table_entry(&mut self.reader, index, file_names_start)?);
        }
        Ok(entries)
    }

    /// Read an entry's stored bytes without decoding them.
    ///
    /// # Errors
    /// Returns [`Error::TruncatedData`] if the stream ends inside the block.
    pub fn read_raw(&mut self, entry: &TableEntry) -> Result<Vec<u8>> {
        read_entry_data(&mut self.reader, entry)
    }

    /// Iterate over the archive's entries in table order, decoding each.
    ///
    /// The iterator is lazy: an entry is only read when it is requested.
    /// After the first error it yields nothing more.
    ///
    /// # Errors
    /// Returns an error if the stream cannot seek to the table.
    pub fn unpack<'a>(
        &'a mut self,
        codecs: &'a CodecRegistry,
        options: &'a UnpackOptions,
    ) -> Result<Unpack<'a, R>> {
        self.reader.seek(SeekFrom::Start(TABLE_START))?;
        let file_names_start = self.file_names_start();

        Ok(Unpack {
            reader: &mut self.reader,
            file_count: self.header.file_count,
            file_names_start,
            codecs,
            options,
            index: 0,
            done: false,
        })
    }

    /// Read every entry, then decode them in parallel.
    ///
    /// Results are in table order. Reads are sequential; only decoding is
    /// spread across threads.
    ///
    /// # Errors
    /// Returns the first format or codec error encountered.
    pub fn unpack_parallel(
        &mut self,
        codecs: &CodecRegistry,
        options: &UnpackOptions,
    ) -> Result<Vec<ArchiveFile>> {
        let entries = self.list()?;
        let raw = entries
            .into_iter()
            .map(|entry| {
                let data = self.read_raw(&entry)?;
                Ok((entry, data))
            })
            .collect::<Result<Vec<_>>>()?;

        let key = options.script_key();
        raw.into_par_iter()
            .map(|(entry, data)| {
                let data = codecs.decode(&entry.name, data, key)?;
                Ok(ArchiveFile {
                    name: entry.name,
                    data,
                })
            })
            .collect()
    }

    fn file_names_start(&self) -> u64 {
        // Checked in `open`
        self.header.file_names_start().unwrap_or_default()
    }
}

/// Lazy, forward-only iterator over decoded archive entries.
///
/// Created by [`FjsysReader::unpack`].
pub struct Unpack<'a, R: Read + Seek> {
    reader: &'a mut R,
    file_count: u32,
    file_names_start: u64,
    codecs: &'a CodecRegistry,
    options: &'a UnpackOptions,
    index: u32,
    done: bool,
}

impl<R: Read + Seek> Unpack<'_, R> {
    fn read_next(&mut self) -> Result<ArchiveFile> {
        let entry = read_table_entry(self.reader, self.index, self.file_names_start)?;
        let raw = read_entry_data(self.reader, &entry)?;
        let data = self
            .codecs
            .decode(&entry.name, raw, self.options.script_key())?;

        tracing::debug!(
            "Unpacked #{} {} ({} -> {} bytes)",
            entry.index,
            entry.name_lossy(),
            entry.data_size,
            data.len()
        );

        Ok(ArchiveFile {
            name: entry.name,
            data,
        })
    }
}

impl<R: Read + Seek> Iterator for Unpack<'_, R> {
    type Item = Result<ArchiveFile>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.index >= self.file_count {
            return None;
        }

        let result = self.read_next();
        self.index += 1;
        if result.is_err() {
            self.done = true;
        }
        Some(result)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.done {
            return (0, Some(0));
        }
        let remaining = (self.file_count - self.index) as usize;
        (0, Some(remaining))
    }
}

impl<R: Read + Seek> FusedIterator for Unpack<'_, R> {}

/// Read the table record at the current position and resolve its name.
///
/// Leaves the stream at the next record.
fn read_table_entry<R: Read + Seek>(
    reader: &mut R,
    index: u32,
    file_names_start: u64,
) -> Result<TableEntry> {
    let mut bytes = [0u8; TABLE_ENTRY_SIZE];
    read_exact_or(reader, &mut bytes, || Error::TruncatedTable { index })?;
    let record = TableRecord::parse(&bytes);

    let name_offset = file_names_start + u64::from(record.name_origin);
    let name = reader.peek(name_offset, |r| -> Result<Vec<u8>> {
        read_until_nul(r)?.ok_or(Error::UnterminatedName { index })
    })?;

    Ok(TableEntry {
        index,
        name,
        name_origin: record.name_origin,
        data_size: record.data_size,
        data_origin: record.data_origin,
    })
}

/// Read an entry's data block, leaving the stream where it was.
pub(crate) fn read_entry_data<R: Read + Seek>(
    reader: &mut R,
    entry: &TableEntry,
) -> Result<Vec<u8>> {
    let TableEntry {
        index, data_size, ..
    } = *entry;
    reader.peek(entry.data_origin, |r| {
        read_block(r, data_size, || Error::TruncatedData {
            index,
            expected: data_size,
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    /// Two entries, "a.txt" and "b.txt", laid out by hand.
    fn hand_built() -> Vec<u8> {
        let names = b"a.txt\0b.txt\0";
        let count = 2u32;
        let names_start = 84 + 16 * count;
        let header_size = names_start + names.len() as u32;

        let mut out = Vec::new();
        out.extend_from_slice(&MAGIC);
        out.extend_from_slice(&header_size.to_le_bytes());
        out.extend_from_slice(&(names.len() as u32).to_le_bytes());
        out.extend_from_slice(&count.to_le_bytes());
        out.extend_from_slice(&[0u8; 64]);

        let data_a = u64::from(header_size);
        let data_b = data_a + 3;
        for (name_origin, size, origin) in [(0u32, 3u32, data_a), (6, 2, data_b)] {
            out.extend_from_slice(&name_origin.to_le_bytes());
            out.extend_from_slice(&size.to_le_bytes());
            out.extend_from_slice(&origin.to_le_bytes());
        }
        out.extend_from_slice(names);
        out.extend_from_slice(b"AAABB");
        out
    }

    #[test]
    fn test_list() {
        let mut reader = FjsysReader::open(Cursor::new(hand_built())).unwrap();
        assert_eq!(reader.file_count(), 2);
        assert!(reader.header().is_consistent());

        let entries = reader.list().unwrap();
        assert_eq!(entries[0].name, b"a.txt");
        assert_eq!(entries[1].name, b"b.txt");
        assert_eq!(entries[1].name_origin, 6);
        assert_eq!(reader.read_raw(&entries[1]).unwrap(), b"BB");
    }

    #[test]
    fn test_reserved_bytes_ignored() {
        let mut bytes = hand_built();
        bytes[20..84].fill(0xA5);

        let codecs = CodecRegistry::default();
        let options = UnpackOptions::default();
        let mut reader = FjsysReader::open(Cursor::new(bytes)).unwrap();
        assert!(reader.header().is_consistent());

        let files = reader
            .unpack(&codecs, &options)
            .unwrap()
            .collect::<Result<Vec<_>>>()
            .unwrap();
        assert_eq!(
            files,
            vec![ArchiveFile::new("a.txt", "AAA"), ArchiveFile::new("b.txt", "BB")]
        );
    }

    #[test]
    fn test_unpack_in_table_order() {
        let codecs = CodecRegistry::default();
        let options = UnpackOptions::default();
        let mut reader = FjsysReader::open(Cursor::new(hand_built())).unwrap();

        let files = reader
            .unpack(&codecs, &options)
            .unwrap()
            .collect::<Result<Vec<_>>>()
            .unwrap();
        assert_eq!(
            files,
            vec![ArchiveFile::new("a.txt", "AAA"), ArchiveFile::new("b.txt", "BB")]
        );
    }

    #[test]
    fn test_unpack_is_lazy() {
        let mut bytes = hand_built();
        // Drop the last byte of the second data block
        bytes.truncate(bytes.len() - 1);

        let codecs = CodecRegistry::default();
        let options = UnpackOptions::default();
        let mut reader = FjsysReader::open(Cursor::new(bytes)).unwrap();
        let mut iter = reader.unpack(&codecs, &options).unwrap();

        assert_eq!(iter.next().unwrap().unwrap().data, b"AAA");
        assert!(matches!(
            iter.next(),
            Some(Err(Error::TruncatedData { index: 1, expected: 2 }))
        ));
        assert!(iter.next().is_none());
    }

    #[test]
    fn test_unpack_parallel_matches_sequential() {
        let codecs = CodecRegistry::default();
        let options = UnpackOptions::default();
        let mut reader = FjsysReader::open(Cursor::new(hand_built())).unwrap();

        let sequential = reader
            .unpack(&codecs, &options)
            .unwrap()
            .collect::<Result<Vec<_>>>()
            .unwrap();
        let parallel = reader.unpack_parallel(&codecs, &options).unwrap();
        assert_eq!(sequential, parallel);
    }

    #[test]
    fn test_bad_magic() {
        let err = FjsysReader::open(Cursor::new(b"PK\x03\x04rest-of-file".to_vec()))
            .err()
            .unwrap();
        match err {
            Error::InvalidMagic { found } => assert_eq!(&found, b"PK\x03\x04rest"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_short_magic() {
        let err = FjsysReader::open(Cursor::new(b"FJS".to_vec())).err().unwrap();
        assert!(matches!(err, Error::InvalidMagic { .. }));
    }

    #[test]
    fn test_truncated_header() {
        let mut bytes = MAGIC.to_vec();
        bytes.extend_from_slice(&[0u8; 10]);
        let err = FjsysReader::open(Cursor::new(bytes)).err().unwrap();
        assert!(matches!(err, Error::TruncatedHeader));
    }

    #[test]
    fn test_name_blob_larger_than_header() {
        let mut bytes = MAGIC.to_vec();
        bytes.extend_from_slice(&10u32.to_le_bytes());
        bytes.extend_from_slice(&20u32.to_le_bytes());
        bytes.extend_from_slice(&[0u8; 68]);
        let err = FjsysReader::open(Cursor::new(bytes)).err().unwrap();
        assert!(matches!(
            err,
            Error::InvalidHeader {
                header_size: 10,
                file_names_size: 20
            }
        ));
    }

    #[test]
    fn test_is_fjsys() {
        let mut archive = Cursor::new(hand_built());
        archive.set_position(5);
        assert!(is_fjsys(&mut archive).unwrap());
        assert_eq!(archive.position(), 5);

        assert!(!is_fjsys(&mut Cursor::new(b"FJ".to_vec())).unwrap());
        assert!(!is_fjsys(&mut Cursor::new(b"MGD data".to_vec())).unwrap());
    }
}
