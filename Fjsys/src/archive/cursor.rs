//! SPDX-FileCopyrightText: 2025 CyberDeco
//! SPDX-License-Identifier: MIT
//!
//! Scoped seeking helpers

use std::io::{self, ErrorKind, Read, Seek, SeekFrom};

use crate::error::{Error, Result};

/// Chunk size used while scanning for a name terminator
const NAME_CHUNK: usize = 64;

/// Run a closure at another offset, then return to where the stream was.
pub(crate) trait Peek: Seek {
    /// Seek to `offset`, run `f`, and restore the previous position whether
    /// or not `f` succeeded. An error from `f` takes precedence over an
    /// error while restoring.
    fn peek<T, E, F>(&mut self, offset: u64, f: F) -> std::result::Result<T, E>
    where
        E: From<io::Error>,
        F: FnOnce(&mut Self) -> std::result::Result<T, E>,
    {
        let saved = self.stream_position()?;
        let result = match self.seek(SeekFrom::Start(offset)) {
            Ok(_) => f(self),
            Err(err) => Err(err.into()),
        };
        let restored = self.seek(SeekFrom::Start(saved));

        match (result, restored) {
            (Err(err), _) => Err(err),
            (Ok(_), Err(err)) => Err(err.into()),
            (Ok(value), Ok(_)) => Ok(value),
        }
    }
}

impl<S: Seek + ?Sized> Peek for S {}

/// Read bytes up to (not including) the next NUL.
///
/// Returns `None` if the stream ends first. May read past the terminator.
pub(crate) fn read_until_nul<R: Read + ?Sized>(reader: &mut R) -> io::Result<Option<Vec<u8>>> {
    let mut name = Vec::new();
    let mut chunk = [0u8; NAME_CHUNK];

    loop {
        let n = match reader.read(&mut chunk) {
            Ok(0) => return Ok(None),
            Ok(n) => n,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        };
        if let Some(end) = chunk[..n].iter().position(|&b| b == 0) {
            name.extend_from_slice(&chunk[..end]);
            return Ok(Some(name));
        }
        name.extend_from_slice(&chunk[..n]);
    }
}

/// `read_exact` that reports a short read as the given format error.
pub(crate) fn read_exact_or<R, F>(reader: &mut R, buf: &mut [u8], on_eof: F) -> Result<()>
where
    R: Read + ?Sized,
    F: FnOnce() -> Error,
{
    reader.read_exact(buf).map_err(|err| {
        if err.kind() == ErrorKind::UnexpectedEof {
            on_eof()
        } else {
            Error::Io(err)
        }
    })
}

/// Read exactly `len` bytes without trusting `len` for the allocation.
pub(crate) fn read_block<R, F>(reader: &mut R, len: u32, on_eof: F) -> Result<Vec<u8>>
where
    R: Read + ?Sized,
    F: FnOnce() -> Error,
{
    const MAX_PREALLOC: usize = 1 << 20;

    let wanted = len as usize;
    let mut data = Vec::with_capacity(wanted.min(MAX_PREALLOC));
    reader.take(u64::from(len)).read_to_end(&mut data)?;
    if data.len() != wanted {
        return Err(on_eof());
    }
    Ok(data)
}
