//! Helper utilities for archive operations

use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};

use crate::error::{Error, Result};

/// Resolve an archive entry name to a path under `output_dir`.
///
/// `/` always separates components; `\` does too in UTF-8 names. Names that
/// would leave the output directory (`..`, drive prefixes, roots) are
/// rejected. Name bytes are kept as-is on Unix; elsewhere a name that is not
/// UTF-8 is an error.
pub(crate) fn entry_output_path(output_dir: &Path, name: &[u8]) -> Result<PathBuf> {
    let display = String::from_utf8_lossy(name);
    // 0x5C is a Shift-JIS trail byte
    let backslash_separates = std::str::from_utf8(name).is_ok();
    let mut path = output_dir.to_path_buf();
    let mut depth = 0usize;

    let parts = name.split(|&b| b == b'/' || (backslash_separates && b == b'\\'));
    for part in parts {
        match part {
            b"" | b"." => {}
            b".." => {
                return Err(Error::InvalidPath(format!(
                    "entry escapes the output directory: {display}"
                )));
            }
            part if part.contains(&b':') => {
                return Err(Error::InvalidPath(format!(
                    "entry has a drive or stream prefix: {display}"
                )));
            }
            part => {
                path.push(component_from_bytes(part, &display)?);
                depth += 1;
            }
        }
    }

    if depth == 0 {
        return Err(Error::InvalidPath(format!(
            "entry has no file name: {display:?}"
        )));
    }
    Ok(path)
}

#[cfg(unix)]
fn component_from_bytes(part: &[u8], _display: &str) -> Result<OsString> {
    use std::os::unix::ffi::OsStrExt;
    Ok(std::ffi::OsStr::from_bytes(part).to_os_string())
}

#[cfg(not(unix))]
fn component_from_bytes(part: &[u8], display: &str) -> Result<OsString> {
    std::str::from_utf8(part)
        .map(OsString::from)
        .map_err(|_| Error::InvalidPath(format!("entry name is not UTF-8: {display}")))
}

/// The archive name for a file found under `root`: its relative path with
/// `/` separators. `None` if the path is not under `root`, or on non-Unix
/// systems if it is not valid UTF-8.
pub(crate) fn archive_name(root: &Path, path: &Path) -> Option<Vec<u8>> {
    let relative = path.strip_prefix(root).ok()?;
    let mut name = Vec::new();
    for component in relative.components() {
        let Component::Normal(part) = component else {
            return None;
        };
        if !name.is_empty() {
            name.push(b'/');
        }
        name.extend_from_slice(os_str_bytes(part)?);
    }
    if name.is_empty() {
        return None;
    }
    Some(name)
}

#[cfg(unix)]
#[allow(clippy::unnecessary_wraps)]
fn os_str_bytes(part: &std::ffi::OsStr) -> Option<&[u8]> {
    use std::os::unix::ffi::OsStrExt;
    Some(part.as_bytes())
}

#[cfg(not(unix))]
fn os_str_bytes(part: &std::ffi::OsStr) -> Option<&[u8]> {
    part.to_str().map(str::as_bytes)
}
