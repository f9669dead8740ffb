//! Archive creation from a directory

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;

use walkdir::WalkDir;

use super::FjsysOperations;
use super::helpers::archive_name;
use crate::archive::{
    ArchiveFile, ArchivePhase, ArchiveProgress, FjsysHeader, FjsysWriter, ProgressCallback,
};
use crate::codec::CodecRegistry;
use crate::error::{Error, Result};
use crate::options::PackOptions;

/// Files that are never packed
const IGNORED_FILES: &[&str] = &[".DS_Store", "Thumbs.db", "desktop.ini"];

impl FjsysOperations {
    /// Pack every file under `source_dir` into a new archive.
    ///
    /// # Errors
    /// See [`create_with_progress`](Self::create_with_progress).
    pub fn create<P: AsRef<Path>, Q: AsRef<Path>>(
        source_dir: P,
        output: Q,
        codecs: &CodecRegistry,
        options: &PackOptions,
    ) -> Result<FjsysHeader> {
        Self::create_with_progress(source_dir, output, codecs, options, &|_| {})
    }

    /// Pack every file under `source_dir` into a new archive with a progress
    /// callback.
    ///
    /// Entries are named by their path relative to `source_dir`, with `/`
    /// separators. On Unix, path bytes are stored unchanged; elsewhere
    /// non-UTF-8 paths are skipped. Symlinks and OS metadata files are
    /// always skipped. A partially written archive is removed on failure.
    ///
    /// # Errors
    /// Returns [`Error::InvalidPath`] if `source_dir` is not a directory,
    /// [`Error::WalkDirError`] if the walk fails, or any pack error.
    pub fn create_with_progress<P: AsRef<Path>, Q: AsRef<Path>>(
        source_dir: P,
        output: Q,
        codecs: &CodecRegistry,
        options: &PackOptions,
        progress: ProgressCallback,
    ) -> Result<FjsysHeader> {
        let source_dir = source_dir.as_ref();
        let output = output.as_ref();

        let files = collect_files(source_dir, progress)?;
        tracing::info!(
            "Collected {} files from {}",
            files.len(),
            source_dir.display()
        );

        let mut sink = BufWriter::new(File::create(output)?);
        let result = FjsysWriter::with_options(*options)
            .add_files(files)
            .write_with_progress(&mut sink, codecs, progress);

        match result {
            Ok(header) => {
                tracing::info!("Created {}", output.display());
                Ok(header)
            }
            Err(err) => {
                drop(sink);
                if let Err(cleanup) = fs::remove_file(output) {
                    tracing::warn!(
                        "Could not remove partial archive {}: {cleanup}",
                        output.display()
                    );
                }
                Err(err)
            }
        }
    }
}

/// Walk `root` and read every regular file, in file-name order.
fn collect_files(root: &Path, progress: ProgressCallback) -> Result<Vec<ArchiveFile>> {
    if !root.is_dir() {
        return Err(Error::InvalidPath(format!(
            "not a directory: {}",
            root.display()
        )));
    }

    let mut paths = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let is_ignored = entry
            .file_name()
            .to_str()
            .is_some_and(|name| IGNORED_FILES.contains(&name));
        if is_ignored {
            continue;
        }

        match archive_name(root, entry.path()) {
            Some(name) => paths.push((name, entry.into_path())),
            None => tracing::warn!("Skipping unnamable path {}", entry.path().display()),
        }
    }

    let total = paths.len();
    let mut files = Vec::with_capacity(total);
    for (index, (name, path)) in paths.into_iter().enumerate() {
        progress(&ArchiveProgress::with_file(
            ArchivePhase::ScanningFiles,
            index + 1,
            total,
            String::from_utf8_lossy(&name),
        ));
        let data = fs::read(&path)?;
        files.push(ArchiveFile::new(name, data));
    }

    Ok(files)
}
