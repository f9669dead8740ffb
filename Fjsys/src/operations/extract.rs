//! Archive extraction

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;

use super::FjsysOperations;
use super::helpers::entry_output_path;
use crate::archive::{
    ArchivePhase, ArchiveProgress, FjsysReader, ProgressCallback, TableEntry, read_entry_data,
};
use crate::codec::CodecRegistry;
use crate::error::Result;
use crate::options::UnpackOptions;

impl FjsysOperations {
    /// Extract every entry of an archive into a directory.
    ///
    /// Returns the number of entries written.
    ///
    /// # Errors
    /// See [`extract_with_progress`](Self::extract_with_progress).
    pub fn extract<P: AsRef<Path>, Q: AsRef<Path>>(
        archive: P,
        output_dir: Q,
        codecs: &CodecRegistry,
        options: &UnpackOptions,
    ) -> Result<usize> {
        Self::extract_with_progress(archive, output_dir, codecs, options, &|_| {})
    }

    /// Extract every entry of an archive into a directory with a progress
    /// callback.
    ///
    /// The table is read first and every name is checked against the output
    /// directory before anything is written. Data blocks are then read,
    /// decoded and written in parallel; each worker opens its own handle on
    /// the archive. Entries whose paths differ only by case are written by
    /// one worker in table order, so the later one in the table wins on a
    /// case-insensitive file system.
    ///
    /// # Errors
    /// Returns [`Error::InvalidPath`](crate::Error::InvalidPath) if an entry
    /// name would escape `output_dir`, a format error for a malformed
    /// archive, or the first codec or IO error hit by any worker.
    pub fn extract_with_progress<P: AsRef<Path>, Q: AsRef<Path>>(
        archive: P,
        output_dir: Q,
        codecs: &CodecRegistry,
        options: &UnpackOptions,
        progress: ProgressCallback,
    ) -> Result<usize> {
        let archive = archive.as_ref();
        let output_dir = output_dir.as_ref();

        progress(&ArchiveProgress::new(ArchivePhase::ReadingTable, 1, 1));
        let mut reader = FjsysReader::open(BufReader::new(File::open(archive)?))?;
        let entries = reader.list()?;
        drop(reader);

        let total = entries.len();
        let groups = plan_outputs(output_dir, entries)?;
        fs::create_dir_all(output_dir)?;

        let processed = AtomicUsize::new(0);
        let key = options.script_key();

        groups.par_iter().try_for_each(|group| -> Result<()> {
            let mut file = BufReader::new(File::open(archive)?);
            for (entry, output_path) in group {
                let current = processed.fetch_add(1, Ordering::SeqCst) + 1;
                progress(&ArchiveProgress::with_file(
                    ArchivePhase::DecodingFiles,
                    current,
                    total,
                    entry.name_lossy(),
                ));

                let raw = read_entry_data(&mut file, entry)?;
                let data = codecs.decode(&entry.name, raw, key)?;

                if let Some(parent) = output_path.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::write(output_path, &data)?;

                tracing::debug!(
                    "Extracted #{} {} -> {}",
                    entry.index,
                    entry.name_lossy(),
                    output_path.display()
                );
            }
            Ok(())
        })?;

        progress(&ArchiveProgress::new(ArchivePhase::Complete, total, total));
        tracing::info!(
            "Extracted {total} files from {} to {}",
            archive.display(),
            output_dir.display()
        );
        Ok(total)
    }
}

type Job = (TableEntry, PathBuf);

/// Map entries to output paths, grouping entries whose paths may name the
/// same file. Groups keep table order.
fn plan_outputs(output_dir: &Path, entries: Vec<TableEntry>) -> Result<Vec<Vec<Job>>> {
    let mut slots: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<Vec<Job>> = Vec::new();

    for entry in entries {
        let path = entry_output_path(output_dir, &entry.name)?;
        let folded = path.to_string_lossy().to_lowercase();
        match slots.get(&folded) {
            Some(&slot) => {
                tracing::warn!(
                    "Entry #{} {} may overwrite {}",
                    entry.index,
                    entry.name_lossy(),
                    groups[slot][0].1.display()
                );
                groups[slot].push((entry, path));
            }
            None => {
                slots.insert(folded, groups.len());
                groups.push(vec![(entry, path)]);
            }
        }
    }

    Ok(groups)
}
