//! CLI command for archive creation

use std::path::Path;
use std::time::Instant;

use anyhow::Context;

use crate::archive::{ArchivePhase, Collation};
use crate::cli::progress::{DISK, LOOKING_GLASS, print_done, print_step, short_name, simple_bar};
use crate::codec::CodecRegistry;
use crate::operations::FjsysOperations;
use crate::options::PackOptions;

pub fn execute(
    source: &Path,
    destination: &Path,
    collation: Collation,
    quiet: bool,
) -> anyhow::Result<()> {
    let started = Instant::now();
    let options = PackOptions::new().with_collation(collation);
    let codecs = CodecRegistry::default();

    if !quiet {
        print_step(1, 2, LOOKING_GLASS, &format!("Scanning {}...", source.display()));
    }

    let pb = simple_bar(0, "Packing", quiet);
    let header = FjsysOperations::create_with_progress(
        source,
        destination,
        &codecs,
        &options,
        &|progress| match progress.phase {
            ArchivePhase::EncodingFiles => {
                pb.set_length(progress.total as u64);
                pb.inc(1);
                if let Some(name) = &progress.current_file {
                    pb.set_message(short_name(name).to_string());
                }
            }
            ArchivePhase::WritingFiles => pb.set_message("writing data"),
            ArchivePhase::WritingTable => pb.set_message("writing table"),
            ArchivePhase::Complete => pb.finish_with_message("done"),
            _ => {}
        },
    )
    .with_context(|| format!("failed to create {}", destination.display()))?;

    if !quiet {
        print_step(
            2,
            2,
            DISK,
            &format!(
                "Wrote {} files to {}",
                header.file_count,
                destination.display()
            ),
        );
        print_done(started.elapsed());
    }
    Ok(())
}
