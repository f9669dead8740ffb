//! CLI command for archive extraction

use std::path::Path;
use std::time::Instant;

use anyhow::Context;

use super::KeyArgs;
use crate::archive::ArchivePhase;
use crate::cli::progress::{LOOKING_GLASS, PACKAGE, print_done, print_step, short_name, simple_bar};
use crate::codec::CodecRegistry;
use crate::operations::FjsysOperations;

pub fn execute(
    source: &Path,
    destination: &Path,
    key: &KeyArgs,
    quiet: bool,
) -> anyhow::Result<()> {
    let started = Instant::now();
    let options = key.unpack_options()?;
    let codecs = CodecRegistry::default();

    if !quiet {
        print_step(1, 2, LOOKING_GLASS, &format!("Reading {}...", source.display()));
    }

    let pb = simple_bar(0, "Extracting", quiet);
    let count = FjsysOperations::extract_with_progress(
        source,
        destination,
        &codecs,
        &options,
        &|progress| match progress.phase {
            ArchivePhase::DecodingFiles => {
                pb.set_length(progress.total as u64);
                pb.inc(1);
                if let Some(name) = &progress.current_file {
                    pb.set_message(short_name(name).to_string());
                }
            }
            ArchivePhase::Complete => pb.finish_with_message("done"),
            _ => {}
        },
    )
    .with_context(|| format!("failed to extract {}", source.display()))?;

    if !quiet {
        print_step(
            2,
            2,
            PACKAGE,
            &format!("Extracted {count} files to {}", destination.display()),
        );
        print_done(started.elapsed());
    }
    Ok(())
}
