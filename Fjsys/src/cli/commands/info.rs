//! CLI command for archive summaries

use std::path::Path;

use console::style;

use crate::codec::CodecRegistry;
use crate::operations::FjsysOperations;

pub fn execute(source: &Path, json: bool) -> anyhow::Result<()> {
    let info = FjsysOperations::info(source, &CodecRegistry::default())?;

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    println!("{}", style(source.display()).bold());
    println!("  Files:        {}", info.file_count);
    println!("    images:     {}", info.image_count);
    println!("    scripts:    {}", info.script_count);
    println!("  Header size:  {:#x}", info.header_size);
    println!("  Names size:   {:#x}", info.file_names_size);
    println!("  Data size:    {}", info.data_size);
    println!("  Archive size: {}", info.archive_size);
    if !info.consistent {
        println!(
            "  {}",
            style("name blob does not directly follow the table").yellow()
        );
    }
    Ok(())
}
