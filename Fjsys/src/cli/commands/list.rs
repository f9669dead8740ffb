//! CLI command for listing archive contents

use std::path::Path;

use serde::Serialize;

use crate::archive::TableEntry;
use crate::operations::FjsysOperations;

/// One table row as printed by `list --json`
#[derive(Debug, Serialize)]
struct ListedEntry {
    index: u32,
    name: String,
    size: u32,
    offset: u64,
}

impl From<&TableEntry> for ListedEntry {
    fn from(entry: &TableEntry) -> Self {
        Self {
            index: entry.index,
            name: entry.name_lossy(),
            size: entry.data_size,
            offset: entry.data_origin,
        }
    }
}

pub fn execute(source: &Path, detailed: bool, json: bool) -> anyhow::Result<()> {
    let entries = FjsysOperations::list(source)?;

    if json {
        let listed: Vec<ListedEntry> = entries.iter().map(ListedEntry::from).collect();
        println!("{}", serde_json::to_string_pretty(&listed)?);
        return Ok(());
    }

    if detailed {
        println!("{:>6}  {:>10}  {:>10}  Name", "Index", "Size", "Offset");
        for entry in &entries {
            println!(
                "{:>6}  {:>10}  {:>#10x}  {}",
                entry.index,
                entry.data_size,
                entry.data_origin,
                entry.name_lossy()
            );
        }
        println!("\nTotal: {} files", entries.len());
    } else {
        for entry in &entries {
            println!("{}", entry.name_lossy());
        }
    }
    Ok(())
}
