//! Command execution implementations

use super::Commands;
use super::{create, extract, info, keys, list};

impl Commands {
    /// Execute the selected command.
    ///
    /// # Errors
    /// Returns an error if the underlying command fails.
    pub fn execute(&self) -> anyhow::Result<()> {
        match self {
            Commands::Extract {
                source,
                destination,
                key,
                quiet,
            } => extract::execute(source, destination, key, *quiet),
            Commands::Create {
                source,
                destination,
                collation,
                quiet,
            } => create::execute(source, destination, (*collation).into(), *quiet),
            Commands::List {
                source,
                detailed,
                json,
            } => list::execute(source, *detailed, *json),
            Commands::Info { source, json } => info::execute(source, *json),
            Commands::Keys { keys } => keys::execute(keys.as_deref()),
        }
    }
}
