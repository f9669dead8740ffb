pub mod create;
pub mod execute;
pub mod extract;
pub mod info;
pub mod keys;
pub mod list;

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::archive::Collation;
use crate::codec::KeyRegistry;
use crate::options::UnpackOptions;

#[derive(Subcommand)]
pub enum Commands {
    /// Extract an FJSYS archive into a directory
    Extract {
        /// Source archive
        source: PathBuf,

        /// Output directory
        destination: PathBuf,

        #[command(flatten)]
        key: KeyArgs,

        /// Suppress progress bar
        #[arg(short, long)]
        quiet: bool,
    },

    /// Create an FJSYS archive from a directory
    Create {
        /// Source directory
        source: PathBuf,

        /// Output archive
        destination: PathBuf,

        /// Table ordering
        #[arg(long, value_enum, default_value = "engine")]
        collation: CollationArg,

        /// Suppress progress bar
        #[arg(short, long)]
        quiet: bool,
    },

    /// List contents of an FJSYS archive
    List {
        /// Source archive
        source: PathBuf,

        /// Show table index, size and offset of each entry
        #[arg(short, long)]
        detailed: bool,

        /// Print the table as JSON
        #[arg(long, conflicts_with = "detailed")]
        json: bool,
    },

    /// Show a summary of an FJSYS archive
    Info {
        /// Source archive
        source: PathBuf,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the script keys in the key registry
    Keys {
        /// Key registry file (defaults to <config dir>/fjsys/keys.toml)
        #[arg(long)]
        keys: Option<PathBuf>,
    },
}

/// Script key selection shared by commands that decode scripts
#[derive(Args, Debug, Clone, Default)]
pub struct KeyArgs {
    /// Name of a script key in the key registry
    #[arg(short, long, conflicts_with = "raw_key")]
    pub key: Option<String>,

    /// Raw script key material
    #[arg(long)]
    pub raw_key: Option<String>,

    /// Key registry file (defaults to <config dir>/fjsys/keys.toml)
    #[arg(long)]
    pub keys: Option<PathBuf>,
}

impl KeyArgs {
    /// Load the key registry these arguments point at.
    ///
    /// # Errors
    /// Returns an error if the registry file cannot be read or parsed.
    pub fn registry(&self) -> crate::Result<KeyRegistry> {
        match &self.keys {
            Some(path) => KeyRegistry::load(path),
            None => KeyRegistry::load_default(),
        }
    }

    /// Resolve the selected key into unpack options.
    ///
    /// # Errors
    /// Returns an error if a named key is not in the registry.
    pub fn unpack_options(&self) -> crate::Result<UnpackOptions> {
        let options = UnpackOptions::new();
        if let Some(raw) = &self.raw_key {
            return Ok(options.with_script_key(raw.as_bytes()));
        }
        match &self.key {
            Some(name) => options.with_named_key(&self.registry()?, name),
            None => Ok(options),
        }
    }
}

/// Table ordering choices
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CollationArg {
    /// Case-insensitive, `_` sorts as `/`
    Engine,
    /// Plain byte order
    Bytes,
}

impl From<CollationArg> for Collation {
    fn from(arg: CollationArg) -> Self {
        match arg {
            CollationArg::Engine => Collation::Engine,
            CollationArg::Bytes => Collation::Bytes,
        }
    }
}
