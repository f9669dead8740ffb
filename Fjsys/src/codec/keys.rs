//! Named script keys
//!
//! Users pick a script key by name (usually the title it belongs to). The
//! names and their key material live in a TOML document:
//!
//! ```toml
//! [keys]
//! title-one = "KEYMATERIAL"
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};

#[derive(Debug, Deserialize)]
struct KeyFile {
    #[serde(default)]
    keys: BTreeMap<String, String>,
}

/// Immutable mapping from key name to key material.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyRegistry {
    keys: BTreeMap<String, Vec<u8>>,
}

impl KeyRegistry {
    /// Parse a registry from a TOML document.
    pub fn from_toml(source: &str) -> Result<Self> {
        let file: KeyFile = toml::from_str(source)?;
        let keys = file
            .keys
            .into_iter()
            .map(|(name, material)| (name, material.into_bytes()))
            .collect();
        Ok(Self { keys })
    }

    /// Load a registry from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let source = fs::read_to_string(path.as_ref())?;
        Self::from_toml(&source)
    }

    /// Load the registry from the default location, or return an empty one if
    /// there is no file there.
    pub fn load_default() -> Result<Self> {
        match Self::default_path() {
            Some(path) if path.is_file() => Self::load(path),
            _ => Ok(Self::default()),
        }
    }

    /// `<config dir>/fjsys/keys.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("fjsys").join("keys.toml"))
    }

    /// Resolve a key name to its key material.
    pub fn resolve(&self, name: &str) -> Result<&[u8]> {
        self.keys
            .get(name)
            .map(Vec::as_slice)
            .ok_or_else(|| Error::UnknownScriptKey {
                name: name.to_string(),
                known: self.names().map(str::to_string).collect(),
            })
    }

    /// Registered key names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.keys.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
