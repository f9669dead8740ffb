//! Options for reading and writing archives

use crate::archive::Collation;
use crate::codec::KeyRegistry;
use crate::error::Result;

/// Options for unpacking an archive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnpackOptions {
    /// Key material handed to the script codec; `None` leaves scripts as
    /// stored.
    pub script_key: Option<Vec<u8>>,
}

impl UnpackOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use raw key material for scripts.
    #[must_use]
    pub fn with_script_key(mut self, key: impl Into<Vec<u8>>) -> Self {
        self.script_key = Some(key.into());
        self
    }

    /// Use a named key from the registry.
    pub fn with_named_key(self, registry: &KeyRegistry, name: &str) -> Result<Self> {
        let key = registry.resolve(name)?.to_vec();
        Ok(self.with_script_key(key))
    }

    pub fn script_key(&self) -> Option<&[u8]> {
        self.script_key.as_deref()
    }
}

/// Options for packing an archive.
#[derive(Debug, Clone, Copy, Default)]
pub struct PackOptions {
    /// Table ordering; defaults to the engine's.
    pub collation: Collation,
}

impl PackOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_collation(mut self, collation: Collation) -> Self {
        self.collation = collation;
        self
    }
}
