//! Table ordering
//!
//! Games look assets up by table index, so a repacked archive only works if
//! its table is sorted exactly like the one the engine was built against.
//! The engine's ordering compares names case-insensitively with `_` sorting
//! as `/`.

/// How the writer orders table records.
#[derive(Debug, Clone, Copy, Default)]
pub enum Collation {
    /// Lowercase ASCII letters and treat `_` as `/`, then compare bytes.
    #[default]
    Engine,
    /// Plain byte order.
    Bytes,
    /// Caller-supplied sort key.
    Custom(fn(&[u8]) -> Vec<u8>),
}

impl Collation {
    /// Sort key for a name under this collation.
    pub fn key(&self, name: &[u8]) -> Vec<u8> {
        match self {
            Collation::Engine => engine_collation_key(name),
            Collation::Bytes => name.to_vec(),
            Collation::Custom(key) => key(name),
        }
    }

    /// Stable sort of `items` by the key of each item's name. Items with
    /// equal keys keep their relative order.
    pub fn sort<T>(&self, items: &mut [T], name: impl Fn(&T) -> &[u8]) {
        items.sort_by_cached_key(|item| self.key(name(item)));
    }
}

/// The engine's collation key: ASCII lowercase, with `_` mapped to `/`.
pub fn engine_collation_key(name: &[u8]) -> Vec<u8> {
    name.iter()
        .map(|&b| match b {
            b'_' => b'/',
            _ => b.to_ascii_lowercase(),
        })
        .collect()
}
