//! Asset codecs applied transparently while unpacking and packing
//!
//! The archive core never interprets asset content itself. It hands each
//! entry to a [`CodecRegistry`], which picks the image codec, the script codec
//! or a pass-through based on an ordered rule list.

mod dispatch;
mod keys;
mod mgd;
mod msd;

pub use dispatch::{CodecRegistry, Handler, Matcher, Rule};
pub use keys::KeyRegistry;
pub use mgd::MgdCodec;
pub use msd::MsdCodec;

use thiserror::Error;

/// Errors reported by an asset codec.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum CodecError {
    /// The MGD container is malformed.
    #[error("invalid MGD image: {message}")]
    InvalidMgd {
        /// Description of what is invalid.
        message: String,
    },

    /// The MGD pixel payload uses a compression scheme this codec cannot handle.
    #[error("unsupported MGD compression type {kind}; only PNG payloads (type 2) are decoded")]
    UnsupportedMgdCompression {
        /// The compression type field from the MGD header.
        kind: u32,
    },

    /// Image dimensions do not fit the MGD header fields.
    #[error("image too large for MGD: {width}x{height}")]
    ImageTooLarge {
        /// Image width in pixels.
        width: u32,
        /// Image height in pixels.
        height: u32,
    },

    /// The embedded image could not be read.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

/// An image codec, auto-detected on unpack by its content signature.
pub trait ImageCodec: Send + Sync {
    /// Leading bytes identifying data this codec decodes.
    fn signature(&self) -> &'static [u8];

    /// File extension (without the dot) of entries encoded with this codec.
    fn extension(&self) -> &'static str;

    /// Decode archived bytes into their exported form.
    fn decode(&self, data: &[u8]) -> Result<Vec<u8>, CodecError>;

    /// Encode exported bytes into their archived form.
    fn encode(&self, data: &[u8]) -> Result<Vec<u8>, CodecError>;
}

/// A script codec, selected by file extension.
pub trait ScriptCodec: Send + Sync {
    /// File extension (without the dot) of entries handled by this codec.
    fn extension(&self) -> &'static str;

    /// Decode archived bytes. `key` is the resolved key material, if any.
    fn decode(&self, data: &[u8], key: Option<&[u8]>) -> Result<Vec<u8>, CodecError>;

    /// Encode exported bytes into their archived form.
    fn encode(&self, data: &[u8]) -> Result<Vec<u8>, CodecError>;
}
