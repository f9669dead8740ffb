//! SPDX-FileCopyrightText: 2025 CyberDeco
//! SPDX-License-Identifier: MIT
//!
//! MSD script codec
//!
//! Encrypted scripts are XORed in 32-byte blocks. Block `i` uses the
//! lowercase hex MD5 digest of the key material followed by the decimal
//! block number, so each block gets its own 32-character key stream.

use super::{CodecError, ScriptCodec};

/// Bytes covered by one digest
const BLOCK_SIZE: usize = 32;

/// MSD script codec.
#[derive(Debug, Clone, Copy, Default)]
pub struct MsdCodec;

impl ScriptCodec for MsdCodec {
    fn extension(&self) -> &'static str {
        "msd"
    }

    fn decode(&self, data: &[u8], key: Option<&[u8]>) -> Result<Vec<u8>, CodecError> {
        let Some(key) = key else {
            return Ok(data.to_vec());
        };
        Ok(apply_key_stream(data, key))
    }

    fn encode(&self, data: &[u8]) -> Result<Vec<u8>, CodecError> {
        // Scripts go back into the archive as plain text
        Ok(data.to_vec())
    }
}

/// XOR `data` with the per-block MD5 key stream derived from `key`.
pub(crate) fn apply_key_stream(data: &[u8], key: &[u8]) -> Vec<u8> {
    let mut out = data.to_vec();
    let mut seed = Vec::with_capacity(key.len() + 20);

    for (block_index, block) in out.chunks_mut(BLOCK_SIZE).enumerate() {
        seed.clear();
        seed.extend_from_slice(key);
        seed.extend_from_slice(block_index.to_string().as_bytes());

        let stream = format!("{:x}", md5::compute(&seed));
        for (byte, k) in block.iter_mut().zip(stream.as_bytes()) {
            *byte ^= k;
        }
    }

    out
}
