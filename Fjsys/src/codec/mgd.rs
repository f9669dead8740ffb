//! SPDX-FileCopyrightText: 2025 CyberDeco
//! SPDX-License-Identifier: MIT
//!
//! MGD image container
//!
//! Layout (little-endian):
//!
//! | Offset | Size | Field |
//! |---|---|---|
//! | 0 | 4 | magic `"MGD "` |
//! | 4 | 2 | data offset (`0x5C`) |
//! | 6 | 2 | format |
//! | 8 | 4 | reserved |
//! | 12 | 2 | width |
//! | 14 | 2 | height |
//! | 16 | 4 | decoded RGBA size |
//! | 20 | 4 | total payload size |
//! | 24 | 4 | compression type |
//! | 28 | 64 | reserved |
//! | 92 | 4 | payload size |
//! | 96 | n | payload |
//!
//! A region block follows the payload; it is ignored on decode and written
//! empty on encode.

use std::io::{Cursor, Write};

use byteorder::{ByteOrder, LittleEndian, WriteBytesExt};

use super::{CodecError, ImageCodec};

/// MGD magic bytes
pub const MAGIC: &[u8; 4] = b"MGD ";

/// Offset of the payload size field
const DATA_OFFSET: u16 = 0x5C;

/// Compression type for a PNG payload
const COMPRESSION_PNG: u32 = 2;

/// MGD image codec, exporting PNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct MgdCodec;

impl ImageCodec for MgdCodec {
    fn signature(&self) -> &'static [u8] {
        MAGIC
    }

    fn extension(&self) -> &'static str {
        "mgd"
    }

    fn decode(&self, data: &[u8]) -> Result<Vec<u8>, CodecError> {
        let header_end = usize::from(DATA_OFFSET) + 4;
        if data.len() < header_end {
            return Err(CodecError::InvalidMgd {
                message: format!("header needs {header_end} bytes, got {}", data.len()),
            });
        }
        if &data[..4] != MAGIC {
            return Err(CodecError::InvalidMgd {
                message: "missing MGD signature".to_string(),
            });
        }

        let data_offset = usize::from(LittleEndian::read_u16(&data[4..6]));
        let compression = LittleEndian::read_u32(&data[24..28]);
        if compression != COMPRESSION_PNG {
            return Err(CodecError::UnsupportedMgdCompression { kind: compression });
        }

        if data.len() < data_offset + 4 {
            return Err(CodecError::InvalidMgd {
                message: format!("data offset {data_offset:#x} past end of image"),
            });
        }
        let payload_size = LittleEndian::read_u32(&data[data_offset..data_offset + 4]) as usize;
        let payload_start = data_offset + 4;
        let payload = data
            .get(payload_start..payload_start.saturating_add(payload_size))
            .ok_or_else(|| CodecError::InvalidMgd {
                message: format!(
                    "payload of {payload_size} bytes exceeds image size {}",
                    data.len()
                ),
            })?;

        Ok(payload.to_vec())
    }

    fn encode(&self, data: &[u8]) -> Result<Vec<u8>, CodecError> {
        // Already an MGD container (e.g. a raw dump being repacked)
        if data.starts_with(MAGIC) {
            return Ok(data.to_vec());
        }

        let (width, height) = image::ImageReader::new(Cursor::new(data))
            .with_guessed_format()
            .map_err(image::ImageError::IoError)?
            .into_dimensions()?;
        let (Ok(width16), Ok(height16)) = (u16::try_from(width), u16::try_from(height)) else {
            return Err(CodecError::ImageTooLarge { width, height });
        };
        let payload_size = u32::try_from(data.len())
            .map_err(|_| CodecError::ImageTooLarge { width, height })?;
        let rgba_size = width
            .checked_mul(height)
            .and_then(|pixels| pixels.checked_mul(4))
            .ok_or(CodecError::ImageTooLarge { width, height })?;

        let mut out = Vec::with_capacity(data.len() + usize::from(DATA_OFFSET) + 12);
        write_container(&mut out, width16, height16, rgba_size, payload_size, data)
            .map_err(image::ImageError::IoError)?;
        Ok(out)
    }
}

fn write_container<W: Write>(
    out: &mut W,
    width: u16,
    height: u16,
    rgba_size: u32,
    payload_size: u32,
    payload: &[u8],
) -> std::io::Result<()> {
    out.write_all(MAGIC)?;
    out.write_u16::<LittleEndian>(DATA_OFFSET)?;
    out.write_u16::<LittleEndian>(0)?; // format
    out.write_all(&[0u8; 4])?;
    out.write_u16::<LittleEndian>(width)?;
    out.write_u16::<LittleEndian>(height)?;
    out.write_u32::<LittleEndian>(rgba_size)?;
    out.write_u32::<LittleEndian>(payload_size.saturating_add(4))?;
    out.write_u32::<LittleEndian>(COMPRESSION_PNG)?;
    out.write_all(&[0u8; 64])?;
    out.write_u32::<LittleEndian>(payload_size)?;
    out.write_all(payload)?;
    // Empty region block: byte length, then region count
    out.write_u32::<LittleEndian>(4)?;
    out.write_u32::<LittleEndian>(0)?;
    Ok(())
}
