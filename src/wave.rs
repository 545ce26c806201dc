// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//

//! RIFF/WAVE container decoding.
//!
//! Only the container is interpreted: the fixed `fmt ` chunk is read and the
//! `data` chunk is located. The payload itself is handed on untouched.

use std::ops::Range;

/// Size of a chunk header (tag + little-endian size).
const CHUNK_HEADER_LEN: usize = 8;

/// `"RIFF"` + size + `"WAVE"`.
const RIFF_DESCRIPTOR_LEN: usize = 12;

/// Minimum size of the `fmt ` chunk body.
const FMT_BODY_LEN: usize = 16;

/// The smallest buffer that can hold the RIFF descriptor, the format chunk and
/// one further chunk header.
pub const MIN_WAVE_LEN: usize =
    RIFF_DESCRIPTOR_LEN + CHUNK_HEADER_LEN + FMT_BODY_LEN + CHUNK_HEADER_LEN;

/// Errors raised while decoding a WAVE container.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum WaveError {
    #[error("buffer of {0} bytes is too small for a RIFF/WAVE header")]
    TooShort(usize),

    #[error("expected {expected:?} tag at offset {offset}")]
    BadTag {
        expected: &'static str,
        offset: usize,
    },

    #[error("format chunk is {0} bytes, expected at least 16")]
    FormatChunkTooSmall(u32),

    #[error("no data chunk found")]
    MissingData,

    #[error("data chunk is empty")]
    EmptyData,

    #[error("data chunk at offset {offset} claims {size} bytes but the buffer holds {len}")]
    DataOverrun { offset: usize, size: u32, len: usize },
}

impl WaveError {
    /// Returns true if the header was readable but the scan ran out of buffer
    /// before a usable `data` chunk was found.
    pub fn is_truncation(&self) -> bool {
        matches!(
            self,
            WaveError::MissingData | WaveError::EmptyData | WaveError::DataOverrun { .. }
        )
    }
}

/// The fields of the `fmt ` chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaveFormat {
    pub audio_format: u16,
    pub channels: u16,
    pub sample_rate: u32,
    pub byte_rate: u32,
    pub block_align: u16,
    pub bits_per_sample: u16,
}

/// A decoded WAVE buffer: its format and where the payload lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaveInfo {
    pub format: WaveFormat,
    /// Byte range of the `data` chunk payload within the decoded buffer.
    pub data: Range<usize>,
}

impl WaveInfo {
    /// Size of the payload in bytes.
    pub fn audio_data_size(&self) -> u32 {
        // The range was built from a u32 chunk size.
        (self.data.end - self.data.start) as u32
    }

    /// Returns the payload slice of the buffer this info was decoded from.
    pub fn payload<'a>(&self, buffer: &'a [u8]) -> &'a [u8] {
        &buffer[self.data.clone()]
    }
}

fn read_u16(buffer: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([buffer[offset], buffer[offset + 1]])
}

fn read_u32(buffer: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        buffer[offset],
        buffer[offset + 1],
        buffer[offset + 2],
        buffer[offset + 3],
    ])
}

fn expect_tag(buffer: &[u8], offset: usize, expected: &'static str) -> Result<(), WaveError> {
    if &buffer[offset..offset + 4] == expected.as_bytes() {
        Ok(())
    } else {
        Err(WaveError::BadTag { expected, offset })
    }
}

/// Decodes a RIFF/WAVE buffer.
///
/// The header tags are checked in order (`RIFF`, `WAVE`, `fmt `), then chunks
/// following the format chunk are skipped until a `data` chunk is found. Odd
/// sized chunks are followed by one pad byte.
pub fn decode(buffer: &[u8]) -> Result<WaveInfo, WaveError> {
    if buffer.len() < MIN_WAVE_LEN {
        return Err(WaveError::TooShort(buffer.len()));
    }

    expect_tag(buffer, 0, "RIFF")?;
    expect_tag(buffer, 8, "WAVE")?;
    expect_tag(buffer, RIFF_DESCRIPTOR_LEN, "fmt ")?;

    let fmt_size = read_u32(buffer, RIFF_DESCRIPTOR_LEN + 4);
    if (fmt_size as usize) < FMT_BODY_LEN {
        return Err(WaveError::FormatChunkTooSmall(fmt_size));
    }

    let body = RIFF_DESCRIPTOR_LEN + CHUNK_HEADER_LEN;
    let format = WaveFormat {
        audio_format: read_u16(buffer, body),
        channels: read_u16(buffer, body + 2),
        sample_rate: read_u32(buffer, body + 4),
        byte_rate: read_u32(buffer, body + 8),
        block_align: read_u16(buffer, body + 12),
        bits_per_sample: read_u16(buffer, body + 14),
    };

    let mut offset = next_chunk(body, fmt_size).ok_or(WaveError::MissingData)?;
    while let Some(header_end) = offset
        .checked_add(CHUNK_HEADER_LEN)
        .filter(|end| *end <= buffer.len())
    {
        let size = read_u32(buffer, offset + 4);

        if &buffer[offset..offset + 4] == b"data" {
            if size == 0 {
                return Err(WaveError::EmptyData);
            }
            let end = header_end
                .checked_add(size as usize)
                .filter(|end| *end <= buffer.len())
                .ok_or(WaveError::DataOverrun {
                    offset,
                    size,
                    len: buffer.len(),
                })?;
            return Ok(WaveInfo {
                format,
                data: header_end..end,
            });
        }

        offset = next_chunk(header_end, size).ok_or(WaveError::MissingData)?;
    }

    Err(WaveError::MissingData)
}

/// Offset of the chunk following a body that starts at `body` and spans `size`
/// bytes, including the pad byte of odd sized chunks.
fn next_chunk(body: usize, size: u32) -> Option<usize> {
    let size = size as usize;
    body.checked_add(size)?.checked_add(size & 1)
}
