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

//! Sample payload memory.
//!
//! Each sample file is read into a transient buffer, decoded, and its payload
//! copied into a buffer whose start address is a multiple of four, as the
//! voice DMA requires. The transient buffer is released before returning.

use std::fmt;
use std::path::Path;

use tracing::{debug, warn};

use crate::patch::LoadError;
use crate::storage::Storage;
use crate::wave::{self, WaveFormat};

/// Alignment, in bytes, required of every payload start address.
pub const PAYLOAD_ALIGNMENT: usize = std::mem::align_of::<u32>();

/// A byte buffer whose start address is a multiple of [`PAYLOAD_ALIGNMENT`].
///
/// The bytes are stored in 32-bit words, so the alignment comes from the type
/// rather than from allocator behaviour.
pub struct AlignedBuffer {
    words: Vec<u32>,
    len: usize,
}

impl AlignedBuffer {
    /// Copies `bytes` into a newly allocated aligned buffer.
    pub fn copy_from(bytes: &[u8]) -> Result<AlignedBuffer, LoadError> {
        let word_count = bytes.len().div_ceil(PAYLOAD_ALIGNMENT);
        let mut words: Vec<u32> = Vec::new();
        words
            .try_reserve_exact(word_count)
            .map_err(|_| LoadError::AllocationFailure { size: bytes.len() })?;
        words.resize(word_count, 0);

        let len = bytes.len();
        bytemuck::cast_slice_mut::<u32, u8>(&mut words)[..len].copy_from_slice(bytes);

        Ok(AlignedBuffer { words, len })
    }

    /// The payload bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &bytemuck::cast_slice::<u32, u8>(&self.words)[..self.len]
    }

    /// The start address handed to the DMA.
    pub fn address(&self) -> usize {
        self.words.as_ptr() as usize
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl fmt::Debug for AlignedBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlignedBuffer")
            .field("address", &format_args!("{:#x}", self.address()))
            .field("len", &self.len)
            .finish()
    }
}

/// Decoded WAVE metadata together with the aligned payload it describes.
/// Populated once by [`load_sample`] and never mutated afterwards.
#[derive(Debug)]
pub struct SampleFormat {
    pub audio_format: u16,
    pub channels: u16,
    pub sample_rate: u32,
    pub byte_rate: u32,
    pub block_align: u16,
    pub bits_per_sample: u16,
    /// Size of the payload in bytes.
    pub audio_data_size: u32,
    data: AlignedBuffer,
}

impl SampleFormat {
    fn new(format: WaveFormat, data: AlignedBuffer) -> SampleFormat {
        SampleFormat {
            audio_format: format.audio_format,
            channels: format.channels,
            sample_rate: format.sample_rate,
            byte_rate: format.byte_rate,
            block_align: format.block_align,
            bits_per_sample: format.bits_per_sample,
            audio_data_size: data.len() as u32,
            data,
        }
    }

    /// The aligned payload.
    pub fn data(&self) -> &AlignedBuffer {
        &self.data
    }
}

/// Reads, decodes and realigns the sample at `path`.
///
/// Returns the sample and the size of the file it was read from. Any failure
/// leaves nothing behind: the transient file buffer and any partially built
/// payload are dropped.
pub fn load_sample(
    storage: &dyn Storage,
    path: &Path,
    max_sample_size: usize,
) -> Result<(SampleFormat, usize), LoadError> {
    let riff = storage
        .read(path, max_sample_size)
        .map_err(|e| LoadError::from_sample_read(path, e))?;

    let info = wave::decode(&riff).map_err(|source| {
        warn!(path = ?path, err = %source, "Unable to decode sample");
        LoadError::from_wave(path, source)
    })?;

    let data = AlignedBuffer::copy_from(info.payload(&riff))?;
    debug!(
        path = ?path,
        channels = info.format.channels,
        sample_rate = info.format.sample_rate,
        bits_per_sample = info.format.bits_per_sample,
        bytes = data.len(),
        address = format!("{:#x}", data.address()),
        "Sample realigned"
    );

    Ok((SampleFormat::new(info.format, data), riff.len()))
}
