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
use std::io::Cursor;

use hound::{SampleFormat, WavSpec, WavWriter};

/// Encodes 16-bit integer samples (interleaved by channel) as a WAVE file.
pub fn hound_wav(channels: u16, sample_rate: u32, samples: &[i16]) -> Vec<u8> {
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = WavWriter::new(
            &mut cursor,
            WavSpec {
                channels,
                sample_rate,
                bits_per_sample: 16,
                sample_format: SampleFormat::Int,
            },
        )
        .expect("unable to create wav writer");
        for sample in samples {
            writer.write_sample(*sample).expect("unable to write sample");
        }
        writer.finalize().expect("unable to finalize wav");
    }
    cursor.into_inner()
}

/// Builds WAVE buffers chunk by chunk, including malformed ones that a
/// regular encoder would refuse to produce.
pub struct WaveBuilder {
    channels: u16,
    sample_rate: u32,
    bits_per_sample: u16,
    format_extra: Vec<u8>,
    chunks: Vec<u8>,
}

impl WaveBuilder {
    pub fn new(channels: u16, sample_rate: u32, bits_per_sample: u16) -> WaveBuilder {
        WaveBuilder {
            channels,
            sample_rate,
            bits_per_sample,
            format_extra: Vec::new(),
            chunks: Vec::new(),
        }
    }

    /// Appends bytes to the `fmt ` chunk beyond its 16 byte body.
    pub fn format_extra(mut self, extra: &[u8]) -> WaveBuilder {
        self.format_extra.extend_from_slice(extra);
        self
    }

    /// Appends a chunk, padding odd sized bodies.
    pub fn chunk(self, tag: &[u8; 4], body: &[u8]) -> WaveBuilder {
        let mut builder = self.raw_chunk(tag, body.len() as u32, body);
        if body.len() % 2 == 1 {
            builder.chunks.push(0);
        }
        builder
    }

    /// Appends a chunk header declaring `declared_size` followed by `body`,
    /// without padding.
    pub fn raw_chunk(mut self, tag: &[u8; 4], declared_size: u32, body: &[u8]) -> WaveBuilder {
        self.chunks.extend_from_slice(tag);
        self.chunks.extend_from_slice(&declared_size.to_le_bytes());
        self.chunks.extend_from_slice(body);
        self
    }

    /// Appends the `data` chunk.
    pub fn data(self, payload: &[u8]) -> WaveBuilder {
        self.chunk(b"data", payload)
    }

    pub fn build(self) -> Vec<u8> {
        let block_align = self.channels * self.bits_per_sample / 8;
        let byte_rate = self.sample_rate * u32::from(block_align);

        let mut fmt = Vec::new();
        fmt.extend_from_slice(&1u16.to_le_bytes());
        fmt.extend_from_slice(&self.channels.to_le_bytes());
        fmt.extend_from_slice(&self.sample_rate.to_le_bytes());
        fmt.extend_from_slice(&byte_rate.to_le_bytes());
        fmt.extend_from_slice(&block_align.to_le_bytes());
        fmt.extend_from_slice(&self.bits_per_sample.to_le_bytes());
        fmt.extend_from_slice(&self.format_extra);

        let mut body = Vec::new();
        body.extend_from_slice(b"WAVE");
        body.extend_from_slice(b"fmt ");
        body.extend_from_slice(&(fmt.len() as u32).to_le_bytes());
        body.extend_from_slice(&fmt);
        body.extend_from_slice(&self.chunks);

        let mut buffer = Vec::new();
        buffer.extend_from_slice(b"RIFF");
        buffer.extend_from_slice(&(body.len() as u32).to_le_bytes());
        buffer.extend_from_slice(&body);
        buffer
    }
}
