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
//! Instrument loading and voice dispatch for a DMA-driven polyphonic sample
//! player.
//!
//! A patch manifest maps note names to WAVE samples. Loading a patch resolves
//! every note, decodes and realigns every sample, and yields a
//! [`patch::PatchDescriptor`]. At runtime, key events are dispatched against
//! the descriptor by the [`engine::VoiceEngine`], which hands sample payloads
//! to hardware voice slots through a [`dma::VoiceDma`] implementation.

pub mod config;
pub mod dma;
pub mod engine;
pub mod manifest;
pub mod midi;
pub mod note;
pub mod patch;
pub mod sample;
pub mod sampler;
pub mod storage;
pub mod wave;

#[cfg(test)]
mod testutil;

pub use sampler::Sampler;
