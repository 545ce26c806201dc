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

//! Patch descriptors and the loader that builds them.
//!
//! A patch is made of keys (MIDI notes). Each key holds one or more voice
//! layers distinguished by velocity, and each voice layer refers to one
//! sample held in memory for the lifetime of the patch.

mod descriptor;
mod error;
mod loader;

pub use descriptor::{
    KeyInformation, PatchDescriptor, VoiceInformation, VoiceStatus, MAX_NUM_OF_KEYS,
    MAX_VELOCITY_LAYERS,
};
pub use error::LoadError;
pub use loader::{build_descriptor, LoadLimits, PatchLoader};
