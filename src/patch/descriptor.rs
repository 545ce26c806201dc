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
use std::fmt;

use crate::sample::SampleFormat;

/// Number of MIDI notes a patch can map.
pub const MAX_NUM_OF_KEYS: usize = 128;

/// Number of velocity layers per key. Only layer 0 is populated by the loader.
pub const MAX_VELOCITY_LAYERS: usize = 4;

/// Playback state of a voice layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VoiceStatus {
    #[default]
    Idle,
    /// Playing on the given hardware slot.
    Playing { slot: u16 },
}

/// One velocity layer of one key.
#[derive(Debug)]
pub struct VoiceInformation {
    /// Lowest velocity this layer answers to, inclusive.
    pub velocity_min: u8,
    /// Highest velocity this layer answers to, inclusive.
    pub velocity_max: u8,
    sample_path: Option<String>,
    sample: Option<SampleFormat>,
    status: VoiceStatus,
}

impl VoiceInformation {
    pub fn new(velocity_min: u8, velocity_max: u8, sample_path: Option<String>) -> Self {
        Self {
            velocity_min,
            velocity_max,
            sample_path,
            sample: None,
            status: VoiceStatus::Idle,
        }
    }

    /// The sample path relative to the manifest directory.
    pub fn sample_path(&self) -> Option<&str> {
        self.sample_path.as_deref()
    }

    pub(crate) fn set_sample_path(&mut self, path: String) {
        self.sample_path = Some(path);
    }

    /// Whether the manifest named a sample for this layer.
    pub fn sample_present(&self) -> bool {
        self.sample_path.is_some()
    }

    /// The loaded sample, if any.
    pub fn sample(&self) -> Option<&SampleFormat> {
        self.sample.as_ref()
    }

    pub(crate) fn set_sample(&mut self, sample: SampleFormat) {
        self.sample = Some(sample);
    }

    pub fn status(&self) -> VoiceStatus {
        self.status
    }

    pub(crate) fn set_status(&mut self, status: VoiceStatus) {
        self.status = status;
    }

    /// Whether `velocity` falls within `[velocity_min, velocity_max]`.
    pub fn matches_velocity(&self, velocity: u8) -> bool {
        self.velocity_min <= velocity && velocity <= self.velocity_max
    }
}

/// The velocity layers of one key.
#[derive(Debug, Default)]
pub struct KeyInformation {
    layers: [Option<VoiceInformation>; MAX_VELOCITY_LAYERS],
}

impl KeyInformation {
    pub fn layer(&self, index: usize) -> Option<&VoiceInformation> {
        self.layers.get(index)?.as_ref()
    }

    pub fn layer_mut(&mut self, index: usize) -> Option<&mut VoiceInformation> {
        self.layers.get_mut(index)?.as_mut()
    }

    /// Returns the layer at `index`, creating an empty one if needed.
    pub(crate) fn layer_or_insert(&mut self, index: usize) -> &mut VoiceInformation {
        self.layers[index].get_or_insert_with(|| VoiceInformation::new(0, 0, None))
    }

    /// Iterates the populated layers in index order.
    pub fn layers(&self) -> impl Iterator<Item = (usize, &VoiceInformation)> + '_ {
        self.layers
            .iter()
            .enumerate()
            .filter_map(|(index, layer)| layer.as_ref().map(|layer| (index, layer)))
    }

    pub(crate) fn layers_mut(&mut self) -> impl Iterator<Item = (usize, &mut VoiceInformation)> + '_ {
        self.layers
            .iter_mut()
            .enumerate()
            .filter_map(|(index, layer)| layer.as_mut().map(|layer| (index, layer)))
    }
}

/// One loaded instrument. The descriptor owns every key, layer and sample
/// payload beneath it; dropping it releases them all.
///
/// A descriptor is not synchronized. At most one mutating call (a load, a
/// `play_key` or a `stop_all`) may be in flight against it at a time, and the
/// caller provides that exclusion.
pub struct PatchDescriptor {
    name: String,
    keys: Vec<Option<KeyInformation>>,
    loaded: bool,
    total_bytes: usize,
    total_keys: usize,
}

impl PatchDescriptor {
    pub fn new() -> Self {
        Self {
            name: String::new(),
            keys: std::iter::repeat_with(|| None).take(MAX_NUM_OF_KEYS).collect(),
            loaded: false,
            total_bytes: 0,
            total_keys: 0,
        }
    }

    /// The instrument name. Empty if the manifest had none.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn set_name(&mut self, name: String) {
        self.name = name;
    }

    pub fn key(&self, note: u8) -> Option<&KeyInformation> {
        self.keys.get(usize::from(note))?.as_ref()
    }

    pub fn key_mut(&mut self, note: u8) -> Option<&mut KeyInformation> {
        self.keys.get_mut(usize::from(note))?.as_mut()
    }

    /// Returns the key for `note`, creating it if needed.
    pub(crate) fn key_or_insert(&mut self, note: u8) -> &mut KeyInformation {
        self.keys[usize::from(note)].get_or_insert_with(KeyInformation::default)
    }

    /// True only once every referenced sample has been decoded and aligned.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub(crate) fn mark_loaded(&mut self, total_bytes: usize, total_keys: usize) {
        self.total_bytes = total_bytes;
        self.total_keys = total_keys;
        self.loaded = true;
    }

    /// Bytes of sample payload held by this patch.
    pub fn total_bytes(&self) -> usize {
        self.total_bytes
    }

    /// Number of samples loaded into this patch.
    pub fn total_keys(&self) -> usize {
        self.total_keys
    }

    /// Iterates every populated voice layer as `(note, layer, voice)`.
    pub fn voices(&self) -> impl Iterator<Item = (u8, usize, &VoiceInformation)> + '_ {
        self.keys
            .iter()
            .enumerate()
            .filter_map(|(note, key)| key.as_ref().map(|key| (note as u8, key)))
            .flat_map(|(note, key)| key.layers().map(move |(layer, voice)| (note, layer, voice)))
    }

    pub(crate) fn voices_mut(
        &mut self,
    ) -> impl Iterator<Item = (u8, usize, &mut VoiceInformation)> + '_ {
        self.keys
            .iter_mut()
            .enumerate()
            .filter_map(|(note, key)| key.as_mut().map(|key| (note as u8, key)))
            .flat_map(|(note, key)| {
                key.layers_mut()
                    .map(move |(layer, voice)| (note, layer, voice))
            })
    }
}

impl Default for PatchDescriptor {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for PatchDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PatchDescriptor")
            .field("name", &self.name)
            .field("keys", &self.keys.iter().filter(|key| key.is_some()).count())
            .field("loaded", &self.loaded)
            .field("total_bytes", &self.total_bytes)
            .field("total_keys", &self.total_keys)
            .finish()
    }
}
