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
use std::path::Path;

use tracing::{debug, error, info, span, Level};

use super::descriptor::{PatchDescriptor, VoiceStatus, MAX_NUM_OF_KEYS};
use super::error::LoadError;
use crate::config::{
    DEFAULT_MAX_MANIFEST_SIZE, DEFAULT_MAX_MANIFEST_TOKENS, DEFAULT_MAX_SAMPLE_SIZE,
};
use crate::manifest::Manifest;
use crate::note::resolve_note;
use crate::sample::load_sample;
use crate::storage::Storage;

/// Size and token limits applied while loading a patch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadLimits {
    pub max_manifest_size: usize,
    pub max_sample_size: usize,
    pub max_manifest_tokens: usize,
}

impl Default for LoadLimits {
    fn default() -> Self {
        Self {
            max_manifest_size: DEFAULT_MAX_MANIFEST_SIZE,
            max_sample_size: DEFAULT_MAX_SAMPLE_SIZE,
            max_manifest_tokens: DEFAULT_MAX_MANIFEST_TOKENS,
        }
    }
}

/// Loads patches from a manifest and the WAVE files it references.
pub struct PatchLoader<'a> {
    storage: &'a dyn Storage,
    limits: LoadLimits,
}

impl<'a> PatchLoader<'a> {
    pub fn new(storage: &'a dyn Storage, limits: LoadLimits) -> Self {
        Self { storage, limits }
    }

    /// Loads the patch described by the manifest at `manifest_path`. Sample
    /// paths in the manifest are relative to `manifest_dir`.
    ///
    /// The returned descriptor is marked loaded. On any failure the partially
    /// built descriptor is dropped along with every sample already loaded.
    pub fn load(
        &self,
        manifest_dir: &Path,
        manifest_path: &Path,
    ) -> Result<PatchDescriptor, LoadError> {
        let span = span!(Level::INFO, "load patch");
        let _enter = span.enter();

        info!(manifest = ?manifest_path, "Loading patch");
        let manifest = {
            let bytes = self
                .storage
                .read(manifest_path, self.limits.max_manifest_size)
                .map_err(|e| LoadError::from_manifest_read(manifest_path, e))?;
            Manifest::from_bytes(&bytes, self.limits.max_manifest_tokens)?
        };

        let mut descriptor = build_descriptor(&manifest);
        self.load_samples(&mut descriptor, manifest_dir)?;

        info!(
            name = descriptor.name(),
            keys = descriptor.total_keys(),
            bytes = descriptor.total_bytes(),
            "Patch loaded"
        );
        Ok(descriptor)
    }

    /// Loads every sample named by the descriptor and marks it loaded.
    fn load_samples(
        &self,
        descriptor: &mut PatchDescriptor,
        manifest_dir: &Path,
    ) -> Result<(), LoadError> {
        let mut total_bytes = 0;
        let mut total_keys = 0;

        for (note, layer, voice) in descriptor.voices_mut() {
            let Some(relative) = voice.sample_path() else {
                continue;
            };
            let path = manifest_dir.join(relative);
            debug!(note, layer, path = ?path, "Loading sample");

            let (sample, file_size) = load_sample(self.storage, &path, self.limits.max_sample_size)
                .inspect_err(|e| error!(note, layer, err = %e, "Failed to load sample"))?;

            debug!(note, layer, file_size, "Sample loaded");
            total_bytes += sample.audio_data_size as usize;
            total_keys += 1;
            voice.set_sample(sample);
            voice.set_status(VoiceStatus::Idle);
        }

        descriptor.mark_loaded(total_bytes, total_keys);
        Ok(())
    }
}

/// Builds the key/voice tree of a manifest without loading any samples.
///
/// Entries whose note does not resolve, or resolves outside the key map, are
/// skipped. Only velocity layer 0 is populated; a later entry for the same
/// note overwrites the velocity bounds of an earlier one, and replaces its
/// path if it names one.
pub fn build_descriptor(manifest: &Manifest) -> PatchDescriptor {
    let mut descriptor = PatchDescriptor::new();
    if let Some(name) = &manifest.name {
        descriptor.set_name(name.clone());
    }

    for entry in &manifest.samples {
        let note = match resolve_note(&entry.note) {
            Some(note) if usize::from(note) < MAX_NUM_OF_KEYS => note as u8,
            Some(note) => {
                debug!(token = entry.note, note, "Note outside the key map, skipping");
                continue;
            }
            None => {
                debug!(token = entry.note, "Unresolved note, skipping");
                continue;
            }
        };

        let voice = descriptor.key_or_insert(note).layer_or_insert(0);
        voice.velocity_min = entry.velocity_min;
        voice.velocity_max = entry.velocity_max;
        if let Some(path) = &entry.path {
            voice.set_sample_path(path.clone());
        }
        debug!(note, path = ?entry.path, "Mapped sample");
    }

    descriptor
}
