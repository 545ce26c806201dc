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
//! The sampler: one loaded instrument, its voice engine, and the lock that
//! serializes loads against playback.

use std::path::Path;
use std::sync::Arc;

use midly::live::LiveEvent;
use midly::MidiMessage;
use parking_lot::Mutex;
use tokio::sync::mpsc::Receiver;
use tracing::{debug, info, warn};

use crate::dma::VoiceDma;
use crate::engine::{KeyAction, PlaybackError, VoiceEngine};
use crate::patch::{LoadError, LoadLimits, PatchDescriptor, PatchLoader};
use crate::storage::Storage;

pub struct Sampler {
    storage: Arc<dyn Storage>,
    limits: LoadLimits,
    engine: VoiceEngine,
    patch: Mutex<Option<PatchDescriptor>>,
}

impl Sampler {
    pub fn new(storage: Arc<dyn Storage>, dma: Arc<dyn VoiceDma>, limits: LoadLimits) -> Sampler {
        Sampler {
            storage,
            limits,
            engine: VoiceEngine::new(dma),
            patch: Mutex::new(None),
        }
    }

    /// Replaces the loaded instrument. Every voice is stopped and the current
    /// instrument released before the new one is read. If the load fails, no
    /// instrument is left loaded.
    pub fn load_instrument(
        &self,
        manifest_dir: &Path,
        manifest_path: &Path,
    ) -> Result<(), LoadError> {
        let mut patch = self.patch.lock();
        self.engine.stop_all(patch.as_mut());
        *patch = None;

        let descriptor =
            PatchLoader::new(self.storage.as_ref(), self.limits).load(manifest_dir, manifest_path)?;
        *patch = Some(descriptor);
        Ok(())
    }

    /// Stops every voice and releases the loaded instrument.
    pub fn unload(&self) {
        let mut patch = self.patch.lock();
        self.engine.stop_all(patch.as_mut());
        *patch = None;
    }

    pub fn is_loaded(&self) -> bool {
        self.patch
            .lock()
            .as_ref()
            .is_some_and(|patch| patch.is_loaded())
    }

    /// Runs `f` against the loaded instrument while holding the sampler lock.
    pub fn with_patch<R>(&self, f: impl FnOnce(Option<&PatchDescriptor>) -> R) -> R {
        f(self.patch.lock().as_ref())
    }

    pub fn play_key(&self, note: u8, velocity: u8) -> Result<KeyAction, PlaybackError> {
        self.engine.play_key(note, velocity, self.patch.lock().as_mut())
    }

    pub fn stop_all(&self) {
        self.engine.stop_all(self.patch.lock().as_mut());
    }

    /// Dispatches a raw MIDI message. Note-on with a non-zero velocity starts
    /// a voice, note-off (or note-on at velocity zero) stops the key. Other
    /// messages, on any channel, are ignored and give `None`.
    pub fn process_midi_event(
        &self,
        raw_event: &[u8],
    ) -> Option<Result<KeyAction, PlaybackError>> {
        let (key, vel) = match LiveEvent::parse(raw_event) {
            Ok(LiveEvent::Midi {
                message: MidiMessage::NoteOn { key, vel },
                ..
            }) => (key.as_int(), vel.as_int()),
            Ok(LiveEvent::Midi {
                message: MidiMessage::NoteOff { key, .. },
                ..
            }) => (key.as_int(), 0),
            Ok(_) => return None,
            Err(e) => {
                debug!(err = %e, "Ignoring unparseable MIDI event");
                return None;
            }
        };
        Some(self.play_key(key, vel))
    }

    /// Dispatches MIDI events until the sending side of the channel closes.
    pub async fn process_midi_events(&self, mut receiver: Receiver<Vec<u8>>) {
        info!("Processing MIDI events");
        while let Some(event) = receiver.recv().await {
            match self.process_midi_event(&event) {
                Some(Ok(action)) => debug!(?action, "Key event handled"),
                Some(Err(e)) => warn!(err = %e, "Key event failed"),
                None => {}
            }
        }
        info!("MIDI event channel closed");
    }
}
