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
//! Voice playback: dispatches key events to hardware voice slots.

use std::sync::Arc;

use tracing::{debug, info, warn};

mod error;

pub use error::PlaybackError;

use crate::dma::{VoiceDma, SLOT_NONE};
use crate::patch::{PatchDescriptor, VoiceStatus, MAX_NUM_OF_KEYS};

/// What a successful call to [`VoiceEngine::play_key`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    /// A note-on started the given layer on a hardware slot.
    Started { layer: usize, slot: u16 },
    /// A note-off stopped this many playing layers.
    Stopped { count: usize },
    /// A note-on matched no velocity layer of the key.
    Unmatched,
}

/// Dispatches key events against a patch descriptor.
///
/// The engine does no locking of its own. At most one mutating call may be in
/// flight against a given descriptor at a time, and a descriptor must not be
/// played while it is being loaded.
pub struct VoiceEngine {
    dma: Arc<dyn VoiceDma>,
}

impl VoiceEngine {
    pub fn new(dma: Arc<dyn VoiceDma>) -> VoiceEngine {
        VoiceEngine { dma }
    }

    pub fn dma(&self) -> &Arc<dyn VoiceDma> {
        &self.dma
    }

    /// Handles a key event. A velocity of zero is a note-off and stops every
    /// playing layer of the key. Any other velocity starts the first layer,
    /// in index order, whose inclusive velocity bounds contain it.
    pub fn play_key(
        &self,
        note: u8,
        velocity: u8,
        descriptor: Option<&mut PatchDescriptor>,
    ) -> Result<KeyAction, PlaybackError> {
        let descriptor = match descriptor {
            Some(descriptor) if descriptor.is_loaded() => descriptor,
            _ => return Err(PlaybackError::NoInstrument),
        };
        if usize::from(note) >= MAX_NUM_OF_KEYS {
            return Err(PlaybackError::UnknownKey(note));
        }
        let key = descriptor
            .key_mut(note)
            .ok_or(PlaybackError::UnknownKey(note))?;

        if velocity == 0 {
            let mut count = 0;
            for (layer, voice) in key.layers_mut() {
                if let VoiceStatus::Playing { slot } = voice.status() {
                    self.dma.stop_slot(slot);
                    voice.set_status(VoiceStatus::Idle);
                    debug!(note, layer, slot, "Voice stopped");
                    count += 1;
                }
            }
            return Ok(KeyAction::Stopped { count });
        }

        let Some((layer, voice)) = key
            .layers_mut()
            .find(|(_, voice)| voice.matches_velocity(velocity))
        else {
            debug!(note, velocity, "No velocity layer matched");
            return Ok(KeyAction::Unmatched);
        };

        if let VoiceStatus::Playing { slot } = voice.status() {
            return Err(PlaybackError::VoiceBusy { slot });
        }
        let (address, length) = voice
            .sample()
            .map(|sample| (sample.data().address(), sample.data().len()))
            .ok_or(PlaybackError::NoSample)?;

        let slot = self
            .dma
            .start_slot(address, length)
            .filter(|slot| *slot != SLOT_NONE)
            .ok_or_else(|| {
                warn!(note, velocity, "No voice slot available");
                PlaybackError::NoSlotAvailable
            })?;

        voice.set_status(VoiceStatus::Playing { slot });
        debug!(note, velocity, layer, slot, "Voice started");
        Ok(KeyAction::Started { layer, slot })
    }

    /// Stops the hardware unconditionally, then forces every playing layer of
    /// the descriptor, if one is given, back to idle.
    pub fn stop_all(&self, descriptor: Option<&mut PatchDescriptor>) {
        self.dma.global_stop();
        for slot in 0..self.dma.slot_count() {
            self.dma.stop_slot(slot);
        }

        let Some(descriptor) = descriptor else {
            info!("All voices stopped");
            return;
        };
        let mut count = 0;
        for (_, _, voice) in descriptor.voices_mut() {
            if matches!(voice.status(), VoiceStatus::Playing { .. }) {
                voice.set_status(VoiceStatus::Idle);
                count += 1;
            }
        }
        info!(voices = count, "All voices stopped");
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::dma::mock::{Dma, DmaCall};
    use crate::sample::{load_sample, SampleFormat};
    use crate::storage::MemoryStorage;
    use crate::testutil::hound_wav;

    fn sample() -> SampleFormat {
        let storage = MemoryStorage::new();
        storage.insert("s.wav", hound_wav(1, 44100, &[1, 2, 3, 4]));
        load_sample(&storage, Path::new("s.wav"), 1024).unwrap().0
    }

    /// Note 60 has a soft and a loud layer, 62 has no sample and 64 only
    /// answers to high velocities.
    fn descriptor() -> PatchDescriptor {
        let mut descriptor = PatchDescriptor::new();
        let key = descriptor.key_or_insert(60);
        let soft = key.layer_or_insert(0);
        soft.velocity_min = 1;
        soft.velocity_max = 63;
        soft.set_sample(sample());
        let loud = key.layer_or_insert(1);
        loud.velocity_min = 64;
        loud.velocity_max = 127;
        loud.set_sample(sample());

        let empty = descriptor.key_or_insert(62).layer_or_insert(0);
        empty.velocity_min = 1;
        empty.velocity_max = 127;

        let high = descriptor.key_or_insert(64).layer_or_insert(0);
        high.velocity_min = 100;
        high.velocity_max = 127;
        high.set_sample(sample());

        descriptor.mark_loaded(24, 3);
        descriptor
    }

    fn engine(slots: u16) -> (Arc<Dma>, VoiceEngine) {
        let dma = Arc::new(Dma::get("mock", slots));
        let engine = VoiceEngine::new(dma.clone());
        (dma, engine)
    }

    fn status(descriptor: &PatchDescriptor, note: u8, layer: usize) -> VoiceStatus {
        descriptor.key(note).unwrap().layer(layer).unwrap().status()
    }

    #[test]
    fn test_note_on_and_off() {
        let (dma, engine) = engine(4);
        let mut descriptor = descriptor();

        assert_eq!(
            engine.play_key(60, 30, Some(&mut descriptor)),
            Ok(KeyAction::Started { layer: 0, slot: 0 })
        );
        assert_eq!(
            engine.play_key(60, 100, Some(&mut descriptor)),
            Ok(KeyAction::Started { layer: 1, slot: 1 })
        );
        assert_eq!(status(&descriptor, 60, 1), VoiceStatus::Playing { slot: 1 });

        let address = descriptor
            .key(60)
            .unwrap()
            .layer(0)
            .unwrap()
            .sample()
            .unwrap()
            .data()
            .address();
        assert_eq!(
            dma.calls()[0],
            DmaCall::Start {
                address,
                length: 8,
                slot: Some(0)
            }
        );

        dma.clear_calls();
        assert_eq!(
            engine.play_key(60, 0, Some(&mut descriptor)),
            Ok(KeyAction::Stopped { count: 2 })
        );
        assert_eq!(dma.calls(), vec![DmaCall::Stop(0), DmaCall::Stop(1)]);
        assert_eq!(status(&descriptor, 60, 0), VoiceStatus::Idle);
        assert_eq!(status(&descriptor, 60, 1), VoiceStatus::Idle);

        // Nothing left to stop.
        assert_eq!(
            engine.play_key(60, 0, Some(&mut descriptor)),
            Ok(KeyAction::Stopped { count: 0 })
        );
    }

    #[test]
    fn test_velocity_bounds_are_inclusive() {
        let (_, engine) = engine(4);
        let mut descriptor = descriptor();

        assert_eq!(
            engine.play_key(60, 63, Some(&mut descriptor)),
            Ok(KeyAction::Started { layer: 0, slot: 0 })
        );
        assert_eq!(
            engine.play_key(60, 64, Some(&mut descriptor)),
            Ok(KeyAction::Started { layer: 1, slot: 1 })
        );
        assert_eq!(
            engine.play_key(64, 99, Some(&mut descriptor)),
            Ok(KeyAction::Unmatched)
        );
        assert_eq!(
            engine.play_key(64, 100, Some(&mut descriptor)),
            Ok(KeyAction::Started { layer: 0, slot: 2 })
        );
    }

    #[test]
    fn test_voice_busy_leaves_hardware_untouched() {
        let (dma, engine) = engine(4);
        let mut descriptor = descriptor();

        engine.play_key(60, 10, Some(&mut descriptor)).unwrap();
        let calls = dma.calls();
        assert_eq!(
            engine.play_key(60, 20, Some(&mut descriptor)),
            Err(PlaybackError::VoiceBusy { slot: 0 })
        );
        assert_eq!(dma.calls(), calls);
        assert_eq!(status(&descriptor, 60, 0), VoiceStatus::Playing { slot: 0 });
    }

    #[test]
    fn test_playback_errors() {
        let (dma, engine) = engine(4);
        let mut descriptor = descriptor();

        assert_eq!(
            engine.play_key(60, 10, None),
            Err(PlaybackError::NoInstrument)
        );
        assert_eq!(
            engine.play_key(60, 10, Some(&mut PatchDescriptor::new())),
            Err(PlaybackError::NoInstrument)
        );
        assert_eq!(
            engine.play_key(61, 10, Some(&mut descriptor)),
            Err(PlaybackError::UnknownKey(61))
        );
        assert_eq!(
            engine.play_key(200, 10, Some(&mut descriptor)),
            Err(PlaybackError::UnknownKey(200))
        );
        assert_eq!(
            engine.play_key(62, 10, Some(&mut descriptor)),
            Err(PlaybackError::NoSample)
        );
        assert!(dma.calls().is_empty());
    }

    #[test]
    fn test_no_slot_available() {
        let (dma, engine) = engine(2);
        let mut descriptor = descriptor();
        dma.occupy_all();

        assert_eq!(
            engine.play_key(60, 10, Some(&mut descriptor)),
            Err(PlaybackError::NoSlotAvailable)
        );
        assert_eq!(status(&descriptor, 60, 0), VoiceStatus::Idle);
    }

    #[test]
    fn test_stop_all_without_descriptor() {
        let (dma, engine) = engine(3);
        engine.stop_all(None);
        assert_eq!(
            dma.calls(),
            vec![
                DmaCall::GlobalStop,
                DmaCall::Stop(0),
                DmaCall::Stop(1),
                DmaCall::Stop(2)
            ]
        );
    }

    #[test]
    fn test_stop_all_resets_voices() {
        let (dma, engine) = engine(4);
        let mut descriptor = descriptor();
        engine.play_key(60, 10, Some(&mut descriptor)).unwrap();
        engine.play_key(60, 90, Some(&mut descriptor)).unwrap();
        engine.play_key(64, 110, Some(&mut descriptor)).unwrap();
        assert_eq!(dma.active_slots(), 3);

        engine.stop_all(Some(&mut descriptor));
        assert_eq!(dma.active_slots(), 0);
        assert!(descriptor
            .voices()
            .all(|(_, _, voice)| voice.status() == VoiceStatus::Idle));

        // Playable again.
        assert_eq!(
            engine.play_key(64, 110, Some(&mut descriptor)),
            Ok(KeyAction::Started { layer: 0, slot: 0 })
        );
    }
}
