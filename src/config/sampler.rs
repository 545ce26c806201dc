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
use serde::Deserialize;

use super::{
    ConfigError, DEFAULT_MAX_MANIFEST_SIZE, DEFAULT_MAX_MANIFEST_TOKENS, DEFAULT_MAX_SAMPLE_SIZE,
    DEFAULT_VOICE_SLOTS,
};
use crate::dma::SLOT_NONE;
use crate::patch::LoadLimits;

/// A YAML representation of the sampler configuration. Every field is
/// optional.
#[derive(Deserialize, Clone, Debug, Default)]
pub struct SamplerConfig {
    /// Largest manifest accepted, in bytes.
    max_manifest_size: Option<usize>,

    /// Largest sample file accepted, in bytes.
    max_sample_size: Option<usize>,

    /// Most tokens a manifest may hold.
    max_manifest_tokens: Option<usize>,

    /// Number of hardware voice slots.
    voice_slots: Option<u16>,

    /// The MIDI input device to listen on.
    midi_device: Option<String>,
}

impl SamplerConfig {
    pub(super) fn validate(&self) -> Result<(), ConfigError> {
        let slots = self.voice_slots();
        if slots == 0 || slots >= SLOT_NONE {
            return Err(ConfigError::Invalid(format!(
                "voice_slots must be between 1 and {}, got {}",
                SLOT_NONE - 1,
                slots
            )));
        }
        if self.max_manifest_tokens() == 0 {
            return Err(ConfigError::Invalid(
                "max_manifest_tokens must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Returns the largest manifest accepted (default: 64 KiB).
    pub fn max_manifest_size(&self) -> usize {
        self.max_manifest_size.unwrap_or(DEFAULT_MAX_MANIFEST_SIZE)
    }

    /// Returns the largest sample file accepted (default: 16 MiB).
    pub fn max_sample_size(&self) -> usize {
        self.max_sample_size.unwrap_or(DEFAULT_MAX_SAMPLE_SIZE)
    }

    /// Returns the manifest token budget (default: 1000).
    pub fn max_manifest_tokens(&self) -> usize {
        self.max_manifest_tokens
            .unwrap_or(DEFAULT_MAX_MANIFEST_TOKENS)
    }

    /// Returns the number of hardware voice slots (default: 32).
    pub fn voice_slots(&self) -> u16 {
        self.voice_slots.unwrap_or(DEFAULT_VOICE_SLOTS)
    }

    pub fn midi_device(&self) -> Option<&str> {
        self.midi_device.as_deref()
    }

    /// Returns the limits the patch loader applies.
    pub fn limits(&self) -> LoadLimits {
        LoadLimits {
            max_manifest_size: self.max_manifest_size(),
            max_sample_size: self.max_sample_size(),
            max_manifest_tokens: self.max_manifest_tokens(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::parse;
    use super::*;

    #[test]
    fn test_defaults() {
        let config = parse("{}").unwrap();
        assert_eq!(config.max_manifest_size(), 65536);
        assert_eq!(config.max_sample_size(), 16 * 1024 * 1024);
        assert_eq!(config.max_manifest_tokens(), 1000);
        assert_eq!(config.voice_slots(), 32);
        assert_eq!(config.midi_device(), None);
        assert_eq!(config.limits(), LoadLimits::default());
    }

    #[test]
    fn test_overrides() {
        let yaml = r#"
            max_manifest_size: 4096
            max_sample_size: 1048576
            max_manifest_tokens: 200
            voice_slots: 16
            midi_device: UM-ONE
        "#;

        let config = parse(yaml).unwrap();
        assert_eq!(
            config.limits(),
            LoadLimits {
                max_manifest_size: 4096,
                max_sample_size: 1048576,
                max_manifest_tokens: 200,
            }
        );
        assert_eq!(config.voice_slots(), 16);
        assert_eq!(config.midi_device(), Some("UM-ONE"));
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            parse("voice_slots: 0"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            parse("voice_slots: 65535"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            parse("max_manifest_tokens: 0"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            parse("voice_slots: many"),
            Err(ConfigError::Load(_))
        ));
    }
}
