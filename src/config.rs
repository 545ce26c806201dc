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
//! Sampler configuration, read from YAML.

use std::path::Path;

use ::config::{Config, File, FileFormat};

mod error;
mod sampler;

pub use error::ConfigError;
pub use sampler::SamplerConfig;

/// Largest manifest accepted, in bytes.
pub const DEFAULT_MAX_MANIFEST_SIZE: usize = 64 * 1024;

/// Largest sample file accepted, in bytes.
pub const DEFAULT_MAX_SAMPLE_SIZE: usize = 16 * 1024 * 1024;

/// Most tokens a manifest may hold.
pub const DEFAULT_MAX_MANIFEST_TOKENS: usize = 1000;

/// Number of hardware voice slots when none is configured.
pub const DEFAULT_VOICE_SLOTS: u16 = 32;

/// Loads the sampler configuration from a YAML file.
pub fn load(path: &Path) -> Result<SamplerConfig, ConfigError> {
    let config: SamplerConfig = Config::builder()
        .add_source(File::from(path).format(FileFormat::Yaml))
        .build()?
        .try_deserialize()?;
    config.validate()?;
    Ok(config)
}

/// Parses the sampler configuration from YAML text.
pub fn parse(yaml: &str) -> Result<SamplerConfig, ConfigError> {
    let config: SamplerConfig = Config::builder()
        .add_source(File::from_str(yaml, FileFormat::Yaml))
        .build()?
        .try_deserialize()?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "voice_slots: 8").unwrap();
        writeln!(file, "midi_device: Keystation").unwrap();

        let config = load(file.path()).unwrap();
        assert_eq!(config.voice_slots(), 8);
        assert_eq!(config.midi_device(), Some("Keystation"));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            load(&dir.path().join("missing.yaml")),
            Err(ConfigError::Load(_))
        ));
    }
}
