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
use std::error::Error;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{crate_version, Parser, Subcommand};
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use sampler::config::{self, SamplerConfig};
use sampler::dma::{self, VoiceDma};
use sampler::patch::PatchDescriptor;
use sampler::storage::FsStorage;
use sampler::{midi, note, wave, Sampler};

#[derive(Parser)]
#[clap(
    author = "Michael Wilson",
    version = crate_version!(),
    about = "A polyphonic sample player."
)]
struct Cli {
    /// The path to the sampler config.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolves note names to MIDI note numbers.
    Note {
        /// Note names such as A0, C1# or C1_S.
        tokens: Vec<String>,
    },
    /// Decodes a WAVE file and prints its format.
    Decode {
        /// The path to the WAVE file.
        path: PathBuf,
    },
    /// Loads a patch and prints its keys and voice layers.
    Inspect {
        /// The path to the patch manifest.
        manifest: PathBuf,
    },
    /// Loads a patch and plays one key against a mock voice controller.
    Play {
        /// The path to the patch manifest.
        manifest: PathBuf,
        /// The key to play, as a note name (C5) or a MIDI note number (60).
        key: String,
        /// The velocity to play at.
        #[arg(default_value_t = 100)]
        velocity: u8,
    },
    /// Lists the available MIDI input devices.
    MidiDevices {},
    /// Loads a patch and plays it from MIDI input until interrupted.
    Listen {
        /// The path to the patch manifest.
        manifest: PathBuf,
        /// The MIDI input device name. Overrides the config.
        #[arg(short, long)]
        midi_device: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => config::load(path)?,
        None => SamplerConfig::default(),
    };

    match cli.command {
        Commands::Note { tokens } => {
            for token in tokens {
                match note::resolve_note(&token) {
                    Some(note) => println!("{} = {}", token, note),
                    None => println!("{} does not resolve", token),
                }
            }
        }
        Commands::Decode { path } => {
            let buffer = std::fs::read(&path)?;
            let info = wave::decode(&buffer)?;
            println!("{}:", path.display());
            println!("- Audio format: {}", info.format.audio_format);
            println!("- Channels: {}", info.format.channels);
            println!("- Sample rate: {}", info.format.sample_rate);
            println!("- Byte rate: {}", info.format.byte_rate);
            println!("- Block align: {}", info.format.block_align);
            println!("- Bits per sample: {}", info.format.bits_per_sample);
            println!(
                "- Data: {} bytes at offset {}",
                info.audio_data_size(),
                info.data.start
            );
        }
        Commands::Inspect { manifest } => {
            let sampler = load_sampler(&config, &manifest, mock_dma(&config))?;
            sampler.with_patch(|patch| {
                if let Some(patch) = patch {
                    print_patch(patch);
                }
            });
        }
        Commands::Play {
            manifest,
            key,
            velocity,
        } => {
            let note = match key.parse::<u8>() {
                Ok(note) => note,
                Err(_) => note::resolve_note(&key)
                    .and_then(|note| u8::try_from(note).ok())
                    .ok_or_else(|| format!("unable to resolve note {}", key))?,
            };

            let dma = Arc::new(dma::mock::Dma::get("mock", config.voice_slots()));
            let sampler = load_sampler(&config, &manifest, dma.clone())?;
            let action = sampler.play_key(note, velocity)?;
            println!("Note {} at velocity {}: {:?}", note, velocity, action);
            sampler.stop_all();
            for call in dma.calls() {
                println!("- {:?}", call);
            }
        }
        Commands::MidiDevices {} => {
            let devices = midi::list_devices()?;

            if devices.is_empty() {
                println!("No devices found.");
                return Ok(());
            }

            println!("Devices:");
            for device in devices {
                println!("- {}", device);
            }
        }
        Commands::Listen {
            manifest,
            midi_device,
        } => {
            let midi_device = midi_device
                .or_else(|| config.midi_device().map(str::to_string))
                .ok_or("there must be a MIDI device specified")?;
            let device = midi::get_device(&midi_device)?;
            let sampler = Arc::new(load_sampler(&config, &manifest, mock_dma(&config))?);

            let (tx, rx) = mpsc::channel(64);
            device.watch_events(tx)?;

            let processor = {
                let sampler = sampler.clone();
                tokio::spawn(async move { sampler.process_midi_events(rx).await })
            };

            info!(device = device.name(), "Listening, press Ctrl-C to stop.");
            tokio::signal::ctrl_c().await?;

            device.stop_watch_events();
            processor.await?;
            sampler.unload();
        }
    }

    Ok(())
}

fn mock_dma(config: &SamplerConfig) -> Arc<dyn VoiceDma> {
    Arc::new(dma::mock::Dma::get("mock", config.voice_slots()))
}

/// Loads the patch at `manifest` from the filesystem into a new sampler.
fn load_sampler(
    config: &SamplerConfig,
    manifest: &Path,
    dma: Arc<dyn VoiceDma>,
) -> Result<Sampler, Box<dyn Error>> {
    let manifest_dir = manifest.parent().unwrap_or_else(|| Path::new("."));
    let sampler = Sampler::new(Arc::new(FsStorage::new()), dma, config.limits());
    sampler.load_instrument(manifest_dir, manifest)?;
    Ok(sampler)
}

fn print_patch(patch: &PatchDescriptor) {
    println!(
        "{} (keys: {}, bytes: {})",
        if patch.name().is_empty() {
            "<unnamed>"
        } else {
            patch.name()
        },
        patch.total_keys(),
        patch.total_bytes()
    );
    for (note, layer, voice) in patch.voices() {
        let format = voice
            .sample()
            .map(|sample| {
                format!(
                    "{}ch {}Hz {}bit, {} bytes",
                    sample.channels,
                    sample.sample_rate,
                    sample.bits_per_sample,
                    sample.audio_data_size
                )
            })
            .unwrap_or_else(|| "no sample".to_string());
        println!(
            "- {} [{}] {}-{} {}: {}",
            note,
            layer,
            voice.velocity_min,
            voice.velocity_max,
            voice.sample_path().unwrap_or("-"),
            format
        );
    }
}
