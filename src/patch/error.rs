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
use std::path::{Path, PathBuf};

use crate::manifest::ManifestError;
use crate::storage::StorageError;
use crate::wave::WaveError;

/// Errors that abort a patch load. Any of them leaves no descriptor behind.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("manifest {path} is {size} bytes, larger than the {max} byte limit")]
    ManifestTooLarge { path: PathBuf, size: u64, max: usize },

    #[error("unable to parse manifest: {0}")]
    Parse(#[from] ManifestError),

    #[error("sample {path} is not a usable RIFF/WAVE file: {source}")]
    Format {
        path: PathBuf,
        #[source]
        source: WaveError,
    },

    #[error("sample {path} is truncated: {source}")]
    Truncated {
        path: PathBuf,
        #[source]
        source: WaveError,
    },

    #[error("unable to allocate {size} bytes")]
    AllocationFailure { size: usize },

    #[error("sample {path} is {size} bytes, larger than the {max} byte limit")]
    SampleTooLarge { path: PathBuf, size: u64, max: usize },

    #[error("unable to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: StorageError,
    },
}

impl LoadError {
    pub(crate) fn from_manifest_read(path: &Path, error: StorageError) -> LoadError {
        match error {
            StorageError::TooLarge { size, max, .. } => LoadError::ManifestTooLarge {
                path: path.to_path_buf(),
                size,
                max,
            },
            StorageError::Allocation { size } => LoadError::AllocationFailure { size },
            source => LoadError::Read {
                path: path.to_path_buf(),
                source,
            },
        }
    }

    pub(crate) fn from_sample_read(path: &Path, error: StorageError) -> LoadError {
        match error {
            StorageError::TooLarge { size, max, .. } => LoadError::SampleTooLarge {
                path: path.to_path_buf(),
                size,
                max,
            },
            StorageError::Allocation { size } => LoadError::AllocationFailure { size },
            source => LoadError::Read {
                path: path.to_path_buf(),
                source,
            },
        }
    }

    pub(crate) fn from_wave(path: &Path, source: WaveError) -> LoadError {
        let path = path.to_path_buf();
        if source.is_truncation() {
            LoadError::Truncated { path, source }
        } else {
            LoadError::Format { path, source }
        }
    }
}
