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

//! The file-read collaborator.
//!
//! The loader never touches a filesystem directly; it asks a [`Storage`] for
//! the bytes of a named file, bounded by a maximum length.

use std::path::{Path, PathBuf};

mod fs;
mod memory;

pub use fs::FsStorage;
pub use memory::MemoryStorage;

/// Errors raised by a storage backend.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("file {0} not found")]
    NotFound(PathBuf),

    #[error("unable to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("file {path} is {size} bytes, larger than the {max} byte limit")]
    TooLarge { path: PathBuf, size: u64, max: usize },

    #[error("unable to allocate {size} bytes")]
    Allocation { size: usize },
}

/// Reads whole files into owned buffers.
pub trait Storage: Send + Sync {
    /// Reads the file at `path` into a freshly allocated buffer sized to the
    /// file. Fails with [`StorageError::TooLarge`] if the file is longer than
    /// `max_len`. The buffer is released when dropped.
    fn read(&self, path: &Path, max_len: usize) -> Result<Vec<u8>, StorageError>;
}

/// Allocates an empty buffer able to hold `size` bytes without reallocating.
pub(crate) fn allocate(size: usize) -> Result<Vec<u8>, StorageError> {
    let mut buffer = Vec::new();
    buffer
        .try_reserve_exact(size)
        .map_err(|_| StorageError::Allocation { size })?;
    Ok(buffer)
}
