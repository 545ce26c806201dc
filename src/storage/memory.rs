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
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;

use super::{allocate, Storage, StorageError};

/// An in-memory file store. Useful for tests and for instruments assembled
/// without a filesystem.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    files: RwLock<HashMap<PathBuf, Vec<u8>>>,
}

impl MemoryStorage {
    pub fn new() -> MemoryStorage {
        MemoryStorage::default()
    }

    /// Adds or replaces a file.
    pub fn insert<P: Into<PathBuf>>(&self, path: P, contents: impl Into<Vec<u8>>) {
        self.files.write().insert(path.into(), contents.into());
    }

    /// Removes a file, returning true if it existed.
    pub fn remove(&self, path: &Path) -> bool {
        self.files.write().remove(path).is_some()
    }
}

impl Storage for MemoryStorage {
    fn read(&self, path: &Path, max_len: usize) -> Result<Vec<u8>, StorageError> {
        let files = self.files.read();
        let contents = files
            .get(path)
            .ok_or_else(|| StorageError::NotFound(path.to_path_buf()))?;

        if contents.len() > max_len {
            return Err(StorageError::TooLarge {
                path: path.to_path_buf(),
                size: contents.len() as u64,
                max: max_len,
            });
        }

        let mut buffer = allocate(contents.len())?;
        buffer.extend_from_slice(contents);
        Ok(buffer)
    }
}
