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
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

use tracing::debug;

use super::{allocate, Storage, StorageError};

/// Reads files from the local filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsStorage;

impl FsStorage {
    pub fn new() -> FsStorage {
        FsStorage
    }
}

impl Storage for FsStorage {
    fn read(&self, path: &Path, max_len: usize) -> Result<Vec<u8>, StorageError> {
        let io_error = |source: std::io::Error| {
            if source.kind() == ErrorKind::NotFound {
                StorageError::NotFound(path.to_path_buf())
            } else {
                StorageError::Io {
                    path: path.to_path_buf(),
                    source,
                }
            }
        };

        let file = File::open(path).map_err(io_error)?;
        let size = file.metadata().map_err(io_error)?.len();
        if size > max_len as u64 {
            return Err(StorageError::TooLarge {
                path: path.to_path_buf(),
                size,
                max: max_len,
            });
        }

        let mut buffer = allocate(size as usize)?;
        // The file may grow between the size check and the read.
        file.take(max_len as u64 + 1)
            .read_to_end(&mut buffer)
            .map_err(io_error)?;
        if buffer.len() > max_len {
            return Err(StorageError::TooLarge {
                path: path.to_path_buf(),
                size: buffer.len() as u64,
                max: max_len,
            });
        }

        debug!(path = ?path, bytes = buffer.len(), "Read file");
        Ok(buffer)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn test_read_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("patch.json");
        fs::write(&path, b"{\"name\": \"piano\"}").unwrap();

        let storage = FsStorage::new();
        let buffer = storage.read(&path, 1024).unwrap();
        assert_eq!(buffer, b"{\"name\": \"piano\"}");
    }

    #[test]
    fn test_read_file_too_large() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.wav");
        fs::write(&path, vec![0u8; 100]).unwrap();

        let storage = FsStorage::new();
        assert!(storage.read(&path, 100).is_ok());
        match storage.read(&path, 99) {
            Err(StorageError::TooLarge { size, max, .. }) => {
                assert_eq!(size, 100);
                assert_eq!(max, 99);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_read_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FsStorage::new();
        assert!(matches!(
            storage.read(&dir.path().join("missing.wav"), 10),
            Err(StorageError::NotFound(_))
        ));
    }
}
