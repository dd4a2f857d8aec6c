// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

/// Physical storage behind attachment records.
///
/// Storage paths are always relative to the store's root. The ledger only
/// deletes through this seam, after the metadata change has committed.
/// Errors there are logged by the caller and never undo the ledger
/// operation.
pub trait FileStore {
    fn delete_stored_file(&self, storage_path: &str) -> io::Result<()>;

    /// Copy `source` into the store and return its storage path.
    fn store_file(&self, source: &Path) -> io::Result<String> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            format!("cannot store {}", source.display()),
        ))
    }
}

/// True when `storage_path` is non-empty, relative and made only of plain
/// components (no `..`, `.` or roots).
pub fn is_safe_storage_path(storage_path: &str) -> bool {
    let p = Path::new(storage_path);
    !storage_path.trim().is_empty()
        && p.components().all(|c| matches!(c, Component::Normal(_)))
}

/// Files kept on the local filesystem under one root directory.
#[derive(Debug, Clone)]
pub struct FsFileStore {
    root: PathBuf,
}

impl FsFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Location of a storage path under the root. Absolute paths and paths
    /// that climb out of the root are rejected.
    pub fn resolve(&self, storage_path: &str) -> io::Result<PathBuf> {
        if !is_safe_storage_path(storage_path) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("storage path '{}' escapes the attachments root", storage_path),
            ));
        }
        Ok(self.root.join(storage_path))
    }
}

impl FileStore for FsFileStore {
    fn delete_stored_file(&self, storage_path: &str) -> io::Result<()> {
        fs::remove_file(self.resolve(storage_path)?)
    }

    fn store_file(&self, source: &Path) -> io::Result<String> {
        let name = source
            .file_name()
            .and_then(|n| n.to_str())
            .filter(|n| is_safe_storage_path(n))
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("{} has no usable file name", source.display()),
                )
            })?;
        fs::create_dir_all(&self.root)?;

        let stamp = chrono::Local::now().format("%Y%m%d%H%M%S%f");
        let mut n = 0;
        loop {
            let storage_path = if n == 0 {
                format!("{}-{}", stamp, name)
            } else {
                format!("{}-{}-{}", stamp, n, name)
            };
            let dest = self.root.join(&storage_path);
            match fs::OpenOptions::new().write(true).create_new(true).open(&dest) {
                Ok(mut out) => {
                    let copied = fs::File::open(source).and_then(|mut src| io::copy(&mut src, &mut out));
                    if let Err(e) = copied {
                        let _ = fs::remove_file(&dest);
                        return Err(e);
                    }
                    return Ok(storage_path);
                }
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => n += 1,
                Err(e) => return Err(e),
            }
        }
    }
}
