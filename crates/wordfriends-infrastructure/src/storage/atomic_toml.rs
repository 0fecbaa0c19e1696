//! Atomic TOML file operations.
//!
//! Writes go through a temporary sibling file that is fsynced and renamed over
//! the target; read-modify-write cycles hold an exclusive lock file.

use fs2::FileExt;
use serde::{Serialize, de::DeserializeOwned};
use std::fs;
use std::io::{ErrorKind, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use thiserror::Error;
use wordfriends_core::WordError;

#[derive(Error, Debug)]
pub enum AtomicTomlError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("failed to encode TOML: {0}")]
    Encode(#[from] toml::ser::Error),

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to lock {}: {source}", path.display())]
    Lock {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl From<AtomicTomlError> for WordError {
    fn from(e: AtomicTomlError) -> Self {
        match e {
            AtomicTomlError::Parse { source, .. } => source.into(),
            AtomicTomlError::Encode(source) => source.into(),
            other => WordError::io(other.to_string()),
        }
    }
}

/// A TOML document of type `T` stored at a fixed path.
pub struct AtomicTomlFile<T> {
    path: PathBuf,
    _doc: PhantomData<fn() -> T>,
}

impl<T> AtomicTomlFile<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            _doc: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the document. A missing or blank file yields `Ok(None)`.
    pub fn load(&self) -> Result<Option<T>, AtomicTomlError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(source) if source.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(AtomicTomlError::Read {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        if text.trim().is_empty() {
            return Ok(None);
        }

        toml::from_str(&text)
            .map(Some)
            .map_err(|source| AtomicTomlError::Parse {
                path: self.path.clone(),
                source,
            })
    }

    /// Serializes `doc` and atomically replaces the file.
    pub fn save(&self, doc: &T) -> Result<(), AtomicTomlError> {
        let encoded = toml::to_string_pretty(doc)?;
        let staging = self.staging_path();

        let write = || -> std::io::Result<()> {
            if let Some(parent) = self.path.parent() {
                fs::create_dir_all(parent)?;
            }
            let mut file = fs::File::create(&staging)?;
            file.write_all(encoded.as_bytes())?;
            file.sync_all()?;
            fs::rename(&staging, &self.path)
        };

        write().map_err(|source| {
            let _ = fs::remove_file(&staging);
            AtomicTomlError::Write {
                path: self.path.clone(),
                source,
            }
        })
    }

    /// Read-modify-write under an exclusive lock.
    ///
    /// `seed` is used when the file does not exist yet. Returns whatever the
    /// closure returns, once the result is on disk.
    pub fn update<F, R>(&self, seed: T, edit: F) -> Result<R, AtomicTomlError>
    where
        F: FnOnce(&mut T) -> R,
    {
        let _lock = LockFile::acquire(&self.path)?;

        let mut doc = self.load()?.unwrap_or(seed);
        let out = edit(&mut doc);
        self.save(&doc)?;
        Ok(out)
    }

    /// Deletes the file. A missing file is not an error.
    pub fn remove(&self) -> Result<(), AtomicTomlError> {
        match fs::remove_file(&self.path) {
            Err(source) if source.kind() != ErrorKind::NotFound => Err(AtomicTomlError::Write {
                path: self.path.clone(),
                source,
            }),
            _ => Ok(()),
        }
    }

    /// `.<name>.tmp` next to the target, so the rename stays on one filesystem.
    fn staging_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.path.with_file_name(format!(".{name}.tmp"))
    }
}

/// Held for the duration of an update; deletes `<stem>.lock` on drop.
struct LockFile {
    _handle: fs::File,
    path: PathBuf,
}

impl LockFile {
    fn acquire(target: &Path) -> Result<Self, AtomicTomlError> {
        let path = target.with_extension("lock");
        let lock_error = |source| AtomicTomlError::Lock {
            path: path.clone(),
            source,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(lock_error)?;
        }
        let handle = fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .map_err(lock_error)?;
        handle.lock_exclusive().map_err(lock_error)?;

        Ok(Self {
            _handle: handle,
            path,
        })
    }
}

impl Drop for LockFile {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}
