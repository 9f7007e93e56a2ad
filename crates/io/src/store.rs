// JSON package store
//
// The whole collection lives in one file, <data_dir>/packages.json:
//   { "version": 1, "packages": [ ... ] }
// A bare JSON array of packages is also accepted on load.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use parceltrack_core::Package;

use crate::STORE_FORMAT_VERSION;

const FILE_NAME: &str = "packages.json";

#[derive(Debug)]
pub enum StoreError {
    /// Filesystem error (create dir, write, rename, remove).
    Io { path: PathBuf, message: String },
    /// Serialization failed.
    Serialize(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Io { path, message } => write!(f, "{}: {}", path.display(), message),
            StoreError::Serialize(msg) => write!(f, "cannot serialize packages: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

#[derive(Serialize)]
struct EnvelopeOut<'a> {
    version: u32,
    packages: &'a [Package],
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Stored {
    Envelope { version: u32, packages: Vec<Package> },
    Bare(Vec<Package>),
}

/// Whole-collection store backed by a single JSON file.
#[derive(Debug, Clone)]
pub struct PackageStore {
    path: PathBuf,
}

impl PackageStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Store at `<dir>/packages.json`.
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(FILE_NAME))
    }

    /// Default data directory: `<data_dir>/parceltrack`
    pub fn default_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("parceltrack")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the collection.
    ///
    /// Never fails: a missing file is an empty collection, and an unreadable
    /// or corrupt file is logged, moved aside to `packages.json.bak`, and
    /// treated as empty.
    pub fn load(&self) -> Vec<Package> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("no package file at {}, starting empty", self.path.display());
                return Vec::new();
            }
            Err(e) => {
                warn!("cannot read {}: {}; starting empty", self.path.display(), e);
                return Vec::new();
            }
        };

        let contents = match String::from_utf8(bytes) {
            Ok(contents) => contents,
            Err(e) => {
                warn!("{} is not valid UTF-8: {}; starting empty", self.path.display(), e);
                self.move_aside();
                return Vec::new();
            }
        };

        if contents.trim().is_empty() {
            return Vec::new();
        }

        match serde_json::from_str::<Stored>(&contents) {
            Ok(Stored::Envelope { version, packages }) => {
                if version > STORE_FORMAT_VERSION {
                    warn!(
                        "{} has format version {} (this build reads {}); loading anyway",
                        self.path.display(),
                        version,
                        STORE_FORMAT_VERSION
                    );
                }
                debug!("loaded {} packages from {}", packages.len(), self.path.display());
                packages
            }
            Ok(Stored::Bare(packages)) => {
                debug!("loaded {} packages (bare array) from {}", packages.len(), self.path.display());
                packages
            }
            Err(e) => {
                warn!("cannot parse {}: {}; starting empty", self.path.display(), e);
                self.move_aside();
                Vec::new()
            }
        }
    }

    /// Write the whole collection. Writes a temp file then renames over the
    /// target so a crash mid-write never leaves a truncated file.
    pub fn save(&self, packages: &[Package]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
        }

        let json = serde_json::to_string_pretty(&EnvelopeOut {
            version: STORE_FORMAT_VERSION,
            packages,
        })
        .map_err(|e| StoreError::Serialize(e.to_string()))?;

        let tmp = self.sibling("tmp");
        fs::write(&tmp, json).map_err(|e| io_err(&tmp, e))?;
        fs::rename(&tmp, &self.path).map_err(|e| io_err(&self.path, e))?;

        debug!("saved {} packages to {}", packages.len(), self.path.display());
        Ok(())
    }

    /// Remove all stored data. Missing file is not an error.
    pub fn clear(&self) -> Result<(), StoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_err(&self.path, e)),
        }
    }

    fn sibling(&self, ext: &str) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".");
        name.push(ext);
        PathBuf::from(name)
    }

    fn move_aside(&self) {
        let backup = self.sibling("bak");
        if let Err(e) = fs::rename(&self.path, &backup) {
            warn!("cannot move {} aside: {}", self.path.display(), e);
        } else {
            warn!("unreadable package file kept at {}", backup.display());
        }
    }
}

fn io_err(path: &Path, e: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.to_path_buf(),
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn sibling_appends_extension() {
        let store = PackageStore::new(PathBuf::from("/data/packages.json"));
        assert_eq!(store.sibling("tmp"), PathBuf::from("/data/packages.json.tmp"));
    }

    #[test]
    fn default_dir_ends_with_app_name() {
        assert!(PackageStore::default_dir().ends_with("parceltrack"));
    }

    #[test]
    fn clear_missing_file_is_ok() {
        let dir = tempdir().unwrap();
        let store = PackageStore::in_dir(dir.path());
        assert!(store.clear().is_ok());
    }
}
