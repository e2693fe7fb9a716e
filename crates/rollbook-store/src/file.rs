// ABOUTME: Filesystem storage provider keeping one JSON file per key in a data directory.
// ABOUTME: Writes go to a temp file that is fsynced and atomically renamed over the previous value.

use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use rollbook_core::storage::{StorageError, StorageProvider, validate_key};

/// Stores each key as `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Open (or create) the data directory.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file holding `key`. Fails for keys that are not plain
    /// file stems.
    pub fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        validate_key(key)?;
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl StorageProvider for FileStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let final_path = self.path_for(key)?;
        let tmp_path = self.dir.join(format!("{}.json.tmp", key));

        if let Err(e) = replace_file(&tmp_path, &final_path, value) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e.into());
        }

        // Best-effort: the rename already happened, so a failed directory
        // fsync does not leave inconsistent data.
        if let Ok(dir) = File::open(&self.dir) {
            let _ = dir.sync_all();
        }

        tracing::debug!("wrote {} bytes to {}", value.len(), final_path.display());
        Ok(())
    }
}

/// Write `value` to `tmp_path`, fsync it, and rename it over `final_path`.
fn replace_file(tmp_path: &Path, final_path: &Path, value: &str) -> std::io::Result<()> {
    let mut file = File::create(tmp_path)?;
    file.write_all(value.as_bytes())?;
    file.sync_all()?;
    drop(file);
    fs::rename(tmp_path, final_path)
}
