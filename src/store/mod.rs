//! Results file persistence with backup and restore.

pub mod literal;

pub use literal::{compare_ids, Descriptions, LiteralError};

use crate::error::StoreError;
use crate::generation::Description;
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Reads and rewrites the results module file.
///
/// Every overwrite copies the previous file to `<file>.backup` first, so a
/// failed or unwanted write can be rolled back with [`ResultStore::restore_from_backup`].
#[derive(Debug, Clone)]
pub struct ResultStore {
    path: PathBuf,
    backup_path: PathBuf,
}

impl ResultStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mut backup = OsString::from(path.as_os_str());
        backup.push(".backup");
        Self {
            backup_path: PathBuf::from(backup),
            path,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn backup_path(&self) -> &Path {
        &self.backup_path
    }

    /// Every stored description; empty when the file does not exist yet.
    pub fn read_all(&self) -> Result<Descriptions, StoreError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Descriptions::new()),
            Err(e) => return Err(self.io_error(&self.path, e)),
        };
        literal::parse(&text).map_err(|e| StoreError::CorruptFile {
            path: self.path.clone(),
            message: e.to_string(),
        })
    }

    /// Insert or replace one description and rewrite the file.
    pub fn upsert(&self, id: &str, description: &Description) -> Result<(), StoreError> {
        let mut descriptions = self.read_all()?;
        descriptions.insert(id.to_string(), description.clone());
        self.save_all(&descriptions)
    }

    /// Serialize, check, back up the current file, then replace it.
    pub fn save_all(&self, descriptions: &Descriptions) -> Result<(), StoreError> {
        let text = literal::serialize(descriptions);
        if let Err(e) = literal::parse(&text) {
            return Err(StoreError::InvalidSyntax(e.to_string()));
        }

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.io_error(parent, e))?;
        }
        self.create_backup()?;

        let mut temp = OsString::from(self.path.as_os_str());
        temp.push(".tmp");
        let temp_path = PathBuf::from(temp);
        fs::write(&temp_path, &text).map_err(|e| self.io_error(&temp_path, e))?;
        fs::rename(&temp_path, &self.path).map_err(|e| {
            let _ = fs::remove_file(&temp_path);
            self.io_error(&self.path, e)
        })?;

        debug!(path = ?self.path, entries = descriptions.len(), "Results file written");
        Ok(())
    }

    /// Copy the backup over the live file.
    pub fn restore_from_backup(&self) -> Result<(), StoreError> {
        if !self.backup_path.exists() {
            return Err(StoreError::NoBackup(self.backup_path.clone()));
        }
        fs::copy(&self.backup_path, &self.path).map_err(|e| self.io_error(&self.path, e))?;
        info!(path = ?self.path, backup = ?self.backup_path, "Results file restored from backup");
        Ok(())
    }

    /// Remove the backup; missing backups are fine.
    pub fn delete_backup(&self) -> Result<(), StoreError> {
        match fs::remove_file(&self.backup_path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_error(&self.backup_path, e)),
        }
    }

    /// Whether `text` is a well-formed results module
    pub fn validate_syntax(text: &str) -> bool {
        literal::parse(text).is_ok()
    }

    fn create_backup(&self) -> Result<(), StoreError> {
        match fs::copy(&self.path, &self.backup_path) {
            Ok(_) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound && !self.path.exists() => Ok(()),
            Err(e) => Err(self.io_error(&self.backup_path, e)),
        }
    }

    fn io_error(&self, path: &Path, source: io::Error) -> StoreError {
        StoreError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}
