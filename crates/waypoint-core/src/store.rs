//! Atomic persistence, daily backups and the archive store.
//!
//! Layout around a plan file `Docs/Plans/plan-demo.json`:
//!
//! ```text
//! Docs/Plans/
//! ├── plan-demo.json
//! ├── .plan-backups/
//! │   ├── plan-demo.2025-11-23.backup.json
//! │   └── plan-demo.2025-11-24.backup.json
//! └── Completed/
//!     └── plan-older.json
//! ```

use std::io::Write;
use std::path::{Path, PathBuf};

use jiff::civil::Date;
use log::{debug, info};
use serde::Serialize;

use crate::{
    config::EngineConfig,
    error::{FsResultExt, LifecycleError, Result},
};

const BACKUP_SUFFIX: &str = ".backup.json";

/// Result of a daily backup request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Backup {
    /// A new backup was written
    Created(PathBuf),

    /// Today's backup already existed and was left alone
    Existing(PathBuf),
}

impl Backup {
    pub fn path(&self) -> &Path {
        match self {
            Backup::Created(path) | Backup::Existing(path) => path,
        }
    }
}

/// File-level operations on plan documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistenceManager {
    backup_dir: String,
    archive_dir: String,
}

impl PersistenceManager {
    pub fn new(backup_dir: impl Into<String>, archive_dir: impl Into<String>) -> Self {
        Self {
            backup_dir: backup_dir.into(),
            archive_dir: archive_dir.into(),
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(&config.backup_dir, &config.archive_dir)
    }

    /// Exact on-disk bytes of `path`.
    pub fn read(&self, path: &Path) -> Result<Vec<u8>> {
        std::fs::read(path).fs_context(path)
    }

    /// Pretty JSON with two-space indent and a trailing newline.
    pub fn render<T: Serialize>(value: &T) -> Result<String> {
        let mut text = serde_json::to_string_pretty(value)?;
        text.push('\n');
        Ok(text)
    }

    /// Serializes `value` and atomically replaces `path` with it. Returns the
    /// written text.
    pub fn save<T: Serialize>(&self, path: &Path, value: &T) -> Result<String> {
        let text = Self::render(value)?;
        self.write_atomic(path, text.as_bytes())?;
        debug!("Saved {} ({} bytes)", path.display(), text.len());
        Ok(text)
    }

    /// Writes `bytes` to a temp file beside `path`, syncs it, then renames it
    /// over `path`.
    pub fn write_atomic(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        let dir = parent_dir(path);
        let stem = file_stem(path);
        let mut temp = tempfile::Builder::new()
            .prefix(&format!(".{stem}_"))
            .suffix(".json")
            .tempfile_in(&dir)
            .fs_context(&dir)?;

        temp.write_all(bytes).fs_context(temp.path())?;
        temp.as_file().sync_all().fs_context(temp.path())?;
        temp.persist(path).map_err(|e| LifecycleError::FileSystem {
            path: path.to_path_buf(),
            source: e.error,
        })?;
        Ok(())
    }

    /// Writes the pre-mutation snapshot back over `path`.
    pub fn restore_snapshot(&self, path: &Path, snapshot: &[u8]) -> Result<()> {
        self.write_atomic(path, snapshot)?;
        info!("Restored {} from pre-mutation snapshot", path.display());
        Ok(())
    }

    pub fn backup_dir_for(&self, path: &Path) -> PathBuf {
        parent_dir(path).join(&self.backup_dir)
    }

    /// `<plan dir>/<backup dir>/<stem>.<date>.backup.json`
    pub fn backup_path(&self, path: &Path, date: Date) -> PathBuf {
        self.backup_dir_for(path)
            .join(format!("{}.{date}{BACKUP_SUFFIX}", file_stem(path)))
    }

    /// Copies the on-disk document into the backup store unless a backup for
    /// `date` already exists.
    pub fn backup(&self, path: &Path, date: Date) -> Result<Backup> {
        let target = self.backup_path(path, date);
        if target.exists() {
            debug!("Using existing backup {}", target.display());
            return Ok(Backup::Existing(target));
        }

        let dir = self.backup_dir_for(path);
        std::fs::create_dir_all(&dir).fs_context(&dir)?;
        std::fs::copy(path, &target).fs_context(path)?;
        info!("Created backup {}", target.display());
        Ok(Backup::Created(target))
    }

    /// Every dated backup of `path`, oldest first.
    pub fn backups(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let dir = self.backup_dir_for(path);
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let prefix = format!("{}.", file_stem(path));
        let mut dated = Vec::new();
        for entry in std::fs::read_dir(&dir).fs_context(&dir)? {
            let entry = entry.fs_context(&dir)?;
            let name = entry.file_name().to_string_lossy().into_owned();
            let date = name
                .strip_prefix(&prefix)
                .and_then(|rest| rest.strip_suffix(BACKUP_SUFFIX))
                .and_then(|date| date.parse::<Date>().ok());
            if let Some(date) = date {
                dated.push((date, entry.path()));
            }
        }
        dated.sort();
        Ok(dated.into_iter().map(|(_, path)| path).collect())
    }

    /// Replaces `path` with its most recent dated backup and returns the
    /// backup used.
    ///
    /// # Errors
    ///
    /// Returns `LifecycleError::BackupUnavailable` when no backup exists.
    pub fn restore(&self, path: &Path) -> Result<PathBuf> {
        let latest = self
            .backups(path)?
            .pop()
            .ok_or_else(|| LifecycleError::BackupUnavailable {
                path: path.to_path_buf(),
            })?;

        let bytes = self.read(&latest)?;
        self.write_atomic(path, &bytes)?;
        info!("Restored {} from {}", path.display(), latest.display());
        Ok(latest)
    }

    /// `<plan dir>/<archive dir>/<file name>`
    pub fn archive_path(&self, path: &Path) -> PathBuf {
        let name = path.file_name().map(PathBuf::from).unwrap_or_default();
        parent_dir(path).join(&self.archive_dir).join(name)
    }

    /// Archive destination for `path`.
    ///
    /// # Errors
    ///
    /// Returns `LifecycleError::ArchiveOccupied` when something already sits
    /// at the destination, so an earlier archive is never replaced.
    pub fn prepare_archive(&self, path: &Path) -> Result<PathBuf> {
        let dest = self.archive_path(path);
        if dest.exists() {
            return Err(LifecycleError::ArchiveOccupied { path: dest });
        }
        Ok(dest)
    }

    pub fn create_archive_dir(&self, dest: &Path) -> Result<()> {
        let dir = parent_dir(dest);
        std::fs::create_dir_all(&dir).fs_context(&dir)
    }

    pub fn remove(&self, path: &Path) -> Result<()> {
        std::fs::remove_file(path).fs_context(path)?;
        debug!("Removed {}", path.display());
        Ok(())
    }

    pub fn is_archive_dir(&self, dir: &Path) -> bool {
        dir.file_name().is_some_and(|name| name == self.archive_dir.as_str())
    }
}

impl Default for PersistenceManager {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}

/// Directory holding `path`; `.` for a bare file name.
pub(crate) fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "plan".to_string())
}
