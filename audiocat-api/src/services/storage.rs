//! Managed upload directory
//!
//! Uploads are first written to a hidden staging file inside the storage
//! directory and only moved onto their sanitized name once the catalog
//! record is written. A staging file that is never installed is removed
//! when its `StagedUpload` is dropped. Installing over an existing file
//! keeps the previous bytes aside until the caller settles the replacement,
//! so a catalog commit that fails can put them back.

use std::io;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tracing::{debug, warn};
use uuid::Uuid;

use super::filename::MAX_EXTENSION_LEN;

/// Handle to the directory that holds uploaded files
#[derive(Debug, Clone)]
pub struct UploadStorage {
    dir: PathBuf,
}

impl UploadStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Final location of a file stored under `name` (already sanitized)
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    /// Create an empty staging file for an upload that will be stored as
    /// `name`, returning its guard and a writable handle.
    ///
    /// The staging name is `.upload-<uuid>` plus the extension of `name`
    /// when that is short, so it stays well under the component limit
    /// whatever the length of `name`.
    pub async fn create_staged(&self, name: &str) -> io::Result<(StagedUpload, File)> {
        let path = self.hidden_path("upload", name);
        let file = File::create(&path).await?;
        debug!(path = %path.display(), "Created staging file");
        Ok((
            StagedUpload {
                path,
                persisted: false,
            },
            file,
        ))
    }

    /// Move `staged` onto its final name `name`.
    ///
    /// A file already stored under `name` is renamed aside first; the
    /// returned [`StoredReplacement`] either [`keep`](StoredReplacement::keep)s
    /// the new bytes or [`revert`](StoredReplacement::revert)s to the old ones.
    pub async fn install(&self, staged: StagedUpload, name: &str) -> io::Result<StoredReplacement> {
        let target = self.path_for(name);

        let backup = match tokio::fs::metadata(&target).await {
            Ok(_) => {
                let backup = self.hidden_path("replaced", name);
                tokio::fs::rename(&target, &backup).await?;
                Some(backup)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => return Err(e),
        };

        if let Err(e) = staged.persist(&target).await {
            if let Some(ref backup) = backup {
                if let Err(restore) = tokio::fs::rename(backup, &target).await {
                    warn!(
                        path = %target.display(),
                        error = %restore,
                        "Failed to restore previous file after install error"
                    );
                }
            }
            return Err(e);
        }

        debug!(path = %target.display(), replaced = backup.is_some(), "Installed upload");
        Ok(StoredReplacement {
            target,
            backup,
            settled: false,
        })
    }

    /// Open a stored file for reading
    pub async fn open(&self, name: &str) -> io::Result<File> {
        File::open(self.path_for(name)).await
    }

    fn hidden_path(&self, kind: &str, name: &str) -> PathBuf {
        let extension = Path::new(name)
            .extension()
            .and_then(|ext| ext.to_str())
            .filter(|ext| ext.len() <= MAX_EXTENSION_LEN);
        let file_name = match extension {
            Some(ext) => format!(".{}-{}.{}", kind, Uuid::new_v4(), ext),
            None => format!(".{}-{}", kind, Uuid::new_v4()),
        };
        self.dir.join(file_name)
    }
}

/// A staged upload awaiting its final name
#[derive(Debug)]
pub struct StagedUpload {
    path: PathBuf,
    persisted: bool,
}

impl StagedUpload {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Atomically move the staged bytes onto `target`, replacing any existing file
    pub async fn persist(mut self, target: &Path) -> io::Result<()> {
        tokio::fs::rename(&self.path, target).await?;
        self.persisted = true;
        Ok(())
    }
}

impl Drop for StagedUpload {
    fn drop(&mut self) {
        if self.persisted {
            return;
        }
        remove_quietly(&self.path, "staging file");
    }
}

/// An installed upload that has not yet been kept or reverted.
///
/// Dropping it unsettled reverts.
#[derive(Debug)]
pub struct StoredReplacement {
    target: PathBuf,
    backup: Option<PathBuf>,
    settled: bool,
}

impl StoredReplacement {
    /// Accept the new file and discard the previous one
    pub fn keep(mut self) {
        self.settled = true;
        if let Some(ref backup) = self.backup {
            remove_quietly(backup, "replaced file");
        }
    }

    /// Remove the new file and restore the previous one, if there was one
    pub fn revert(mut self) -> io::Result<()> {
        self.settled = true;
        self.restore()
    }

    fn restore(&self) -> io::Result<()> {
        match &self.backup {
            Some(backup) => std::fs::rename(backup, &self.target)?,
            None => match std::fs::remove_file(&self.target) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(e),
            },
        }
        debug!(path = %self.target.display(), "Reverted installed upload");
        Ok(())
    }
}

impl Drop for StoredReplacement {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        if let Err(e) = self.restore() {
            warn!(path = %self.target.display(), error = %e, "Failed to revert installed upload");
        }
    }
}

fn remove_quietly(path: &Path, what: &str) {
    match std::fs::remove_file(path) {
        Ok(()) => debug!(path = %path.display(), "Removed {}", what),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => warn!(path = %path.display(), error = %e, "Failed to remove {}", what),
    }
}
