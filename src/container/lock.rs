//! Per-name provisioning lock.
//!
//! Two concurrent runs for the same name could both pass the existence check
//! before either creates the container. Holding an exclusive file lock for
//! the name across check-then-create closes that window on one host.

use crate::container::{ContainerError, Result};
use fs4::FileExt;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Exclusive lock on a container name, released on drop.
#[derive(Debug)]
pub struct ProvisionLock {
    file: File,
    path: PathBuf,
}

impl ProvisionLock {
    /// Try to take the lock for `name` without blocking.
    ///
    /// # Errors
    ///
    /// Returns [`ContainerError::Locked`] if another process holds it, or an
    /// IO error if the lock file cannot be opened.
    pub fn acquire(lock_dir: &Path, name: &str) -> Result<Self> {
        fs::create_dir_all(lock_dir)?;
        let path = lock_dir.join(format!("{}.lock", name));

        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)?;

        if let Err(e) = FileExt::try_lock_exclusive(&file) {
            if e.raw_os_error() == fs4::lock_contended_error().raw_os_error() {
                return Err(ContainerError::Locked(name.to_string()));
            }
            return Err(e.into());
        }

        debug!(path = %path.display(), "Acquired provisioning lock");
        Ok(Self { file, path })
    }

    /// Path of the lock file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ProvisionLock {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            warn!(path = %self.path.display(), "Failed to release provisioning lock: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_lock_is_exclusive_per_name() {
        let dir = TempDir::new().unwrap();

        let first = ProvisionLock::acquire(dir.path(), "elk").unwrap();
        assert!(first.path().ends_with("elk.lock"));

        let second = ProvisionLock::acquire(dir.path(), "elk");
        assert!(matches!(second, Err(ContainerError::Locked(name)) if name == "elk"));

        // Other names are independent
        let _other = ProvisionLock::acquire(dir.path(), "kibana").unwrap();
    }

    #[test]
    fn test_lock_released_on_drop() {
        let dir = TempDir::new().unwrap();

        drop(ProvisionLock::acquire(dir.path(), "elk").unwrap());
        assert!(ProvisionLock::acquire(dir.path(), "elk").is_ok());
    }
}
