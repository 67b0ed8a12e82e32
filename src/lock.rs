use crate::error::{Result, TkError};
use fs2::FileExt;
use log::debug;
use std::fs::{File, OpenOptions};
use std::path::Path;

/// Exclusive advisory lock held for the lifetime of the value.
pub struct FileLock {
    file: File,
}

impl FileLock {
    /// Block until the lock is ours.
    pub fn acquire(path: &Path) -> Result<Self> {
        let file = open_lock_file(path)?;
        file.lock_exclusive()
            .map_err(|e| TkError::Lock(format!("failed to acquire lock: {}", e)))?;
        debug!("event=lock_acquire module=lock status=ok mode=blocking");
        Ok(Self { file })
    }

    /// Fail right away if another process holds the lock.
    pub fn try_acquire(path: &Path) -> Result<Self> {
        let file = open_lock_file(path)?;
        file.try_lock_exclusive().map_err(|_| {
            TkError::Lock(format!(
                "{} is in use by another tk session",
                path.display()
            ))
        })?;
        debug!("event=lock_acquire module=lock status=ok mode=try");
        Ok(Self { file })
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        let _ = self.file.unlock();
    }
}

fn open_lock_file(path: &Path) -> Result<File> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() && !dir.exists() {
            std::fs::create_dir_all(dir)?;
        }
    }
    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)?;
    Ok(file)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_try_fails_while_held() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.txt.lock");
        let held = FileLock::acquire(&path).unwrap();
        assert!(matches!(FileLock::try_acquire(&path), Err(TkError::Lock(_))));
        drop(held);
        assert!(FileLock::try_acquire(&path).is_ok());
    }
}
