use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Advisory lock held while a command rewrites `notes.json` or the UI state.
///
/// Uses flock (Unix) so a CLI invocation and a running TUI never write the
/// notebook at the same time. The holder writes its pid into the lock file,
/// which is left in place.
pub struct NotebookLock {
    _file: File,
}

/// Error type for lock operations
#[derive(Debug, thiserror::Error)]
pub enum LockError {
    #[error("could not create lock file at {path}: {source}")]
    CreateError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not acquire lock on {path}: another ql process{} is writing", holder_suffix(.holder))]
    Timeout { path: PathBuf, holder: Option<u32> },
}

impl NotebookLock {
    /// Acquire the lock in the `quill/` directory, waiting up to `timeout`.
    pub fn acquire(notebook_dir: &Path, timeout: Duration) -> Result<Self, LockError> {
        let lock_path = notebook_dir.join(".lock");
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(|e| LockError::CreateError {
                path: lock_path.clone(),
                source: e,
            })?;

        let start = Instant::now();
        loop {
            match try_lock(&file) {
                Ok(()) => {
                    let mut file = file;
                    // The pid is informational; a failed write still holds the lock
                    if file.set_len(0).is_ok() {
                        let _ = write!(file, "{}", std::process::id());
                    }
                    return Ok(NotebookLock { _file: file });
                }
                Err(_) if start.elapsed() < timeout => {
                    std::thread::sleep(Duration::from_millis(10));
                }
                Err(_) => {
                    let holder = read_holder(&lock_path);
                    tracing::warn!(path = %lock_path.display(), ?holder, "lock wait timed out");
                    return Err(LockError::Timeout {
                        path: lock_path,
                        holder,
                    });
                }
            }
        }
    }

    /// Acquire with the default timeout (5 seconds)
    pub fn acquire_default(notebook_dir: &Path) -> Result<Self, LockError> {
        Self::acquire(notebook_dir, Duration::from_secs(5))
    }
}

/// Pid recorded by the current holder, if it wrote one
fn read_holder(lock_path: &Path) -> Option<u32> {
    fs::read_to_string(lock_path).ok()?.trim().parse().ok()
}

fn holder_suffix(holder: &Option<u32>) -> String {
    holder.map(|pid| format!(" (pid {})", pid)).unwrap_or_default()
}

#[cfg(unix)]
fn try_lock(file: &File) -> Result<(), std::io::Error> {
    use std::os::unix::io::AsRawFd;
    let fd = file.as_raw_fd();
    let result = unsafe { libc::flock(fd, libc::LOCK_EX | libc::LOCK_NB) };
    if result == 0 {
        Ok(())
    } else {
        Err(std::io::Error::last_os_error())
    }
}

#[cfg(not(unix))]
fn try_lock(_file: &File) -> Result<(), std::io::Error> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_acquire_and_release_lock() {
        let tmp = TempDir::new().unwrap();

        let lock = NotebookLock::acquire_default(tmp.path());
        assert!(lock.is_ok());
        drop(lock);

        let lock2 = NotebookLock::acquire_default(tmp.path());
        assert!(lock2.is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn test_lock_contention() {
        let tmp = TempDir::new().unwrap();
        let _held = NotebookLock::acquire_default(tmp.path()).unwrap();

        let second = NotebookLock::acquire(tmp.path(), Duration::from_millis(50));
        match second {
            Err(LockError::Timeout { holder, .. }) => {
                assert_eq!(holder, Some(std::process::id()));
            }
            _ => panic!("expected a timeout"),
        }
    }
}
