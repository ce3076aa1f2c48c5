use fs2::FileExt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

pub mod kv;
pub mod recent;
pub mod settings;

pub use kv::{FileKvStore, KeyValueStore, MemoryKvStore};
pub use recent::{RecentJobs, MAX_RECENT_JOBS, RECENT_JOBS_KEY};
pub use settings::Settings;

/// Env var that relocates the store root (tests, portable installs).
pub const HOME_ENV: &str = "REPOLENS_HOME";

/// Return the per-user store root: `$REPOLENS_HOME`, else the platform data
/// dir (`~/.local/share/repolens`, `%APPDATA%\repolens`), else `~/.repolens`.
pub fn store_root() -> PathBuf {
    if let Some(home) = std::env::var_os(HOME_ENV).filter(|v| !v.is_empty()) {
        return PathBuf::from(home);
    }
    if let Some(data_dir) = dirs::data_dir() {
        data_dir.join("repolens")
    } else if let Some(home) = dirs::home_dir() {
        home.join(".repolens")
    } else {
        PathBuf::from(".repolens-store")
    }
}

/// `store_root/storage.json`: the key-value file backing client-side state.
pub fn storage_path() -> PathBuf {
    store_root().join("storage.json")
}

/// `store_root/config.json`
pub fn config_path() -> PathBuf {
    store_root().join("config.json")
}

/// Atomic write: write to temp file in same dir, then rename.
pub fn write_atomic(path: &Path, data: &[u8]) -> anyhow::Result<()> {
    let parent = path
        .parent()
        .ok_or_else(|| anyhow::anyhow!("no parent dir for {}", path.display()))?;
    fs::create_dir_all(parent)?;
    let mut tmp = tempfile::NamedTempFile::new_in(parent)?;
    tmp.write_all(data)?;
    tmp.flush()?;
    tmp.persist(path)?;
    Ok(())
}

/// File-based exclusive lock guard.
pub struct LockGuard {
    _file: fs::File,
}

/// Acquire an exclusive file lock. Creates the lock file if needed.
pub fn lock_file(path: &Path) -> anyhow::Result<LockGuard> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = fs::OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(path)?;
    file.lock_exclusive()?;
    Ok(LockGuard { _file: file })
}

/// Serializes tests that read or change process environment variables.
#[cfg(test)]
pub(crate) static ENV_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_root_is_not_empty() {
        let _env = ENV_LOCK.lock().unwrap();
        let root = store_root();
        assert!(!root.as_os_str().is_empty());
    }

    #[test]
    fn store_files_live_under_root() {
        let _env = ENV_LOCK.lock().unwrap();
        assert!(storage_path().starts_with(store_root()));
        assert!(config_path().ends_with("config.json"));
    }

    #[test]
    fn home_env_relocates_store() {
        let _env = ENV_LOCK.lock().unwrap();
        let tmp = tempfile::tempdir().unwrap();
        std::env::set_var(HOME_ENV, tmp.path());
        let root = store_root();
        let storage = storage_path();
        std::env::remove_var(HOME_ENV);

        assert_eq!(root, tmp.path());
        assert_eq!(storage, tmp.path().join("storage.json"));
    }

    #[test]
    fn empty_home_env_is_ignored() {
        let _env = ENV_LOCK.lock().unwrap();
        std::env::set_var(HOME_ENV, "");
        let root = store_root();
        std::env::remove_var(HOME_ENV);
        assert!(!root.as_os_str().is_empty());
    }

    #[test]
    fn write_atomic_creates_file_and_parents() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("nested").join("test.txt");
        write_atomic(&path, b"hello world").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "hello world");
    }

    #[test]
    fn write_atomic_replaces_content() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("test.txt");
        write_atomic(&path, b"first").unwrap();
        write_atomic(&path, b"second").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "second");
    }

    #[test]
    fn lock_file_acquires_and_drops() {
        let tmp = tempfile::tempdir().unwrap();
        let lock_path = tmp.path().join("test.lock");
        let guard = lock_file(&lock_path).unwrap();
        assert!(lock_path.exists());
        drop(guard);
        let _again = lock_file(&lock_path).unwrap();
    }
}
