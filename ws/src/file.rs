//! Directory-backed store
//!
//! Each key is one `<key>.json` file. Writes go to a sibling temp file and are
//! renamed into place so a crash mid-write leaves the previous document intact.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::APP_DIR_NAME;
use crate::error::{Result, StoreError};
use crate::store::{LocalStore, validate_key};

const EXTENSION: &str = "json";

#[derive(Debug, Clone)]
pub struct FileStore {
    base_path: PathBuf,
}

impl FileStore {
    /// Open or create a store rooted at `path`
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let base_path = path.as_ref().to_path_buf();
        fs::create_dir_all(&base_path)?;
        info!(?base_path, "Opened wall store");
        Ok(Self { base_path })
    }

    /// Platform default location (`~/.local/share/whisperwall` on Linux)
    pub fn default_dir() -> Result<PathBuf> {
        dirs::data_local_dir()
            .map(|d| d.join(APP_DIR_NAME))
            .ok_or(StoreError::NoDataDir)
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        validate_key(key)?;
        Ok(self.base_path.join(format!("{}.{}", key, EXTENSION)))
    }
}

impl LocalStore for FileStore {
    fn read_raw(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(?path, "FileStore::read_raw: no file");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn write_raw(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key)?;
        let tmp = path.with_extension(format!("{}.tmp", EXTENSION));
        debug!(?path, len = value.len(), "FileStore::write_raw: called");

        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn keys(&self) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        for entry in fs::read_dir(&self.base_path)? {
            let path = entry?.path();
            if path.extension().is_some_and(|e| e == EXTENSION)
                && let Some(stem) = path.file_stem().and_then(|s| s.to_str())
            {
                keys.push(stem.to_string());
            }
        }
        keys.sort();
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StoreExt;
    use tempfile::TempDir;

    #[test]
    fn test_open_creates_directory() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("a").join("b");

        let store = FileStore::open(&nested).unwrap();

        assert!(nested.is_dir());
        assert_eq!(store.base_path(), nested.as_path());
    }

    #[test]
    fn test_roundtrip_survives_reopen() {
        let temp_dir = TempDir::new().unwrap();
        {
            let store = FileStore::open(temp_dir.path()).unwrap();
            store.save("whisperwall_my_ids", &vec!["x1", "x2"]).unwrap();
        }

        let reopened = FileStore::open(temp_dir.path()).unwrap();
        let ids: Option<Vec<String>> = reopened.load("whisperwall_my_ids");

        assert_eq!(ids, Some(vec!["x1".to_string(), "x2".to_string()]));
    }

    #[test]
    fn test_missing_key_is_none() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::open(temp_dir.path()).unwrap();
        assert_eq!(store.read_raw("absent").unwrap(), None);
    }

    #[test]
    fn test_write_leaves_no_temp_file() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::open(temp_dir.path()).unwrap();
        store.write_raw("draft", "{}").unwrap();

        let names: Vec<String> = fs::read_dir(temp_dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();

        assert_eq!(names, vec!["draft.json".to_string()]);
    }

    #[test]
    fn test_keys_and_remove() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::open(temp_dir.path()).unwrap();
        store.write_raw("whisperwall_posts", "[]").unwrap();
        store.write_raw("whisperwall_draft", "{}").unwrap();
        fs::write(temp_dir.path().join("notes.txt"), "ignored").unwrap();

        assert_eq!(
            store.keys().unwrap(),
            vec!["whisperwall_draft".to_string(), "whisperwall_posts".to_string()]
        );

        store.remove("whisperwall_draft").unwrap();
        store.remove("whisperwall_draft").unwrap();
        assert_eq!(store.keys().unwrap(), vec!["whisperwall_posts".to_string()]);
    }

    #[test]
    fn test_invalid_key_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::open(temp_dir.path()).unwrap();
        assert!(matches!(
            store.write_raw("../escape", "{}"),
            Err(StoreError::InvalidKey(_))
        ));
    }
}
