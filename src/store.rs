use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context as _;

/// String key-value preferences persisted as one JSON object.
///
/// A missing file reads as an empty store; it is created on the first write.
#[derive(Debug)]
pub struct PreferenceStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl PreferenceStore {
    pub fn open(path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let path = path.into();
        let entries = if path.exists() {
            let bytes =
                std::fs::read(&path).with_context(|| format!("read {}", path.display()))?;
            serde_json::from_slice(&bytes)
                .with_context(|| format!("parse preferences {}", path.display()))?
        } else {
            BTreeMap::new()
        };
        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Returns `false` without touching the file when the value is unchanged.
    pub fn set(&mut self, key: &str, value: &str) -> anyhow::Result<bool> {
        if self.get(key) == Some(value) {
            return Ok(false);
        }
        self.entries.insert(key.to_string(), value.to_string());
        self.persist()?;
        Ok(true)
    }

    pub fn remove(&mut self, key: &str) -> anyhow::Result<bool> {
        if self.entries.remove(key).is_none() {
            return Ok(false);
        }
        self.persist()?;
        Ok(true)
    }

    fn persist(&self) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("create {}", parent.display()))?;
            }
        }
        let json = serde_json::to_vec_pretty(&self.entries).context("serialize preferences")?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("write {}", self.path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_is_empty_until_first_write() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("nested/prefs.json");
        let mut store = PreferenceStore::open(&path).unwrap();
        assert_eq!(store.get("theme"), None);
        assert!(!path.exists());

        assert!(store.set("theme", "dark").unwrap());
        assert!(path.exists());

        let reopened = PreferenceStore::open(&path).unwrap();
        assert_eq!(reopened.get("theme"), Some("dark"));
    }

    #[test]
    fn unchanged_value_is_not_rewritten() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("prefs.json");
        let mut store = PreferenceStore::open(&path).unwrap();
        assert!(store.set("theme", "light").unwrap());

        std::fs::remove_file(&path).unwrap();
        assert!(!store.set("theme", "light").unwrap());
        assert!(!path.exists());
    }

    #[test]
    fn remove_reports_whether_key_existed() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("prefs.json");
        let mut store = PreferenceStore::open(&path).unwrap();
        assert!(!store.remove("theme").unwrap());
        store.set("theme", "dark").unwrap();
        assert!(store.remove("theme").unwrap());
        assert_eq!(PreferenceStore::open(&path).unwrap().get("theme"), None);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("prefs.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(PreferenceStore::open(&path).is_err());
    }
}
