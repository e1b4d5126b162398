use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use crate::forum::backend::BackendError;

/// Object storage on the local filesystem.
///
/// Object paths are `/`-separated and relative to the store root; anything
/// that would escape the root is refused.
#[derive(Debug, Clone)]
pub struct ObjectStore {
    root: PathBuf,
    public_prefix: String,
}

impl ObjectStore {
    pub fn new(root: impl Into<PathBuf>, public_prefix: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_prefix: public_prefix.into(),
        }
    }

    pub fn resolve(&self, path: &str) -> Result<PathBuf, BackendError> {
        let relative = Path::new(path);
        let clean = !path.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !clean {
            return Err(BackendError::rejected(format!(
                "Недопустимый путь к файлу: {}",
                path
            )));
        }
        Ok(self.root.join(relative))
    }

    /// Paths of the objects stored directly under `prefix`, sorted.
    pub fn list(&self, prefix: &str) -> Result<Vec<String>, BackendError> {
        let prefix = prefix.trim_end_matches('/');
        let dir = self.resolve(prefix)?;

        let entries = match std::fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                if let Some(name) = entry.file_name().to_str() {
                    paths.push(format!("{}/{}", prefix, name));
                }
            }
        }
        paths.sort();
        Ok(paths)
    }

    pub fn put(&self, path: &str, data: &[u8]) -> Result<(), BackendError> {
        let target = self.resolve(path)?;
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&target, data)?;
        Ok(())
    }

    /// Removing an object that is already gone is not an error.
    pub fn remove(&self, path: &str) -> Result<(), BackendError> {
        let target = self.resolve(path)?;
        match std::fs::remove_file(&target) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn read(&self, path: &str) -> Result<Option<Vec<u8>>, BackendError> {
        let target = self.resolve(path)?;
        match std::fs::read(&target) {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn public_url(&self, path: &str) -> String {
        format!("{}/{}", self.public_prefix.trim_end_matches('/'), path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (ObjectStore, tempfile::TempDir) {
        let tmp = tempfile::tempdir().unwrap();
        (ObjectStore::new(tmp.path(), "/uploads/"), tmp)
    }

    #[test]
    fn put_list_remove() {
        let (store, _tmp) = store();
        store.put("avatars/u1/b.png", b"b").unwrap();
        store.put("avatars/u1/a.png", b"a").unwrap();
        store.put("avatars/u2/c.png", b"c").unwrap();

        assert_eq!(
            store.list("avatars/u1/").unwrap(),
            vec!["avatars/u1/a.png".to_string(), "avatars/u1/b.png".to_string()]
        );

        store.remove("avatars/u1/a.png").unwrap();
        store.remove("avatars/u1/a.png").unwrap();
        assert_eq!(store.list("avatars/u1").unwrap(), vec!["avatars/u1/b.png"]);
        assert_eq!(store.read("avatars/u2/c.png").unwrap(), Some(b"c".to_vec()));
    }

    #[test]
    fn listing_missing_prefix_is_empty() {
        let (store, _tmp) = store();
        assert!(store.list("avatars/nobody/").unwrap().is_empty());
    }

    #[test]
    fn traversal_is_refused() {
        let (store, _tmp) = store();
        assert!(store.resolve("../etc/passwd").is_err());
        assert!(store.resolve("/etc/passwd").is_err());
        assert!(store.resolve("./avatars/x").is_err());
        assert!(store.resolve("").is_err());
    }

    #[test]
    fn public_url_joins_prefix() {
        let (store, _tmp) = store();
        assert_eq!(store.public_url("avatars/u1/a.png"), "/uploads/avatars/u1/a.png");
    }
}
