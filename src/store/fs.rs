//! File-system artifact store
//!
//! Artifacts live as flat files under one directory, by default in the XDG
//! data directory (~/.local/share/ripple-nav/artifacts/).

use crate::artifact::{validate_key, RequestId};
use crate::config::defaults::{APP_DIR_NAME, ARTIFACT_DIR_NAME};
use crate::error::{Error, Result};
use crate::store::ArtifactStore;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Directory-backed artifact store
#[derive(Debug, Clone)]
pub struct FsArtifactStore {
    root: PathBuf,
}

impl FsArtifactStore {
    /// Open a store rooted at `root`, creating the directory if needed
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|e| {
            Error::Config(format!(
                "Failed to create artifact directory {}: {}",
                root.display(),
                e
            ))
        })?;
        Ok(Self { root })
    }

    /// Default artifact directory
    pub fn default_dir() -> Result<PathBuf> {
        dirs::data_dir()
            .map(|p| p.join(APP_DIR_NAME).join(ARTIFACT_DIR_NAME))
            .ok_or_else(|| Error::Config("Could not determine data directory".to_string()))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, name: &str) -> Result<PathBuf> {
        validate_key(name)?;
        Ok(self.root.join(name))
    }
}

impl ArtifactStore for FsArtifactStore {
    fn save(&self, name: &str, bytes: &[u8]) -> Result<()> {
        let path = self.path_for(name)?;
        // Write then rename so readers never see a partial file; the temp
        // file is removed on drop if persisting fails
        let mut tmp = tempfile::NamedTempFile::new_in(&self.root)?;
        tmp.write_all(bytes)?;
        tmp.persist(&path).map_err(|e| Error::Io(e.error))?;
        debug!("Saved {} ({} bytes)", path.display(), bytes.len());
        Ok(())
    }

    fn load(&self, name: &str) -> Result<Vec<u8>> {
        let path = self.path_for(name)?;
        match fs::read(&path) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(Error::NotFound(name.to_string())),
            Err(e) => Err(e.into()),
        }
    }

    fn list(&self, request_id: &RequestId) -> Result<Vec<String>> {
        let prefix = format!("{}_", request_id);
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if name.starts_with(&prefix) {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    fn location(&self) -> String {
        self.root.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::artifact::MAX_KEY_LEN;
    use tempfile::TempDir;

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let store = FsArtifactStore::new(dir.path()).unwrap();

        store.save("r1_navigation_route.geojson", b"{}").unwrap();
        assert_eq!(store.load("r1_navigation_route.geojson").unwrap(), b"{}");
        assert!(dir.path().join("r1_navigation_route.geojson").exists());
    }

    #[test]
    fn test_overwrite() {
        let dir = TempDir::new().unwrap();
        let store = FsArtifactStore::new(dir.path()).unwrap();

        store.save("r1_route_plot.png", b"one").unwrap();
        store.save("r1_route_plot.png", b"two").unwrap();
        assert_eq!(store.load("r1_route_plot.png").unwrap(), b"two");
    }

    #[test]
    fn test_creates_missing_root() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("nested").join("artifacts");
        let store = FsArtifactStore::new(&root).unwrap();
        assert!(root.is_dir());
        assert_eq!(store.root(), root.as_path());
    }

    #[test]
    fn test_missing_is_not_found() {
        let dir = TempDir::new().unwrap();
        let store = FsArtifactStore::new(dir.path()).unwrap();
        assert!(matches!(
            store.load("missing_navigation_route.kml").unwrap_err(),
            Error::NotFound(_)
        ));
    }

    #[test]
    fn test_path_traversal_rejected() {
        let dir = TempDir::new().unwrap();
        let store = FsArtifactStore::new(dir.path()).unwrap();

        for name in ["../etc/passwd", "a/b", ".hidden", ""] {
            assert!(matches!(
                store.load(name).unwrap_err(),
                Error::InvalidArtifactName(_)
            ));
            assert!(store.save(name, b"x").is_err());
        }
    }

    #[test]
    fn test_longest_key_round_trips() {
        let dir = TempDir::new().unwrap();
        let store = FsArtifactStore::new(dir.path()).unwrap();
        let name = format!("{}.kml", "a".repeat(MAX_KEY_LEN - 4));
        assert_eq!(name.len(), MAX_KEY_LEN);

        store.save(&name, b"k").unwrap();
        assert_eq!(store.load(&name).unwrap(), b"k");

        let too_long = format!("a{}", name);
        assert!(matches!(
            store.save(&too_long, b"k").unwrap_err(),
            Error::InvalidArtifactName(_)
        ));
    }

    #[test]
    fn test_save_leaves_no_temp_files() {
        let dir = TempDir::new().unwrap();
        let store = FsArtifactStore::new(dir.path()).unwrap();
        store.save("r1_route_plot.png", b"one").unwrap();
        store.save("r1_route_plot.png", b"two").unwrap();
        store.save("r1_navigation_route.kml", b"k").unwrap();

        let mut entries: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        entries.sort();
        assert_eq!(entries, vec!["r1_navigation_route.kml", "r1_route_plot.png"]);
    }

    #[test]
    fn test_list_ignores_temp_and_other_requests() {
        let dir = TempDir::new().unwrap();
        let store = FsArtifactStore::new(dir.path()).unwrap();
        store.save("r1_navigation_route.kml", b"k").unwrap();
        store.save("r1_route_plot.png", b"p").unwrap();
        store.save("r2_route_plot.png", b"p").unwrap();

        let id = RequestId::parse("r1").unwrap();
        assert_eq!(
            store.list(&id).unwrap(),
            vec!["r1_navigation_route.kml", "r1_route_plot.png"]
        );
    }
}
