//! In-memory artifact store

use crate::artifact::{validate_key, RequestId};
use crate::error::{Error, Result};
use crate::store::ArtifactStore;
use dashmap::DashMap;

/// Concurrent in-memory store, mainly for tests and ephemeral servers
#[derive(Debug, Default)]
pub struct MemoryArtifactStore {
    blobs: DashMap<String, Vec<u8>>,
}

impl MemoryArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }
}

impl ArtifactStore for MemoryArtifactStore {
    fn save(&self, name: &str, bytes: &[u8]) -> Result<()> {
        validate_key(name)?;
        self.blobs.insert(name.to_string(), bytes.to_vec());
        Ok(())
    }

    fn load(&self, name: &str) -> Result<Vec<u8>> {
        validate_key(name)?;
        self.blobs
            .get(name)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| Error::NotFound(name.to_string()))
    }

    fn list(&self, request_id: &RequestId) -> Result<Vec<String>> {
        let prefix = format!("{}_", request_id);
        let mut names: Vec<String> = self
            .blobs
            .iter()
            .filter(|entry| entry.key().starts_with(&prefix))
            .map(|entry| entry.key().clone())
            .collect();
        names.sort();
        Ok(names)
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_save_and_load() {
        let store = MemoryArtifactStore::new();
        store.save("abc_route_plot.png", b"png").unwrap();
        assert_eq!(store.load("abc_route_plot.png").unwrap(), b"png");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_missing_is_not_found() {
        let store = MemoryArtifactStore::new();
        assert!(matches!(store.load("nope.kml").unwrap_err(), Error::NotFound(_)));
    }

    #[test]
    fn test_unsafe_name_rejected() {
        let store = MemoryArtifactStore::new();
        assert!(matches!(
            store.save("../x", b"").unwrap_err(),
            Error::InvalidArtifactName(_)
        ));
    }

    #[test]
    fn test_list_by_request() {
        let store = MemoryArtifactStore::new();
        store.save("a_navigation_route.kml", b"1").unwrap();
        store.save("a_navigation_route.geojson", b"2").unwrap();
        store.save("ab_navigation_route.kml", b"3").unwrap();

        let id = RequestId::parse("a").unwrap();
        assert_eq!(
            store.list(&id).unwrap(),
            vec!["a_navigation_route.geojson", "a_navigation_route.kml"]
        );
    }

    #[test]
    fn test_concurrent_requests_do_not_interfere() {
        let store = Arc::new(MemoryArtifactStore::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    let id = RequestId::generate();
                    let name = format!("{}_route_plot.png", id);
                    store.save(&name, &[i as u8; 16]).unwrap();
                    (name, i as u8)
                })
            })
            .collect();

        for handle in handles {
            let (name, byte) = handle.join().unwrap();
            assert_eq!(store.load(&name).unwrap(), vec![byte; 16]);
        }
        assert_eq!(store.len(), 8);
    }
}
