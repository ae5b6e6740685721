//! Artifact storage
//!
//! The pipeline never touches file paths; it hands named byte buffers to an
//! `ArtifactStore`. Names are validated as storage-key-safe by every store.

pub mod fs;
pub mod memory;

use crate::artifact::{manifest_filename, ArtifactBundle, BundleManifest, RequestId};
use crate::error::Result;
use tracing::info;

pub use fs::FsArtifactStore;
pub use memory::MemoryArtifactStore;

/// Key-value blob store for generated artifacts
pub trait ArtifactStore: Send + Sync {
    /// Store `bytes` under `name`, replacing any previous value
    fn save(&self, name: &str, bytes: &[u8]) -> Result<()>;

    /// Load the bytes stored under `name`, or `Error::NotFound`
    fn load(&self, name: &str) -> Result<Vec<u8>>;

    /// Names of all artifacts stored for `request_id`, sorted
    fn list(&self, request_id: &RequestId) -> Result<Vec<String>>;

    /// Human-readable description of where artifacts live
    fn location(&self) -> String;
}

/// Save every artifact of `bundle` plus its manifest
pub fn persist_bundle(store: &dyn ArtifactStore, bundle: &ArtifactBundle) -> Result<BundleManifest> {
    for (name, bytes) in bundle.files() {
        store.save(&name, bytes)?;
    }

    let manifest = bundle.manifest();
    let manifest_json = serde_json::to_vec_pretty(&manifest)?;
    store.save(&manifest_filename(bundle.request_id()), &manifest_json)?;

    info!(
        "Persisted {} artifacts for {} to {}",
        bundle.len(),
        bundle.request_id(),
        store.location()
    );
    Ok(manifest)
}

/// Load the manifest previously written by [`persist_bundle`]
pub fn load_manifest(store: &dyn ArtifactStore, request_id: &RequestId) -> Result<BundleManifest> {
    let bytes = store.load(&manifest_filename(request_id))?;
    Ok(serde_json::from_slice(&bytes)?)
}
