//! Request identifiers, artifact naming and bundles
//!
//! Artifacts are addressed by storage-key-safe file names derived from the
//! request id and artifact kind, e.g. `{id}_navigation_route.kml`.

use crate::constants::artifact::{
    CUSTOM_GEOJSON_SUFFIX, DOWNLOAD_PREFIX, GEOJSON_SUFFIX, KML_SUFFIX, MANIFEST_SUFFIX,
    MAX_KEY_LEN, PLOT_SUFFIX,
};
use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Check that `name` is safe as a storage key and URL path segment
///
/// Allowed: ASCII letters, digits, `.`, `_`, `-`; no leading dot, non-empty.
pub fn validate_key(name: &str) -> Result<()> {
    let safe = !name.is_empty()
        && !name.starts_with('.')
        && name.len() <= MAX_KEY_LEN
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));
    if safe {
        Ok(())
    } else {
        Err(Error::InvalidArtifactName(name.to_string()))
    }
}

/// Opaque per-request identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(String);

impl RequestId {
    /// Generate a fresh random identifier
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Accept an externally supplied identifier if it is key-safe
    pub fn parse(s: &str) -> Result<Self> {
        validate_key(s)?;
        Ok(Self(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kinds of derived artifacts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    Geojson,
    Plot,
    Kml,
}

impl ArtifactKind {
    /// Logical artifact name used in bundles
    pub fn name(&self) -> &'static str {
        match self {
            Self::Geojson => "geojson",
            Self::Plot => "plot",
            Self::Kml => "kml",
        }
    }

    /// MIME type of the artifact bytes
    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Geojson => "application/geo+json",
            Self::Plot => "image/png",
            Self::Kml => "application/vnd.google-earth.kml+xml",
        }
    }

    /// Storage file name for this artifact of `request_id`
    pub fn filename(&self, request_id: &RequestId) -> String {
        let suffix = match self {
            Self::Geojson => GEOJSON_SUFFIX,
            Self::Plot => PLOT_SUFFIX,
            Self::Kml => KML_SUFFIX,
        };
        format!("{}_{}", request_id, suffix)
    }

    /// Guess the kind from a stored file name
    pub fn from_filename(name: &str) -> Option<Self> {
        if name.ends_with(".geojson") {
            Some(Self::Geojson)
        } else if name.ends_with(".png") {
            Some(Self::Plot)
        } else if name.ends_with(".kml") {
            Some(Self::Kml)
        } else {
            None
        }
    }
}

impl std::fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// File name of the manifest stored alongside a bundle
pub fn manifest_filename(request_id: &RequestId) -> String {
    format!("{}_{}", request_id, MANIFEST_SUFFIX)
}

/// File name for a caller-supplied GeoJSON document
pub fn custom_geojson_filename(request_id: &RequestId) -> String {
    format!("{}_{}", request_id, CUSTOM_GEOJSON_SUFFIX)
}

/// Reference path the transport layer resolves to a stored file
pub fn download_reference(filename: &str) -> String {
    format!("{}{}", DOWNLOAD_PREFIX, filename)
}

/// Derived artifacts of one request, keyed by kind
#[derive(Debug, Clone)]
pub struct ArtifactBundle {
    request_id: RequestId,
    created_at: DateTime<Utc>,
    artifacts: BTreeMap<ArtifactKind, Vec<u8>>,
}

impl ArtifactBundle {
    pub(crate) fn new(request_id: RequestId, artifacts: BTreeMap<ArtifactKind, Vec<u8>>) -> Self {
        Self {
            request_id,
            created_at: Utc::now(),
            artifacts,
        }
    }

    pub fn request_id(&self) -> &RequestId {
        &self.request_id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn get(&self, kind: ArtifactKind) -> Option<&[u8]> {
        self.artifacts.get(&kind).map(Vec::as_slice)
    }

    pub fn contains(&self, kind: ArtifactKind) -> bool {
        self.artifacts.contains_key(&kind)
    }

    /// Artifacts with their storage file names, in kind order
    pub fn files(&self) -> impl Iterator<Item = (String, &[u8])> {
        self.artifacts
            .iter()
            .map(|(kind, bytes)| (kind.filename(&self.request_id), bytes.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }

    /// Manifest describing this bundle
    pub fn manifest(&self) -> BundleManifest {
        BundleManifest {
            request_id: self.request_id.clone(),
            created_at: self.created_at.to_rfc3339(),
            artifacts: self
                .artifacts
                .keys()
                .map(|kind| ManifestEntry {
                    kind: *kind,
                    filename: kind.filename(&self.request_id),
                    content_type: kind.content_type().to_string(),
                    size: self.artifacts[kind].len(),
                })
                .collect(),
        }
    }
}

/// Stored description of a persisted bundle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BundleManifest {
    pub request_id: RequestId,
    pub created_at: String,
    pub artifacts: Vec<ManifestEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub kind: ArtifactKind,
    pub filename: String,
    pub content_type: String,
    pub size: usize,
}
