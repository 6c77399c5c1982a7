//! Installed-bundle manifest persistence.
//!
//! The manifest records which bundle versions a sync run installed, keyed
//! by bundle name with per-version metadata (etag, integrity digest,
//! signature, last-modified). It is the consistency anchor of the tool: a
//! manifest on disk always describes a set of bundles that were all
//! fetched successfully in the same run.
//!
//! Entries live in `BTreeMap`s so serialization order is deterministic and
//! identical runs produce byte-identical files. The file is written
//! pretty-printed to `manifest.json`, via a temporary sibling and a rename
//! so a crashed run never leaves a half-written manifest behind.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// File name of the persisted manifest inside the destination directory.
pub const MANIFEST_FILENAME: &str = "manifest.json";

/// Current manifest schema version.
const MANIFEST_VERSION: u32 = 1;

/// Errors from manifest persistence.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// Reading or writing the manifest file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The manifest file is not valid JSON or has an unexpected shape.
    #[error("failed to parse manifest: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Server-reported metadata for one installed bundle version.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionMetadata {
    /// ETag from the server at download time.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub etag: Option<String>,
    /// Integrity digest of the payload.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub integrity: Option<String>,
    /// Detached signature over the integrity digest.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub signature: Option<String>,
    /// Last-modified timestamp from the server.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub last_modified: Option<String>,
}

/// All installed versions of one bundle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestEntry {
    /// Metadata per installed version.
    pub versions: BTreeMap<String, VersionMetadata>,
    /// The version currently active for this bundle.
    pub current_version: String,
}

/// The persisted install manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    /// Schema version of this file.
    pub manifest_version: u32,
    /// Installed bundles keyed by name.
    pub entries: BTreeMap<String, ManifestEntry>,
}

impl Default for Manifest {
    fn default() -> Self {
        Self {
            manifest_version: MANIFEST_VERSION,
            entries: BTreeMap::new(),
        }
    }
}

impl Manifest {
    /// An empty manifest at the current schema version.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an installed version; the inserted version becomes the
    /// bundle's current version.
    pub fn insert(&mut self, name: &str, version: &str, metadata: VersionMetadata) {
        self.entries
            .entry(name.to_string())
            .and_modify(|entry| {
                entry.versions.insert(version.to_string(), metadata.clone());
                entry.current_version = version.to_string();
            })
            .or_insert_with(|| ManifestEntry {
                versions: BTreeMap::from([(version.to_string(), metadata.clone())]),
                current_version: version.to_string(),
            });
    }

    /// The entry for a bundle, if installed.
    pub fn get(&self, name: &str) -> Option<&ManifestEntry> {
        self.entries.get(name)
    }

    /// The current version of a bundle, if installed.
    pub fn current_version(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(|e| e.current_version.as_str())
    }

    /// Whether the manifest has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of installed bundles.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Serialize to the on-disk representation.
    pub fn to_pretty_json(&self) -> Result<Vec<u8>, ManifestError> {
        Ok(serde_json::to_vec_pretty(self)?)
    }

    /// Write the manifest into `dir/manifest.json`, creating the directory
    /// as needed. Returns the written path.
    pub async fn save(&self, dir: &Path) -> Result<PathBuf, ManifestError> {
        let raw = self.to_pretty_json()?;
        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(MANIFEST_FILENAME);
        let tmp = dir.join(format!("{}.tmp", MANIFEST_FILENAME));
        tokio::fs::write(&tmp, &raw).await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(path)
    }

    /// Load a manifest from a file path.
    pub async fn load(path: &Path) -> Result<Self, ManifestError> {
        let raw = tokio::fs::read(path).await?;
        Ok(serde_json::from_slice(&raw)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata(etag: Option<&str>) -> VersionMetadata {
        VersionMetadata {
            etag: etag.map(str::to_string),
            ..VersionMetadata::default()
        }
    }

    #[test]
    fn test_insert_sets_current_version() {
        let mut manifest = Manifest::new();
        manifest.insert("app", "1.0.0", metadata(None));
        assert_eq!(manifest.current_version("app"), Some("1.0.0"));

        manifest.insert("app", "1.1.0", metadata(Some("\"abc\"")));
        let entry = manifest.get("app").unwrap();
        assert_eq!(entry.current_version, "1.1.0");
        assert_eq!(entry.versions.len(), 2);
    }

    #[test]
    fn test_serializes_camel_case_schema() {
        let mut manifest = Manifest::new();
        manifest.insert("app", "1.0.0", metadata(Some("\"abc\"")));
        let json = String::from_utf8(manifest.to_pretty_json().unwrap()).unwrap();
        assert!(json.contains("\"manifestVersion\": 1"));
        assert!(json.contains("\"currentVersion\": \"1.0.0\""));
        assert!(json.contains("\"etag\""));
        // Absent optional metadata is omitted, not serialized as null.
        assert!(!json.contains("\"integrity\""));
    }

    #[test]
    fn test_serialization_is_deterministic() {
        let mut a = Manifest::new();
        a.insert("app", "1.0.0", metadata(None));
        a.insert("docs", "2.0.0", metadata(None));

        let mut b = Manifest::new();
        b.insert("docs", "2.0.0", metadata(None));
        b.insert("app", "1.0.0", metadata(None));

        assert_eq!(a.to_pretty_json().unwrap(), b.to_pretty_json().unwrap());
    }

    #[tokio::test]
    async fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let mut manifest = Manifest::new();
        manifest.insert("app", "1.0.0", metadata(Some("\"abc\"")));

        let path = manifest.save(dir.path()).await.unwrap();
        assert_eq!(path, dir.path().join(MANIFEST_FILENAME));
        // No temporary file is left behind.
        assert!(!dir
            .path()
            .join(format!("{}.tmp", MANIFEST_FILENAME))
            .exists());

        let loaded = Manifest::load(&path).await.unwrap();
        assert_eq!(loaded, manifest);
    }

    #[tokio::test]
    async fn test_save_creates_destination_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("deeply").join("nested");
        let manifest = Manifest::new();
        let path = manifest.save(&nested).await.unwrap();
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_load_rejects_malformed_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(MANIFEST_FILENAME);
        tokio::fs::write(&path, b"{not json").await.unwrap();
        let err = Manifest::load(&path).await.unwrap_err();
        assert!(matches!(err, ManifestError::Parse(_)));
    }
}
