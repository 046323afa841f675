//! Path-to-digest manifest over a staged package tree.
//!
//! The manifest maps every file in an archive (except `signature.json`
//! itself) to its SHA-256 digest, keyed by the file's forward-slash
//! relative path. It is embedded in the signing payload, so any change
//! to a packaged file changes the signature.

use crate::error::{PackagerError, Result};
use crate::package::digest::Sha256Digest;
use crate::package::signature::SIGNATURE_FILE_NAME;
use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use walkdir::WalkDir;

/// A sorted map of relative file paths to content digests.
///
/// Keys use `/` as the separator on every platform, so manifests built
/// on different systems for the same tree are byte-identical.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileManifest(BTreeMap<String, Sha256Digest>);

impl FileManifest {
    /// Hash every file under `root` into a manifest.
    ///
    /// Files named `signature.json` are skipped wherever they appear,
    /// so a manifest computed over an extracted archive matches the one
    /// recorded inside it.
    ///
    /// # Errors
    ///
    /// Returns [`PackagerError::NonUtf8Path`] for undecodable file
    /// names and [`PackagerError::Io`] when the tree cannot be read.
    pub fn from_dir(root: &Utf8Path) -> Result<Self> {
        let mut entries = BTreeMap::new();
        for entry in WalkDir::new(root.as_std_path()).follow_links(false) {
            let entry = entry.map_err(std::io::Error::from)?;
            if !entry.file_type().is_file() {
                continue;
            }
            let path = Utf8PathBuf::try_from(entry.path().to_path_buf())
                .map_err(|e| PackagerError::NonUtf8Path { path: e.into_path_buf() })?;
            if path.file_name() == Some(SIGNATURE_FILE_NAME) {
                continue;
            }
            let relative = path
                .strip_prefix(root)
                .map_err(|_| std::io::Error::other(format!("{path} is outside {root}")))?;
            let key = relative
                .components()
                .map(|c| c.as_str())
                .collect::<Vec<_>>()
                .join("/");
            entries.insert(key, Sha256Digest::of_file(&path)?);
        }
        Ok(Self(entries))
    }

    /// The number of files recorded.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the manifest records no files.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Look up the digest of one relative path.
    #[must_use]
    pub fn digest_of(&self, relative_path: &str) -> Option<&Sha256Digest> {
        self.0.get(relative_path)
    }

    /// Iterate over `(relative path, digest)` pairs in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Sha256Digest)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Re-hash `root` and compare against this manifest.
    ///
    /// Returns `true` only when the directory holds exactly the files
    /// recorded here with matching digests.
    ///
    /// # Errors
    ///
    /// Returns [`PackagerError::Io`] when the tree cannot be read.
    pub fn verify_dir(&self, root: &Utf8Path) -> Result<bool> {
        Ok(Self::from_dir(root)? == *self)
    }
}
