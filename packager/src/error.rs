//! Error types for package building and installation.
//!
//! Every fatal or validation condition carries a human-readable message
//! naming the file or part that caused it. Recoverable conditions inside
//! the child-acquisition loop are not errors; they are modelled as
//! [`crate::package::install::ChildRejection`] values instead.

use camino::Utf8PathBuf;
use charapack_common::error::CharacterError;
use thiserror::Error;

/// Errors that can occur while building or installing packages.
#[derive(Debug, Error)]
pub enum PackagerError {
    /// The signing salt could not be loaded; fatal at startup.
    #[error("signature salt unavailable: {reason}")]
    Salt {
        /// Why the salt is unavailable and how to fix it.
        reason: String,
    },

    /// An archive could not be opened or is not a valid ZIP file.
    #[error("archive {path} is unreadable or corrupt: {reason}")]
    ArchiveUnreadable {
        /// Path to the offending archive.
        path: Utf8PathBuf,
        /// Description of the failure.
        reason: String,
    },

    /// An archive has no `package_info.json` entry at its root.
    #[error("archive {path} contains no package_info.json")]
    PackageInfoMissing {
        /// Path to the offending archive.
        path: Utf8PathBuf,
    },

    /// An archive's `package_info.json` could not be parsed or carries
    /// an unrecognized package type or role.
    #[error("archive {path} carries invalid package information: {reason}")]
    PackageInfoInvalid {
        /// Path to the offending archive.
        path: Utf8PathBuf,
        /// Description of the invalid content, naming unknown values.
        reason: String,
    },

    /// A split archive declares no package role.
    #[error("archive {path} is marked split but declares no package_role")]
    PackageRoleMissing {
        /// Path to the offending archive.
        path: Utf8PathBuf,
    },

    /// A produced archive exceeds the per-archive size limit.
    #[error(
        "archive {archive} is {size_bytes} bytes, over the {limit_bytes} byte limit; \
         reduce the character's image sizes or file count"
    )]
    SizeLimitExceeded {
        /// File name of the oversized archive.
        archive: String,
        /// Actual size of the produced archive.
        size_bytes: u64,
        /// The hard per-archive limit.
        limit_bytes: u64,
    },

    /// An archive entry attempts to escape the extraction target.
    #[error("entry '{entry}' in {archive} escapes the extraction target")]
    PathTraversal {
        /// Path to the archive holding the entry.
        archive: Utf8PathBuf,
        /// The offending entry name.
        entry: String,
    },

    /// A filesystem path is not valid UTF-8.
    #[error("path is not valid UTF-8: {path}")]
    NonUtf8Path {
        /// The offending path.
        path: std::path::PathBuf,
    },

    /// A character domain error, such as an invalid identifier inside
    /// package metadata.
    #[error(transparent)]
    Character(#[from] CharacterError),

    /// JSON serialization or deserialization failed.
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using [`PackagerError`].
pub type Result<T> = std::result::Result<T, PackagerError>;
