//! The `package_info.json` schema.
//!
//! Every archive carries a `package_info.json` at its root identifying
//! the character, the package type, and — for split packages — the
//! part's role in the parent/child protocol. The installer classifies
//! an incoming archive from this file alone, before extracting
//! anything.

use charapack_common::ids::{CharacterId, CostumeId};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// File name of the package metadata entry at the archive root.
pub const PACKAGE_INFO_FILE_NAME: &str = "package_info.json";

/// Version of the package format written by this implementation.
pub const FORMAT_VERSION: &str = "1.0";

/// Generator tag recorded in package metadata and signatures.
pub const GENERATED_BY: &str = "charapack";

/// The `part_name` carried by every split parent archive.
pub const PARENT_PART_NAME: &str = "base";

/// Whether an archive is self-contained or one part of a split set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageType {
    /// A single archive holding the entire character bundle.
    Complete,
    /// One part of a parent-plus-children split set.
    Split,
}

/// The role of one archive within a split set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageRole {
    /// The base archive listing every required child part.
    Parent,
    /// One costume archive belonging to a parent.
    Child,
}

impl fmt::Display for PackageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Complete => f.write_str("complete"),
            Self::Split => f.write_str("split"),
        }
    }
}

impl fmt::Display for PackageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parent => f.write_str("parent"),
            Self::Child => f.write_str("child"),
        }
    }
}

/// An ISO 8601 UTC timestamp string.
///
/// Stored as an opaque string; builds inject it so the same instant
/// appears in every archive of one build attempt, and tests can pin it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(String);

impl Timestamp {
    /// The current instant in UTC, microsecond precision.
    #[must_use]
    pub fn now() -> Self {
        Self(Utc::now().to_rfc3339_opts(SecondsFormat::Micros, false))
    }

    /// Wrap an existing timestamp string.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Return the timestamp as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity fields shared by every archive of one build attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageMeta {
    /// The character identifier, also the install directory name.
    pub character_id: CharacterId,
    /// The character's display name.
    pub character_name: String,
    /// When this build attempt started.
    pub generated_at: Timestamp,
}

/// The package metadata written to `package_info.json`.
///
/// Optional fields are omitted from the JSON when unset, so a complete
/// package carries no split bookkeeping at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageInfo {
    format_version: String,
    character_id: String,
    character_name: String,
    timestamp_utc: Timestamp,
    generated_by: String,
    package_type: PackageType,
    #[serde(skip_serializing_if = "Option::is_none")]
    base_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    package_role: Option<PackageRole>,
    #[serde(skip_serializing_if = "Option::is_none")]
    part_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    parent_part: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    child_parts: Option<Vec<String>>,
}

impl PackageInfo {
    fn base(meta: &PackageMeta, package_type: PackageType) -> Self {
        Self {
            format_version: FORMAT_VERSION.to_owned(),
            character_id: meta.character_id.as_str().to_owned(),
            character_name: meta.character_name.clone(),
            timestamp_utc: meta.generated_at.clone(),
            generated_by: GENERATED_BY.to_owned(),
            package_type,
            base_id: Some(meta.character_id.as_str().to_owned()),
            package_role: None,
            part_name: None,
            parent_part: None,
            child_parts: None,
        }
    }

    /// Metadata for a single self-contained archive.
    #[must_use]
    pub fn complete(meta: &PackageMeta) -> Self {
        Self::base(meta, PackageType::Complete)
    }

    /// Metadata for the parent archive of a split set.
    ///
    /// `child_parts` lists every costume archive an installer must
    /// collect before the character is usable.
    #[must_use]
    pub fn split_parent(meta: &PackageMeta, child_parts: &[CostumeId]) -> Self {
        let mut info = Self::base(meta, PackageType::Split);
        info.package_role = Some(PackageRole::Parent);
        info.part_name = Some(PARENT_PART_NAME.to_owned());
        info.child_parts = Some(
            child_parts
                .iter()
                .map(|part| part.as_str().to_owned())
                .collect(),
        );
        info
    }

    /// Metadata for one child archive of a split set.
    #[must_use]
    pub fn split_child(meta: &PackageMeta, part: &CostumeId) -> Self {
        let mut info = Self::base(meta, PackageType::Split);
        info.package_role = Some(PackageRole::Child);
        info.part_name = Some(part.as_str().to_owned());
        info.parent_part = Some(PARENT_PART_NAME.to_owned());
        info
    }

    /// The package format version.
    #[must_use]
    pub fn format_version(&self) -> &str {
        &self.format_version
    }

    /// The character identifier this archive installs as.
    #[must_use]
    pub fn character_id(&self) -> &str {
        &self.character_id
    }

    /// The character's display name.
    #[must_use]
    pub fn character_name(&self) -> &str {
        &self.character_name
    }

    /// When the archive was built.
    #[must_use]
    pub fn timestamp_utc(&self) -> &Timestamp {
        &self.timestamp_utc
    }

    /// The tool that generated the archive.
    #[must_use]
    pub fn generated_by(&self) -> &str {
        &self.generated_by
    }

    /// Whether the archive is complete or one part of a split set.
    #[must_use]
    pub fn package_type(&self) -> PackageType {
        self.package_type
    }

    /// The identifier of the split set this archive belongs to.
    #[must_use]
    pub fn base_id(&self) -> Option<&str> {
        self.base_id.as_deref()
    }

    /// This archive's role within a split set, when declared.
    #[must_use]
    pub fn package_role(&self) -> Option<PackageRole> {
        self.package_role
    }

    /// This archive's part name within a split set.
    #[must_use]
    pub fn part_name(&self) -> Option<&str> {
        self.part_name.as_deref()
    }

    /// The part name of the parent archive, on children.
    #[must_use]
    pub fn parent_part(&self) -> Option<&str> {
        self.parent_part.as_deref()
    }

    /// Every child part a parent archive requires; empty on others.
    #[must_use]
    pub fn child_parts(&self) -> &[String] {
        self.child_parts.as_deref().unwrap_or_default()
    }
}
