//! Deterministic archive naming policy.
//!
//! Archive names are derived from the character identifier and, for
//! split sets, the part name. Installers also reverse the policy to
//! tell a user which parent archive a stray child belongs to.

use charapack_common::ids::{CharacterId, CostumeId};
use std::fmt;

/// The name of one output archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArchiveName {
    /// `{id}.zip`, a self-contained package.
    Complete(CharacterId),
    /// `{id}_base.zip`, the parent of a split set.
    Base(CharacterId),
    /// `{id}_{costume}.zip`, one child of a split set.
    Child(CharacterId, CostumeId),
}

impl ArchiveName {
    /// Render the file name, including the `.zip` suffix.
    #[must_use]
    pub fn filename(&self) -> String {
        match self {
            Self::Complete(id) => format!("{id}.zip"),
            Self::Base(id) => format!("{id}_base.zip"),
            Self::Child(id, costume) => format!("{id}_{costume}.zip"),
        }
    }
}

impl fmt::Display for ArchiveName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.filename())
    }
}

/// The file name of the archive holding `parent_part` of a split set.
///
/// Used in user-facing guidance when a child archive arrives before its
/// parent has been installed.
#[must_use]
pub fn parent_archive_name(base_id: &str, parent_part: &str) -> String {
    format!("{base_id}_{parent_part}.zip")
}
