//! The costume value type.

use crate::ids::CostumeId;

/// A named visual variant of a character.
///
/// Each costume owns a directory of images under the character's asset
/// root, keyed by its identifier. The display name is free-form text
/// shown to the user and never used for paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Costume {
    /// The costume identifier, matching its image directory name.
    pub id: CostumeId,
    /// The human-readable display name.
    pub name: String,
}

impl Costume {
    /// Construct a costume from a validated identifier and a display name.
    #[must_use]
    pub fn new(id: CostumeId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}
