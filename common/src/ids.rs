//! Validated identifier newtypes for characters and costumes.
//!
//! Both identifiers become on-disk directory names and archive name
//! components, so they reject the characters that are hostile to any
//! mainstream filesystem.

use crate::error::{CharacterError, Result};
use std::fmt;

/// The costume every character must carry and that is never split out
/// into a child archive.
pub const DEFAULT_COSTUME: &str = "default";

/// Characters that may not appear in an identifier.
const FORBIDDEN_CHARS: &[char] = &['\\', '/', ':', '*', '?', '"', '<', '>', '|'];

/// A validated character identifier.
///
/// Doubles as the character's directory name under the `characters`
/// root and as the base of every archive name derived from it.
///
/// # Examples
///
/// ```
/// use charapack_common::ids::CharacterId;
///
/// let id = CharacterId::try_from("alice").expect("valid id");
/// assert_eq!(id.as_str(), "alice");
/// assert!(CharacterId::try_from("al/ice").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CharacterId(String);

/// A validated costume identifier.
///
/// Costume identifiers name the per-costume image directory and the
/// `part_name` of a split child archive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CostumeId(String);

impl CharacterId {
    /// Return the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl CostumeId {
    /// Return the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is the mandatory `default` costume.
    #[must_use]
    pub fn is_default(&self) -> bool {
        self.0 == DEFAULT_COSTUME
    }
}

/// Validate that `value` can serve as a directory-name identifier.
fn validate_identifier(value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(CharacterError::InvalidId {
            value: value.to_owned(),
            reason: "identifier is empty".to_owned(),
        });
    }
    if let Some(bad) = value.chars().find(|c| FORBIDDEN_CHARS.contains(c)) {
        return Err(CharacterError::InvalidId {
            value: value.to_owned(),
            reason: format!("'{bad}' cannot be used in a file name"),
        });
    }
    Ok(())
}

impl TryFrom<&str> for CharacterId {
    type Error = CharacterError;

    fn try_from(value: &str) -> Result<Self> {
        validate_identifier(value)?;
        Ok(Self(value.to_owned()))
    }
}

impl TryFrom<String> for CharacterId {
    type Error = CharacterError;

    fn try_from(value: String) -> Result<Self> {
        validate_identifier(&value)?;
        Ok(Self(value))
    }
}

impl TryFrom<&str> for CostumeId {
    type Error = CharacterError;

    fn try_from(value: &str) -> Result<Self> {
        validate_identifier(value)?;
        Ok(Self(value.to_owned()))
    }
}

impl TryFrom<String> for CostumeId {
    type Error = CharacterError;

    fn try_from(value: String) -> Result<Self> {
        validate_identifier(&value)?;
        Ok(Self(value))
    }
}

impl AsRef<str> for CharacterId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for CostumeId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CharacterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for CostumeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
