//! The shared signing secret.
//!
//! Signatures are salted with a secret string distributed alongside the
//! application. The salt marks provenance and makes casual tampering
//! evident; it is not a security boundary. It is loaded once at process
//! start, before any packaging or installation work, so a missing
//! secret surfaces immediately rather than mid-operation.

use crate::error::{PackagerError, Result};
use camino::Utf8Path;
use std::fmt;
use std::fs;

/// Default file name of the salt secret next to the executable.
pub const SALT_FILE_NAME: &str = "salt.key";

/// The signing salt, guaranteed non-empty.
#[derive(Clone, PartialEq, Eq)]
pub struct SignatureSalt(String);

impl SignatureSalt {
    /// Construct a salt from an in-process string.
    ///
    /// # Errors
    ///
    /// Returns [`PackagerError::Salt`] when the value is empty after
    /// trimming.
    pub fn new(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(PackagerError::Salt {
                reason: "salt value is empty".to_owned(),
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Load the salt from a single-line secret file.
    ///
    /// Leading and trailing whitespace (including the trailing newline)
    /// is stripped.
    ///
    /// # Errors
    ///
    /// Returns [`PackagerError::Salt`] when the file is missing,
    /// unreadable, or empty, with guidance naming the expected file.
    pub fn load(path: &Utf8Path) -> Result<Self> {
        let contents = fs::read_to_string(path.as_std_path()).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                PackagerError::Salt {
                    reason: format!(
                        "'{path}' not found; create it and paste the distributed salt string"
                    ),
                }
            } else {
                PackagerError::Salt {
                    reason: format!("could not read '{path}': {e}"),
                }
            }
        })?;

        let trimmed = contents.trim();
        if trimmed.is_empty() {
            return Err(PackagerError::Salt {
                reason: format!("'{path}' is empty"),
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// The salt bytes appended to the canonical payload before hashing.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Debug for SignatureSalt {
    /// The secret itself is kept out of debug output.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SignatureSalt(..)")
    }
}
