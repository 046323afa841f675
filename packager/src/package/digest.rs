//! SHA-256 digest newtype and hashing helpers.
//!
//! Digests are stored and compared as 64-character lowercase hex
//! strings, the form they take inside `signature.json`.

use crate::error::{PackagerError, Result};
use camino::Utf8Path;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::fs;
use std::io::Read;

/// Expected length of a hex-encoded SHA-256 digest.
const DIGEST_HEX_LEN: usize = 64;

/// A validated hex-encoded SHA-256 digest string.
///
/// # Examples
///
/// ```
/// use charapack_packager::package::digest::Sha256Digest;
///
/// let digest = Sha256Digest::of_bytes(b"abc");
/// assert_eq!(
///     digest.as_str(),
///     "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub struct Sha256Digest(String);

impl Sha256Digest {
    /// Hash a byte slice.
    #[must_use]
    pub fn of_bytes(bytes: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        // sha2 always produces valid 64-char lowercase hex.
        Self(format!("{:x}", hasher.finalize()))
    }

    /// Hash a file's full contents, reading in chunks.
    ///
    /// # Errors
    ///
    /// Returns [`PackagerError::Io`] when the file cannot be read.
    pub fn of_file(path: &Utf8Path) -> Result<Self> {
        let mut file = fs::File::open(path.as_std_path())?;
        let mut hasher = Sha256::new();
        let mut buffer = [0u8; 8192];
        loop {
            let bytes_read = file.read(&mut buffer)?;
            if bytes_read == 0 {
                break;
            }
            hasher.update(&buffer[..bytes_read]);
        }
        Ok(Self(format!("{:x}", hasher.finalize())))
    }

    /// Return the digest as a hex string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for Sha256Digest {
    type Error = PackagerError;

    fn try_from(value: &str) -> Result<Self> {
        validate_hex(value)?;
        Ok(Self(value.to_owned()))
    }
}

impl TryFrom<String> for Sha256Digest {
    type Error = PackagerError;

    fn try_from(value: String) -> Result<Self> {
        validate_hex(&value)?;
        Ok(Self(value))
    }
}

impl AsRef<str> for Sha256Digest {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Sha256Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Validate that `value` is a well-formed lowercase hex digest.
fn validate_hex(value: &str) -> Result<()> {
    if value.len() != DIGEST_HEX_LEN {
        return Err(invalid(format!(
            "expected {DIGEST_HEX_LEN} hex characters, got {}",
            value.len()
        )));
    }
    if let Some(bad) = value
        .chars()
        .find(|c| !c.is_ascii_hexdigit() || c.is_ascii_uppercase())
    {
        return Err(invalid(format!("unexpected character '{bad}'")));
    }
    Ok(())
}

fn invalid(reason: String) -> PackagerError {
    PackagerError::PackageInfoInvalid {
        path: camino::Utf8PathBuf::new(),
        reason: format!("malformed SHA-256 digest: {reason}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use rstest::rstest;

    #[test]
    fn known_vector_matches() {
        assert_eq!(
            Sha256Digest::of_bytes(b"abc").as_str(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn file_and_bytes_agree() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = Utf8PathBuf::try_from(dir.path().join("data.bin")).expect("utf-8 path");
        fs::write(&path, b"hello world").expect("write");

        let from_file = Sha256Digest::of_file(&path).expect("hash file");
        assert_eq!(from_file, Sha256Digest::of_bytes(b"hello world"));
    }

    #[rstest]
    #[case::too_short("abcdef")]
    #[case::uppercase(
        "BA7816BF8F01CFEA414140DE5DAE2223B00361A396177A9CB410FF61F20015AD"
    )]
    #[case::non_hex(
        "zz7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
    )]
    fn rejects_malformed_digests(#[case] value: &str) {
        assert!(Sha256Digest::try_from(value).is_err());
    }

    #[test]
    fn accepts_valid_digest() {
        let hex = "a".repeat(64);
        let digest = Sha256Digest::try_from(hex.as_str()).expect("valid digest");
        assert_eq!(digest.as_str().len(), 64);
    }
}
