//! Canonical signing payload and the `signature.json` record.
//!
//! The payload is serialized canonically (keys sorted, no insignificant
//! whitespace), the salt is appended, and the SHA-256 of the result
//! becomes the signature. Verification recomputes the digest from the
//! stored payload fields; because the manifest is part of the payload,
//! verification covers every packaged file.

use crate::error::Result;
use crate::package::digest::Sha256Digest;
use crate::package::info::GENERATED_BY;
use crate::package::manifest::FileManifest;
use crate::salt::SignatureSalt;
use camino::Utf8Path;
use serde::{Deserialize, Serialize};
use std::fs;

/// File name of the signature record at the archive root.
pub const SIGNATURE_FILE_NAME: &str = "signature.json";

/// Version of the signature scheme written by this implementation.
pub const SIGNATURE_VERSION: &str = "1.0.0";

/// The fields covered by the signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignaturePayload {
    /// Signature scheme version.
    pub version: String,
    /// The tool that produced the signature.
    pub generated_by: String,
    /// When the signature was produced.
    pub timestamp_utc: String,
    /// The character the signed package belongs to.
    pub character_id: String,
    /// Digest of every packaged file, keyed by relative path.
    pub file_manifest: FileManifest,
}

impl SignaturePayload {
    /// Build the payload for a package's staged tree.
    #[must_use]
    pub fn new(character_id: &str, timestamp_utc: &str, file_manifest: FileManifest) -> Self {
        Self {
            version: SIGNATURE_VERSION.to_owned(),
            generated_by: GENERATED_BY.to_owned(),
            timestamp_utc: timestamp_utc.to_owned(),
            character_id: character_id.to_owned(),
            file_manifest,
        }
    }

    /// The canonical byte serialization of this payload.
    ///
    /// Object keys are emitted in sorted order with compact separators,
    /// so the same payload always canonicalizes to the same bytes.
    ///
    /// # Errors
    ///
    /// Returns [`crate::PackagerError::Serialization`] when the payload
    /// cannot be serialized.
    pub fn canonical_bytes(&self) -> Result<Vec<u8>> {
        // serde_json::Value keeps object keys in a sorted map, so
        // rendering through it yields the canonical form.
        let value = serde_json::to_value(self)?;
        Ok(value.to_string().into_bytes())
    }

    /// Sign the payload with `salt`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::PackagerError::Serialization`] when the payload
    /// cannot be canonicalized.
    pub fn sign(&self, salt: &SignatureSalt) -> Result<Sha256Digest> {
        let mut bytes = self.canonical_bytes()?;
        bytes.extend_from_slice(salt.as_bytes());
        Ok(Sha256Digest::of_bytes(&bytes))
    }
}

/// The on-disk `signature.json` record: payload plus signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureRecord {
    /// The signed fields.
    #[serde(flatten)]
    pub payload: SignaturePayload,
    /// Salted SHA-256 digest of the canonical payload.
    pub signature: Sha256Digest,
}

impl SignatureRecord {
    /// Sign `payload` and wrap it into a record.
    ///
    /// # Errors
    ///
    /// Returns [`crate::PackagerError::Serialization`] when the payload
    /// cannot be canonicalized.
    pub fn create(payload: SignaturePayload, salt: &SignatureSalt) -> Result<Self> {
        let signature = payload.sign(salt)?;
        Ok(Self { payload, signature })
    }

    /// Recompute the signature from the stored payload and compare.
    ///
    /// # Errors
    ///
    /// Returns [`crate::PackagerError::Serialization`] when the payload
    /// cannot be canonicalized.
    pub fn verify(&self, salt: &SignatureSalt) -> Result<bool> {
        Ok(self.payload.sign(salt)? == self.signature)
    }

    /// Write the record as `signature.json` inside `dir`.
    ///
    /// # Errors
    ///
    /// Returns an error when serialization or the write fails.
    pub fn write_into(&self, dir: &Utf8Path) -> Result<()> {
        let rendered = serde_json::to_string_pretty(self)?;
        fs::write(dir.join(SIGNATURE_FILE_NAME).as_std_path(), rendered)?;
        Ok(())
    }

    /// Read a record back from `signature.json` inside `dir`.
    ///
    /// # Errors
    ///
    /// Returns an error when the file is missing or malformed.
    pub fn read_from(dir: &Utf8Path) -> Result<Self> {
        let raw = fs::read_to_string(dir.join(SIGNATURE_FILE_NAME).as_std_path())?;
        Ok(serde_json::from_str(&raw)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use rstest::fixture;
    use rstest::rstest;

    #[fixture]
    fn salt() -> SignatureSalt {
        SignatureSalt::new("test-salt").expect("valid salt")
    }

    fn payload() -> SignaturePayload {
        SignaturePayload::new(
            "alice",
            "2026-08-25T00:00:00+00:00",
            FileManifest::default(),
        )
    }

    #[test]
    fn canonical_bytes_sort_keys_compactly() {
        let bytes = payload().canonical_bytes().expect("canonicalize");
        let text = String::from_utf8(bytes).expect("utf-8");

        assert!(!text.contains(": "));
        assert!(!text.contains('\n'));
        let character_id = text.find("\"character_id\"").expect("field present");
        let version = text.find("\"version\"").expect("field present");
        assert!(character_id < version);
    }

    #[rstest]
    fn round_trip_verifies(salt: SignatureSalt) {
        let record = SignatureRecord::create(payload(), &salt).expect("sign");
        assert!(record.verify(&salt).expect("verify"));
    }

    #[rstest]
    fn tampered_payload_fails_verification(salt: SignatureSalt) {
        let mut record = SignatureRecord::create(payload(), &salt).expect("sign");
        record.payload.character_id = "mallory".to_owned();
        assert!(!record.verify(&salt).expect("verify"));
    }

    #[rstest]
    fn different_salt_fails_verification(salt: SignatureSalt) {
        let record = SignatureRecord::create(payload(), &salt).expect("sign");
        let other = SignatureSalt::new("other-salt").expect("valid salt");
        assert!(!record.verify(&other).expect("verify"));
    }

    #[rstest]
    fn record_flattens_payload_fields(salt: SignatureSalt) {
        let record = SignatureRecord::create(payload(), &salt).expect("sign");
        let json = serde_json::to_string(&record).expect("serialize");

        assert!(json.contains("\"character_id\":\"alice\""));
        assert!(json.contains("\"signature\":"));
        assert!(!json.contains("\"payload\""));
    }

    #[rstest]
    fn write_and_read_round_trip(salt: SignatureSalt) {
        let dir = tempfile::tempdir().expect("temp dir");
        let root = Utf8PathBuf::try_from(dir.path().to_path_buf()).expect("utf-8 temp dir");

        let record = SignatureRecord::create(payload(), &salt).expect("sign");
        record.write_into(&root).expect("write");
        let read = SignatureRecord::read_from(&root).expect("read");
        assert_eq!(read, record);
    }
}
