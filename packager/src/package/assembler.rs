//! Single-archive assembly: stage, sign, compress.
//!
//! The assembler turns one archive specification (which staged items
//! go in, under what name, with what metadata) into a signed ZIP file.
//! Split planning above it decides how many specifications a build
//! produces; the assembler itself knows nothing about splitting.

use crate::error::{PackagerError, Result};
use crate::package::archive;
use crate::package::info::{PACKAGE_INFO_FILE_NAME, PackageInfo};
use crate::package::manifest::FileManifest;
use crate::package::naming::ArchiveName;
use crate::package::signature::{SignaturePayload, SignatureRecord};
use crate::package::staging;
use crate::salt::SignatureSalt;
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;

/// Everything needed to assemble one archive.
#[derive(Debug)]
pub struct ArchiveSpec<'a> {
    /// Output archive name.
    pub name: ArchiveName,
    /// Staged tree the items are copied from.
    pub source_dir: &'a Utf8Path,
    /// Root-level item names (files or directories) to include.
    pub items: Vec<String>,
    /// Package metadata written as `package_info.json`.
    pub info: PackageInfo,
}

/// Assembles signed archives into an output directory.
#[derive(Debug)]
pub struct PackageAssembler {
    salt: SignatureSalt,
    output_dir: Utf8PathBuf,
}

impl PackageAssembler {
    /// Create an assembler writing archives into `output_dir`.
    #[must_use]
    pub fn new(salt: SignatureSalt, output_dir: impl Into<Utf8PathBuf>) -> Self {
        Self {
            salt,
            output_dir: output_dir.into(),
        }
    }

    /// The directory archives are written into.
    #[must_use]
    pub fn output_dir(&self) -> &Utf8Path {
        &self.output_dir
    }

    /// Assemble one archive and return its path.
    ///
    /// The archive tree is built in a scratch directory: the selected
    /// items are copied in, `package_info.json` is written, the file
    /// manifest is computed and signed, and `signature.json` is added
    /// last so it covers everything else. The scratch directory is
    /// removed when assembly finishes, successfully or not.
    ///
    /// # Errors
    ///
    /// Returns an error when an item cannot be copied, signing fails,
    /// or the archive cannot be written.
    pub fn assemble(&self, spec: &ArchiveSpec<'_>) -> Result<Utf8PathBuf> {
        let scratch = tempfile::tempdir()?;
        let scratch_root = Utf8PathBuf::try_from(scratch.path().to_path_buf())
            .map_err(|e| PackagerError::NonUtf8Path { path: e.into_path_buf() })?;

        for item in &spec.items {
            let source = spec.source_dir.join(item);
            let target = scratch_root.join(item);
            if source.is_dir() {
                staging::copy_dir_recursive(&source, &target)?;
            } else {
                fs::copy(source.as_std_path(), target.as_std_path())?;
            }
        }

        let rendered = serde_json::to_string_pretty(&spec.info)?;
        fs::write(
            scratch_root.join(PACKAGE_INFO_FILE_NAME).as_std_path(),
            rendered,
        )?;

        let manifest = FileManifest::from_dir(&scratch_root)?;
        let payload = SignaturePayload::new(
            spec.info.character_id(),
            spec.info.timestamp_utc().as_str(),
            manifest,
        );
        SignatureRecord::create(payload, &self.salt)?.write_into(&scratch_root)?;

        fs::create_dir_all(self.output_dir.as_std_path())?;
        let archive_path = self.output_dir.join(spec.name.filename());
        archive::compress_dir(&scratch_root, &archive_path)?;

        log::info!("assembled {}", spec.name);
        Ok(archive_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::info::{PackageMeta, Timestamp};
    use crate::package::signature::SIGNATURE_FILE_NAME;
    use charapack_common::ids::CharacterId;
    use rstest::fixture;
    use rstest::rstest;

    struct Sandbox {
        _guard: tempfile::TempDir,
        root: Utf8PathBuf,
    }

    #[fixture]
    fn sandbox() -> Sandbox {
        let guard = tempfile::tempdir().expect("temp dir");
        let root = Utf8PathBuf::try_from(guard.path().to_path_buf()).expect("utf-8 temp dir");
        Sandbox { _guard: guard, root }
    }

    fn meta() -> PackageMeta {
        PackageMeta {
            character_id: CharacterId::try_from("alice").expect("valid id"),
            character_name: "Alice".to_owned(),
            generated_at: Timestamp::new("2026-08-25T00:00:00+00:00"),
        }
    }

    #[rstest]
    fn assembles_signed_archive_with_selected_items(sandbox: Sandbox) {
        let staged = sandbox.root.join("staged");
        fs::create_dir_all(staged.join("default")).expect("mkdir");
        fs::create_dir_all(staged.join("party")).expect("mkdir");
        fs::write(staged.join("character.ini"), "[INFO]\n").expect("write");
        fs::write(staged.join("default/pose.png"), b"png").expect("write");
        fs::write(staged.join("party/pose.png"), b"party-png").expect("write");

        let salt = SignatureSalt::new("test-salt").expect("valid salt");
        let assembler = PackageAssembler::new(salt.clone(), sandbox.root.join("out"));
        let spec = ArchiveSpec {
            name: ArchiveName::Complete(CharacterId::try_from("alice").expect("valid id")),
            source_dir: &staged,
            items: vec!["character.ini".to_owned(), "default".to_owned()],
            info: PackageInfo::complete(&meta()),
        };

        let archive_path = assembler.assemble(&spec).expect("assemble");
        assert_eq!(archive_path.file_name(), Some("alice.zip"));

        let extracted = sandbox.root.join("extracted");
        fs::create_dir(&extracted).expect("mkdir");
        archive::extract_into(&archive_path, &extracted).expect("extract");

        // Only the selected items plus the metadata files are present.
        assert!(extracted.join("default/pose.png").is_file());
        assert!(!extracted.join("party").exists());
        assert!(extracted.join(PACKAGE_INFO_FILE_NAME).is_file());

        // The embedded signature verifies against the extracted tree.
        let record = SignatureRecord::read_from(&extracted).expect("read signature");
        assert!(record.verify(&salt).expect("verify"));
        assert!(record.payload.file_manifest.verify_dir(&extracted).expect("verify manifest"));
    }

    #[rstest]
    fn embedded_info_round_trips(sandbox: Sandbox) {
        let staged = sandbox.root.join("staged");
        fs::create_dir_all(&staged).expect("mkdir");
        fs::write(staged.join("character.ini"), "[INFO]\n").expect("write");

        let salt = SignatureSalt::new("test-salt").expect("valid salt");
        let assembler = PackageAssembler::new(salt, sandbox.root.join("out"));
        let info = PackageInfo::complete(&meta());
        let spec = ArchiveSpec {
            name: ArchiveName::Complete(CharacterId::try_from("alice").expect("valid id")),
            source_dir: &staged,
            items: vec!["character.ini".to_owned()],
            info: info.clone(),
        };

        let archive_path = assembler.assemble(&spec).expect("assemble");
        let read = archive::read_package_info(&archive_path).expect("read info");
        assert_eq!(read, info);
    }
}
