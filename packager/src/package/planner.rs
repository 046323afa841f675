//! The split decision and multi-archive builds.
//!
//! A character whose staged assets exceed the per-archive limit and
//! that has more than one costume is split: a parent archive keeps the
//! shared material (root files, the mandatory costumes, events and
//! stills) and each remaining costume becomes its own child archive.
//! Characters under the limit, or with nothing to split off, ship as a
//! single complete archive. Every produced archive is size-checked
//! individually; an oversized archive fails the build with the
//! offending part named.

use crate::error::{PackagerError, Result};
use crate::package::assembler::{ArchiveSpec, PackageAssembler};
use crate::package::info::{PackageInfo, PackageMeta, Timestamp};
use crate::package::naming::ArchiveName;
use crate::package::staging::StagedTree;
use crate::salt::SignatureSalt;
use camino::{Utf8Path, Utf8PathBuf};
use charapack_common::ids::{CharacterId, CostumeId};
use std::fs;

/// Hard per-archive size limit: 24 MiB.
pub const ARCHIVE_SIZE_LIMIT_BYTES: u64 = 24 * 1024 * 1024;

/// Costume directories that always stay in the parent archive.
const PARENT_COSTUME_DIRS: &[&str] = &["default", "hearts"];

/// Directories the parent archive carries when present on disk.
const PARENT_DIRS: &[&str] = &["default", "hearts", "events", "stills"];

/// A build order for one character.
#[derive(Debug)]
pub struct BuildRequest {
    /// The character to package.
    pub character_id: CharacterId,
    /// The character's display name.
    pub character_name: String,
    /// The character's on-disk asset directory.
    pub asset_root: Utf8PathBuf,
    /// Declared costumes, in configuration order.
    pub costumes: Vec<CostumeId>,
    /// Where the produced archives go.
    pub output_dir: Utf8PathBuf,
}

/// Whether a character of this staged size and costume count splits.
///
/// Splitting needs both an oversized tree and at least two costumes;
/// a single-costume character has nothing to split off and must fit in
/// one archive or fail.
#[must_use]
pub fn should_split(total_bytes: u64, costume_count: usize) -> bool {
    total_bytes > ARCHIVE_SIZE_LIMIT_BYTES && costume_count > 1
}

/// Build every archive for `request` and return their paths.
///
/// For a split build the parent archive is produced first, then the
/// children in costume order. Archives produced before a failure are
/// left on disk.
///
/// # Errors
///
/// Returns [`PackagerError::SizeLimitExceeded`] naming the first
/// archive over the limit, or the underlying staging, signing, or I/O
/// error.
pub fn build_character_archives(
    request: &BuildRequest,
    salt: &SignatureSalt,
) -> Result<Vec<Utf8PathBuf>> {
    let staged = StagedTree::stage(&request.asset_root)?;
    let total = staged.total_size()?;
    let meta = PackageMeta {
        character_id: request.character_id.clone(),
        character_name: request.character_name.clone(),
        generated_at: Timestamp::now(),
    };
    let assembler = PackageAssembler::new(salt.clone(), request.output_dir.clone());

    if !should_split(total, request.costumes.len()) {
        log::info!(
            "packaging {} as a single archive ({total} bytes staged)",
            request.character_id
        );
        let spec = ArchiveSpec {
            name: ArchiveName::Complete(request.character_id.clone()),
            source_dir: staged.root(),
            items: staged.root_items()?,
            info: PackageInfo::complete(&meta),
        };
        let path = assemble_checked(&assembler, &spec)?;
        return Ok(vec![path]);
    }

    let child_costumes: Vec<CostumeId> = request
        .costumes
        .iter()
        .filter(|c| !PARENT_COSTUME_DIRS.contains(&c.as_str()) && staged.has_dir(c.as_str()))
        .cloned()
        .collect();
    log::info!(
        "splitting {}: {total} bytes staged across {} child part(s)",
        request.character_id,
        child_costumes.len()
    );

    // The parent carries the staged root files plus the enumerated
    // shared directories; anything else at the root stays out even if
    // it survived staging.
    let parent_items: Vec<String> = staged
        .root_items()?
        .into_iter()
        .filter(|item| !staged.has_dir(item) || PARENT_DIRS.contains(&item.as_str()))
        .collect();

    let mut produced = Vec::with_capacity(child_costumes.len() + 1);
    let parent_spec = ArchiveSpec {
        name: ArchiveName::Base(request.character_id.clone()),
        source_dir: staged.root(),
        items: parent_items,
        info: PackageInfo::split_parent(&meta, &child_costumes),
    };
    produced.push(assemble_checked(&assembler, &parent_spec)?);

    for costume in &child_costumes {
        let spec = ArchiveSpec {
            name: ArchiveName::Child(request.character_id.clone(), costume.clone()),
            source_dir: staged.root(),
            items: vec![costume.as_str().to_owned()],
            info: PackageInfo::split_child(&meta, costume),
        };
        produced.push(assemble_checked(&assembler, &spec)?);
    }

    Ok(produced)
}

/// Assemble one archive and enforce the size limit on the result.
fn assemble_checked(assembler: &PackageAssembler, spec: &ArchiveSpec<'_>) -> Result<Utf8PathBuf> {
    let path = assembler.assemble(spec)?;
    let size = archive_size(&path)?;
    if size > ARCHIVE_SIZE_LIMIT_BYTES {
        return Err(PackagerError::SizeLimitExceeded {
            archive: spec.name.filename(),
            size_bytes: size,
            limit_bytes: ARCHIVE_SIZE_LIMIT_BYTES,
        });
    }
    Ok(path)
}

fn archive_size(path: &Utf8Path) -> Result<u64> {
    Ok(fs::metadata(path.as_std_path())?.len())
}
