//! Filtered staging of a character's asset tree.
//!
//! Packaging never reads the live project directly into an archive.
//! The asset tree is first copied into a temporary staging root with
//! the packaging filter applied, so editor droppings, caches, and
//! unrelated files never leave the author's machine. All later steps
//! (splitting, manifesting, signing, compressing) operate on the staged
//! copy.

use crate::error::{PackagerError, Result};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use walkdir::WalkDir;

/// Root files that are packaged when present, matched case-insensitively.
pub const ALLOWED_ROOT_FILES: &[&str] =
    &["character.ini", "readme.txt", "thumbnail.png", "topics.txt"];

/// Image extensions packaged from costume directories, lowercase.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp"];

/// Directories copied wholesale, without the image filter.
const UNFILTERED_DIRS: &[&str] = &["events", "stills"];

/// A filtered working copy of one character's assets.
///
/// The backing temporary directory is removed when the value is
/// dropped, so staged trees never outlive the build that created them.
#[derive(Debug)]
pub struct StagedTree {
    _guard: tempfile::TempDir,
    root: Utf8PathBuf,
}

impl StagedTree {
    /// Copy `asset_root` into a fresh staging directory, filtered.
    ///
    /// Root files are kept only when their lowercased name appears in
    /// [`ALLOWED_ROOT_FILES`]. The `events` and `stills` directories
    /// are copied wholesale. Every other directory is treated as a
    /// costume directory: it is created in the staging root even when
    /// empty, and only files with an [`IMAGE_EXTENSIONS`] extension are
    /// copied into it.
    ///
    /// # Errors
    ///
    /// Returns [`PackagerError::NonUtf8Path`] for undecodable names and
    /// [`PackagerError::Io`] when the tree cannot be read or copied.
    pub fn stage(asset_root: &Utf8Path) -> Result<Self> {
        let guard = tempfile::tempdir()?;
        let root = Utf8PathBuf::try_from(guard.path().to_path_buf())
            .map_err(|e| PackagerError::NonUtf8Path { path: e.into_path_buf() })?;

        for entry in fs::read_dir(asset_root.as_std_path())? {
            let entry = entry?;
            let source = Utf8PathBuf::try_from(entry.path())
                .map_err(|e| PackagerError::NonUtf8Path { path: e.into_path_buf() })?;
            let name = match source.file_name() {
                Some(name) => name.to_owned(),
                None => continue,
            };
            let target = root.join(&name);

            if entry.file_type()?.is_dir() {
                if UNFILTERED_DIRS.contains(&name.as_str()) {
                    copy_dir_recursive(&source, &target)?;
                } else {
                    stage_costume_dir(&source, &target)?;
                }
            } else if ALLOWED_ROOT_FILES.contains(&name.to_lowercase().as_str()) {
                fs::copy(source.as_std_path(), target.as_std_path())?;
            }
        }

        Ok(Self { _guard: guard, root })
    }

    /// The staging root.
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Total size in bytes of every staged file.
    ///
    /// # Errors
    ///
    /// Returns [`PackagerError::Io`] when the tree cannot be read.
    pub fn total_size(&self) -> Result<u64> {
        let mut total = 0;
        for entry in WalkDir::new(self.root.as_std_path()) {
            let entry = entry.map_err(std::io::Error::from)?;
            if entry.file_type().is_file() {
                total += entry.metadata().map_err(std::io::Error::from)?.len();
            }
        }
        Ok(total)
    }

    /// Names of the staged root entries, files and directories, sorted.
    ///
    /// # Errors
    ///
    /// Returns [`PackagerError::Io`] when the root cannot be read.
    pub fn root_items(&self) -> Result<Vec<String>> {
        let mut items = Vec::new();
        for entry in fs::read_dir(self.root.as_std_path())? {
            let entry = entry?;
            let name = entry.file_name().into_string().map_err(|name| {
                PackagerError::NonUtf8Path { path: name.into() }
            })?;
            items.push(name);
        }
        items.sort();
        Ok(items)
    }

    /// Whether a staged directory with this name exists.
    #[must_use]
    pub fn has_dir(&self, name: &str) -> bool {
        self.root.join(name).is_dir()
    }
}

/// Copy a costume directory, keeping only recognized image files.
fn stage_costume_dir(source: &Utf8Path, target: &Utf8Path) -> Result<()> {
    fs::create_dir_all(target.as_std_path())?;
    for entry in fs::read_dir(source.as_std_path())? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let path = Utf8PathBuf::try_from(entry.path())
            .map_err(|e| PackagerError::NonUtf8Path { path: e.into_path_buf() })?;
        let keep = path
            .extension()
            .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()));
        if keep {
            if let Some(name) = path.file_name() {
                fs::copy(path.as_std_path(), target.join(name).as_std_path())?;
            }
        }
    }
    Ok(())
}

/// Copy a directory tree verbatim.
pub(crate) fn copy_dir_recursive(source: &Utf8Path, target: &Utf8Path) -> Result<()> {
    fs::create_dir_all(target.as_std_path())?;
    for entry in fs::read_dir(source.as_std_path())? {
        let entry = entry?;
        let path = Utf8PathBuf::try_from(entry.path())
            .map_err(|e| PackagerError::NonUtf8Path { path: e.into_path_buf() })?;
        let name = match path.file_name() {
            Some(name) => name,
            None => continue,
        };
        let destination = target.join(name);
        if entry.file_type()?.is_dir() {
            copy_dir_recursive(&path, &destination)?;
        } else {
            fs::copy(path.as_std_path(), destination.as_std_path())?;
        }
    }
    Ok(())
}
