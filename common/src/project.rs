//! Character project directory listing and creation.
//!
//! A "project" is simply a directory under the `characters` root named
//! after the character identifier, holding the asset tree the editor
//! works on and the packager stages from.

use crate::error::{CharacterError, Result};
use crate::ids::{CharacterId, DEFAULT_COSTUME};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;

/// Subdirectories every new character project starts with.
const PROJECT_SKELETON: &[&str] = &[DEFAULT_COSTUME, "hearts", "stills"];

/// Manages the directory of character projects.
#[derive(Debug, Clone)]
pub struct CharacterProjects {
    characters_dir: Utf8PathBuf,
}

impl CharacterProjects {
    /// Create a manager rooted at the given `characters` directory.
    #[must_use]
    pub fn new(characters_dir: impl Into<Utf8PathBuf>) -> Self {
        Self {
            characters_dir: characters_dir.into(),
        }
    }

    /// The `characters` root directory.
    #[must_use]
    pub fn characters_dir(&self) -> &Utf8Path {
        &self.characters_dir
    }

    /// The asset root of one character.
    #[must_use]
    pub fn project_path(&self, id: &CharacterId) -> Utf8PathBuf {
        self.characters_dir.join(id.as_str())
    }

    /// List existing project identifiers, sorted.
    ///
    /// A missing `characters` root is treated as an empty list, so a
    /// fresh installation lists cleanly.
    ///
    /// # Errors
    ///
    /// Returns an error when the root exists but cannot be read, or
    /// when an entry name is not valid UTF-8.
    pub fn list(&self) -> Result<Vec<String>> {
        let entries = match fs::read_dir(self.characters_dir.as_std_path()) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut projects = Vec::new();
        for entry in entries {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let name = entry
                .file_name()
                .into_string()
                .map_err(|name| CharacterError::NonUtf8Path { path: name.into() })?;
            projects.push(name);
        }
        projects.sort();
        Ok(projects)
    }

    /// Create a new project skeleton for `id`.
    ///
    /// Creates `<characters>/<id>/` with empty `default`, `hearts`, and
    /// `stills` subdirectories.
    ///
    /// # Errors
    ///
    /// Returns [`CharacterError::ProjectExists`] when the directory is
    /// already present, or an I/O error when creation fails.
    pub fn create(&self, id: &CharacterId) -> Result<Utf8PathBuf> {
        let project_path = self.project_path(id);
        if project_path.exists() {
            return Err(CharacterError::ProjectExists {
                id: id.as_str().to_owned(),
            });
        }

        fs::create_dir_all(project_path.as_std_path())?;
        for subdir in PROJECT_SKELETON {
            fs::create_dir(project_path.join(subdir).as_std_path())?;
        }
        log::info!("created character project at {project_path}");
        Ok(project_path)
    }
}
