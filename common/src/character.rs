//! The character-source trait and its `character.ini` implementation.
//!
//! The packaging core consumes a character through [`CharacterSource`],
//! which exposes only what packaging needs: the identifier, display
//! name, asset root, costume list, and censor rectangles. The shipped
//! implementation reads the editor's `character.ini`.

use crate::censor::{CensorRect, parse_censor_rects};
use crate::costume::Costume;
use crate::error::{CharacterError, Result};
use crate::ids::{CharacterId, CostumeId};
use camino::{Utf8Path, Utf8PathBuf};
use ini::Ini;

/// File name of the character configuration inside the asset root.
pub const CHARACTER_CONFIG_FILE: &str = "character.ini";

/// Narrow view of a character as consumed by the packaging core.
pub trait CharacterSource {
    /// The validated character identifier.
    fn character_id(&self) -> &CharacterId;

    /// The display name shown to users and recorded in package metadata.
    fn display_name(&self) -> &str;

    /// The directory holding the character's asset tree.
    fn asset_root(&self) -> &Utf8Path;

    /// List the character's costumes in configuration order.
    ///
    /// # Errors
    ///
    /// Returns an error when a configured costume identifier is not a
    /// usable directory name.
    fn costumes(&self) -> Result<Vec<Costume>>;

    /// Censor rectangles to apply to the thumbnail before sharing.
    ///
    /// # Errors
    ///
    /// Returns an error when the stored rectangle list is malformed.
    fn thumbnail_censor_rects(&self) -> Result<Vec<CensorRect>>;
}

/// A character backed by a `character.ini` file.
///
/// Reads the display name from `[INFO] character_name` (the identifier
/// is the fallback), costumes from the `[COSTUMES]` section (`id = name`
/// pairs), and censor rectangles from `[THUMBNAIL] censor_rects`. Key
/// lookups accept both the lower-case form the editor writes and the
/// upper-case form of hand-edited files.
#[derive(Debug)]
pub struct IniCharacter {
    id: CharacterId,
    root: Utf8PathBuf,
    display_name: String,
    config: Ini,
}

impl IniCharacter {
    /// Load a character from its asset root directory.
    ///
    /// # Errors
    ///
    /// Returns [`CharacterError::ConfigMissing`] when `character.ini`
    /// does not exist, [`CharacterError::ConfigInvalid`] when it cannot
    /// be parsed, and an identifier error when the directory name is
    /// not a usable identifier.
    pub fn load(asset_root: &Utf8Path) -> Result<Self> {
        let id_str = asset_root
            .file_name()
            .ok_or_else(|| CharacterError::InvalidId {
                value: asset_root.to_string(),
                reason: "asset root has no directory name".to_owned(),
            })?;
        let id = CharacterId::try_from(id_str)?;

        let config_path = asset_root.join(CHARACTER_CONFIG_FILE);
        if !config_path.is_file() {
            return Err(CharacterError::ConfigMissing { path: config_path });
        }
        let config = Ini::load_from_file(config_path.as_std_path()).map_err(|e| {
            CharacterError::ConfigInvalid {
                reason: e.to_string(),
            }
        })?;

        let display_name = lookup(&config, "INFO", "character_name")
            .map(ToOwned::to_owned)
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| id.as_str().to_owned());

        Ok(Self {
            id,
            root: asset_root.to_owned(),
            display_name,
            config,
        })
    }
}

/// Look up a key in a section, trying the given case then upper case.
fn lookup<'a>(config: &'a Ini, section: &str, key: &str) -> Option<&'a str> {
    config
        .get_from(Some(section), key)
        .or_else(|| config.get_from(Some(section), key.to_uppercase().as_str()))
}

impl CharacterSource for IniCharacter {
    fn character_id(&self) -> &CharacterId {
        &self.id
    }

    fn display_name(&self) -> &str {
        &self.display_name
    }

    fn asset_root(&self) -> &Utf8Path {
        &self.root
    }

    fn costumes(&self) -> Result<Vec<Costume>> {
        let Some(section) = self.config.section(Some("COSTUMES")) else {
            return Ok(Vec::new());
        };
        let mut costumes = Vec::new();
        for (id, name) in section.iter() {
            costumes.push(Costume::new(CostumeId::try_from(id)?, name));
        }
        Ok(costumes)
    }

    fn thumbnail_censor_rects(&self) -> Result<Vec<CensorRect>> {
        match lookup(&self.config, "THUMBNAIL", "censor_rects") {
            Some(stored) => parse_censor_rects(stored),
            None => Ok(Vec::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_character(dir: &Utf8Path, id: &str, contents: &str) -> Utf8PathBuf {
        let root = dir.join(id);
        fs::create_dir_all(&root).expect("create asset root");
        fs::write(root.join(CHARACTER_CONFIG_FILE), contents).expect("write ini");
        root
    }

    fn temp_root() -> (tempfile::TempDir, Utf8PathBuf) {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = Utf8PathBuf::try_from(dir.path().to_path_buf()).expect("utf-8 temp dir");
        (dir, path)
    }

    #[test]
    fn loads_name_costumes_and_rects() {
        let (_guard, dir) = temp_root();
        let root = write_character(
            &dir,
            "alice",
            concat!(
                "[INFO]\n",
                "character_name = Alice\n",
                "[COSTUMES]\n",
                "default = Everyday\n",
                "party = Party Dress\n",
                "[THUMBNAIL]\n",
                "censor_rects = [(10, 20, 110, 120)]\n",
            ),
        );

        let character = IniCharacter::load(&root).expect("load");
        assert_eq!(character.character_id().as_str(), "alice");
        assert_eq!(character.display_name(), "Alice");

        let costumes = character.costumes().expect("costumes");
        assert_eq!(costumes.len(), 2);
        assert_eq!(costumes[0].id.as_str(), "default");
        assert_eq!(costumes[1].name, "Party Dress");

        let rects = character.thumbnail_censor_rects().expect("rects");
        assert_eq!(rects, vec![CensorRect::new(10, 20, 110, 120)]);
    }

    #[test]
    fn display_name_falls_back_to_id() {
        let (_guard, dir) = temp_root();
        let root = write_character(&dir, "bob", "[COSTUMES]\ndefault = Default\n");
        let character = IniCharacter::load(&root).expect("load");
        assert_eq!(character.display_name(), "bob");
    }

    #[test]
    fn accepts_upper_case_keys() {
        let (_guard, dir) = temp_root();
        let root = write_character(&dir, "carol", "[INFO]\nCHARACTER_NAME = Carol\n");
        let character = IniCharacter::load(&root).expect("load");
        assert_eq!(character.display_name(), "Carol");
    }

    #[test]
    fn missing_config_is_reported() {
        let (_guard, dir) = temp_root();
        let root = dir.join("dave");
        fs::create_dir_all(&root).expect("create asset root");

        let err = IniCharacter::load(&root).expect_err("load should fail");
        assert!(matches!(err, CharacterError::ConfigMissing { .. }));
    }

    #[test]
    fn malformed_rects_are_rejected() {
        let (_guard, dir) = temp_root();
        let root = write_character(
            &dir,
            "eve",
            "[THUMBNAIL]\ncensor_rects = __import__('os')\n",
        );
        let character = IniCharacter::load(&root).expect("load");
        let err = character
            .thumbnail_censor_rects()
            .expect_err("rects should be rejected");
        assert!(matches!(err, CharacterError::InvalidCensorRects { .. }));
    }
}
