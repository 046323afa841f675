//! The installer state machine.
//!
//! Installation is all-or-nothing: the character directory appears
//! under the `characters` root only once every required part has been
//! extracted. Split packages drive an interactive child-acquisition
//! loop through the [`InstallPrompt`] seam, so the same engine serves
//! a console front end and tests alike.
//!
//! User decisions and per-archive problems are ordinary values here:
//! declining an overwrite or dismissing the child prompt yields an
//! [`InstallOutcome::Cancelled`], and a wrong archive offered during
//! the loop yields a [`ChildRejection`] that is reported and retried,
//! never an error.

use crate::error::{PackagerError, Result};
use crate::package::archive;
use crate::package::info::{PARENT_PART_NAME, PackageInfo, PackageRole, PackageType};
use crate::package::naming;
use camino::{Utf8Path, Utf8PathBuf};
use charapack_common::ids::CharacterId;
use std::collections::BTreeSet;
use std::fmt;
use std::fs;

/// The terminal result of one install attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    /// The character was fully installed.
    Installed {
        /// The installed character's identifier.
        character_id: CharacterId,
    },
    /// The user backed out; nothing was left on disk.
    Cancelled(CancelReason),
    /// The archive cannot start an installation.
    Rejected(InstallRejection),
}

/// Why an install attempt was cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    /// The character already exists and the user kept it.
    OverwriteDeclined,
    /// The user dismissed the child archive prompt mid-loop.
    ChildPromptDismissed,
}

/// Why an archive cannot start an installation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallRejection {
    /// A split child was offered on its own; its parent must go first.
    ChildWithoutParent {
        /// File name of the parent archive to install instead.
        expected_parent: String,
    },
}

/// Why one offered child archive was refused during the loop.
///
/// These are reported through [`InstallPrompt::notify_child_rejected`]
/// and the loop continues; none of them abort the installation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChildRejection {
    /// The file could not be read as a package archive.
    UnreadableArchive {
        /// Path to the offered file.
        path: Utf8PathBuf,
        /// Description of the failure.
        reason: String,
    },
    /// The archive carries no `package_info.json`.
    MissingPackageInfo {
        /// Path to the offered file.
        path: Utf8PathBuf,
    },
    /// The archive belongs to a different character.
    WrongCharacter {
        /// The character the loop is collecting parts for.
        expected: CharacterId,
    },
    /// The archive is not a split child at all.
    NotAChild,
    /// The archive's part is not one the parent asked for.
    UnrequestedPart {
        /// The declared part name.
        part: String,
    },
    /// The archive's part has already been installed this session.
    AlreadyInstalled {
        /// The declared part name.
        part: String,
    },
}

impl fmt::Display for ChildRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnreadableArchive { path, reason } => {
                write!(f, "{path} is not a readable package archive: {reason}")
            }
            Self::MissingPackageInfo { path } => {
                write!(f, "{path} contains no package information")
            }
            Self::WrongCharacter { expected } => {
                write!(f, "that archive belongs to a different character (expected {expected})")
            }
            Self::NotAChild => f.write_str("that archive is not a child part of a split package"),
            Self::UnrequestedPart { part } => {
                write!(f, "part '{part}' is not required by this package")
            }
            Self::AlreadyInstalled { part } => {
                write!(f, "part '{part}' has already been installed")
            }
        }
    }
}

/// What the installer asks for when it needs the next child archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildRequest {
    /// The character being assembled.
    pub character_id: CharacterId,
    /// Parts still missing, in the parent's declared order.
    pub remaining: Vec<String>,
    /// A sensible directory to start browsing in.
    pub initial_dir: Utf8PathBuf,
}

/// The interaction seam between the install engine and its front end.
#[cfg_attr(test, mockall::automock)]
pub trait InstallPrompt {
    /// Ask whether an existing character may be replaced.
    fn confirm_overwrite(&mut self, character_id: &CharacterId) -> bool;

    /// Ask for the next child archive; `None` cancels the install.
    fn choose_child_archive(&mut self, request: &ChildRequest) -> Option<Utf8PathBuf>;

    /// Report that an offered child archive was refused.
    fn notify_child_rejected(&mut self, rejection: &ChildRejection);

    /// Report that one part was extracted successfully.
    fn notify_part_installed(&mut self, part: &str);
}

/// Removes a partially installed character directory unless disarmed.
struct RollbackGuard {
    target: Option<Utf8PathBuf>,
}

impl RollbackGuard {
    fn new(target: Utf8PathBuf) -> Self {
        Self {
            target: Some(target),
        }
    }

    /// Keep the directory; called only after every part is in place.
    fn disarm(&mut self) {
        self.target = None;
    }
}

impl Drop for RollbackGuard {
    fn drop(&mut self) {
        if let Some(target) = self.target.take() {
            if let Err(e) = fs::remove_dir_all(target.as_std_path()) {
                log::warn!("could not roll back partial install at {target}: {e}");
            }
        }
    }
}

/// Tracks which parts of a split set have arrived.
#[derive(Debug)]
struct InstallSession {
    character_id: CharacterId,
    required: Vec<String>,
    installed: BTreeSet<String>,
}

impl InstallSession {
    fn new(character_id: CharacterId, required: Vec<String>) -> Self {
        Self {
            character_id,
            required,
            installed: BTreeSet::new(),
        }
    }

    /// Missing parts, in the parent's declared order.
    fn remaining(&self) -> Vec<String> {
        self.required
            .iter()
            .filter(|part| !self.installed.contains(*part))
            .cloned()
            .collect()
    }

    /// Check an offered archive's metadata against this session.
    ///
    /// Returns the accepted part name, or the reason the archive was
    /// refused.
    fn validate_child(&self, info: &PackageInfo) -> std::result::Result<String, ChildRejection> {
        if info.base_id() != Some(self.character_id.as_str()) {
            return Err(ChildRejection::WrongCharacter {
                expected: self.character_id.clone(),
            });
        }
        if info.package_type() != PackageType::Split
            || info.package_role() != Some(PackageRole::Child)
        {
            return Err(ChildRejection::NotAChild);
        }
        let Some(part) = info.part_name() else {
            return Err(ChildRejection::NotAChild);
        };
        if !self.required.iter().any(|p| p == part) {
            return Err(ChildRejection::UnrequestedPart {
                part: part.to_owned(),
            });
        }
        if self.installed.contains(part) {
            return Err(ChildRejection::AlreadyInstalled {
                part: part.to_owned(),
            });
        }
        Ok(part.to_owned())
    }

    fn mark_installed(&mut self, part: String) {
        self.installed.insert(part);
    }
}

/// Installs package archives under a `characters` root.
#[derive(Debug)]
pub struct Installer {
    characters_dir: Utf8PathBuf,
}

impl Installer {
    /// Create an installer targeting `characters_dir`.
    #[must_use]
    pub fn new(characters_dir: impl Into<Utf8PathBuf>) -> Self {
        Self {
            characters_dir: characters_dir.into(),
        }
    }

    /// The root directory characters are installed under.
    #[must_use]
    pub fn characters_dir(&self) -> &Utf8Path {
        &self.characters_dir
    }

    /// Install the package at `archive_path`, prompting through
    /// `prompt` as needed.
    ///
    /// A complete archive extracts directly. A split parent starts the
    /// child-acquisition loop and keeps prompting until every declared
    /// part has been extracted or the user cancels. A split child on
    /// its own is rejected with the parent it belongs to named. Any
    /// cancellation or error removes the partially installed
    /// directory.
    ///
    /// # Errors
    ///
    /// Returns an error when the initial archive is unreadable or
    /// malformed, when a split archive declares no role, or when
    /// extraction fails mid-install.
    pub fn install(
        &self,
        archive_path: &Utf8Path,
        prompt: &mut dyn InstallPrompt,
    ) -> Result<InstallOutcome> {
        let info = archive::read_package_info(archive_path)?;
        let character_id = CharacterId::try_from(info.character_id())?;

        match info.package_type() {
            PackageType::Complete => self.install_complete(archive_path, &character_id, prompt),
            PackageType::Split => match info.package_role() {
                Some(PackageRole::Parent) => {
                    self.install_split(archive_path, &character_id, &info, prompt)
                }
                Some(PackageRole::Child) => {
                    let base_id = info.base_id().unwrap_or(character_id.as_str());
                    let parent_part = info.parent_part().unwrap_or(PARENT_PART_NAME);
                    Ok(InstallOutcome::Rejected(
                        InstallRejection::ChildWithoutParent {
                            expected_parent: naming::parent_archive_name(base_id, parent_part),
                        },
                    ))
                }
                None => Err(PackagerError::PackageRoleMissing {
                    path: archive_path.to_owned(),
                }),
            },
        }
    }

    fn install_complete(
        &self,
        archive_path: &Utf8Path,
        character_id: &CharacterId,
        prompt: &mut dyn InstallPrompt,
    ) -> Result<InstallOutcome> {
        let Some(target) = self.prepare_target(character_id, prompt)? else {
            return Ok(InstallOutcome::Cancelled(CancelReason::OverwriteDeclined));
        };

        let mut guard = RollbackGuard::new(target.clone());
        archive::extract_into(archive_path, &target)?;
        guard.disarm();

        log::info!("installed {character_id} from {archive_path}");
        Ok(InstallOutcome::Installed {
            character_id: character_id.clone(),
        })
    }

    fn install_split(
        &self,
        parent_path: &Utf8Path,
        character_id: &CharacterId,
        parent_info: &PackageInfo,
        prompt: &mut dyn InstallPrompt,
    ) -> Result<InstallOutcome> {
        let Some(target) = self.prepare_target(character_id, prompt)? else {
            return Ok(InstallOutcome::Cancelled(CancelReason::OverwriteDeclined));
        };

        let mut guard = RollbackGuard::new(target.clone());
        archive::extract_into(parent_path, &target)?;
        if let Some(part) = parent_info.part_name() {
            prompt.notify_part_installed(part);
        }

        let mut session =
            InstallSession::new(character_id.clone(), parent_info.child_parts().to_vec());
        // The chooser always starts where the parent archive lives.
        let browse_dir = parent_dir_of(parent_path);

        loop {
            let remaining = session.remaining();
            if remaining.is_empty() {
                break;
            }
            let request = ChildRequest {
                character_id: character_id.clone(),
                remaining,
                initial_dir: browse_dir.clone(),
            };
            let Some(child_path) = prompt.choose_child_archive(&request) else {
                log::info!("install of {character_id} cancelled; rolling back");
                return Ok(InstallOutcome::Cancelled(CancelReason::ChildPromptDismissed));
            };

            let child_info = match archive::read_package_info(&child_path) {
                Ok(child_info) => child_info,
                Err(e) => {
                    prompt.notify_child_rejected(&rejection_for_read_error(&child_path, e));
                    continue;
                }
            };
            match session.validate_child(&child_info) {
                Ok(part) => {
                    archive::extract_into(&child_path, &target)?;
                    session.mark_installed(part.clone());
                    prompt.notify_part_installed(&part);
                }
                Err(rejection) => prompt.notify_child_rejected(&rejection),
            }
        }

        guard.disarm();
        log::info!("installed {character_id} from split package {parent_path}");
        Ok(InstallOutcome::Installed {
            character_id: character_id.clone(),
        })
    }

    /// Create the (empty) install target, handling overwrite consent.
    ///
    /// Returns `None` when the user declined to replace an existing
    /// character.
    fn prepare_target(
        &self,
        character_id: &CharacterId,
        prompt: &mut dyn InstallPrompt,
    ) -> Result<Option<Utf8PathBuf>> {
        let target = self.characters_dir.join(character_id.as_str());
        if target.exists() {
            if !prompt.confirm_overwrite(character_id) {
                log::info!("kept existing {character_id}; install declined");
                return Ok(None);
            }
            fs::remove_dir_all(target.as_std_path())?;
        }
        fs::create_dir_all(target.as_std_path())?;
        Ok(Some(target))
    }
}

/// Translate an archive read failure into a loop-level rejection.
fn rejection_for_read_error(path: &Utf8Path, error: PackagerError) -> ChildRejection {
    match error {
        PackagerError::PackageInfoMissing { path } => ChildRejection::MissingPackageInfo { path },
        other => ChildRejection::UnreadableArchive {
            path: path.to_owned(),
            reason: other.to_string(),
        },
    }
}

fn parent_dir_of(path: &Utf8Path) -> Utf8PathBuf {
    path.parent().map_or_else(Utf8PathBuf::new, Utf8Path::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::info::{PackageMeta, Timestamp};
    use charapack_common::ids::CostumeId;
    use rstest::rstest;

    fn meta() -> PackageMeta {
        PackageMeta {
            character_id: CharacterId::try_from("alice").expect("valid id"),
            character_name: "Alice".to_owned(),
            generated_at: Timestamp::new("2026-08-25T00:00:00+00:00"),
        }
    }

    fn costume(value: &str) -> CostumeId {
        CostumeId::try_from(value).expect("valid id")
    }

    fn session() -> InstallSession {
        InstallSession::new(
            CharacterId::try_from("alice").expect("valid id"),
            vec!["party".to_owned(), "winter".to_owned()],
        )
    }

    #[test]
    fn remaining_preserves_declared_order() {
        let mut session = session();
        session.mark_installed("winter".to_owned());
        assert_eq!(session.remaining(), ["party"]);
        session.mark_installed("party".to_owned());
        assert!(session.remaining().is_empty());
    }

    #[test]
    fn accepts_a_required_child_once() {
        let mut session = session();
        let info = PackageInfo::split_child(&meta(), &costume("party"));

        assert_eq!(session.validate_child(&info), Ok("party".to_owned()));
        session.mark_installed("party".to_owned());
        assert_eq!(
            session.validate_child(&info),
            Err(ChildRejection::AlreadyInstalled {
                part: "party".to_owned()
            })
        );
    }

    #[test]
    fn rejects_foreign_character_before_anything_else() {
        let session = session();
        let foreign = PackageMeta {
            character_id: CharacterId::try_from("bob").expect("valid id"),
            ..meta()
        };
        let info = PackageInfo::split_child(&foreign, &costume("party"));

        assert_eq!(
            session.validate_child(&info),
            Err(ChildRejection::WrongCharacter {
                expected: CharacterId::try_from("alice").expect("valid id")
            })
        );
    }

    #[rstest]
    #[case::parent(PackageInfo::split_parent(&meta(), &[costume("party")]))]
    #[case::complete(PackageInfo::complete(&meta()))]
    fn rejects_non_child_archives(#[case] info: PackageInfo) {
        assert_eq!(session().validate_child(&info), Err(ChildRejection::NotAChild));
    }

    #[test]
    fn rejects_unrequested_parts() {
        let info = PackageInfo::split_child(&meta(), &costume("summer"));
        assert_eq!(
            session().validate_child(&info),
            Err(ChildRejection::UnrequestedPart {
                part: "summer".to_owned()
            })
        );
    }

    #[test]
    fn prepare_target_respects_overwrite_decision() {
        let dir = tempfile::tempdir().expect("temp dir");
        let root = Utf8PathBuf::try_from(dir.path().to_path_buf()).expect("utf-8 temp dir");
        let installer = Installer::new(root.clone());
        let alice = CharacterId::try_from("alice").expect("valid id");
        fs::create_dir(root.join("alice").as_std_path()).expect("mkdir");
        fs::write(root.join("alice/keep.txt").as_std_path(), b"old").expect("write");

        let mut declining = MockInstallPrompt::new();
        declining.expect_confirm_overwrite().return_const(false);
        let target = installer
            .prepare_target(&alice, &mut declining)
            .expect("prepare");
        assert!(target.is_none());
        assert!(root.join("alice/keep.txt").exists());

        let mut consenting = MockInstallPrompt::new();
        consenting.expect_confirm_overwrite().return_const(true);
        let target = installer
            .prepare_target(&alice, &mut consenting)
            .expect("prepare");
        assert_eq!(target, Some(root.join("alice")));
        assert!(!root.join("alice/keep.txt").exists());
    }

    #[test]
    fn rollback_guard_removes_target_unless_disarmed() {
        let dir = tempfile::tempdir().expect("temp dir");
        let root = Utf8PathBuf::try_from(dir.path().to_path_buf()).expect("utf-8 temp dir");

        let doomed = root.join("doomed");
        fs::create_dir(doomed.as_std_path()).expect("mkdir");
        drop(RollbackGuard::new(doomed.clone()));
        assert!(!doomed.exists());

        let kept = root.join("kept");
        fs::create_dir(kept.as_std_path()).expect("mkdir");
        let mut guard = RollbackGuard::new(kept.clone());
        guard.disarm();
        drop(guard);
        assert!(kept.exists());
    }
}
