//! Shared fixtures for the packaging and installation tests.
#![allow(dead_code)]

use camino::{Utf8Path, Utf8PathBuf};
use charapack_common::ids::{CharacterId, CostumeId};
use charapack_packager::package::assembler::{ArchiveSpec, PackageAssembler};
use charapack_packager::package::info::{PackageInfo, PackageMeta, Timestamp};
use charapack_packager::package::naming::ArchiveName;
use charapack_packager::package::install::{ChildRejection, ChildRequest, InstallPrompt};
use charapack_packager::salt::SignatureSalt;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use std::collections::VecDeque;
use std::fs;

/// A disposable workspace with a characters root and an output directory.
pub struct TestWorkspace {
    _guard: tempfile::TempDir,
    pub root: Utf8PathBuf,
    pub characters_dir: Utf8PathBuf,
    pub output_dir: Utf8PathBuf,
}

impl TestWorkspace {
    pub fn new() -> Self {
        let guard = tempfile::tempdir().expect("temp dir");
        let root = Utf8PathBuf::try_from(guard.path().to_path_buf()).expect("utf-8 temp dir");
        let characters_dir = root.join("characters");
        let output_dir = root.join("dist");
        fs::create_dir_all(characters_dir.as_std_path()).expect("mkdir characters");
        Self {
            _guard: guard,
            root,
            characters_dir,
            output_dir,
        }
    }
}

/// The salt used throughout the test suite.
pub fn test_salt() -> SignatureSalt {
    SignatureSalt::new("integration-test-salt").expect("valid salt")
}

pub fn character_id(value: &str) -> CharacterId {
    CharacterId::try_from(value).expect("valid character id")
}

pub fn costume_id(value: &str) -> CostumeId {
    CostumeId::try_from(value).expect("valid costume id")
}

/// Create a character project with the given costumes.
///
/// Each costume directory gets one `pose.png` of `size` pseudo-random
/// (incompressible) bytes, so archive sizes track the raw asset sizes.
pub fn write_project(
    characters_dir: &Utf8Path,
    id: &str,
    display_name: &str,
    costumes: &[(&str, u64)],
) -> Utf8PathBuf {
    let root = characters_dir.join(id);
    fs::create_dir_all(root.as_std_path()).expect("mkdir project");

    let mut ini = format!("[INFO]\ncharacter_name = {display_name}\n\n[COSTUMES]\n");
    for (costume, _) in costumes {
        ini.push_str(&format!("{costume} = {costume}\n"));
    }
    fs::write(root.join("character.ini").as_std_path(), ini).expect("write ini");
    fs::write(root.join("readme.txt").as_std_path(), "sample character").expect("write readme");

    for (index, (costume, size)) in costumes.iter().enumerate() {
        let dir = root.join(costume);
        fs::create_dir_all(dir.as_std_path()).expect("mkdir costume");
        write_incompressible(&dir.join("pose.png"), *size, index as u64);
    }
    for extra in ["hearts", "stills", "events"] {
        fs::create_dir_all(root.join(extra).as_std_path()).expect("mkdir extra");
    }
    fs::write(root.join("events/intro.script").as_std_path(), "wave\n").expect("write event");

    root
}

/// Fill a file with seeded pseudo-random bytes that deflate poorly.
pub fn write_incompressible(path: &Utf8Path, size: u64, seed: u64) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut remaining = size;
    let mut buffer = vec![0u8; 64 * 1024];
    let mut file = fs::File::create(path.as_std_path()).expect("create file");
    use std::io::Write;
    while remaining > 0 {
        let chunk = remaining.min(buffer.len() as u64) as usize;
        rng.fill_bytes(&mut buffer[..chunk]);
        file.write_all(&buffer[..chunk]).expect("write chunk");
        remaining -= chunk as u64;
    }
}

/// Hand-build a tiny split set: a parent plus one child per costume.
///
/// The staged content is minimal; these packages exercise the install
/// protocol without the bulk that triggers splitting in a real build.
pub fn write_tiny_split_set(
    workspace: &TestWorkspace,
    id: &str,
    child_costumes: &[&str],
) -> Vec<Utf8PathBuf> {
    let staged = workspace.root.join(format!("staged_{id}"));
    fs::create_dir_all(staged.join("default").as_std_path()).expect("mkdir default");
    fs::write(staged.join("character.ini").as_std_path(), "[INFO]\n").expect("write ini");
    fs::write(staged.join("default/pose.png").as_std_path(), b"base-png").expect("write png");
    for costume in child_costumes {
        let dir = staged.join(costume);
        fs::create_dir_all(dir.as_std_path()).expect("mkdir costume");
        fs::write(
            dir.join("pose.png").as_std_path(),
            format!("{costume}-png"),
        )
        .expect("write png");
    }

    let meta = PackageMeta {
        character_id: character_id(id),
        character_name: id.to_owned(),
        generated_at: Timestamp::new("2026-08-25T00:00:00+00:00"),
    };
    let costumes: Vec<CostumeId> = child_costumes.iter().map(|c| costume_id(c)).collect();
    let assembler = PackageAssembler::new(test_salt(), workspace.output_dir.clone());

    let mut produced = Vec::new();
    let parent = ArchiveSpec {
        name: ArchiveName::Base(character_id(id)),
        source_dir: &staged,
        items: vec!["character.ini".to_owned(), "default".to_owned()],
        info: PackageInfo::split_parent(&meta, &costumes),
    };
    produced.push(assembler.assemble(&parent).expect("assemble parent"));

    for costume in &costumes {
        let child = ArchiveSpec {
            name: ArchiveName::Child(character_id(id), costume.clone()),
            source_dir: &staged,
            items: vec![costume.as_str().to_owned()],
            info: PackageInfo::split_child(&meta, costume),
        };
        produced.push(assembler.assemble(&child).expect("assemble child"));
    }
    produced
}

/// Write a ZIP holding only the given `package_info.json` body.
pub fn write_info_archive(path: &Utf8Path, info_json: &str) {
    use std::io::Write;

    let file = fs::File::create(path.as_std_path()).expect("create archive");
    let mut writer = zip::ZipWriter::new(file);
    let options = zip::write::SimpleFileOptions::default();
    writer
        .start_file("package_info.json", options)
        .expect("start entry");
    writer.write_all(info_json.as_bytes()).expect("write entry");
    writer.finish().expect("finish archive");
}

/// A prompt that replays a fixed script and records everything it saw.
pub struct ScriptedPrompt {
    pub overwrite_answer: bool,
    pub responses: VecDeque<Option<Utf8PathBuf>>,
    pub requests: Vec<ChildRequest>,
    pub rejections: Vec<ChildRejection>,
    pub installed_parts: Vec<String>,
}

impl ScriptedPrompt {
    pub fn new(responses: impl IntoIterator<Item = Option<Utf8PathBuf>>) -> Self {
        Self {
            overwrite_answer: true,
            responses: responses.into_iter().collect(),
            requests: Vec::new(),
            rejections: Vec::new(),
            installed_parts: Vec::new(),
        }
    }

    pub fn declining_overwrite() -> Self {
        let mut prompt = Self::new([]);
        prompt.overwrite_answer = false;
        prompt
    }
}

impl InstallPrompt for ScriptedPrompt {
    fn confirm_overwrite(&mut self, _character_id: &CharacterId) -> bool {
        self.overwrite_answer
    }

    fn choose_child_archive(&mut self, request: &ChildRequest) -> Option<Utf8PathBuf> {
        self.requests.push(request.clone());
        // An exhausted script cancels rather than hanging the loop.
        self.responses.pop_front().flatten()
    }

    fn notify_child_rejected(&mut self, rejection: &ChildRejection) {
        self.rejections.push(rejection.clone());
    }

    fn notify_part_installed(&mut self, part: &str) {
        self.installed_parts.push(part.to_owned());
    }
}
