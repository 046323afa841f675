//! charapack CLI entrypoint.
//!
//! This binary packages character projects into signed distribution
//! archives and installs such archives back into a characters
//! directory, including the interactive part-collection loop for split
//! packages.

use camino::{Utf8Path, Utf8PathBuf};
use charapack_common::character::{CharacterSource, IniCharacter};
use charapack_common::ids::CharacterId;
use charapack_common::project::CharacterProjects;
use charapack_packager::cli::{BuildArgs, Cli, Command, InstallArgs, NewArgs};
use charapack_packager::error::Result;
use charapack_packager::package::install::{
    CancelReason, ChildRejection, ChildRequest, InstallOutcome, InstallPrompt, InstallRejection,
    Installer,
};
use charapack_packager::package::planner::{BuildRequest, build_character_archives};
use charapack_packager::salt::{SALT_FILE_NAME, SignatureSalt};
use clap::Parser;
use std::io::{BufRead, Write};

fn main() {
    let cli = Cli::parse();
    let mut stderr = std::io::stderr();
    let run_result = run(&cli, &mut stderr);
    let exit_code = exit_code_for_run_result(run_result, &mut stderr);
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}

fn run(cli: &Cli, stderr: &mut dyn Write) -> Result<i32> {
    let characters_dir = cli
        .characters_dir
        .clone()
        .unwrap_or_else(|| Utf8PathBuf::from("characters"));

    match &cli.command {
        Command::Build(args) => {
            let salt = load_salt(cli)?;
            run_build(args, &characters_dir, &salt, cli.quiet, stderr)
        }
        Command::Install(args) => {
            // Loaded up front so a missing secret fails before any
            // prompting, even though installation does not verify
            // signatures.
            let _salt = load_salt(cli)?;
            run_install(args, &characters_dir, cli.quiet, stderr)
        }
        Command::New(args) => run_new(args, &characters_dir, cli.quiet, stderr),
        Command::List => run_list(&characters_dir, stderr),
    }
}

/// Loads the signing salt from the configured or default location.
fn load_salt(cli: &Cli) -> Result<SignatureSalt> {
    let path = cli
        .salt_file
        .clone()
        .unwrap_or_else(|| Utf8PathBuf::from(SALT_FILE_NAME));
    SignatureSalt::load(&path)
}

/// Packages one character project into distribution archives.
fn run_build(
    args: &BuildArgs,
    characters_dir: &Utf8Path,
    salt: &SignatureSalt,
    quiet: bool,
    stderr: &mut dyn Write,
) -> Result<i32> {
    let character_id = CharacterId::try_from(args.character_id.as_str())?;
    let projects = CharacterProjects::new(characters_dir);
    let character = IniCharacter::load(&projects.project_path(&character_id))?;
    let costumes = character.costumes()?;

    let request = BuildRequest {
        character_id: character.character_id().clone(),
        character_name: character.display_name().to_owned(),
        asset_root: character.asset_root().to_owned(),
        costumes: costumes.into_iter().map(|c| c.id).collect(),
        output_dir: args
            .output_dir
            .clone()
            .unwrap_or_else(|| Utf8PathBuf::from(".")),
    };

    if !quiet {
        write_stderr_line(
            stderr,
            format!("Packaging {} ({})...", request.character_id, request.character_name),
        );
    }

    let produced = build_character_archives(&request, salt)?;

    if !quiet {
        write_stderr_line(stderr, "");
        write_stderr_line(
            stderr,
            format!("Wrote {} archive(s):", produced.len()),
        );
        for path in &produced {
            write_stderr_line(stderr, format!("  {path}"));
        }
    }
    Ok(0)
}

/// Installs a package archive, prompting on the console as needed.
fn run_install(
    args: &InstallArgs,
    characters_dir: &Utf8Path,
    quiet: bool,
    stderr: &mut dyn Write,
) -> Result<i32> {
    let installer = Installer::new(characters_dir);
    let mut prompt = ConsolePrompt {
        force: args.force,
        quiet,
    };

    match installer.install(&args.archive, &mut prompt)? {
        InstallOutcome::Installed { character_id } => {
            if !quiet {
                write_stderr_line(stderr, format!("Installed {character_id}."));
            }
            Ok(0)
        }
        InstallOutcome::Cancelled(reason) => {
            let message = match reason {
                CancelReason::OverwriteDeclined => "Install cancelled; existing character kept.",
                CancelReason::ChildPromptDismissed => {
                    "Install cancelled; partial files were removed."
                }
            };
            write_stderr_line(stderr, message);
            Ok(0)
        }
        InstallOutcome::Rejected(InstallRejection::ChildWithoutParent { expected_parent }) => {
            write_stderr_line(
                stderr,
                format!(
                    "This archive is one part of a split package. \
                     Install {expected_parent} first; it will ask for the remaining parts."
                ),
            );
            Ok(1)
        }
    }
}

/// Creates a new character project skeleton.
fn run_new(
    args: &NewArgs,
    characters_dir: &Utf8Path,
    quiet: bool,
    stderr: &mut dyn Write,
) -> Result<i32> {
    let character_id = CharacterId::try_from(args.character_id.as_str())?;
    let projects = CharacterProjects::new(characters_dir);
    let path = projects.create(&character_id)?;
    if !quiet {
        write_stderr_line(stderr, format!("Created character project at {path}"));
    }
    Ok(0)
}

/// Lists character projects under the characters directory.
fn run_list(characters_dir: &Utf8Path, stderr: &mut dyn Write) -> Result<i32> {
    let projects = CharacterProjects::new(characters_dir);
    let ids = projects.list()?;
    if ids.is_empty() {
        write_stderr_line(stderr, "No character projects found.");
    } else {
        for id in ids {
            write_stderr_line(stderr, id);
        }
    }
    Ok(0)
}

/// Console-backed prompt for the install loop.
struct ConsolePrompt {
    force: bool,
    quiet: bool,
}

impl ConsolePrompt {
    fn ask(&self, question: &str) -> Option<String> {
        eprint!("{question}");
        if std::io::stderr().flush().is_err() {
            return None;
        }
        let mut line = String::new();
        let stdin = std::io::stdin();
        match stdin.lock().read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line.trim().to_owned()),
        }
    }
}

impl InstallPrompt for ConsolePrompt {
    fn confirm_overwrite(&mut self, character_id: &CharacterId) -> bool {
        if self.force {
            return true;
        }
        let answer = self.ask(&format!(
            "Character '{character_id}' already exists. Replace it? [y/N] "
        ));
        matches!(answer.as_deref(), Some("y") | Some("Y") | Some("yes"))
    }

    fn choose_child_archive(&mut self, request: &ChildRequest) -> Option<Utf8PathBuf> {
        eprintln!(
            "Still needed for '{}': {}",
            request.character_id,
            request.remaining.join(", ")
        );
        let answer = self.ask("Path to the next archive (blank to cancel): ")?;
        if answer.is_empty() {
            return None;
        }
        Some(Utf8PathBuf::from(answer))
    }

    fn notify_child_rejected(&mut self, rejection: &ChildRejection) {
        eprintln!("{rejection}");
    }

    fn notify_part_installed(&mut self, part: &str) {
        if !self.quiet {
            eprintln!("Installed part '{part}'.");
        }
    }
}

fn exit_code_for_run_result(result: Result<i32>, stderr: &mut dyn Write) -> i32 {
    match result {
        Ok(code) => code,
        Err(err) => {
            write_stderr_line(stderr, err);
            1
        }
    }
}

fn write_stderr_line(stderr: &mut dyn Write, message: impl std::fmt::Display) {
    if writeln!(stderr, "{message}").is_err() {
        // Best-effort logging; ignore write failures.
    }
}
