//! CLI argument definitions for the charapack tool.
//!
//! This module defines the command-line interface using clap. It is
//! separated from the main entrypoint to keep the binary focused on
//! orchestration.

use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};

/// Package and install character bundles.
#[derive(Parser, Debug)]
#[command(name = "charapack")]
#[command(version, about)]
#[command(long_about = concat!(
    "Package and install character bundles.\n\n",
    "charapack turns a character project directory into one or more signed ZIP ",
    "archives for distribution, and installs such archives back into a characters ",
    "directory. Characters whose assets exceed the per-archive size limit are ",
    "split into a base archive plus one archive per extra costume; installing the ",
    "base archive prompts for the remaining parts.\n\n",
    "Signing requires the shared salt file (salt.key by default) distributed ",
    "alongside the application.",
))]
#[command(after_help = concat!(
    "EXAMPLES:\n",
    "  Package a character:\n",
    "    $ charapack build alice\n\n",
    "  Package into a specific directory:\n",
    "    $ charapack build alice --output-dir ./dist\n\n",
    "  Install a package:\n",
    "    $ charapack install alice.zip\n\n",
    "  Create a new character project skeleton:\n",
    "    $ charapack new alice\n\n",
    "  List character projects:\n",
    "    $ charapack list\n",
))]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,

    /// Root directory holding character projects [default: ./characters].
    #[arg(long, global = true, value_name = "DIR")]
    pub characters_dir: Option<Utf8PathBuf>,

    /// Path to the signing salt file [default: ./salt.key].
    #[arg(long, global = true, value_name = "FILE")]
    pub salt_file: Option<Utf8PathBuf>,

    /// Suppress progress output (errors still shown).
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// Available subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Build distribution archives for a character project.
    Build(BuildArgs),

    /// Install a package archive into the characters directory.
    Install(InstallArgs),

    /// Create a new character project skeleton.
    New(NewArgs),

    /// List character projects.
    List,
}

/// Arguments for the build command.
#[derive(Parser, Debug, Clone)]
pub struct BuildArgs {
    /// Identifier of the character project to package.
    #[arg(value_name = "CHARACTER_ID")]
    pub character_id: String,

    /// Directory the archives are written into [default: current directory].
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<Utf8PathBuf>,
}

/// Arguments for the install command.
#[derive(Parser, Debug, Clone)]
pub struct InstallArgs {
    /// Path to the package archive to install.
    #[arg(value_name = "ARCHIVE")]
    pub archive: Utf8PathBuf,

    /// Replace an existing character without prompting.
    #[arg(short = 'f', long)]
    pub force: bool,
}

/// Arguments for the new command.
#[derive(Parser, Debug, Clone)]
pub struct NewArgs {
    /// Identifier of the character project to create.
    #[arg(value_name = "CHARACTER_ID")]
    pub character_id: String,
}
