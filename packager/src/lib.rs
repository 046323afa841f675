//! Character package builder and installer.
//!
//! This crate implements the charapack package format and its two-sided
//! protocol: building tamper-evident, optionally size-split ZIP archives
//! from a character's asset tree, and installing such archives back onto
//! disk, including the interactive multi-part reconciliation loop for
//! split packages. It is used by the `charapack` CLI binary and can be
//! consumed programmatically by an editor front end.
//!
//! # Modules
//!
//! - [`cli`] - Command-line argument definitions
//! - [`error`] - Semantic error types for packaging and installation
//! - [`package`] - The package format: manifest, signature, assembly,
//!   split planning, and the installer state machine
//! - [`salt`] - The shared signing secret loaded at startup

pub mod cli;
pub mod error;
pub mod package;
pub mod salt;

pub use error::{PackagerError, Result};
pub use salt::SignatureSalt;
