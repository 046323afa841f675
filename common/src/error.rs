//! Error types for the character domain.
//!
//! Variants carry enough context to show an actionable message to the
//! person editing the character, without exposing internal paths where
//! the identifier alone is clearer.

use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors arising from character data handling.
#[derive(Debug, Error)]
pub enum CharacterError {
    /// An identifier contains characters that cannot appear in a
    /// directory name, or is empty.
    #[error("invalid character identifier '{value}': {reason}")]
    InvalidId {
        /// The rejected identifier as supplied.
        value: String,
        /// Why the identifier was rejected.
        reason: String,
    },

    /// A project with the requested identifier already exists.
    #[error("character project '{id}' already exists")]
    ProjectExists {
        /// The identifier that is already in use.
        id: String,
    },

    /// The character configuration file was not found.
    #[error("character configuration not found at {path}")]
    ConfigMissing {
        /// The expected location of `character.ini`.
        path: Utf8PathBuf,
    },

    /// The character configuration file could not be parsed.
    #[error("failed to parse character configuration: {reason}")]
    ConfigInvalid {
        /// Description of the parse failure.
        reason: String,
    },

    /// The stored censor-rectangle list is malformed.
    #[error("malformed censor rectangle data: {reason}")]
    InvalidCensorRects {
        /// Description of the malformed input.
        reason: String,
    },

    /// A filesystem path is not valid UTF-8.
    #[error("path is not valid UTF-8: {path}")]
    NonUtf8Path {
        /// The offending path.
        path: std::path::PathBuf,
    },

    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using [`CharacterError`].
pub type Result<T> = std::result::Result<T, CharacterError>;
