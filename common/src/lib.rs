//! Character domain model shared by the charapack tools.
//!
//! This crate holds everything a front end and the packaging core both
//! need to know about a character: validated identifiers, the costume
//! list, thumbnail censor rectangles, the `character.ini` reader, and
//! project directory management. The packaging core consumes characters
//! through the narrow [`character::CharacterSource`] trait so that the
//! editor UI, tests, and the CLI can supply their own implementations.
//!
//! # Modules
//!
//! - [`ids`] - Validated character and costume identifier newtypes
//! - [`costume`] - The costume value type
//! - [`censor`] - Typed parsing of stored censor-rectangle lists
//! - [`character`] - The character-source trait and its ini-backed reader
//! - [`project`] - Character project directory listing and creation
//! - [`error`] - Semantic error types for the character domain

pub mod censor;
pub mod character;
pub mod costume;
pub mod error;
pub mod ids;
pub mod project;

pub use censor::{CensorRect, format_censor_rects, parse_censor_rects};
pub use character::{CharacterSource, IniCharacter};
pub use costume::Costume;
pub use error::{CharacterError, Result};
pub use ids::{CharacterId, CostumeId, DEFAULT_COSTUME};
pub use project::CharacterProjects;
