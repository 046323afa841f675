//! The charapack package format and its two-sided protocol.
//!
//! A package is a ZIP archive carrying `package_info.json` (identity
//! and split metadata), `signature.json` (a salted, content-addressed
//! manifest), and the character's allow-listed asset tree. Building
//! stages a filtered working copy, decides whether to split, and
//! assembles one or more signed archives; installing classifies an
//! incoming archive and either extracts it directly or drives the
//! interactive child-acquisition loop for split packages.
//!
//! # Sub-modules
//!
//! - [`digest`] - SHA-256 digest newtype and file hashing
//! - [`info`] - `package_info.json` schema (`PackageInfo`)
//! - [`manifest`] - Path-to-digest manifest over a staged tree
//! - [`signature`] - Canonical signing payload and `signature.json`
//! - [`naming`] - Deterministic archive naming policy
//! - [`staging`] - Filtered, scoped staging of the asset tree
//! - [`archive`] - ZIP packing and guarded extraction
//! - [`assembler`] - Single-archive assembly (stage, sign, compress)
//! - [`planner`] - The split decision and multi-archive builds
//! - [`install`] - The installer state machine and its prompt seam

pub mod archive;
pub mod assembler;
pub mod digest;
pub mod info;
pub mod install;
pub mod manifest;
pub mod naming;
pub mod planner;
pub mod signature;
pub mod staging;
