//! ZIP packing and guarded extraction.
//!
//! Entry names always use forward slashes, so archives built on any
//! platform extract identically. Extraction refuses entries whose
//! names would escape the target directory.

use crate::error::{PackagerError, Result};
use crate::package::info::{PACKAGE_INFO_FILE_NAME, PackageInfo};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use std::io::{self, Read};
use walkdir::WalkDir;
use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Compress the tree under `source` into a ZIP file at `destination`.
///
/// Directories are recorded explicitly so empty costume directories
/// survive the round trip.
///
/// # Errors
///
/// Returns [`PackagerError::Io`] or [`PackagerError::ArchiveUnreadable`]
/// when the tree cannot be read or the archive cannot be written.
pub fn compress_dir(source: &Utf8Path, destination: &Utf8Path) -> Result<()> {
    let file = fs::File::create(destination.as_std_path())?;
    let mut writer = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for entry in WalkDir::new(source.as_std_path()).min_depth(1) {
        let entry = entry.map_err(io::Error::from)?;
        let path = Utf8PathBuf::try_from(entry.path().to_path_buf())
            .map_err(|e| PackagerError::NonUtf8Path { path: e.into_path_buf() })?;
        let relative = path
            .strip_prefix(source)
            .map_err(|_| io::Error::other(format!("{path} is outside {source}")))?;
        let name = relative
            .components()
            .map(|c| c.as_str())
            .collect::<Vec<_>>()
            .join("/");

        if entry.file_type().is_dir() {
            writer
                .add_directory(name.as_str(), options)
                .map_err(|e| zip_error(destination, &e))?;
        } else {
            writer
                .start_file(name.as_str(), options)
                .map_err(|e| zip_error(destination, &e))?;
            let mut reader = fs::File::open(path.as_std_path())?;
            io::copy(&mut reader, &mut writer)?;
        }
    }

    writer.finish().map_err(|e| zip_error(destination, &e))?;
    Ok(())
}

/// Extract every entry of `archive_path` into `target`.
///
/// # Errors
///
/// Returns [`PackagerError::PathTraversal`] when an entry name would
/// resolve outside `target`, and [`PackagerError::ArchiveUnreadable`]
/// when the archive cannot be opened or decoded.
pub fn extract_into(archive_path: &Utf8Path, target: &Utf8Path) -> Result<()> {
    let file = fs::File::open(archive_path.as_std_path())?;
    let mut archive = ZipArchive::new(file).map_err(|e| zip_error(archive_path, &e))?;

    for index in 0..archive.len() {
        let mut entry = archive
            .by_index(index)
            .map_err(|e| zip_error(archive_path, &e))?;
        let Some(relative) = entry.enclosed_name() else {
            return Err(PackagerError::PathTraversal {
                archive: archive_path.to_owned(),
                entry: entry.name().to_owned(),
            });
        };
        let destination = target.as_std_path().join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&destination)?;
        } else {
            if let Some(parent) = destination.parent() {
                fs::create_dir_all(parent)?;
            }
            let mut out = fs::File::create(&destination)?;
            io::copy(&mut entry, &mut out)?;
        }
    }
    Ok(())
}

/// Read and parse `package_info.json` from an archive without
/// extracting anything else.
///
/// # Errors
///
/// Returns [`PackagerError::PackageInfoMissing`] when the archive has
/// no `package_info.json` entry, [`PackagerError::PackageInfoInvalid`]
/// when the entry cannot be parsed, and
/// [`PackagerError::ArchiveUnreadable`] when the archive itself cannot
/// be opened.
pub fn read_package_info(archive_path: &Utf8Path) -> Result<PackageInfo> {
    let file = fs::File::open(archive_path.as_std_path())
        .map_err(|e| PackagerError::ArchiveUnreadable {
            path: archive_path.to_owned(),
            reason: e.to_string(),
        })?;
    let mut archive = ZipArchive::new(file).map_err(|e| zip_error(archive_path, &e))?;

    let mut raw = String::new();
    match archive.by_name(PACKAGE_INFO_FILE_NAME) {
        Ok(mut entry) => {
            entry.read_to_string(&mut raw)?;
        }
        Err(ZipError::FileNotFound) => {
            return Err(PackagerError::PackageInfoMissing {
                path: archive_path.to_owned(),
            });
        }
        Err(e) => return Err(zip_error(archive_path, &e)),
    }

    serde_json::from_str(&raw).map_err(|e| PackagerError::PackageInfoInvalid {
        path: archive_path.to_owned(),
        reason: e.to_string(),
    })
}

/// Append raw bytes as one archive entry; test-only archive forging.
#[cfg(test)]
pub(crate) fn write_single_entry(
    destination: &Utf8Path,
    entry_name: &str,
    bytes: &[u8],
) -> Result<()> {
    use std::io::Write;

    let file = fs::File::create(destination.as_std_path())?;
    let mut writer = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    writer
        .start_file(entry_name, options)
        .map_err(|e| zip_error(destination, &e))?;
    writer.write_all(bytes)?;
    writer.finish().map_err(|e| zip_error(destination, &e))?;
    Ok(())
}

fn zip_error(path: &Utf8Path, error: &ZipError) -> PackagerError {
    PackagerError::ArchiveUnreadable {
        path: path.to_owned(),
        reason: error.to_string(),
    }
}
