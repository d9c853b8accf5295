//! Unit discovery under the shapes root and vector file listing inside a unit

use crate::models::Unit;
use crate::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// List the immediate subdirectories of `root`, one [`Unit`] each.
///
/// The walk is not recursive. Units are sorted by name so logs are
/// reproducible between runs. Entries whose metadata cannot be read are
/// skipped with a warning; an unreadable root is an error.
pub fn list_unit_dirs<P: AsRef<Path>>(root: P) -> Result<Vec<Unit>> {
    let root = root.as_ref();
    let root_display = root.to_string_lossy().to_string();

    if !root.exists() {
        return Err(Error::InvalidInput(format!(
            "Path does not exist: {root_display}"
        )));
    }

    if !root.is_dir() {
        return Err(Error::InvalidInput(format!(
            "Path is not a directory: {root_display}"
        )));
    }

    let mut units = Vec::new();
    for entry in fs::read_dir(root)? {
        let entry = entry?;
        let entry_path = entry.path();

        // Follows symlinks so a linked unit directory still counts.
        let metadata = match fs::metadata(&entry_path) {
            Ok(m) => m,
            Err(e) => {
                log::warn!("Skipping {}: {e}", entry_path.display());
                continue;
            }
        };

        if metadata.is_dir() {
            units.push(Unit {
                name: entry.file_name().to_string_lossy().to_string(),
                path: entry_path,
            });
        }
    }

    units.sort_by(|a, b| a.name.cmp(&b.name));
    log::debug!("Found {} unit directories in {root_display}", units.len());
    Ok(units)
}

/// List regular files directly inside `unit_dir` whose extension matches
/// `extension` (ASCII case-insensitive), sorted by path.
pub fn list_vector_files<P: AsRef<Path>>(unit_dir: P, extension: &str) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in fs::read_dir(unit_dir.as_ref())? {
        let entry_path = entry?.path();

        let matches_extension = entry_path
            .extension()
            .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case(extension));

        if matches_extension && entry_path.is_file() {
            files.push(entry_path);
        }
    }

    files.sort();
    Ok(files)
}
