//! Writing generated units to disk.

use std::path::{Path, PathBuf};

use mbind_codegen::OutputUnit;

use crate::GenerateError;

/// Write every unit into `dir`, creating it if needed. Returns the written
/// paths in unit order.
pub fn write_units(dir: &Path, units: &[OutputUnit]) -> Result<Vec<PathBuf>, GenerateError> {
    std::fs::create_dir_all(dir).map_err(|source| GenerateError::Write {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut written = Vec::with_capacity(units.len());
    for unit in units {
        let path = dir.join(&unit.name);
        std::fs::write(&path, &unit.text).map_err(|source| GenerateError::Write {
            path: path.clone(),
            source,
        })?;
        tracing::debug!(path = %path.display(), kind = %unit.kind, "wrote unit");
        written.push(path);
    }
    Ok(written)
}
