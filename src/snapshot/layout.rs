//! File naming conventions of a snapshot directory
//!
//! ```text
//! output_00042/
//!     info_00042.txt          text header
//!     rbd_00042.out           guiding center + bound particles
//!     rbd_mesh_00042.out      interpolated force mesh (optional)
//!     amr_00042.out00001      AMR metadata, one file per process
//!     amr_00042.out00002
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, SnapshotError};

pub const OUTPUT_PREFIX: &str = "output_";
pub const AMR_PREFIX: &str = "amr_";

/// `output_` followed by the 5-digit zero padded id
pub fn snapshot_dir_name(id: u32) -> String {
    format!("{OUTPUT_PREFIX}{id:05}")
}

/// Snapshot id is whatever follows the last `_` of the directory name
pub fn snapshot_id(dir: &Path) -> Option<String> {
    let name = dir.file_name()?.to_str()?;
    name.rsplit_once('_').map(|(_, id)| id.to_string())
}

pub fn header_file(dir: &Path, snap_id: &str) -> PathBuf {
    dir.join(format!("info_{snap_id}.txt"))
}

pub fn particle_file(dir: &Path, snap_id: &str) -> PathBuf {
    dir.join(format!("rbd_{snap_id}.out"))
}

pub fn mesh_file(dir: &Path, snap_id: &str) -> PathBuf {
    dir.join(format!("rbd_mesh_{snap_id}.out"))
}

pub fn amr_file(dir: &Path, snap_id: &str, cpu: u32) -> PathBuf {
    dir.join(format!("{AMR_PREFIX}{snap_id}.out{cpu:05}"))
}

/// Entries of `dir` whose name starts with `prefix`, sorted by name
pub fn list_prefixed(dir: &Path, prefix: &str) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(SnapshotError::PathNotFound {
            path: dir.to_path_buf(),
        });
    }

    let mut entries = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let matches = entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with(prefix));
        if matches {
            entries.push(entry.path());
        }
    }
    entries.sort();
    Ok(entries)
}

/// Snapshot directories of a run, in output order
pub fn output_dirs(run_dir: &Path) -> Result<Vec<PathBuf>> {
    Ok(list_prefixed(run_dir, OUTPUT_PREFIX)?
        .into_iter()
        .filter(|p| p.is_dir())
        .collect())
}

/// AMR files of one snapshot, in process order
pub fn amr_files(dir: &Path, snap_id: &str) -> Result<Vec<PathBuf>> {
    let prefix = format!("{AMR_PREFIX}{snap_id}.out");
    Ok(list_prefixed(dir, &prefix)?
        .into_iter()
        .filter(|p| p.is_file())
        .collect())
}

/// Process id encoded in the last 5 characters of an AMR file name
pub fn amr_cpu_id(path: &Path) -> Result<u32> {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
    let bad_suffix = || SnapshotError::ParseError {
        path: path.to_path_buf(),
        field: "cpu id",
        value: name.to_string(),
    };

    let start = name.len().checked_sub(5).ok_or_else(bad_suffix)?;
    name.get(start..)
        .and_then(|suffix| suffix.parse().ok())
        .ok_or_else(bad_suffix)
}
