//! Configuration types for decoding snapshot directories.
//!
//! This module defines a thin, `serde`-deserializable description of what
//! the reader should decode and how the binary records are framed:
//!
//! - [`ReaderConfig`] – top-level switches (mesh, AMR, verbosity, parallelism)
//! - [`RecordConfig`] – record framing options (length marker width)
//!
//! # YAML format
//! Every key is optional; the values below are the defaults.
//!
//! ```yaml
//! load_mesh: true        # decode rbd_mesh_XXXXX.out
//! load_amr: false        # decode every amr_XXXXX.outYYYYY file
//! verbose: false         # log decode statistics at info level
//! parallel_amr: true     # decode per-CPU AMR files on the rayon pool
//! record:
//!   marker: "u32"        # "u32" or "u64" record length markers
//! ```

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::Deserialize;

use crate::error::{Result, SnapshotError};
use crate::format::record::MarkerWidth;

/// Record framing options
#[derive(Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(default)]
pub struct RecordConfig {
    pub marker: MarkerWidth, // width of the prefix/suffix length markers
}

/// Top-level reader configuration loaded from YAML
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ReaderConfig {
    pub load_mesh: bool,    // decode the interpolated force mesh
    pub load_amr: bool,     // decode the AMR octree metadata
    pub verbose: bool,      // decode statistics at info level instead of debug
    pub parallel_amr: bool, // per-CPU AMR files are independent, decode them concurrently
    pub record: RecordConfig,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            load_mesh: true,
            load_amr: false,
            verbose: false,
            parallel_amr: true,
            record: RecordConfig::default(),
        }
    }
}

impl ReaderConfig {
    /// Load a configuration from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(SnapshotError::PathNotFound {
                path: path.to_path_buf(),
            });
        }
        let reader = BufReader::new(File::open(path)?);
        serde_yaml::from_reader(reader).map_err(|source| SnapshotError::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Particles and header only, as used for trajectory extraction
    pub fn particles_only(&self) -> Self {
        Self {
            load_mesh: false,
            load_amr: false,
            ..self.clone()
        }
    }
}
