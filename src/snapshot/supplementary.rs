//! Optional second source of particle positions for a snapshot
//!
//! Some runs can also be opened by an external particle toolkit that reads
//! the host simulation's own outputs. A snapshot asks the loader whether it
//! is usable before calling it; an unusable or failing loader only means
//! the snapshot has no supplementary stream.

use std::path::Path;

use crate::error::Result;
use crate::snapshot::header::Header;
use crate::snapshot::states::NVec3;

pub trait SupplementaryLoader: Send + Sync {
    /// Whether this loader can be used at all
    fn is_available(&self) -> bool;

    /// Tracer positions in box coordinates (not yet centered)
    fn load_positions(&self, dir: &Path, header: &Header) -> Result<Vec<NVec3>>;
}

/// Loader used when no supplementary toolkit is present
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSupplementary;

impl SupplementaryLoader for NoSupplementary {
    fn is_available(&self) -> bool {
        false
    }

    fn load_positions(&self, _dir: &Path, _header: &Header) -> Result<Vec<NVec3>> {
        Ok(Vec::new())
    }
}
