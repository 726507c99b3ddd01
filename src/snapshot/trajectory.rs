//! Guiding center trajectory across all snapshots of a run
//!
//! Only headers and particle files are decoded. Snapshots share nothing,
//! so they are decoded on the rayon pool and then put back in output order.

use std::path::Path;

use log::info;
use rayon::prelude::*;

use crate::configuration::config::ReaderConfig;
use crate::error::Result;
use crate::snapshot::layout;
use crate::snapshot::reader::Snapshot;
use crate::snapshot::states::NVec3;
use crate::snapshot::supplementary::NoSupplementary;

#[derive(Debug, Clone, PartialEq)]
pub struct TrajectoryPoint {
    pub snap_id: String,
    pub time: f64, // Myr
    pub x: NVec3,  // guiding center position, box-centered
}

pub fn guiding_center_trajectory(run_dir: &Path, cfg: &ReaderConfig) -> Result<Vec<TrajectoryPoint>> {
    let outputs = layout::output_dirs(run_dir)?;
    info!("extracting trajectory from {} snapshots in {}", outputs.len(), run_dir.display());

    let cfg = cfg.particles_only();
    outputs
        .par_iter()
        .map(|dir| -> Result<TrajectoryPoint> {
            let snap = Snapshot::open(dir, &cfg, &NoSupplementary)?;
            Ok(TrajectoryPoint {
                snap_id: snap.snap_id,
                time: snap.header.time,
                x: snap.guiding_center.x,
            })
        })
        .collect()
}
