//! Open a whole snapshot directory
//!
//! Takes a snapshot path plus a [`ReaderConfig`] and produces a [`Snapshot`]
//! bundle containing:
//! - the text header (`Header`)
//! - guiding center and bound particles (always decoded)
//! - the force mesh and AMR levels (when enabled)
//! - the supplementary position stream (when a loader is available)
//!
//! Header and particles are required: if either fails no `Snapshot` is
//! built. Mesh and AMR decodes are kept as their own `Result`s so one
//! broken file does not throw away the particles.

use std::path::{Path, PathBuf};

use log::{debug, log, warn, Level};

use crate::configuration::config::ReaderConfig;
use crate::error::{Result, SnapshotError};
use crate::format::record::RecordReader;
use crate::snapshot::amr::read_amr_dir;
use crate::snapshot::header::{load_header, Header};
use crate::snapshot::layout;
use crate::snapshot::mesh::read_mesh;
use crate::snapshot::particles::read_particles;
use crate::snapshot::states::{AmrLevels, ForceMesh, GuidingCenter, NVec3, ParticleSet};
use crate::snapshot::supplementary::SupplementaryLoader;

#[derive(Debug)]
pub struct Snapshot {
    pub path: PathBuf,
    pub snap_id: String,
    pub header: Header,
    pub guiding_center: GuidingCenter,
    pub particles: ParticleSet,
    pub mesh: Option<Result<ForceMesh>>,  // None when not requested
    pub amr: Option<Result<AmrLevels>>,   // None when not requested
    pub stream: Option<Vec<NVec3>>,       // supplementary positions, box-centered
}

impl Snapshot {
    pub fn open(path: impl AsRef<Path>, cfg: &ReaderConfig, supplementary: &dyn SupplementaryLoader) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SnapshotError::PathNotFound {
                path: path.to_path_buf(),
            });
        }

        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        if !name.starts_with(layout::OUTPUT_PREFIX) {
            warn!(
                "{} does not start with `{}`, this may not be a snapshot directory",
                path.display(),
                layout::OUTPUT_PREFIX
            );
        }

        let snap_id = layout::snapshot_id(path).unwrap_or_default();
        let header = load_header(path, &snap_id)?;
        let level = if cfg.verbose { Level::Info } else { Level::Debug };

        let (guiding_center, particles) = read_particle_file(path, &snap_id, &header, cfg)?;
        log_particles(level, &guiding_center, &particles);

        let mesh = cfg.load_mesh.then(|| {
            let mesh = read_mesh_file(path, &snap_id, &header, &guiding_center, cfg);
            match &mesh {
                Ok(m) => log!(level, "mesh: N = {} ({}^3+1)", m.len(), m.nx),
                Err(e) => warn!("mesh decode failed: {e}"),
            }
            mesh
        });

        let stream = load_supplementary(path, &header, supplementary);

        let amr = cfg.load_amr.then(|| {
            let amr = read_amr_dir(path, &snap_id, cfg);
            match &amr {
                Ok(levels) => {
                    for (l, cells) in &levels.levels {
                        log!(level, "amr level {}: {} cells", l, cells.len());
                    }
                }
                Err(e) => warn!("amr decode failed: {e}"),
            }
            amr
        });

        Ok(Self {
            path: path.to_path_buf(),
            snap_id,
            header,
            guiding_center,
            particles,
            mesh,
            amr,
            stream,
        })
    }

    /// The force mesh, if it was requested and decoded
    pub fn mesh(&self) -> Option<&ForceMesh> {
        self.mesh.as_ref().and_then(|m| m.as_ref().ok())
    }

    /// The AMR levels, if they were requested and decoded
    pub fn amr(&self) -> Option<&AmrLevels> {
        self.amr.as_ref().and_then(|a| a.as_ref().ok())
    }
}

fn read_particle_file(
    dir: &Path,
    snap_id: &str,
    header: &Header,
    cfg: &ReaderConfig,
) -> Result<(GuidingCenter, ParticleSet)> {
    let file = layout::particle_file(dir, snap_id);
    debug!("reading particles from {}", file.display());
    let mut stream = RecordReader::open(&file, cfg.record.marker)?;
    read_particles(&mut stream, header)
}

fn read_mesh_file(
    dir: &Path,
    snap_id: &str,
    header: &Header,
    guiding_center: &GuidingCenter,
    cfg: &ReaderConfig,
) -> Result<ForceMesh> {
    let file = layout::mesh_file(dir, snap_id);
    debug!("reading mesh from {}", file.display());
    let mut stream = RecordReader::open(&file, cfg.record.marker)?;
    read_mesh(&mut stream, guiding_center, header)
}

fn load_supplementary(dir: &Path, header: &Header, loader: &dyn SupplementaryLoader) -> Option<Vec<NVec3>> {
    if !loader.is_available() {
        debug!("no supplementary loader available");
        return None;
    }

    match loader.load_positions(dir, header) {
        Ok(positions) => Some(positions.into_iter().map(|x| x.add_scalar(-header.half_box())).collect()),
        Err(e) => {
            warn!("supplementary loader failed for {}: {e}", dir.display());
            None
        }
    }
}

fn log_particles(level: Level, gc: &GuidingCenter, particles: &ParticleSet) {
    log!(
        level,
        "guiding center: x = ({:.3}, {:.3}, {:.3}) v = ({:.3}, {:.3}, {:.3}) on process #{}",
        gc.x.x, gc.x.y, gc.x.z, gc.v.x, gc.v.y, gc.v.z, gc.owner
    );
    log!(
        level,
        "cluster: N bound = {}, avg mass = {:?}, avg rc = {:?}, std rc = {:?}",
        particles.len(),
        particles.mean_mass(),
        particles.mean_radius(),
        particles.std_radius()
    );
}
