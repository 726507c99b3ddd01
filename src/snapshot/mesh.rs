//! Decoder for the interpolated force mesh (`rbd_mesh_XXXXX.out`)
//!
//! The file repeats the guiding center records of the particle file
//! (position, velocity, owner). Those are skipped and the guiding center
//! decoded from the particle file is used instead. Then comes `[M, Nx]`
//! followed by three position records and three force records of M reals.

use std::io::Read;

use crate::error::Result;
use crate::format::record::RecordReader;
use crate::snapshot::header::Header;
use crate::snapshot::states::{ForceMesh, GuidingCenter, MeshPoint, NVec3};

const REDUNDANT_GC_RECORDS: usize = 3;

pub fn read_mesh<R: Read>(
    stream: &mut RecordReader<R>,
    guiding_center: &GuidingCenter,
    header: &Header,
) -> Result<ForceMesh> {
    stream.skip_records(REDUNDANT_GC_RECORDS)?;

    let dim_record = stream.records_read();
    let mdim = stream.read_int_record()?;
    if mdim.len() < 2 {
        return Err(stream.mismatch(dim_record, "mesh dimensions", 2, mdim.len()));
    }
    let n_points = stream.to_count(dim_record, "mesh point count", mdim[0])?;
    let nx = stream.to_count(dim_record, "mesh resolution", mdim[1])?;

    // Cluster frame: box-centered, then relative to the guiding center
    let mut pos: [Vec<f64>; 3] = Default::default();
    for (axis, (values, field)) in pos.iter_mut().zip(["mesh x", "mesh y", "mesh z"]).enumerate() {
        *values = stream.read_real_record_exact(n_points, field)?;
        let shift = guiding_center.x[axis] + header.half_box();
        for x in values.iter_mut() {
            *x -= shift;
        }
    }

    let mut force: [Vec<f64>; 3] = Default::default();
    for (values, field) in force.iter_mut().zip(["force x", "force y", "force z"]) {
        *values = stream.read_real_record_exact(n_points, field)?;
    }

    let points = (0..n_points)
        .map(|i| MeshPoint {
            x: NVec3::new(pos[0][i], pos[1][i], pos[2][i]),
            f: NVec3::new(force[0][i], force[1][i], force[2][i]),
        })
        .collect();

    Ok(ForceMesh { nx, points })
}
