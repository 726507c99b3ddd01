//! Decoder for the guiding center and bound particles (`rbd_XXXXX.out`)
//!
//! Record sequence:
//!
//! | # | type | content                                   |
//! |---|------|-------------------------------------------|
//! | 0 | int  | process count                             |
//! | 1 | int  | dimensionality                            |
//! | 2 | int  | bound particle count N                    |
//! | 3 | real | mesh scale                                |
//! | 4 | real | guiding center position (3)               |
//! | 5 | real | guiding center velocity (3)               |
//! | 6 | int  | process owning the guiding center         |
//! | 7-9  | real | particle x, y, z (N each)              |
//! | 10-12| real | particle vx, vy, vz (N each)           |
//! | 13   | real | particle mass (N)                      |
//!
//! Stored positions are in box coordinates `[0, boxlen)`; everything is
//! shifted by half a box so the box center sits at the origin.

use std::io::Read;

use crate::error::Result;
use crate::format::record::RecordReader;
use crate::snapshot::header::Header;
use crate::snapshot::states::{BoundParticle, GuidingCenter, NVec3, ParticleFileInfo, ParticleSet};

/// Decode the particle file into the guiding center and its bound particles
pub fn read_particles<R: Read>(
    stream: &mut RecordReader<R>,
    header: &Header,
) -> Result<(GuidingCenter, ParticleSet)> {
    let half_box = header.half_box();

    let ncpu = stream.read_count("ncpu")?;
    let ndim = stream.read_count("ndim")?;
    let n_bound = stream.read_count("n_bound")?;
    let mesh_scale = stream.read_real_scalar("mesh_scale")?;

    let gc_x = read_vec3(stream, "guiding center position")?.add_scalar(-half_box);
    let gc_v = read_vec3(stream, "guiding center velocity")?;
    let owner = stream.read_int_scalar("guiding center owner")?;

    let guiding_center = GuidingCenter {
        x: gc_x,
        v: gc_v,
        owner,
    };

    // Positions shifted into the centered box frame, velocities as stored
    let mut pos: [Vec<f64>; 3] = Default::default();
    for (axis, field) in pos.iter_mut().zip(["x", "y", "z"]) {
        *axis = stream.read_real_record_exact(n_bound, field)?;
        for x in axis.iter_mut() {
            *x -= half_box;
        }
    }

    let mut vel: [Vec<f64>; 3] = Default::default();
    for (axis, field) in vel.iter_mut().zip(["vx", "vy", "vz"]) {
        *axis = stream.read_real_record_exact(n_bound, field)?;
    }

    let mass = stream.read_real_record_exact(n_bound, "mass")?;

    let particles = (0..n_bound)
        .map(|i| {
            let x_box = NVec3::new(pos[0][i], pos[1][i], pos[2][i]);
            let x = x_box - guiding_center.x;
            BoundParticle {
                x_box,
                x,
                v: NVec3::new(vel[0][i], vel[1][i], vel[2][i]),
                m: mass[i],
                r: x.norm(),
            }
        })
        .collect();

    let set = ParticleSet {
        info: ParticleFileInfo {
            ncpu,
            ndim,
            n_bound,
            mesh_scale,
        },
        particles,
    };
    Ok((guiding_center, set))
}

/// Read a record holding exactly one 3-vector
pub(crate) fn read_vec3<R: Read>(stream: &mut RecordReader<R>, field: &'static str) -> Result<NVec3> {
    let v = stream.read_real_record_exact(3, field)?;
    Ok(NVec3::new(v[0], v[1], v[2]))
}
