//! Decoded snapshot data types.
//!
//! - `GuidingCenter`  cluster trajectory point, origin of the cluster frame
//! - `BoundParticle` / `ParticleSet`  bound cluster members
//! - `MeshPoint` / `ForceMesh`  interpolated force mesh samples
//! - `AmrLevels`  cell corners of the AMR octree, grouped by level
//!
//! All of these are built once by their decoder and never mutated afterwards.

use std::collections::BTreeMap;

use nalgebra::Vector3;
pub type NVec3 = Vector3<f64>;

#[derive(Debug, Clone, PartialEq)]
pub struct GuidingCenter {
    pub x: NVec3,     // position, box-centered
    pub v: NVec3,     // velocity
    pub owner: i32,   // process currently holding the guiding center
}

/// Preamble of the particle file
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleFileInfo {
    pub ncpu: usize,
    pub ndim: usize,
    pub n_bound: usize,
    pub mesh_scale: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoundParticle {
    pub x_box: NVec3, // box-centered position
    pub x: NVec3,     // cluster frame position (x_box - guiding center)
    pub v: NVec3,     // velocity
    pub m: f64,       // mass
    pub r: f64,       // distance from the guiding center
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParticleSet {
    pub info: ParticleFileInfo,
    pub particles: Vec<BoundParticle>,
}

impl ParticleSet {
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn mean_mass(&self) -> Option<f64> {
        mean(self.particles.iter().map(|p| p.m))
    }

    pub fn mean_radius(&self) -> Option<f64> {
        mean(self.particles.iter().map(|p| p.r))
    }

    /// Population standard deviation of the radii
    pub fn std_radius(&self) -> Option<f64> {
        let mu = self.mean_radius()?;
        mean(self.particles.iter().map(|p| (p.r - mu) * (p.r - mu))).map(f64::sqrt)
    }
}

fn mean(values: impl ExactSizeIterator<Item = f64>) -> Option<f64> {
    let n = values.len();
    if n == 0 {
        return None;
    }
    Some(values.sum::<f64>() / n as f64)
}

#[derive(Debug, Clone, PartialEq)]
pub struct MeshPoint {
    pub x: NVec3, // cluster frame position
    pub f: NVec3, // interpolated force
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForceMesh {
    pub nx: usize, // cells per axis
    pub points: Vec<MeshPoint>,
}

impl ForceMesh {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Cell corners of the AMR hierarchy keyed by refinement level
/// A level is only present once at least one grid was read for it
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AmrLevels {
    pub levels: BTreeMap<usize, Vec<NVec3>>,
}

impl AmrLevels {
    pub fn level(&self, level: usize) -> Option<&[NVec3]> {
        self.levels.get(&level).map(Vec::as_slice)
    }

    pub fn n_cells(&self) -> usize {
        self.levels.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Append a batch of corners to `level`
    pub(crate) fn extend_level(&mut self, level: usize, corners: impl IntoIterator<Item = NVec3>) {
        self.levels.entry(level).or_default().extend(corners);
    }

    /// Append every level of `other`, keeping per-level order
    pub(crate) fn merge(&mut self, other: AmrLevels) {
        for (level, corners) in other.levels {
            self.extend_level(level, corners);
        }
    }
}
