//! # AMR octree decoder
//!
//! Reads the AMR metadata files (`amr_XXXXX.outYYYYY`, one per process) and
//! collects the corner coordinates of every grid, grouped by refinement level.
//!
//! ## Layout
//!
//! The file is decoded in two phases.
//!
//! **Preamble.** A fixed run of bookkeeping records:
//!
//! - 9 integer records: process count (0), dimensionality (1), max level (3),
//!   boundary domain count (5), the rest is not needed
//! - 5 real records, 1 integer record (coarse step counters), 4 real records
//! - level linked lists: heads, tails, the occupancy table and totals.
//!   The occupancy table gives the number of grids of every
//!   `(level, domain)` pair, stored level-major as `[levelmax][ncpu]`
//! - if there are boundary domains: their heads, tails and occupancy table
//!   (`[levelmax][nboundary]`)
//! - free memory, ordering, bound keys and 3 coarse level records
//!
//! **Grids.** For every level, for every domain (processes first, then
//! boundaries), a batch of records is present only if the occupancy table
//! says that pair holds grids:
//!
//! ```text
//! ids, next, prev                       3 integer records
//! grid centers                          ndim real records
//! father                                1 integer record
//! neighbors                             6 integer records
//! sons, cpu map, refinement flags       3 x 8 integer records
//! ```
//!
//! Nothing in the stream marks where a batch starts, so the occupancy table
//! has to be complete before the first grid record is read.
//!
//! Grid centers are in normalised box units. A level `L` cell is `1 / 2^L`
//! wide, and corners sit half a cell below the center.

use std::io::Read;
use std::path::{Path, PathBuf};

use log::debug;
use rayon::prelude::*;

use crate::configuration::config::ReaderConfig;
use crate::error::Result;
use crate::format::record::{MarkerWidth, RecordReader};
use crate::snapshot::layout;
use crate::snapshot::states::{AmrLevels, NVec3};

const HEADER_INT_RECORDS: usize = 9;
const HEADER_REAL_RECORDS: usize = 5;
const STEP_RECORDS: usize = 1;
const EXTRA_REAL_RECORDS: usize = 4;
const TRAILING_RECORDS: usize = 6; // free memory, ordering, bound keys, 3 coarse

pub const GRID_LINK_RECORDS: usize = 3;
pub const FATHER_RECORDS: usize = 1;
pub const NEIGHBOR_RECORDS: usize = 6;
pub const SON_RECORDS: usize = 8;
pub const CPU_MAP_RECORDS: usize = 8;
pub const FLAG_RECORDS: usize = 8;

/// Records consumed by one non-empty `(level, domain)` batch
pub fn records_per_batch(ndim: usize) -> usize {
    GRID_LINK_RECORDS + ndim + FATHER_RECORDS + NEIGHBOR_RECORDS + SON_RECORDS + CPU_MAP_RECORDS + FLAG_RECORDS
}

/// Half the width of a cell at `level`
pub fn half_cell_width(level: usize) -> f64 {
    0.5 * 0.5f64.powi(level as i32)
}

/// Number of grids for every `(level, domain)` pair
#[derive(Debug, Clone, PartialEq)]
pub struct OccupancyTable {
    pub levelmax: usize,
    pub ncpu: usize,
    pub nboundary: usize,
    cpu: Vec<usize>,      // [levelmax][ncpu]
    boundary: Vec<usize>, // [levelmax][nboundary]
}

impl OccupancyTable {
    pub fn n_domains(&self) -> usize {
        self.ncpu + self.nboundary
    }

    /// Grid count for a level and domain, domains `>= ncpu` being boundaries
    pub fn get(&self, level: usize, domain: usize) -> usize {
        if domain < self.ncpu {
            self.cpu[level * self.ncpu + domain]
        } else {
            self.boundary[level * self.nboundary + domain - self.ncpu]
        }
    }

    pub fn total(&self) -> usize {
        self.cpu.iter().chain(&self.boundary).sum()
    }
}

/// Values captured from the preamble
#[derive(Debug, Clone, PartialEq)]
pub struct AmrPreamble {
    pub ncpu: usize,
    pub ndim: usize,
    pub levelmax: usize,
    pub nboundary: usize,
    pub occupancy: OccupancyTable,
}

/// Decode one AMR file from an open stream
pub fn read_amr<R: Read>(stream: &mut RecordReader<R>) -> Result<AmrLevels> {
    let preamble = read_preamble(stream)?;
    read_grids(stream, &preamble)
}

/// Phase 1: everything up to the first grid batch
pub fn read_preamble<R: Read>(stream: &mut RecordReader<R>) -> Result<AmrPreamble> {
    let mut ncpu = 0;
    let mut ndim = 0;
    let mut levelmax = 0;
    let mut nboundary = 0;

    for i in 0..HEADER_INT_RECORDS {
        match i {
            0 => ncpu = stream.read_count("ncpu")?,
            1 => ndim = stream.read_count("ndim")?,
            3 => levelmax = stream.read_count("levelmax")?,
            5 => nboundary = stream.read_count("nboundary")?,
            _ => stream.skip_record()?,
        }
    }

    stream.skip_records(HEADER_REAL_RECORDS + STEP_RECORDS + EXTRA_REAL_RECORDS)?;

    // heads, tails, occupancy, totals
    stream.skip_records(2)?;
    let cpu = read_table(stream, levelmax * ncpu, "level occupancy")?;
    stream.skip_record()?;

    let boundary = if nboundary > 0 {
        stream.skip_records(2)?;
        read_table(stream, levelmax * nboundary, "boundary occupancy")?
    } else {
        Vec::new()
    };

    stream.skip_records(TRAILING_RECORDS)?;

    Ok(AmrPreamble {
        ncpu,
        ndim,
        levelmax,
        nboundary,
        occupancy: OccupancyTable {
            levelmax,
            ncpu,
            nboundary,
            cpu,
            boundary,
        },
    })
}

fn read_table<R: Read>(stream: &mut RecordReader<R>, len: usize, field: &'static str) -> Result<Vec<usize>> {
    let record = stream.records_read();
    stream
        .read_int_record_exact(len, field)?
        .into_iter()
        .map(|n| stream.to_count(record, field, n))
        .collect()
}

/// Phase 2: walk every `(level, domain)` pair the occupancy table announces
pub fn read_grids<R: Read>(stream: &mut RecordReader<R>, preamble: &AmrPreamble) -> Result<AmrLevels> {
    let table = &preamble.occupancy;
    let mut levels = AmrLevels::default();

    for level in 0..preamble.levelmax {
        let shift = half_cell_width(level);

        for domain in 0..table.n_domains() {
            let ncache = table.get(level, domain);
            if ncache == 0 {
                continue;
            }

            stream.skip_records(GRID_LINK_RECORDS)?;

            // Axes beyond the third are consumed but not kept
            let mut corners: [Vec<f64>; 3] = Default::default();
            for axis in 0..preamble.ndim {
                let mut centers = stream.read_real_record_exact(ncache, "grid center")?;
                if let Some(slot) = corners.get_mut(axis) {
                    for x in centers.iter_mut() {
                        *x -= shift;
                    }
                    *slot = centers;
                }
            }

            stream.skip_records(FATHER_RECORDS + NEIGHBOR_RECORDS + SON_RECORDS + CPU_MAP_RECORDS + FLAG_RECORDS)?;

            let coord = |axis: usize, i: usize| corners[axis].get(i).copied().unwrap_or(0.0);
            levels.extend_level(
                level,
                (0..ncache).map(|i| NVec3::new(coord(0, i), coord(1, i), coord(2, i))),
            );
        }
    }

    Ok(levels)
}

/// Decode a single AMR file on disk
pub fn read_amr_file(path: &Path, marker: MarkerWidth) -> Result<AmrLevels> {
    let cpu = layout::amr_cpu_id(path)?;
    let mut stream = RecordReader::open(path, marker)?;
    let preamble = read_preamble(&mut stream)?;
    let levels = read_grids(&mut stream, &preamble)?;

    debug!(
        "amr file {} (cpu {}): levelmax={} grids={} records={}",
        path.display(),
        cpu,
        preamble.levelmax,
        preamble.occupancy.total(),
        stream.records_read()
    );
    Ok(levels)
}

/// Decode and merge every AMR file of a snapshot
/// Files are merged in name order whether or not they were decoded in parallel
pub fn read_amr_dir(dir: &Path, snap_id: &str, cfg: &ReaderConfig) -> Result<AmrLevels> {
    let files = layout::amr_files(dir, snap_id)?;
    let marker = cfg.record.marker;
    let decode = |path: &PathBuf| read_amr_file(path, marker);

    let per_file: Vec<AmrLevels> = if cfg.parallel_amr {
        files.par_iter().map(decode).collect::<Result<_>>()?
    } else {
        files.iter().map(decode).collect::<Result<_>>()?
    };

    let mut levels = AmrLevels::default();
    for file_levels in per_file {
        levels.merge(file_levels);
    }
    Ok(levels)
}
