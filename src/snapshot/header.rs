//! Text header (`info_XXXXX.txt`) of a snapshot
//!
//! The file is a fixed sequence of `label = value` lines where the value
//! always starts at column 15. Lines are matched by position, not by label.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use log::debug;

use crate::error::{Result, SnapshotError};
use crate::snapshot::layout;

/// Seconds to megayears
pub const S2MYR: f64 = 3.168808781402895e-14;

/// Column where every header value starts
pub const VALUE_COLUMN: usize = 15;

/// Field name of each significant line, `None` for unused lines
const LINE_FIELDS: [Option<&str>; 18] = [
    Some("ncpu"),
    Some("ndim"),
    Some("levelmin"),
    Some("levelmax"),
    Some("ngridmax"),
    Some("nstep_coarse"),
    None,
    Some("boxlen"),
    Some("time"),
    Some("aexp"),
    Some("H0"),
    Some("omega_m"),
    Some("omega_l"),
    Some("omega_k"),
    Some("omega_b"),
    Some("unit_l"),
    Some("unit_d"),
    Some("unit_t"),
];

#[allow(non_snake_case)]
#[derive(Debug, Clone, PartialEq)]
pub struct Header {
    pub path: PathBuf, // snapshot directory
    pub snap_id: String,

    pub ncpu: usize,
    pub ndim: usize,
    pub levelmin: usize,
    pub levelmax: usize,
    pub ngridmax: usize,
    pub nstep_coarse: i64,

    pub boxlen: f64,
    pub time_code: f64, // time in code units, as written
    pub time: f64,      // time in Myr
    pub aexp: f64,      // expansion factor
    pub H0: f64,
    pub omega_m: f64,
    pub omega_l: f64,
    pub omega_k: f64,
    pub omega_b: f64,

    pub unit_l: f64,
    pub unit_d: f64,
    pub unit_t: f64,
    pub unit_m: f64, // derived: unit_d / unit_l^3
}

impl Header {
    /// Half the box length, the shift that centers box coordinates on zero
    pub fn half_box(&self) -> f64 {
        0.5 * self.boxlen
    }
}

/// Read `info_<snap_id>.txt` from a snapshot directory
pub fn load_header(dir: &Path, snap_id: &str) -> Result<Header> {
    let file = layout::header_file(dir, snap_id);
    if !file.is_file() {
        return Err(SnapshotError::PathNotFound { path: file });
    }
    let text = fs::read_to_string(&file)?;
    let header = parse_header(&text, &file, dir, snap_id)?;

    debug!(
        "header {}: ncpu={} ndim={} levels={}..{} boxlen={} t={:.3} Myr",
        file.display(),
        header.ncpu,
        header.ndim,
        header.levelmin,
        header.levelmax,
        header.boxlen,
        header.time
    );
    Ok(header)
}

/// Parse header text; `file` only labels errors
pub fn parse_header(text: &str, file: &Path, dir: &Path, snap_id: &str) -> Result<Header> {
    let lines: Vec<&str> = text.lines().take(LINE_FIELDS.len()).collect();

    // Fail on the first field whose line is missing altogether
    if let Some(field) = LINE_FIELDS[lines.len()..].iter().flatten().next().copied() {
        return Err(SnapshotError::MissingField {
            path: file.to_path_buf(),
            field,
        });
    }

    let value = |i: usize| line_value(lines[i]);
    let field = |i: usize| LINE_FIELDS[i].unwrap_or("reserved");

    let int = |i: usize| parse_value::<i64>(value(i), file, field(i));
    let count = |i: usize| parse_value::<usize>(value(i), file, field(i));
    let real = |i: usize| parse_value::<f64>(value(i), file, field(i));

    let unit_l = real(15)?;
    let unit_d = real(16)?;
    let unit_t = real(17)?;
    let time_code = real(8)?;

    Ok(Header {
        path: dir.to_path_buf(),
        snap_id: snap_id.to_string(),
        ncpu: count(0)?,
        ndim: count(1)?,
        levelmin: count(2)?,
        levelmax: count(3)?,
        ngridmax: count(4)?,
        nstep_coarse: int(5)?,
        boxlen: real(7)?,
        time_code,
        time: time_code * unit_t * S2MYR,
        aexp: real(9)?,
        H0: real(10)?,
        omega_m: real(11)?,
        omega_l: real(12)?,
        omega_k: real(13)?,
        omega_b: real(14)?,
        unit_l,
        unit_d,
        unit_t,
        unit_m: unit_d / unit_l.powi(3),
    })
}

/// Text after the value column, trimmed; short lines give an empty value
fn line_value(line: &str) -> &str {
    line.get(VALUE_COLUMN..).unwrap_or("").trim()
}

fn parse_value<T: FromStr>(value: &str, file: &Path, field: &'static str) -> Result<T> {
    value.parse().map_err(|_| SnapshotError::ParseError {
        path: file.to_path_buf(),
        field,
        value: value.to_string(),
    })
}
