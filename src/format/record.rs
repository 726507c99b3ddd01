//! Sequential reader for Fortran-style unformatted records
//!
//! Every record on disk is framed as
//!
//! ```text
//! [length prefix][payload: length bytes][length suffix]
//! ```
//!
//! where prefix and suffix are the same little-endian unsigned integer
//! (4 bytes by default, 8 for some compilers). The payload is a homogeneous
//! array whose element type is decided by the caller, not by the file:
//! integer records hold `i32`, real records hold `f64`.
//!
//! The reader is forward-only. It keeps the index of the next record and
//! the path it was opened from so that every error points at the record
//! that broke.

use std::fs::File;
use std::io::{BufReader, ErrorKind, Read};
use std::path::{Path, PathBuf};

use byteorder::{ByteOrder, LittleEndian, ReadBytesExt};
use serde::Deserialize;

use crate::error::{Result, SnapshotError};

/// Width of the length markers around each record
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MarkerWidth {
    #[default]
    #[serde(rename = "u32")] // gfortran / ifort default
    U32,

    #[serde(rename = "u64")] // old gfortran builds with 8-byte record markers
    U64,
}

impl MarkerWidth {
    pub fn bytes(self) -> usize {
        match self {
            MarkerWidth::U32 => 4,
            MarkerWidth::U64 => 8,
        }
    }
}

/// Fixed-width element that can be decoded from a little-endian payload
pub trait Element: Sized + Copy {
    const WIDTH: usize;
    const KIND: &'static str;
    fn from_le(bytes: &[u8]) -> Self;
}

macro_rules! impl_element {
    ($t:ty, $kind:literal, $read:ident) => {
        impl Element for $t {
            const WIDTH: usize = std::mem::size_of::<$t>();
            const KIND: &'static str = $kind;
            fn from_le(bytes: &[u8]) -> Self {
                LittleEndian::$read(bytes)
            }
        }
    };
}

impl_element!(i32, "integer", read_i32);
impl_element!(f64, "real", read_f64);

/// Forward-only record stream over any byte source
pub struct RecordReader<R: Read> {
    inner: R,
    path: PathBuf,
    marker: MarkerWidth,
    record: usize, // index of the next record to be read
}

impl RecordReader<BufReader<File>> {
    /// Open a record file on disk, failing with `PathNotFound` if it is absent
    pub fn open(path: impl AsRef<Path>, marker: MarkerWidth) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(SnapshotError::PathNotFound {
                path: path.to_path_buf(),
            });
        }
        let file = File::open(path)?;
        Ok(Self::new(BufReader::new(file), path, marker))
    }
}

impl<R: Read> RecordReader<R> {
    /// Wrap an already-open stream positioned at a record boundary
    /// `path` is only used to label errors
    pub fn new(inner: R, path: impl Into<PathBuf>, marker: MarkerWidth) -> Self {
        Self {
            inner,
            path: path.into(),
            marker,
            record: 0,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of records consumed so far (also the index of the next one)
    pub fn records_read(&self) -> usize {
        self.record
    }

    /// Consume one record of `i32` values
    pub fn read_int_record(&mut self) -> Result<Vec<i32>> {
        self.read_record::<i32>()
    }

    /// Consume one record of `f64` values
    pub fn read_real_record(&mut self) -> Result<Vec<f64>> {
        self.read_record::<f64>()
    }

    /// Consume one record of any element type
    pub fn read_record<T: Element>(&mut self) -> Result<Vec<T>> {
        let payload = self.read_payload(T::WIDTH, T::KIND)?;
        Ok(payload.chunks_exact(T::WIDTH).map(T::from_le).collect())
    }

    /// Consume one record without decoding it
    /// Framing is still checked
    pub fn skip_record(&mut self) -> Result<()> {
        self.read_payload(1, "raw").map(|_| ())
    }

    pub fn skip_records(&mut self, n: usize) -> Result<()> {
        for _ in 0..n {
            self.skip_record()?;
        }
        Ok(())
    }

    /// Consume a record and check it holds exactly `expected` values
    pub fn read_record_exact<T: Element>(
        &mut self,
        expected: usize,
        field: &'static str,
    ) -> Result<Vec<T>> {
        let record = self.record;
        let values = self.read_record::<T>()?;
        if values.len() != expected {
            return Err(self.mismatch(record, field, expected, values.len()));
        }
        Ok(values)
    }

    pub fn read_real_record_exact(&mut self, expected: usize, field: &'static str) -> Result<Vec<f64>> {
        self.read_record_exact::<f64>(expected, field)
    }

    pub fn read_int_record_exact(&mut self, expected: usize, field: &'static str) -> Result<Vec<i32>> {
        self.read_record_exact::<i32>(expected, field)
    }

    /// First value of an integer record
    pub fn read_int_scalar(&mut self, field: &'static str) -> Result<i32> {
        self.read_scalar::<i32>(field)
    }

    /// First value of a real record
    pub fn read_real_scalar(&mut self, field: &'static str) -> Result<f64> {
        self.read_scalar::<f64>(field)
    }

    /// First value of an integer record, as a non-negative count
    pub fn read_count(&mut self, field: &'static str) -> Result<usize> {
        let record = self.record;
        let value = self.read_int_scalar(field)?;
        self.to_count(record, field, value)
    }

    fn read_scalar<T: Element>(&mut self, field: &'static str) -> Result<T> {
        let record = self.record;
        let values = self.read_record::<T>()?;
        values
            .first()
            .copied()
            .ok_or_else(|| self.mismatch(record, field, 1, 0))
    }

    /// Convert a decoded integer into a count, rejecting negatives
    pub(crate) fn to_count(&self, record: usize, field: &'static str, value: i32) -> Result<usize> {
        usize::try_from(value).map_err(|_| SnapshotError::MalformedRecord {
            path: self.path.clone(),
            record,
            reason: format!("negative {field} ({value})"),
        })
    }

    pub(crate) fn mismatch(
        &self,
        record: usize,
        field: &'static str,
        expected: usize,
        found: usize,
    ) -> SnapshotError {
        SnapshotError::DimensionMismatch {
            path: self.path.clone(),
            record,
            field,
            expected,
            found,
        }
    }

    fn malformed(&self, reason: impl Into<String>) -> SnapshotError {
        SnapshotError::MalformedRecord {
            path: self.path.clone(),
            record: self.record,
            reason: reason.into(),
        }
    }

    fn read_marker(&mut self, which: &str) -> Result<u64> {
        let marker = match self.marker {
            MarkerWidth::U32 => self.inner.read_u32::<LittleEndian>().map(u64::from),
            MarkerWidth::U64 => self.inner.read_u64::<LittleEndian>(),
        };
        marker.map_err(|e| match e.kind() {
            ErrorKind::UnexpectedEof => self.malformed(format!("unexpected end of stream in {which}")),
            _ => SnapshotError::Io(e),
        })
    }

    /// Read prefix, payload and suffix of the next record
    /// The record counter only advances once the whole frame checks out
    fn read_payload(&mut self, width: usize, kind: &str) -> Result<Vec<u8>> {
        let prefix = self.read_marker("length prefix")?;

        // Bounded read: a garbage prefix must not turn into a huge allocation
        let mut payload = Vec::new();
        (&mut self.inner).take(prefix).read_to_end(&mut payload)?;
        if payload.len() as u64 != prefix {
            return Err(self.malformed(format!(
                "stream ended after {} of {} payload bytes",
                payload.len(),
                prefix
            )));
        }

        let suffix = self.read_marker("length suffix")?;
        if suffix != prefix {
            return Err(self.malformed(format!(
                "length prefix {prefix} does not match suffix {suffix}"
            )));
        }

        if payload.len() % width != 0 {
            return Err(self.malformed(format!(
                "{} payload bytes is not a whole number of {kind} values ({width} bytes each)",
                payload.len()
            )));
        }

        self.record += 1;
        Ok(payload)
    }
}
