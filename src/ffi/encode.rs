//! Point-set encoding
//!
//! Converts host rows into the "array of row pointers" layout the engine
//! reads its input from.

use std::fmt;

use libc::{c_double, c_uint};

use super::error::{MarshalError, MarshalResult};
use super::layout::DataRepresentation;

/// Validate rows and return `(count, dimension)` without allocating.
fn validate_shape<R: AsRef<[f64]>>(points: &[R]) -> MarshalResult<(usize, usize)> {
    let first = points.first().ok_or(MarshalError::EmptyInput)?;
    let dimension = first.as_ref().len();
    if dimension == 0 {
        return Err(MarshalError::InvalidShape(
            "rows must have at least one coordinate".to_string(),
        ));
    }

    if let Some((index, row)) = points
        .iter()
        .enumerate()
        .find(|(_, row)| row.as_ref().len() != dimension)
    {
        return Err(MarshalError::InvalidShape(format!(
            "row {} has {} coordinates, expected {}",
            index,
            row.as_ref().len(),
            dimension
        )));
    }

    if c_uint::try_from(points.len()).is_err() || c_uint::try_from(dimension).is_err() {
        return Err(MarshalError::InvalidShape(format!(
            "{} x {} does not fit the engine's unsigned int counters",
            points.len(),
            dimension
        )));
    }

    Ok((points.len(), dimension))
}

/// Host-side set of equal-dimension points, stored row-major
#[derive(Debug, Clone, PartialEq)]
pub struct PointSet {
    count: usize,
    dimension: usize,
    values: Vec<f64>,
}

impl PointSet {
    /// Build from rows, rejecting empty input and ragged rows
    pub fn from_rows<R: AsRef<[f64]>>(rows: &[R]) -> MarshalResult<Self> {
        let (count, dimension) = validate_shape(rows)?;
        let mut values = Vec::with_capacity(count * dimension);
        for row in rows {
            values.extend_from_slice(row.as_ref());
        }
        Ok(Self {
            count,
            dimension,
            values,
        })
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Row-major coordinates
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn row(&self, index: usize) -> Option<&[f64]> {
        self.values.chunks_exact(self.dimension).nth(index)
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        self.values.chunks_exact(self.dimension)
    }

    /// Encode into the engine's input layout
    pub fn to_foreign(&self) -> ForeignPointSet {
        ForeignPointSet::build(self.rows(), self.count, self.dimension)
    }
}

/// Engine-readable point set
///
/// Owns one buffer per row, the index of row addresses, and the header
/// pointing at that index. Everything stays at a fixed address until the
/// value is dropped, so the pointer from [`ForeignPointSet::as_ptr`] is valid
/// for as long as the borrow it came from.
pub struct ForeignPointSet {
    // Fields drop in declaration order: header, index, rows. That is the
    // reverse of the order they are allocated in.
    header: Box<DataRepresentation>,
    index: Vec<*mut c_double>,
    rows: Vec<Vec<c_double>>,
}

impl ForeignPointSet {
    /// Validate and encode rows in one step
    ///
    /// Fails with [`MarshalError::EmptyInput`] for no rows and
    /// [`MarshalError::InvalidShape`] for ragged or zero-width rows. Nothing
    /// is allocated when validation fails.
    pub fn encode<R: AsRef<[f64]>>(points: &[R]) -> MarshalResult<Self> {
        let (count, dimension) = validate_shape(points)?;
        Ok(Self::build(
            points.iter().map(|row| row.as_ref()),
            count,
            dimension,
        ))
    }

    fn build<'a>(rows: impl Iterator<Item = &'a [f64]>, count: usize, dimension: usize) -> Self {
        let mut rows: Vec<Vec<c_double>> = rows.map(|row| row.to_vec()).collect();
        let mut index: Vec<*mut c_double> = rows.iter_mut().map(|row| row.as_mut_ptr()).collect();
        let header = Box::new(DataRepresentation {
            number_objects: count as c_uint,
            dimension: dimension as c_uint,
            pointer_objects: index.as_mut_ptr(),
        });

        tracing::trace!(count, dimension, "encoded point set");

        Self {
            header,
            index,
            rows,
        }
    }

    /// Header address to pass to the engine
    pub fn as_ptr(&self) -> *const DataRepresentation {
        &*self.header
    }

    pub fn count(&self) -> usize {
        self.header.number_objects as usize
    }

    pub fn dimension(&self) -> usize {
        self.header.dimension as usize
    }

    /// Read a row back through the foreign index, exactly as the engine sees it
    pub fn row(&self, index: usize) -> Option<&[f64]> {
        let ptr = *self.index.get(index)?;
        // Safety: every index entry addresses a live row of `dimension`
        // values owned by `self.rows`, and `&self` keeps it alive.
        Some(unsafe { std::slice::from_raw_parts(ptr, self.dimension()) })
    }

    /// Copy the encoded rows back into a host point set
    pub fn to_point_set(&self) -> PointSet {
        let mut values = Vec::with_capacity(self.count() * self.dimension());
        for i in 0..self.count() {
            if let Some(row) = self.row(i) {
                values.extend_from_slice(row);
            }
        }
        PointSet {
            count: self.count(),
            dimension: self.dimension(),
            values,
        }
    }
}

impl fmt::Debug for ForeignPointSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ForeignPointSet")
            .field("count", &self.count())
            .field("dimension", &self.dimension())
            .field("rows", &self.rows.len())
            .finish()
    }
}
