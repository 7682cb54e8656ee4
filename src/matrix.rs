//! Dense row-major `f32` matrix.
//!
//! [`Matrix`] owns its buffer exclusively; `clone` deep-copies it and `clone_from` replaces it.
//! Shapes are never empty: both dimensions are `>= 1` for the lifetime of a value.
//!
//! Two flavours of API are provided:
//!
//! - Checked methods ([`Matrix::get`], [`Matrix::matmul`], [`Matrix::try_add`], ...) return
//!   [`Result`] and never panic.
//! - Operators (`*`, `+`, `+=`, indexing) panic on a contract violation, with the same message
//!   the checked method would have returned.

use std::fmt;
use std::io::{Read, Write};
use std::ops::{Add, AddAssign, Index, IndexMut, Mul};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::matmul::gemm_f32;
use crate::{Error, Result};

/// Values strictly above this are drawn as ink by the [`fmt::Display`] rendering.
pub const RENDER_THRESHOLD: f32 = 0.1;

/// Matrix dimensions.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dims {
    pub rows: usize,
    pub cols: usize,
}

impl Dims {
    #[inline]
    pub const fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols }
    }

    /// Number of elements.
    #[inline]
    pub const fn len(self) -> usize {
        self.rows * self.cols
    }

    /// Number of elements, or `None` if `rows * cols` overflows.
    #[inline]
    pub const fn checked_len(self) -> Option<usize> {
        self.rows.checked_mul(self.cols)
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.rows == 0 || self.cols == 0
    }
}

impl fmt::Display for Dims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.rows, self.cols)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    dims: Dims,
    /// Row-major, `dims.len()` elements.
    data: Vec<f32>,
}

impl Default for Matrix {
    /// A single zero cell.
    fn default() -> Self {
        Self {
            dims: Dims::new(1, 1),
            data: vec![0.0],
        }
    }
}

impl Matrix {
    /// Zero-filled `rows x cols` matrix.
    pub fn new(rows: usize, cols: usize) -> Result<Self> {
        let dims = checked_dims(rows, cols)?;
        Ok(Self {
            dims,
            data: vec![0.0; dims.len()],
        })
    }

    #[inline]
    pub fn zeros(dims: Dims) -> Result<Self> {
        Self::new(dims.rows, dims.cols)
    }

    /// Wrap a row-major buffer.
    pub fn from_vec(rows: usize, cols: usize, data: Vec<f32>) -> Result<Self> {
        let dims = checked_dims(rows, cols)?;
        if data.len() != dims.len() {
            return Err(Error::InvalidShape(format!(
                "data length {} does not match {dims} ({} elements)",
                data.len(),
                dims.len()
            )));
        }
        Ok(Self { dims, data })
    }

    /// Build from per-row slices. All rows must have the same non-zero length.
    pub fn from_rows(rows: &[&[f32]]) -> Result<Self> {
        let cols = rows.first().map_or(0, |r| r.len());
        let mut data = Vec::with_capacity(rows.len() * cols);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != cols {
                return Err(Error::InvalidShape(format!(
                    "row {i} has len {}, expected {cols}",
                    row.len()
                )));
            }
            data.extend_from_slice(row);
        }
        Self::from_vec(rows.len(), cols, data)
    }

    /// Square identity matrix.
    pub fn identity(n: usize) -> Result<Self> {
        let mut m = Self::new(n, n)?;
        for i in 0..n {
            m.data[i * n + i] = 1.0;
        }
        Ok(m)
    }

    /// Read a `rows x cols` matrix from `reader`. See [`Matrix::read_from`].
    pub fn from_reader<R: Read>(rows: usize, cols: usize, reader: &mut R) -> Result<Self> {
        let mut m = Self::new(rows, cols)?;
        m.read_from(reader)?;
        Ok(m)
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.dims.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.dims.cols
    }

    #[inline]
    pub fn dims(&self) -> Dims {
        self.dims
    }

    /// Number of elements (`rows * cols`). Never zero.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        &mut self.data
    }

    #[inline]
    pub fn into_vec(self) -> Vec<f32> {
        self.data
    }

    /// Element at `(row, col)`.
    pub fn get(&self, row: usize, col: usize) -> Result<f32> {
        let idx = self.offset(row, col)?;
        Ok(self.data[idx])
    }

    pub fn get_mut(&mut self, row: usize, col: usize) -> Result<&mut f32> {
        let idx = self.offset(row, col)?;
        Ok(&mut self.data[idx])
    }

    /// Element at linear (row-major) index `idx`.
    pub fn at(&self, idx: usize) -> Result<f32> {
        self.check_linear(idx)?;
        Ok(self.data[idx])
    }

    pub fn at_mut(&mut self, idx: usize) -> Result<&mut f32> {
        self.check_linear(idx)?;
        Ok(&mut self.data[idx])
    }

    /// Matrix product `self * other`.
    ///
    /// Requires `self.cols() == other.rows()`; the result is `self.rows() x other.cols()`.
    pub fn matmul(&self, other: &Matrix) -> Result<Matrix> {
        if self.dims.cols != other.dims.rows {
            return Err(Error::ShapeMismatch {
                op: "*",
                left: self.dims,
                right: other.dims,
            });
        }
        let (m, k, n) = (self.dims.rows, self.dims.cols, other.dims.cols);
        let mut out = Matrix {
            dims: Dims::new(m, n),
            data: vec![0.0; m * n],
        };
        gemm_f32(m, n, k, &self.data, &other.data, &mut out.data);
        Ok(out)
    }

    /// Elementwise sum. Shapes must be identical.
    pub fn try_add(&self, other: &Matrix) -> Result<Matrix> {
        self.check_same_shape("+", other)?;
        let data = self
            .data
            .iter()
            .zip(&other.data)
            .map(|(a, b)| a + b)
            .collect();
        Ok(Matrix {
            dims: self.dims,
            data,
        })
    }

    /// In-place elementwise sum. `self` is untouched on error.
    pub fn try_add_assign(&mut self, other: &Matrix) -> Result<&mut Self> {
        self.check_same_shape("+=", other)?;
        for (a, b) in self.data.iter_mut().zip(&other.data) {
            *a += b;
        }
        Ok(self)
    }

    /// Elementwise scale.
    pub fn scaled(&self, scalar: f32) -> Matrix {
        Matrix {
            dims: self.dims,
            data: self.data.iter().map(|v| v * scalar).collect(),
        }
    }

    /// Reshape in place to a `(rows * cols) x 1` column vector.
    ///
    /// The buffer is untouched, so the vector order is the row-major order of the source.
    pub fn vectorize(&mut self) -> &mut Self {
        self.dims = Dims::new(self.dims.len(), 1);
        self
    }

    /// Index and value of the first strictly greatest element, scanning from a best value of 0.
    ///
    /// Returns `(0, 0.0)` when no element is positive.
    pub fn argmax(&self) -> (usize, f32) {
        let mut best = (0, 0.0_f32);
        for (i, &v) in self.data.iter().enumerate() {
            if v > best.1 {
                best = (i, v);
            }
        }
        best
    }

    /// Fill the buffer with `rows * cols` little-endian `f32` values, in row-major order.
    ///
    /// A source that runs out early is an error and leaves `self` unchanged.
    pub fn read_from<R: Read>(&mut self, reader: &mut R) -> Result<()> {
        let mut buf = vec![0.0_f32; self.data.len()];
        if let Err(e) = reader.read_f32_into::<LittleEndian>(&mut buf) {
            if e.kind() == std::io::ErrorKind::UnexpectedEof {
                return Err(Error::InvalidData(format!(
                    "source ended before {} values for a {} matrix",
                    self.data.len(),
                    self.dims
                )));
            }
            return Err(e.into());
        }
        self.data = buf;
        Ok(())
    }

    /// Write the buffer as little-endian `f32` values, in row-major order.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        for &v in &self.data {
            writer.write_f32::<LittleEndian>(v)?;
        }
        Ok(())
    }

    /// Display adapter printing the numeric values, space separated, one row per line.
    pub fn plain(&self) -> Plain<'_> {
        Plain(self)
    }

    #[inline]
    fn offset(&self, row: usize, col: usize) -> Result<usize> {
        if row >= self.dims.rows || col >= self.dims.cols {
            return Err(Error::OutOfBounds {
                index: format!("({row}, {col})"),
                dims: self.dims,
            });
        }
        Ok(row * self.dims.cols + col)
    }

    #[inline]
    fn check_linear(&self, idx: usize) -> Result<()> {
        if idx >= self.data.len() {
            return Err(Error::OutOfBounds {
                index: format!("[{idx}]"),
                dims: self.dims,
            });
        }
        Ok(())
    }

    fn check_same_shape(&self, op: &'static str, other: &Matrix) -> Result<()> {
        if self.dims != other.dims {
            return Err(Error::ShapeMismatch {
                op,
                left: self.dims,
                right: other.dims,
            });
        }
        Ok(())
    }
}

fn checked_dims(rows: usize, cols: usize) -> Result<Dims> {
    let dims = Dims::new(rows, cols);
    if dims.is_empty() {
        return Err(Error::InvalidShape(format!(
            "rows and cols must be > 0, got {dims}"
        )));
    }
    dims.checked_len()
        .ok_or_else(|| Error::InvalidShape(format!("{dims} overflows usize")))?;
    Ok(dims)
}

/// Unwrap an operator result, keeping the checked error's message.
#[inline]
#[track_caller]
fn or_panic<T>(r: Result<T>) -> T {
    match r {
        Ok(v) => v,
        Err(e) => panic!("{e}"),
    }
}

impl Index<(usize, usize)> for Matrix {
    type Output = f32;

    #[track_caller]
    fn index(&self, (row, col): (usize, usize)) -> &f32 {
        let idx = or_panic(self.offset(row, col));
        &self.data[idx]
    }
}

impl IndexMut<(usize, usize)> for Matrix {
    #[track_caller]
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut f32 {
        or_panic(self.get_mut(row, col))
    }
}

impl Index<usize> for Matrix {
    type Output = f32;

    #[track_caller]
    fn index(&self, idx: usize) -> &f32 {
        or_panic(self.check_linear(idx));
        &self.data[idx]
    }
}

impl IndexMut<usize> for Matrix {
    #[track_caller]
    fn index_mut(&mut self, idx: usize) -> &mut f32 {
        or_panic(self.at_mut(idx))
    }
}

impl Mul<&Matrix> for &Matrix {
    type Output = Matrix;

    #[track_caller]
    fn mul(self, rhs: &Matrix) -> Matrix {
        or_panic(self.matmul(rhs))
    }
}

impl Mul for Matrix {
    type Output = Matrix;

    #[track_caller]
    fn mul(self, rhs: Matrix) -> Matrix {
        &self * &rhs
    }
}

impl Add<&Matrix> for &Matrix {
    type Output = Matrix;

    #[track_caller]
    fn add(self, rhs: &Matrix) -> Matrix {
        or_panic(self.try_add(rhs))
    }
}

impl Add for Matrix {
    type Output = Matrix;

    #[track_caller]
    fn add(mut self, rhs: Matrix) -> Matrix {
        self += &rhs;
        self
    }
}

impl AddAssign<&Matrix> for Matrix {
    #[track_caller]
    fn add_assign(&mut self, rhs: &Matrix) {
        or_panic(self.try_add_assign(rhs));
    }
}

impl Mul<f32> for &Matrix {
    type Output = Matrix;

    fn mul(self, scalar: f32) -> Matrix {
        self.scaled(scalar)
    }
}

impl Mul<f32> for Matrix {
    type Output = Matrix;

    fn mul(mut self, scalar: f32) -> Matrix {
        self.data.iter_mut().for_each(|v| *v *= scalar);
        self
    }
}

impl Mul<&Matrix> for f32 {
    type Output = Matrix;

    fn mul(self, m: &Matrix) -> Matrix {
        m.scaled(self)
    }
}

impl Mul<Matrix> for f32 {
    type Output = Matrix;

    fn mul(self, m: Matrix) -> Matrix {
        m * self
    }
}

/// Threshold rendering: `**` for values above [`RENDER_THRESHOLD`], two spaces otherwise.
impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.data.chunks(self.dims.cols) {
            for &v in row {
                f.write_str(if v > RENDER_THRESHOLD { "**" } else { "  " })?;
            }
            f.write_str("\n")?;
        }
        Ok(())
    }
}

/// See [`Matrix::plain`].
pub struct Plain<'a>(&'a Matrix);

impl fmt::Display for Plain<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.0.data.chunks(self.0.dims.cols) {
            for v in row {
                write!(f, "{v} ")?;
            }
            f.write_str("\n")?;
        }
        Ok(())
    }
}
