//! Strided memory layouts.
//!
//! A [`Layout`] maps an n-dimensional index to an element offset into some
//! backing storage: `offset + Σ index[i] * strides[i]`. Strides are counted
//! in elements and may be zero or negative. Every constructor validates that
//! no addressable element lies before the start of the storage, and records
//! the [`span`](Layout::span) the storage must cover.

use std::ops::Range;

use smallvec::SmallVec;

use crate::dtype::DType;
use crate::error::LayoutError;

/// Array shape.
pub type Dims = SmallVec<[usize; 4]>;

/// Per-axis strides (elements or bytes, depending on context).
pub type Strides = SmallVec<[isize; 4]>;

/// Shape, element strides and base offset of a strided array.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Layout {
    shape: Dims,
    strides: Strides,
    offset: usize,
    span: usize,
}

impl Layout {
    /// Row-major contiguous layout for `shape`, starting at offset 0.
    pub fn contiguous(shape: &[usize]) -> Self {
        let mut strides: Strides = SmallVec::from_elem(0, shape.len());
        let mut step: isize = 1;
        for (axis, &n) in shape.iter().enumerate().rev() {
            strides[axis] = step;
            step = step.saturating_mul(n.max(1) as isize);
        }
        let len: usize = shape.iter().product();
        Self {
            shape: shape.iter().copied().collect(),
            strides,
            offset: 0,
            span: len,
        }
    }

    /// Layout with explicit element strides and base offset.
    pub fn new(shape: &[usize], strides: &[isize], offset: usize) -> Result<Self, LayoutError> {
        if shape.len() != strides.len() {
            return Err(LayoutError::RankMismatch {
                shape: shape.len(),
                strides: strides.len(),
            });
        }
        Self::build(
            shape.iter().copied().collect(),
            strides.iter().copied().collect(),
            offset,
        )
    }

    /// Layout from byte strides, as found in exchange descriptors.
    ///
    /// The base offset is chosen so the lowest addressed element sits at
    /// offset 0; for non-negative strides that is element `[0, 0, ...]`.
    /// Strides of axes with extent ≤ 1 are never dereferenced and are
    /// normalised to 0.
    pub fn from_byte_strides(
        shape: &[usize],
        byte_strides: &[isize],
        dtype: DType,
    ) -> Result<Self, LayoutError> {
        if shape.len() != byte_strides.len() {
            return Err(LayoutError::RankMismatch {
                shape: shape.len(),
                strides: byte_strides.len(),
            });
        }
        let elem_size = dtype.size_bytes();
        let size = elem_size as isize;
        let mut strides = Strides::with_capacity(shape.len());
        for (&n, &stride) in shape.iter().zip(byte_strides) {
            if n <= 1 {
                strides.push(0);
            } else if stride % size != 0 {
                return Err(LayoutError::StrideNotMultiple { stride, elem_size });
            } else {
                strides.push(stride / size);
            }
        }
        let shape: Dims = shape.iter().copied().collect();
        let (lo, _) = extents(&shape, &strides)?;
        let offset = lo.checked_neg().ok_or(LayoutError::Overflow)? as usize;
        Self::build(shape, strides, offset)
    }

    fn build(shape: Dims, strides: Strides, offset: usize) -> Result<Self, LayoutError> {
        let empty = shape.iter().any(|&n| n == 0);
        let span = if empty {
            0
        } else {
            let (lo, hi) = extents(&shape, &strides)?;
            let base = isize::try_from(offset).map_err(|_| LayoutError::Overflow)?;
            if base.checked_add(lo).ok_or(LayoutError::Overflow)? < 0 {
                return Err(LayoutError::NegativeOffset);
            }
            let last = base.checked_add(hi).ok_or(LayoutError::Overflow)?;
            (last as usize).checked_add(1).ok_or(LayoutError::Overflow)?
        };
        Ok(Self {
            shape,
            strides,
            offset,
            span,
        })
    }

    /// Extent of each axis.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Element stride of each axis.
    pub fn strides(&self) -> &[isize] {
        &self.strides
    }

    /// Offset of element `[0, 0, ...]` in the backing storage.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Number of axes.
    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// Number of addressable elements.
    pub fn len(&self) -> usize {
        self.shape.iter().product()
    }

    /// Returns `true` if any axis has extent 0.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Minimum storage length (in elements) that covers every element.
    pub fn span(&self) -> usize {
        self.span
    }

    /// Returns `true` for a row-major layout with no gaps starting at 0.
    pub fn is_contiguous(&self) -> bool {
        if self.is_empty() {
            return true;
        }
        if self.offset != 0 {
            return false;
        }
        let mut expected: isize = 1;
        for (&n, &stride) in self.shape.iter().zip(&self.strides).rev() {
            if n > 1 && stride != expected {
                return false;
            }
            expected = expected.saturating_mul(n as isize);
        }
        true
    }

    /// Check that storage of `available` elements covers this layout.
    pub fn check_fits(&self, available: usize) -> Result<(), LayoutError> {
        if self.span > available {
            return Err(LayoutError::OutOfBounds {
                span: self.span,
                available,
            });
        }
        Ok(())
    }

    /// Storage offset of `index`, or `None` if it is out of range.
    pub fn offset_of(&self, index: &[usize]) -> Option<usize> {
        if index.len() != self.ndim() {
            return None;
        }
        let mut at = self.offset as isize;
        for ((&i, &n), &stride) in index.iter().zip(&self.shape).zip(&self.strides) {
            if i >= n {
                return None;
            }
            at += i as isize * stride;
        }
        Some(at as usize)
    }

    /// Strides converted to bytes for `dtype`.
    pub fn byte_strides(&self, dtype: DType) -> Strides {
        let size = dtype.size_bytes() as isize;
        self.strides.iter().map(|&s| s * size).collect()
    }

    /// Fix `axis` at `index`, dropping that axis.
    pub fn select(&self, axis: usize, index: usize) -> Result<Self, LayoutError> {
        self.check_axis(axis)?;
        let len = self.shape[axis];
        if index >= len {
            return Err(LayoutError::IndexOutOfRange { index, len });
        }
        let offset = shift(self.offset, index, self.strides[axis])?;
        let mut shape = self.shape.clone();
        let mut strides = self.strides.clone();
        shape.remove(axis);
        strides.remove(axis);
        Self::build(shape, strides, offset)
    }

    /// Restrict `axis` to `range`.
    pub fn slice_axis(&self, axis: usize, range: Range<usize>) -> Result<Self, LayoutError> {
        self.check_axis(axis)?;
        let len = self.shape[axis];
        if range.start > range.end || range.end > len {
            return Err(LayoutError::IndexOutOfRange {
                index: range.end.max(range.start),
                len,
            });
        }
        let offset = if range.is_empty() {
            self.offset
        } else {
            shift(self.offset, range.start, self.strides[axis])?
        };
        let mut shape = self.shape.clone();
        shape[axis] = range.end - range.start;
        Self::build(shape, self.strides.clone(), offset)
    }

    /// Storage offsets of every element, in row-major index order.
    pub fn offsets(&self) -> Offsets<'_> {
        Offsets {
            layout: self,
            index: SmallVec::from_elem(0, self.ndim()),
            current: self.offset as isize,
            remaining: self.len(),
        }
    }

    fn check_axis(&self, axis: usize) -> Result<(), LayoutError> {
        if axis >= self.ndim() {
            return Err(LayoutError::AxisOutOfRange {
                axis,
                ndim: self.ndim(),
            });
        }
        Ok(())
    }
}

/// Lowest and highest displacement from the base offset, in elements.
fn extents(shape: &[usize], strides: &[isize]) -> Result<(isize, isize), LayoutError> {
    let mut lo: isize = 0;
    let mut hi: isize = 0;
    if shape.iter().any(|&n| n == 0) {
        return Ok((0, 0));
    }
    for (&n, &stride) in shape.iter().zip(strides) {
        let steps = isize::try_from(n - 1).map_err(|_| LayoutError::Overflow)?;
        let extent = steps.checked_mul(stride).ok_or(LayoutError::Overflow)?;
        if extent < 0 {
            lo = lo.checked_add(extent).ok_or(LayoutError::Overflow)?;
        } else {
            hi = hi.checked_add(extent).ok_or(LayoutError::Overflow)?;
        }
    }
    Ok((lo, hi))
}

fn shift(offset: usize, index: usize, stride: isize) -> Result<usize, LayoutError> {
    let steps = isize::try_from(index).map_err(|_| LayoutError::Overflow)?;
    let delta = steps.checked_mul(stride).ok_or(LayoutError::Overflow)?;
    let base = isize::try_from(offset).map_err(|_| LayoutError::Overflow)?;
    let moved = base.checked_add(delta).ok_or(LayoutError::Overflow)?;
    usize::try_from(moved).map_err(|_| LayoutError::NegativeOffset)
}

/// Iterator over the storage offsets of a [`Layout`].
pub struct Offsets<'a> {
    layout: &'a Layout,
    index: Dims,
    current: isize,
    remaining: usize,
}

impl Iterator for Offsets<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.remaining == 0 {
            return None;
        }
        let out = self.current as usize;
        self.remaining -= 1;
        if self.remaining > 0 {
            for axis in (0..self.index.len()).rev() {
                let stride = self.layout.strides[axis];
                self.index[axis] += 1;
                self.current += stride;
                if self.index[axis] < self.layout.shape[axis] {
                    break;
                }
                self.current -= stride * self.layout.shape[axis] as isize;
                self.index[axis] = 0;
            }
        }
        Some(out)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Offsets<'_> {}
