//! Error types shared across the fieldsnap workspace.
//!
//! Layout errors come from describing strided memory; exchange errors come
//! from turning an exchange descriptor back into a typed borrow.

use std::error::Error;
use std::fmt;

use crate::device::Device;
use crate::dtype::DType;

/// Errors from constructing or transforming a [`Layout`](crate::Layout).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LayoutError {
    /// Shape and strides have different lengths.
    RankMismatch {
        /// Number of shape dimensions.
        shape: usize,
        /// Number of stride entries.
        strides: usize,
    },
    /// A byte stride is not a whole number of elements.
    StrideNotMultiple {
        /// The offending byte stride.
        stride: isize,
        /// Element size in bytes.
        elem_size: usize,
    },
    /// The layout addresses an element before the start of its storage.
    NegativeOffset,
    /// The layout addresses more elements than the storage holds.
    OutOfBounds {
        /// Elements required by the layout.
        span: usize,
        /// Elements available in the storage.
        available: usize,
    },
    /// Offset or extent arithmetic overflowed.
    Overflow,
    /// An axis argument exceeds the layout's rank.
    AxisOutOfRange {
        /// Requested axis.
        axis: usize,
        /// Rank of the layout.
        ndim: usize,
    },
    /// An index along an axis is past its extent.
    IndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Extent of the axis.
        len: usize,
    },
    /// Two layouts that must agree have different shapes.
    ShapeMismatch {
        /// The shape that was required.
        expected: Vec<usize>,
        /// The shape that was supplied.
        found: Vec<usize>,
    },
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RankMismatch { shape, strides } => {
                write!(f, "rank mismatch: {shape} dims but {strides} strides")
            }
            Self::StrideNotMultiple { stride, elem_size } => {
                write!(
                    f,
                    "byte stride {stride} is not a multiple of element size {elem_size}"
                )
            }
            Self::NegativeOffset => write!(f, "layout addresses memory before its base"),
            Self::OutOfBounds { span, available } => {
                write!(
                    f,
                    "layout spans {span} elements but storage holds {available}"
                )
            }
            Self::Overflow => write!(f, "layout arithmetic overflowed"),
            Self::AxisOutOfRange { axis, ndim } => {
                write!(f, "axis {axis} out of range for rank {ndim}")
            }
            Self::IndexOutOfRange { index, len } => {
                write!(f, "index {index} out of range for extent {len}")
            }
            Self::ShapeMismatch { expected, found } => {
                write!(f, "shape mismatch: expected {expected:?}, found {found:?}")
            }
        }
    }
}

impl Error for LayoutError {}

/// Errors from importing memory through an exchange descriptor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExchangeError {
    /// The descriptor's element type is not the one requested.
    DTypeMismatch {
        /// Element type the importer asked for.
        expected: DType,
        /// Element type recorded in the descriptor.
        found: DType,
    },
    /// The memory does not live on the importer's device.
    DeviceMismatch {
        /// Device the importer runs on.
        expected: Device,
        /// Device recorded in the descriptor.
        found: Device,
    },
    /// The descriptor has a null base pointer but a non-empty shape.
    NullPointer,
    /// The base pointer is not aligned for the element type.
    Misaligned {
        /// Address of the first element.
        address: usize,
        /// Required alignment in bytes.
        align: usize,
    },
    /// A mutable import was requested for read-only memory.
    ReadOnly,
    /// The descriptor's shape/strides are invalid.
    Layout(LayoutError),
}

impl fmt::Display for ExchangeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DTypeMismatch { expected, found } => {
                write!(f, "dtype mismatch: expected {expected}, found {found}")
            }
            Self::DeviceMismatch { expected, found } => {
                write!(f, "device mismatch: expected {expected}, found {found}")
            }
            Self::NullPointer => write!(f, "null data pointer for non-empty array"),
            Self::Misaligned { address, align } => {
                write!(f, "address {address:#x} is not {align}-byte aligned")
            }
            Self::ReadOnly => write!(f, "exported memory is read-only"),
            Self::Layout(e) => write!(f, "invalid layout: {e}"),
        }
    }
}

impl Error for ExchangeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Layout(e) => Some(e),
            _ => None,
        }
    }
}

impl From<LayoutError> for ExchangeError {
    fn from(e: LayoutError) -> Self {
        Self::Layout(e)
    }
}
