//! Tensor error types.

use std::error::Error;
use std::fmt;

use fieldsnap_core::{Device, ExchangeError, LayoutError};

/// Errors from tensor import and arithmetic.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TensorError {
    /// The exchange descriptor could not be imported.
    Exchange(ExchangeError),
    /// Indexing or reshaping failed.
    Layout(LayoutError),
    /// Operands of an elementwise op have different shapes.
    ShapeMismatch {
        /// Shape of the left operand.
        lhs: Vec<usize>,
        /// Shape of the right operand.
        rhs: Vec<usize>,
    },
    /// Operands of an elementwise op live on different devices.
    DeviceMismatch {
        /// Device of the left operand.
        lhs: Device,
        /// Device of the right operand.
        rhs: Device,
    },
}

impl fmt::Display for TensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exchange(e) => write!(f, "tensor import failed: {e}"),
            Self::Layout(e) => write!(f, "tensor layout error: {e}"),
            Self::ShapeMismatch { lhs, rhs } => {
                write!(f, "incompatible shapes {lhs:?} and {rhs:?}")
            }
            Self::DeviceMismatch { lhs, rhs } => {
                write!(f, "operands on different devices: {lhs} and {rhs}")
            }
        }
    }
}

impl Error for TensorError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Exchange(e) => Some(e),
            Self::Layout(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ExchangeError> for TensorError {
    fn from(e: ExchangeError) -> Self {
        Self::Exchange(e)
    }
}

impl From<LayoutError> for TensorError {
    fn from(e: LayoutError) -> Self {
        Self::Layout(e)
    }
}
