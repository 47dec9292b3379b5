//! Analysis error types.

use std::error::Error;
use std::fmt;

use fieldsnap_collect::CollectError;
use fieldsnap_core::LayoutError;
use fieldsnap_device::DeviceError;
use fieldsnap_tensor::TensorError;

/// Errors from [`analyze`](crate::analyze) and friends.
#[derive(Clone, Debug, PartialEq)]
pub enum AnalysisError {
    /// An [`AnalysisConfig`](crate::AnalysisConfig) invariant is violated.
    InvalidConfig {
        /// Which invariant.
        reason: String,
    },
    /// The column trim leaves no columns.
    ColumnsOutOfRange {
        /// Columns dropped at the start.
        leading: usize,
        /// Columns dropped at the end.
        trailing: usize,
        /// Row width.
        width: usize,
    },
    /// Decomposition input is not a matrix.
    NotTwoDimensional {
        /// Axes in the input.
        ndim: usize,
    },
    /// The input holds NaN or an infinity.
    NonFinite {
        /// Row of the first offending element.
        row: usize,
        /// Column of the first offending element.
        col: usize,
    },
    /// The SVD iteration did not converge.
    NoConvergence,
    /// Reading the collector failed.
    Collect(CollectError),
    /// A device transfer failed.
    Device(DeviceError),
    /// Slicing the buffer failed.
    Layout(LayoutError),
    /// Tensor import or arithmetic failed.
    Tensor(TensorError),
}

impl fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidConfig { reason } => write!(f, "invalid analysis config: {reason}"),
            Self::ColumnsOutOfRange {
                leading,
                trailing,
                width,
            } => write!(
                f,
                "dropping {leading} leading and {trailing} trailing columns leaves nothing of {width}"
            ),
            Self::NotTwoDimensional { ndim } => {
                write!(f, "decomposition needs a matrix, got {ndim} axes")
            }
            Self::NonFinite { row, col } => write!(f, "non-finite value at ({row}, {col})"),
            Self::NoConvergence => write!(f, "SVD did not converge"),
            Self::Collect(e) => write!(f, "collector error: {e}"),
            Self::Device(e) => write!(f, "device error: {e}"),
            Self::Layout(e) => write!(f, "layout error: {e}"),
            Self::Tensor(e) => write!(f, "tensor error: {e}"),
        }
    }
}

impl Error for AnalysisError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Collect(e) => Some(e),
            Self::Device(e) => Some(e),
            Self::Layout(e) => Some(e),
            Self::Tensor(e) => Some(e),
            _ => None,
        }
    }
}

impl From<CollectError> for AnalysisError {
    fn from(e: CollectError) -> Self {
        Self::Collect(e)
    }
}

impl From<DeviceError> for AnalysisError {
    fn from(e: DeviceError) -> Self {
        Self::Device(e)
    }
}

impl From<LayoutError> for AnalysisError {
    fn from(e: LayoutError) -> Self {
        Self::Layout(e)
    }
}

impl From<TensorError> for AnalysisError {
    fn from(e: TensorError) -> Self {
        Self::Tensor(e)
    }
}
