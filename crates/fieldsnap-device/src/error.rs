//! Device-layer error types.

use std::error::Error;
use std::fmt;

use fieldsnap_core::{Device, ExchangeError, LayoutError};

/// Errors from allocation, transfer and kernel execution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DeviceError {
    /// The allocation would exceed the accelerator's memory limit.
    OutOfMemory {
        /// Bytes requested by the allocation.
        requested: usize,
        /// Bytes still available under the limit.
        available: usize,
    },
    /// The requested size does not fit in `usize` bytes.
    SizeOverflow,
    /// An operand lives on a different device than the operation.
    DeviceMismatch {
        /// Device the operation runs on.
        expected: Device,
        /// Device the operand lives on.
        found: Device,
    },
    /// Operand shapes or strides are invalid or disagree.
    Layout(LayoutError),
    /// Importing exchanged memory failed.
    Exchange(ExchangeError),
    /// Configuration rejected by `validate()`.
    InvalidConfig {
        /// Description of the problem.
        reason: String,
    },
}

impl fmt::Display for DeviceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfMemory {
                requested,
                available,
            } => write!(
                f,
                "device out of memory: requested {requested} bytes, {available} bytes available"
            ),
            Self::SizeOverflow => write!(f, "allocation size overflows usize"),
            Self::DeviceMismatch { expected, found } => {
                write!(f, "operand on {found}, expected {expected}")
            }
            Self::Layout(e) => write!(f, "layout error: {e}"),
            Self::Exchange(e) => write!(f, "exchange error: {e}"),
            Self::InvalidConfig { reason } => write!(f, "invalid accelerator config: {reason}"),
        }
    }
}

impl Error for DeviceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Layout(e) => Some(e),
            Self::Exchange(e) => Some(e),
            _ => None,
        }
    }
}

impl From<LayoutError> for DeviceError {
    fn from(e: LayoutError) -> Self {
        Self::Layout(e)
    }
}

impl From<ExchangeError> for DeviceError {
    fn from(e: ExchangeError) -> Self {
        Self::Exchange(e)
    }
}
