//! Collector error types.

use std::error::Error;
use std::fmt;

use fieldsnap_core::{Device, ExchangeError, LayoutError};
use fieldsnap_device::DeviceError;

use crate::config::ConfigError;

/// Errors from [`SnapshotCollector`](crate::SnapshotCollector) operations.
///
/// A failed `collect` leaves the buffer and the cursor unchanged.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CollectError {
    /// Every row is written and the overflow policy is `Reject`.
    CapacityExhausted {
        /// Rows in the buffer.
        capacity: usize,
    },
    /// The sample's length differs from the row width.
    WidthMismatch {
        /// Row width of the buffer.
        expected: usize,
        /// Length of the sample.
        found: usize,
    },
    /// The sample is not a 1-D array.
    NotOneDimensional {
        /// Number of axes in the sample.
        ndim: usize,
    },
    /// The sample lives on a different device than the buffer.
    DeviceMismatch {
        /// The buffer's device.
        expected: Device,
        /// The sample's device.
        found: Device,
    },
    /// The sample's exchange descriptor could not be borrowed.
    Exchange(ExchangeError),
    /// Allocation or a device operation failed.
    Device(DeviceError),
    /// The collector configuration is invalid.
    Config(ConfigError),
    /// A row index or layout was invalid.
    Layout(LayoutError),
}

impl fmt::Display for CollectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CapacityExhausted { capacity } => {
                write!(f, "snapshot buffer full ({capacity} rows)")
            }
            Self::WidthMismatch { expected, found } => {
                write!(f, "sample has {found} elements, rows hold {expected}")
            }
            Self::NotOneDimensional { ndim } => {
                write!(f, "sample must be 1-D, got {ndim} axes")
            }
            Self::DeviceMismatch { expected, found } => {
                write!(f, "sample on {found}, buffer on {expected}")
            }
            Self::Exchange(e) => write!(f, "cannot borrow sample: {e}"),
            Self::Device(e) => write!(f, "device error: {e}"),
            Self::Config(e) => write!(f, "invalid collector config: {e}"),
            Self::Layout(e) => write!(f, "layout error: {e}"),
        }
    }
}

impl Error for CollectError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Exchange(e) => Some(e),
            Self::Device(e) => Some(e),
            Self::Config(e) => Some(e),
            Self::Layout(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ExchangeError> for CollectError {
    fn from(e: ExchangeError) -> Self {
        Self::Exchange(e)
    }
}

impl From<DeviceError> for CollectError {
    fn from(e: DeviceError) -> Self {
        Self::Device(e)
    }
}

impl From<ConfigError> for CollectError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<LayoutError> for CollectError {
    fn from(e: LayoutError) -> Self {
        Self::Layout(e)
    }
}
