//! C-compatible status codes.
//!
//! [`FieldsnapStatus`] is a `repr(i32)` enum covering every error condition
//! a C caller can observe. Conversions from the Rust error types are
//! provided so entry points can map failures with `FieldsnapStatus::from(&e)`.

use fieldsnap_analysis::AnalysisError;
use fieldsnap_collect::{CollectError, ConfigError};
use fieldsnap_core::ExchangeError;
use fieldsnap_device::DeviceError;

/// C-compatible status code returned by all FFI functions.
///
/// `Ok` = 0, all errors are negative. Values are ABI-stable.
#[repr(i32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldsnapStatus {
    /// Success.
    Ok = 0,
    /// Handle is invalid or was already destroyed.
    InvalidHandle = -1,
    /// An argument is null, out of range, or otherwise invalid.
    InvalidArgument = -2,
    /// Caller-provided buffer is too small.
    BufferTooSmall = -3,
    /// Collector configuration is invalid.
    ConfigError = -4,
    /// Every row is written and the overflow policy rejects more.
    CapacityExhausted = -5,
    /// Sample length differs from the row width.
    WidthMismatch = -6,
    /// Sample is not 1-D.
    NotOneDimensional = -7,
    /// Sample is on a different device than the collector.
    DeviceMismatch = -8,
    /// Sample element type differs from the collector's.
    DTypeMismatch = -9,
    /// Sample pointer is null where elements are addressed.
    NullPointer = -10,
    /// Sample pointer is not aligned for its element type.
    Misaligned = -11,
    /// Sample strides or extents are invalid.
    LayoutError = -12,
    /// Device allocation failed.
    OutOfMemory = -13,
    /// The buffer holds NaN or infinities.
    NonFinite = -14,
    /// Decomposition failed to converge.
    AnalysisFailed = -15,
    /// Internal error (e.g. poisoned mutex after a prior panic).
    InternalError = -20,
    /// A Rust panic was caught at the FFI boundary.
    Panicked = -128,
}

impl From<&ExchangeError> for FieldsnapStatus {
    fn from(e: &ExchangeError) -> Self {
        match e {
            ExchangeError::DTypeMismatch { .. } => FieldsnapStatus::DTypeMismatch,
            ExchangeError::DeviceMismatch { .. } => FieldsnapStatus::DeviceMismatch,
            ExchangeError::NullPointer => FieldsnapStatus::NullPointer,
            ExchangeError::Misaligned { .. } => FieldsnapStatus::Misaligned,
            ExchangeError::ReadOnly => FieldsnapStatus::InvalidArgument,
            ExchangeError::Layout(_) => FieldsnapStatus::LayoutError,
        }
    }
}

impl From<&DeviceError> for FieldsnapStatus {
    fn from(e: &DeviceError) -> Self {
        match e {
            DeviceError::OutOfMemory { .. } | DeviceError::SizeOverflow => {
                FieldsnapStatus::OutOfMemory
            }
            DeviceError::DeviceMismatch { .. } => FieldsnapStatus::DeviceMismatch,
            DeviceError::Layout(_) => FieldsnapStatus::LayoutError,
            DeviceError::Exchange(e) => FieldsnapStatus::from(e),
            DeviceError::InvalidConfig { .. } => FieldsnapStatus::ConfigError,
        }
    }
}

impl From<&ConfigError> for FieldsnapStatus {
    fn from(_e: &ConfigError) -> Self {
        FieldsnapStatus::ConfigError
    }
}

impl From<&CollectError> for FieldsnapStatus {
    fn from(e: &CollectError) -> Self {
        match e {
            CollectError::CapacityExhausted { .. } => FieldsnapStatus::CapacityExhausted,
            CollectError::WidthMismatch { .. } => FieldsnapStatus::WidthMismatch,
            CollectError::NotOneDimensional { .. } => FieldsnapStatus::NotOneDimensional,
            CollectError::DeviceMismatch { .. } => FieldsnapStatus::DeviceMismatch,
            CollectError::Exchange(e) => FieldsnapStatus::from(e),
            CollectError::Device(e) => FieldsnapStatus::from(e),
            CollectError::Config(e) => FieldsnapStatus::from(e),
            CollectError::Layout(_) => FieldsnapStatus::LayoutError,
        }
    }
}

impl From<&AnalysisError> for FieldsnapStatus {
    fn from(e: &AnalysisError) -> Self {
        match e {
            AnalysisError::InvalidConfig { .. } | AnalysisError::ColumnsOutOfRange { .. } => {
                FieldsnapStatus::InvalidArgument
            }
            AnalysisError::NonFinite { .. } => FieldsnapStatus::NonFinite,
            AnalysisError::NotTwoDimensional { .. } | AnalysisError::NoConvergence => {
                FieldsnapStatus::AnalysisFailed
            }
            AnalysisError::Collect(e) => FieldsnapStatus::from(e),
            AnalysisError::Device(e) => FieldsnapStatus::from(e),
            AnalysisError::Layout(_) => FieldsnapStatus::LayoutError,
            AnalysisError::Tensor(_) => FieldsnapStatus::InternalError,
        }
    }
}
