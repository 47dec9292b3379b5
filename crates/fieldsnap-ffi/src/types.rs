//! C-compatible enums and the collector configuration struct.

use fieldsnap_collect::{CollectorConfig, OverflowPolicy};
use fieldsnap_core::DType;
use fieldsnap_device::AcceleratorConfig;

use crate::status::FieldsnapStatus;

/// Element type of a collector and of the samples handed to it.
#[repr(i32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldsnapDType {
    /// 32-bit float.
    F32 = 0,
    /// 64-bit float.
    F64 = 1,
}

impl FieldsnapDType {
    pub(crate) fn from_raw(raw: i32) -> Option<Self> {
        match raw {
            0 => Some(Self::F32),
            1 => Some(Self::F64),
            _ => None,
        }
    }
}

impl From<FieldsnapDType> for DType {
    fn from(d: FieldsnapDType) -> Self {
        match d {
            FieldsnapDType::F32 => DType::F32,
            FieldsnapDType::F64 => DType::F64,
        }
    }
}

/// What a collector does with a sample once every row is written.
#[repr(i32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldsnapOverflow {
    /// Refuse it with `FIELDSNAP_STATUS_CAPACITY_EXHAUSTED`.
    Reject = 0,
    /// Append `grow_rows` zeroed rows, then write it.
    Grow = 1,
    /// Overwrite the oldest row.
    Wrap = 2,
}

/// Collector configuration as passed across the C boundary.
///
/// Fill with `fieldsnap_collector_config_default` and override fields.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldsnapCollectorConfig {
    /// Rows allocated up front.
    pub rows: usize,
    /// Elements per row.
    pub width: usize,
    /// A `FieldsnapOverflow` value.
    pub overflow: i32,
    /// Rows appended per growth when `overflow` is `Grow`.
    pub grow_rows: usize,
    /// A `FieldsnapDType` value.
    pub dtype: i32,
    /// Accelerator ordinal the buffer is allocated on.
    pub device_ordinal: u32,
    /// Device memory cap in bytes. 0 = unlimited.
    pub memory_limit_bytes: usize,
}

impl Default for FieldsnapCollectorConfig {
    fn default() -> Self {
        let base = CollectorConfig::default();
        Self {
            rows: base.rows,
            width: base.width,
            overflow: FieldsnapOverflow::Reject as i32,
            grow_rows: base.rows,
            dtype: FieldsnapDType::F64 as i32,
            device_ordinal: 0,
            memory_limit_bytes: 0,
        }
    }
}

impl FieldsnapCollectorConfig {
    /// Split into the accelerator and collector configs plus the element type.
    ///
    /// Unknown enum values are `InvalidArgument`; structural checks are left
    /// to the Rust configs' own validation.
    pub(crate) fn resolve(
        &self,
    ) -> Result<(AcceleratorConfig, CollectorConfig, FieldsnapDType), FieldsnapStatus> {
        let dtype = FieldsnapDType::from_raw(self.dtype).ok_or(FieldsnapStatus::InvalidArgument)?;
        let overflow = match self.overflow {
            0 => OverflowPolicy::Reject,
            1 => OverflowPolicy::Grow {
                rows: self.grow_rows,
            },
            2 => OverflowPolicy::Wrap,
            _ => return Err(FieldsnapStatus::InvalidArgument),
        };
        let accelerator = AcceleratorConfig {
            ordinal: self.device_ordinal,
            memory_limit_bytes: (self.memory_limit_bytes != 0).then_some(self.memory_limit_bytes),
        };
        let collector = CollectorConfig::new(self.rows, self.width).with_overflow(overflow);
        Ok((accelerator, collector, dtype))
    }
}
