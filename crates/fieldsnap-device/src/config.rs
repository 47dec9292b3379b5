//! Accelerator configuration.

use crate::error::DeviceError;

/// Configuration for an [`Accelerator`](crate::Accelerator).
#[derive(Clone, Debug)]
pub struct AcceleratorConfig {
    /// Accelerator ordinal. Default: 0.
    pub ordinal: u32,
    /// Upper bound on live device allocations in bytes. `None` = unlimited.
    pub memory_limit_bytes: Option<usize>,
}

impl Default for AcceleratorConfig {
    fn default() -> Self {
        Self {
            ordinal: 0,
            memory_limit_bytes: None,
        }
    }
}

impl AcceleratorConfig {
    /// Config for accelerator `ordinal` with no memory limit.
    pub fn new(ordinal: u32) -> Self {
        Self {
            ordinal,
            ..Self::default()
        }
    }

    /// Check structural invariants.
    pub fn validate(&self) -> Result<(), DeviceError> {
        if self.memory_limit_bytes == Some(0) {
            return Err(DeviceError::InvalidConfig {
                reason: "memory_limit_bytes must be non-zero".into(),
            });
        }
        Ok(())
    }
}
