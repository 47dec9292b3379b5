//! Memory residency.

use std::fmt;

/// Where a buffer's memory lives.
///
/// Transfers between [`Device::Host`] and an accelerator are always explicit;
/// nothing in the workspace moves data across implicitly.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Device {
    /// Ordinary CPU memory.
    Host,
    /// Accelerator memory, identified by ordinal.
    Accelerator {
        /// Zero-based accelerator index.
        ordinal: u32,
    },
}

impl Device {
    /// Shorthand for `Device::Accelerator { ordinal }`.
    pub const fn accelerator(ordinal: u32) -> Self {
        Self::Accelerator { ordinal }
    }

    /// Returns `true` for [`Device::Host`].
    pub fn is_host(self) -> bool {
        matches!(self, Self::Host)
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Host => write!(f, "host"),
            Self::Accelerator { ordinal } => write!(f, "accel:{ordinal}"),
        }
    }
}
