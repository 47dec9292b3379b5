//! Collector configuration and validation.

use std::error::Error;
use std::fmt;

// ── OverflowPolicy ─────────────────────────────────────────────────

/// What [`collect`](crate::SnapshotCollector::collect) does once every row
/// of the buffer has been written.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OverflowPolicy {
    /// Refuse the sample with
    /// [`CapacityExhausted`](crate::CollectError::CapacityExhausted).
    #[default]
    Reject,
    /// Extend the device buffer by `rows` zeroed rows, then write.
    Grow {
        /// Rows added per growth step. Must be non-zero.
        rows: usize,
    },
    /// Treat the buffer as a ring: write to row `cursor % capacity`.
    Wrap,
}

// ── CollectorConfig ────────────────────────────────────────────────

/// Shape and overflow behaviour of a [`SnapshotCollector`](crate::SnapshotCollector).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CollectorConfig {
    /// Number of snapshot rows (maximum timesteps). Default: 2001.
    pub rows: usize,
    /// Elements per row (field width including ghost cells). Default: 258.
    pub width: usize,
    /// Behaviour once `rows` samples have been collected. Default: `Reject`.
    pub overflow: OverflowPolicy,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            rows: 2001,
            width: 258,
            overflow: OverflowPolicy::Reject,
        }
    }
}

impl CollectorConfig {
    /// A `rows` × `width` collector that rejects overflow.
    pub fn new(rows: usize, width: usize) -> Self {
        Self {
            rows,
            width,
            overflow: OverflowPolicy::Reject,
        }
    }

    /// Replace the overflow policy.
    pub fn with_overflow(mut self, overflow: OverflowPolicy) -> Self {
        self.overflow = overflow;
        self
    }

    /// Check structural invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rows == 0 {
            return Err(ConfigError::ZeroRows);
        }
        if self.width == 0 {
            return Err(ConfigError::ZeroWidth);
        }
        if self.rows.checked_mul(self.width).is_none() {
            return Err(ConfigError::BufferTooLarge {
                rows: self.rows,
                width: self.width,
            });
        }
        if self.overflow == (OverflowPolicy::Grow { rows: 0 }) {
            return Err(ConfigError::ZeroGrowth);
        }
        Ok(())
    }
}

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected by [`CollectorConfig::validate`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// `rows` is zero.
    ZeroRows,
    /// `width` is zero.
    ZeroWidth,
    /// `rows * width` overflows `usize`.
    BufferTooLarge {
        /// Configured rows.
        rows: usize,
        /// Configured width.
        width: usize,
    },
    /// `OverflowPolicy::Grow` with a growth step of zero.
    ZeroGrowth,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroRows => write!(f, "collector must have at least one row"),
            Self::ZeroWidth => write!(f, "collector rows must have at least one element"),
            Self::BufferTooLarge { rows, width } => {
                write!(f, "buffer of {rows} x {width} elements overflows usize")
            }
            Self::ZeroGrowth => write!(f, "grow policy must add at least one row"),
        }
    }
}

impl Error for ConfigError {}
