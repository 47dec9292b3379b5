//! Analysis parameters.

use std::ops::Range;

use crate::error::AnalysisError;

/// Columns dropped from each end of a row before analysis.
///
/// The default drops one ghost cell at each end of the field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ColumnRange {
    /// Columns dropped from the start.
    pub leading: usize,
    /// Columns dropped from the end.
    pub trailing: usize,
}

impl Default for ColumnRange {
    fn default() -> Self {
        Self {
            leading: 1,
            trailing: 1,
        }
    }
}

impl ColumnRange {
    /// Keep every column.
    pub const FULL: Self = Self {
        leading: 0,
        trailing: 0,
    };

    /// The retained column range for rows of `width` elements.
    pub fn resolve(&self, width: usize) -> Result<Range<usize>, AnalysisError> {
        let end = width.checked_sub(self.trailing);
        match end {
            Some(end) if self.leading < end => Ok(self.leading..end),
            _ => Err(AnalysisError::ColumnsOutOfRange {
                leading: self.leading,
                trailing: self.trailing,
                width,
            }),
        }
    }
}

/// Which buffer rows enter the analysis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RowSelection {
    /// Every allocated row, written or not.
    #[default]
    All,
    /// Only rows written since creation or the last reset.
    Collected,
}

/// Parameters of [`analyze`](crate::analyze).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnalysisConfig {
    /// Plot every `trace_stride`-th row in the evolution figure. Default: 400.
    pub trace_stride: usize,
    /// Columns kept for plotting and decomposition. Default: drop one at each end.
    pub columns: ColumnRange,
    /// Leading modes plotted. Default: 3.
    pub mode_count: usize,
    /// Rows analysed. Default: `All`.
    pub rows: RowSelection,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            trace_stride: 400,
            columns: ColumnRange::default(),
            mode_count: 3,
            rows: RowSelection::All,
        }
    }
}

impl AnalysisConfig {
    /// Check structural invariants.
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if self.trace_stride == 0 {
            return Err(AnalysisError::InvalidConfig {
                reason: "trace_stride must be at least 1".into(),
            });
        }
        Ok(())
    }
}
