//! Field-evolution and mode figures for a collected buffer.

use fieldsnap_collect::SnapshotCollector;
use fieldsnap_core::{Element, LayoutError};

use crate::config::{AnalysisConfig, RowSelection};
use crate::error::AnalysisError;
use crate::figure::Figure;
use crate::grid::periodic_coordinates;
use crate::svd::ModeDecomposition;

/// Everything [`analyze`] produces.
#[derive(Clone, Debug)]
pub struct AnalysisReport {
    /// Every `trace_stride`-th row against the periodic grid.
    pub evolution: Figure,
    /// The leading rows of `Vᵀ` against the periodic grid.
    pub modes: Figure,
    /// The decomposition the modes come from.
    pub decomposition: ModeDecomposition,
}

/// Plot the collected field and its leading SVD modes.
///
/// The evolution figure is built from one device-to-host copy of the buffer.
/// The decomposition reads the device buffer directly.
pub fn analyze<T: Element>(
    collector: &SnapshotCollector<T>,
    config: &AnalysisConfig,
) -> Result<AnalysisReport, AnalysisError> {
    config.validate()?;
    let columns = config.columns.resolve(collector.width())?;
    let rows = selected_rows(collector, config);
    let x = periodic_coordinates(columns.len());

    let host = collector.to_host()?;
    let mut evolution = Figure::new("Field evolution", "x", "u");
    for (step, row) in traced_rows(collector, rows).step_by(config.trace_stride) {
        let values = host.row(row).ok_or(LayoutError::IndexOutOfRange {
            index: row,
            len: host.shape()[0],
        })?;
        let y = values[columns.clone()].iter().map(|v| v.to_f64()).collect();
        evolution.push(format!("Timestep {step}"), x.clone(), y);
    }

    let decomposition = decompose_collector(collector, config)?;

    let mut modes = Figure::new("SVD Eigenvectors", "x", "v");
    for k in 0..config.mode_count.min(decomposition.len()) {
        if let Some(v) = decomposition.mode(k) {
            modes.push(format!("Mode {k}"), x.clone(), v);
        }
    }

    Ok(AnalysisReport {
        evolution,
        modes,
        decomposition,
    })
}

/// Reduced SVD of the configured rows and columns of the device buffer.
///
/// Rows enter in buffer order, so after a wrap the rows of `U` follow the
/// ring rather than time. Singular values and `Vᵀ` do not depend on row order.
pub fn decompose_collector<T: Element>(
    collector: &SnapshotCollector<T>,
    config: &AnalysisConfig,
) -> Result<ModeDecomposition, AnalysisError> {
    let columns = config.columns.resolve(collector.width())?;
    let rows = selected_rows(collector, config);
    let view = collector
        .buffer()
        .slice_axis(0, 0..rows)?
        .slice_axis(1, columns)?;
    log::info!("performing SVD");
    let decomposition = ModeDecomposition::decompose(&view)?;
    log::debug!(
        "SVD of {:?} on {}: leading values {:?}",
        view.shape(),
        view.device(),
        &decomposition.singular_values()[..decomposition.len().min(3)]
    );
    Ok(decomposition)
}

/// `(timestep, row)` pairs for the first `rows` buffer rows, oldest first.
///
/// A wrapped ring is walked from its oldest row so traces carry the
/// timestep they were collected at.
fn traced_rows<T: Element>(
    collector: &SnapshotCollector<T>,
    rows: usize,
) -> Box<dyn Iterator<Item = (usize, usize)> + '_> {
    if collector.has_wrapped() {
        Box::new(collector.chronological_rows())
    } else {
        Box::new((0..rows).map(|i| (i, i)))
    }
}

fn selected_rows<T: Element>(collector: &SnapshotCollector<T>, config: &AnalysisConfig) -> usize {
    match config.rows {
        RowSelection::All => collector.capacity(),
        RowSelection::Collected => collector.rows_filled(),
    }
}
