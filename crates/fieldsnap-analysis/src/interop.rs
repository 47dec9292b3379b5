//! Zero-copy hand-off of the snapshot buffer to `fieldsnap-tensor`.

use fieldsnap_collect::SnapshotCollector;
use fieldsnap_core::{Device, Element, Exportable};
use fieldsnap_tensor::{add, reduce_sum, sub, Tensor, TensorRef};

use crate::error::AnalysisError;

/// Result of [`analyze_exchange`].
#[derive(Clone, Debug, PartialEq)]
pub struct InteropReport<T> {
    /// Device the imported tensor reports.
    pub device: Device,
    /// `((x + y) - x) - y` with `x = y = A[0, :]`. All zeros when the
    /// shared memory is read consistently.
    pub residual: Tensor<T>,
    /// Sum of `A[0, :]`.
    pub row_sum: T,
}

impl<T: Element> InteropReport<T> {
    /// Returns `true` if every residual element is exactly zero.
    pub fn residual_is_zero(&self) -> bool {
        self.residual.as_slice().iter().all(|&v| v == T::ZERO)
    }
}

/// Export the collector buffer, import it as a tensor without copying and
/// run a small arithmetic check on row 0.
pub fn analyze_exchange<T: Element>(
    collector: &SnapshotCollector<T>,
) -> Result<InteropReport<T>, AnalysisError> {
    let a = TensorRef::<T>::from_exchange(collector.export())?;
    log::info!("imported {:?} {} tensor on {}", a.shape(), a.dtype(), a.device());

    let x = a.index_axis0(0)?;
    let y = a.index_axis0(0)?;
    let psum1 = add(&x, &y)?;
    let psum2 = sub(&psum1.view(), &x)?;
    let psum3 = sub(&psum2.view(), &y)?;
    let s = reduce_sum(&x);
    log::info!("exchange residual {:?}, row sum {s:?}", psum3.as_slice());

    Ok(InteropReport {
        device: a.device(),
        residual: psum3,
        row_sum: s,
    })
}
