//! Owned device and host arrays.

use std::ops::Range;
use std::sync::Arc;

use fieldsnap_core::{
    Device, Dims, Element, Exportable, ExportableMut, Exported, ExportedMut, Layout, LayoutError,
};

use crate::accelerator::{byte_len, checked_len, Ledger};
use crate::error::DeviceError;
use crate::view::{StridedView, StridedViewMut};

/// Contiguous row-major array resident on an accelerator.
///
/// Created by [`Accelerator::zeros`](crate::Accelerator::zeros) or
/// [`Accelerator::upload`](crate::Accelerator::upload). Its bytes stay
/// charged to the accelerator's ledger until it is dropped.
pub struct DeviceArray<T: Element> {
    data: Vec<T>,
    layout: Layout,
    device: Device,
    ledger: Arc<Ledger>,
}

impl<T: Element> DeviceArray<T> {
    /// Wrap storage already charged to `ledger`.
    pub(crate) fn from_parts(
        data: Vec<T>,
        layout: Layout,
        device: Device,
        ledger: Arc<Ledger>,
    ) -> Self {
        debug_assert_eq!(data.len(), layout.len());
        Self {
            data,
            layout,
            device,
            ledger,
        }
    }

    /// Extent of each axis.
    pub fn shape(&self) -> &[usize] {
        self.layout.shape()
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the array has no elements.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Size of the allocation in bytes.
    pub fn byte_len(&self) -> usize {
        self.data.len() * T::DTYPE.size_bytes()
    }

    /// Device the array lives on.
    pub fn device(&self) -> Device {
        self.device
    }

    /// Shared view of the whole array.
    pub fn view(&self) -> StridedView<'_, T> {
        StridedView::new(&self.data, self.layout.clone(), self.device)
            .expect("contiguous layout matches storage length")
    }

    /// Exclusive view of the whole array.
    pub fn view_mut(&mut self) -> StridedViewMut<'_, T> {
        StridedViewMut::new(&mut self.data, self.layout.clone(), self.device)
            .expect("contiguous layout matches storage length")
    }

    /// Shared view of row `index` (axis 0).
    pub fn row(&self, index: usize) -> Result<StridedView<'_, T>, LayoutError> {
        let layout = self.layout.select(0, index)?;
        StridedView::new(&self.data, layout, self.device)
    }

    /// Exclusive view of row `index` (axis 0).
    pub fn row_mut(&mut self, index: usize) -> Result<StridedViewMut<'_, T>, LayoutError> {
        let layout = self.layout.select(0, index)?;
        StridedViewMut::new(&mut self.data, layout, self.device)
    }

    /// Shared view of `range` along `axis`.
    pub fn slice_axis(
        &self,
        axis: usize,
        range: Range<usize>,
    ) -> Result<StridedView<'_, T>, LayoutError> {
        let layout = self.layout.slice_axis(axis, range)?;
        StridedView::new(&self.data, layout, self.device)
    }

    /// Set every element to `value`.
    pub fn fill(&mut self, value: T) {
        self.data.fill(value);
    }

    /// Append `extra` zeroed entries along axis 0.
    ///
    /// The new bytes are charged to the ledger before the storage grows;
    /// on failure the array is unchanged.
    pub fn grow_rows(&mut self, extra: usize) -> Result<(), DeviceError> {
        if self.layout.ndim() == 0 {
            return Err(LayoutError::AxisOutOfRange { axis: 0, ndim: 0 }.into());
        }
        let mut shape: Dims = self.layout.shape().iter().copied().collect();
        shape[0] = shape[0].checked_add(extra).ok_or(DeviceError::SizeOverflow)?;
        let new_len = checked_len(&shape)?;
        let added = byte_len::<T>(new_len - self.data.len())?;
        self.ledger.reserve(added)?;
        self.data.resize(new_len, T::ZERO);
        self.layout = Layout::contiguous(&shape);
        log::debug!("{}: grew array to {:?} (+{added} bytes)", self.device, self.layout.shape());
        Ok(())
    }
}

impl<T: Element> Drop for DeviceArray<T> {
    fn drop(&mut self) {
        self.ledger.release(self.byte_len());
    }
}

impl<T: Element> std::fmt::Debug for DeviceArray<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceArray")
            .field("dtype", &T::DTYPE)
            .field("shape", &self.layout.shape())
            .field("device", &self.device)
            .finish()
    }
}

impl<T: Element> Exportable for DeviceArray<T> {
    fn export(&self) -> Exported<'_> {
        Exported::from_slice(&self.data, &self.layout, self.device)
            .expect("contiguous layout matches storage length")
    }
}

impl<T: Element> ExportableMut for DeviceArray<T> {
    fn export_mut(&mut self) -> ExportedMut<'_> {
        ExportedMut::from_slice_mut(&mut self.data, &self.layout, self.device)
            .expect("contiguous layout matches storage length")
    }
}

/// Contiguous row-major array in host memory.
#[derive(Clone, Debug, PartialEq)]
pub struct HostArray<T> {
    data: Vec<T>,
    shape: Dims,
}

impl<T: Element> HostArray<T> {
    /// Wrap `data` with `shape`. `data.len()` must equal the shape's product.
    pub(crate) fn new(data: Vec<T>, shape: &[usize]) -> Self {
        debug_assert_eq!(data.len(), shape.iter().product::<usize>());
        Self {
            data,
            shape: shape.iter().copied().collect(),
        }
    }

    /// Extent of each axis.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// All elements in row-major order.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Consume into the row-major element vector.
    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    /// Element at `index`, or `None` if out of range.
    pub fn get(&self, index: &[usize]) -> Option<T> {
        Layout::contiguous(&self.shape)
            .offset_of(index)
            .map(|at| self.data[at])
    }

    /// Row `index` of a 2-D array, or `None` if out of range.
    pub fn row(&self, index: usize) -> Option<&[T]> {
        if self.shape.len() != 2 || index >= self.shape[0] {
            return None;
        }
        let width = self.shape[1];
        Some(&self.data[index * width..(index + 1) * width])
    }

    /// Host view of the whole array.
    pub fn view(&self) -> StridedView<'_, T> {
        StridedView::new(&self.data, Layout::contiguous(&self.shape), Device::Host)
            .expect("contiguous layout matches storage length")
    }
}
