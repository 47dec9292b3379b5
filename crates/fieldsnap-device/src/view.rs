//! Typed strided views over borrowed memory.
//!
//! A view never owns its storage. It is built either from a slice plus a
//! [`Layout`] that is checked to fit, or from an exchange descriptor through
//! [`Exported::borrow_typed`], which is the only way foreign memory becomes a
//! typed view.

use std::ops::Range;

use fieldsnap_core::{
    Device, Element, ExchangeError, Exportable, ExportableMut, Exported, ExportedMut, Layout,
    LayoutError,
};

/// Shared strided view of `T` elements on some device.
#[derive(Clone, Debug)]
pub struct StridedView<'a, T> {
    data: &'a [T],
    layout: Layout,
    device: Device,
}

impl<'a, T: Element> StridedView<'a, T> {
    /// View `data` through `layout`.
    pub fn new(data: &'a [T], layout: Layout, device: Device) -> Result<Self, LayoutError> {
        layout.check_fits(data.len())?;
        Ok(Self {
            data,
            layout,
            device,
        })
    }

    /// Contiguous 1-D view of a whole slice.
    pub fn from_slice(data: &'a [T], device: Device) -> Self {
        Self {
            data,
            layout: Layout::contiguous(&[data.len()]),
            device,
        }
    }

    /// Reinterpret exchanged memory as a typed view without copying.
    ///
    /// `device` is the device the caller runs on; memory recorded on any
    /// other device is rejected.
    pub fn from_exchange(exported: &Exported<'a>, device: Device) -> Result<Self, ExchangeError> {
        let borrow = exported.borrow_typed::<T>(device)?;
        Ok(Self {
            data: borrow.data,
            layout: borrow.layout,
            device,
        })
    }

    /// The view's layout.
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Extent of each axis.
    pub fn shape(&self) -> &[usize] {
        self.layout.shape()
    }

    /// Number of axes.
    pub fn ndim(&self) -> usize {
        self.layout.ndim()
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.layout.len()
    }

    /// Returns `true` if the view has no elements.
    pub fn is_empty(&self) -> bool {
        self.layout.is_empty()
    }

    /// Device the memory lives on.
    pub fn device(&self) -> Device {
        self.device
    }

    /// Element at `index`, or `None` if out of range.
    pub fn get(&self, index: &[usize]) -> Option<T> {
        self.layout.offset_of(index).map(|at| self.data[at])
    }

    /// Elements in row-major index order.
    pub fn iter(&self) -> impl Iterator<Item = T> + '_ {
        self.layout.offsets().map(|at| self.data[at])
    }

    /// Gather the elements into a contiguous `Vec`.
    pub fn to_vec(&self) -> Vec<T> {
        self.iter().collect()
    }

    /// The elements as one slice, if the layout is contiguous.
    pub fn as_contiguous(&self) -> Option<&'a [T]> {
        if !self.layout.is_contiguous() {
            return None;
        }
        Some(&self.data[..self.layout.len()])
    }

    /// Sub-view with axis 0 fixed at `index`.
    pub fn row(&self, index: usize) -> Result<StridedView<'a, T>, LayoutError> {
        Ok(StridedView {
            data: self.data,
            layout: self.layout.select(0, index)?,
            device: self.device,
        })
    }

    /// Sub-view restricted to `range` along `axis`.
    pub fn slice_axis(
        &self,
        axis: usize,
        range: Range<usize>,
    ) -> Result<StridedView<'a, T>, LayoutError> {
        Ok(StridedView {
            data: self.data,
            layout: self.layout.slice_axis(axis, range)?,
            device: self.device,
        })
    }
}

impl<T: Element> Exportable for StridedView<'_, T> {
    fn export(&self) -> Exported<'_> {
        Exported::from_slice(self.data, &self.layout, self.device)
            .expect("view layout validated against its storage")
    }
}

/// Exclusive strided view of `T` elements on some device.
#[derive(Debug)]
pub struct StridedViewMut<'a, T> {
    data: &'a mut [T],
    layout: Layout,
    device: Device,
}

impl<'a, T: Element> StridedViewMut<'a, T> {
    /// View `data` mutably through `layout`.
    pub fn new(data: &'a mut [T], layout: Layout, device: Device) -> Result<Self, LayoutError> {
        layout.check_fits(data.len())?;
        Ok(Self {
            data,
            layout,
            device,
        })
    }

    /// Contiguous 1-D view of a whole slice.
    pub fn from_slice_mut(data: &'a mut [T], device: Device) -> Self {
        let layout = Layout::contiguous(&[data.len()]);
        Self {
            data,
            layout,
            device,
        }
    }

    /// Reinterpret exclusively exchanged memory as a typed view.
    pub fn from_exchange(exported: ExportedMut<'a>, device: Device) -> Result<Self, ExchangeError> {
        let borrow = exported.into_typed_mut::<T>(device)?;
        Ok(Self {
            data: borrow.data,
            layout: borrow.layout,
            device,
        })
    }

    /// Shared reborrow.
    pub fn as_view(&self) -> StridedView<'_, T> {
        StridedView {
            data: &*self.data,
            layout: self.layout.clone(),
            device: self.device,
        }
    }

    /// The view's layout.
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Extent of each axis.
    pub fn shape(&self) -> &[usize] {
        self.layout.shape()
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.layout.len()
    }

    /// Returns `true` if the view has no elements.
    pub fn is_empty(&self) -> bool {
        self.layout.is_empty()
    }

    /// Device the memory lives on.
    pub fn device(&self) -> Device {
        self.device
    }

    /// Mutable element at `index`, or `None` if out of range.
    pub fn get_mut(&mut self, index: &[usize]) -> Option<&mut T> {
        let at = self.layout.offset_of(index)?;
        Some(&mut self.data[at])
    }

    /// Exclusive sub-view with axis 0 fixed at `index`.
    pub fn row_mut(&mut self, index: usize) -> Result<StridedViewMut<'_, T>, LayoutError> {
        let layout = self.layout.select(0, index)?;
        Ok(StridedViewMut {
            data: &mut *self.data,
            layout,
            device: self.device,
        })
    }

    /// Apply `f` to every element in row-major order.
    ///
    /// Elements aliased by a zero stride are visited once per index.
    pub fn for_each_mut(&mut self, mut f: impl FnMut(&mut T)) {
        for at in self.layout.offsets() {
            f(&mut self.data[at]);
        }
    }

    /// Set every element to `value`.
    pub fn fill(&mut self, value: T) {
        self.for_each_mut(|v| *v = value);
    }

    /// Combine each element with the matching element of `rhs`.
    pub fn zip_apply(
        &mut self,
        rhs: &StridedView<'_, T>,
        mut f: impl FnMut(&mut T, T),
    ) -> Result<(), LayoutError> {
        if self.shape() != rhs.shape() {
            return Err(LayoutError::ShapeMismatch {
                expected: self.shape().to_vec(),
                found: rhs.shape().to_vec(),
            });
        }
        for (at, value) in self.layout.offsets().zip(rhs.iter()) {
            f(&mut self.data[at], value);
        }
        Ok(())
    }

    /// Overwrite every element with the matching element of `src`.
    pub fn copy_from(&mut self, src: &StridedView<'_, T>) -> Result<(), LayoutError> {
        self.zip_apply(src, |dst, value| *dst = value)
    }
}

impl<T: Element> Exportable for StridedViewMut<'_, T> {
    fn export(&self) -> Exported<'_> {
        Exported::from_slice(&*self.data, &self.layout, self.device)
            .expect("view layout validated against its storage")
    }
}

impl<T: Element> ExportableMut for StridedViewMut<'_, T> {
    fn export_mut(&mut self) -> ExportedMut<'_> {
        ExportedMut::from_slice_mut(&mut *self.data, &self.layout, self.device)
            .expect("view layout validated against its storage")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fieldsnap_core::Dims;

    const ACCEL: Device = Device::accelerator(0);

    #[test]
    fn new_rejects_short_storage() {
        let data = [0.0f64; 5];
        let err = StridedView::new(&data, Layout::contiguous(&[2, 3]), Device::Host).unwrap_err();
        assert_eq!(
            err,
            LayoutError::OutOfBounds {
                span: 6,
                available: 5
            }
        );
    }

    #[test]
    fn strided_view_gathers() {
        let data: Vec<f64> = (0..10).map(f64::from).collect();
        let layout = Layout::new(&[4], &[3], 0).unwrap();
        let view = StridedView::new(&data, layout, Device::Host).unwrap();
        assert_eq!(view.to_vec(), vec![0.0, 3.0, 6.0, 9.0]);
        assert!(view.as_contiguous().is_none());
    }

    #[test]
    fn rows_and_column_slices() {
        let data: Vec<f32> = (0..12).map(|v| v as f32).collect();
        let view = StridedView::new(&data, Layout::contiguous(&[3, 4]), ACCEL).unwrap();
        assert_eq!(view.row(1).unwrap().to_vec(), vec![4.0, 5.0, 6.0, 7.0]);
        let inner = view.slice_axis(1, 1..3).unwrap();
        assert_eq!(inner.shape(), &[3, 2]);
        assert_eq!(inner.to_vec(), vec![1.0, 2.0, 5.0, 6.0, 9.0, 10.0]);
        assert_eq!(inner.get(&[2, 1]), Some(10.0));
        assert_eq!(view.row(1).unwrap().as_contiguous(), Some(&data[4..8]));
    }

    #[test]
    fn exchange_round_trip_preserves_strides() {
        let data: Vec<f64> = (0..12).map(f64::from).collect();
        let view = StridedView::new(&data, Layout::contiguous(&[3, 4]), ACCEL).unwrap();
        let column = view.slice_axis(1, 2..3).unwrap();
        let exported = column.export();
        assert_eq!(exported.descriptor().shape, Dims::from_slice(&[3, 1]));
        let imported = StridedView::<f64>::from_exchange(&exported, ACCEL).unwrap();
        assert_eq!(imported.to_vec(), vec![2.0, 6.0, 10.0]);
    }

    #[test]
    fn exchange_rejects_wrong_device() {
        let data = [1.0f64; 3];
        let view = StridedView::from_slice(&data, Device::Host);
        let exported = view.export();
        let err = StridedView::<f64>::from_exchange(&exported, ACCEL).unwrap_err();
        assert!(matches!(err, ExchangeError::DeviceMismatch { .. }));
    }

    #[test]
    fn copy_from_requires_matching_shape() {
        let mut dst = [0.0f64; 4];
        let src = [1.0f64, 2.0, 3.0];
        let mut view = StridedViewMut::from_slice_mut(&mut dst, ACCEL);
        let err = view
            .copy_from(&StridedView::from_slice(&src, ACCEL))
            .unwrap_err();
        assert!(matches!(err, LayoutError::ShapeMismatch { .. }));
    }

    #[test]
    fn row_mut_writes_only_its_row() {
        let mut data = [0.0f64; 6];
        let mut view = StridedViewMut::new(&mut data, Layout::contiguous(&[2, 3]), ACCEL).unwrap();
        view.row_mut(1).unwrap().fill(7.0);
        *view.get_mut(&[0, 2]).unwrap() = 1.0;
        assert_eq!(data, [0.0, 0.0, 1.0, 7.0, 7.0, 7.0]);
    }

    #[test]
    fn mutable_exchange_modifies_owner() {
        let mut data = [1.0f64, 2.0, 3.0, 4.0];
        {
            let mut owner = StridedViewMut::from_slice_mut(&mut data, ACCEL);
            let exported = owner.export_mut();
            let mut imported = StridedViewMut::<f64>::from_exchange(exported, ACCEL).unwrap();
            imported.for_each_mut(|v| *v += 10.0);
        }
        assert_eq!(data, [11.0, 12.0, 13.0, 14.0]);
    }
}
