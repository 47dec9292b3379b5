//! Elementwise kernels.
//!
//! Every kernel runs on an [`Accelerator`] and refuses operands that live on
//! any other device. In-place kernels take a [`StridedViewMut`], so they
//! work equally on device arrays and on borrowed foreign memory.

use fieldsnap_core::{Element, LayoutError};

use crate::accelerator::Accelerator;
use crate::array::DeviceArray;
use crate::error::DeviceError;
use crate::view::{StridedView, StridedViewMut};

impl Accelerator {
    /// `target *= factor`
    pub fn scale<T: Element>(
        &self,
        target: &mut StridedViewMut<'_, T>,
        factor: T,
    ) -> Result<(), DeviceError> {
        self.map_in_place("scale", target, |v| v * factor)
    }

    /// `target *= target`
    pub fn square<T: Element>(
        &self,
        target: &mut StridedViewMut<'_, T>,
    ) -> Result<(), DeviceError> {
        self.map_in_place("square", target, |v| v * v)
    }

    /// `target += target`
    pub fn double<T: Element>(
        &self,
        target: &mut StridedViewMut<'_, T>,
    ) -> Result<(), DeviceError> {
        self.map_in_place("double", target, |v| v + v)
    }

    /// `target += rhs`, elementwise.
    pub fn add_assign<T: Element>(
        &self,
        target: &mut StridedViewMut<'_, T>,
        rhs: &StridedView<'_, T>,
    ) -> Result<(), DeviceError> {
        self.check_resident(target.device())?;
        self.check_resident(rhs.device())?;
        target.zip_apply(rhs, |dst, v| *dst = *dst + v)?;
        self.record_launch("add_assign", target.len());
        Ok(())
    }

    /// `target = src`, elementwise. Both views must be on this device.
    pub fn copy<T: Element>(
        &self,
        target: &mut StridedViewMut<'_, T>,
        src: &StridedView<'_, T>,
    ) -> Result<(), DeviceError> {
        self.check_resident(target.device())?;
        self.check_resident(src.device())?;
        target.copy_from(src)?;
        self.record_launch("copy", target.len());
        Ok(())
    }

    /// `lhs + rhs` into a new device array.
    pub fn add<T: Element>(
        &self,
        lhs: &StridedView<'_, T>,
        rhs: &StridedView<'_, T>,
    ) -> Result<DeviceArray<T>, DeviceError> {
        self.binary("add", lhs, rhs, |a, b| a + b)
    }

    /// `lhs - rhs` into a new device array.
    pub fn sub<T: Element>(
        &self,
        lhs: &StridedView<'_, T>,
        rhs: &StridedView<'_, T>,
    ) -> Result<DeviceArray<T>, DeviceError> {
        self.binary("sub", lhs, rhs, |a, b| a - b)
    }

    /// Sum of all elements, accumulated in row-major order.
    pub fn sum<T: Element>(&self, input: &StridedView<'_, T>) -> Result<T, DeviceError> {
        self.check_resident(input.device())?;
        let total = input.iter().fold(T::ZERO, |acc, v| acc + v);
        self.record_launch("sum", input.len());
        Ok(total)
    }

    fn map_in_place<T: Element>(
        &self,
        kernel: &'static str,
        target: &mut StridedViewMut<'_, T>,
        f: impl Fn(T) -> T,
    ) -> Result<(), DeviceError> {
        self.check_resident(target.device())?;
        target.for_each_mut(|v| *v = f(*v));
        self.record_launch(kernel, target.len());
        Ok(())
    }

    fn binary<T: Element>(
        &self,
        kernel: &'static str,
        lhs: &StridedView<'_, T>,
        rhs: &StridedView<'_, T>,
        f: impl Fn(T, T) -> T,
    ) -> Result<DeviceArray<T>, DeviceError> {
        self.check_resident(lhs.device())?;
        self.check_resident(rhs.device())?;
        if lhs.shape() != rhs.shape() {
            return Err(LayoutError::ShapeMismatch {
                expected: lhs.shape().to_vec(),
                found: rhs.shape().to_vec(),
            }
            .into());
        }
        let mut out = self.zeros::<T>(lhs.shape())?;
        {
            let mut dst = out.view_mut();
            let mut values = lhs.iter().zip(rhs.iter());
            dst.for_each_mut(|slot| {
                if let Some((a, b)) = values.next() {
                    *slot = f(a, b);
                }
            });
        }
        self.record_launch(kernel, lhs.len());
        Ok(out)
    }
}
