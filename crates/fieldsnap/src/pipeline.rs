//! Host/device transform demos.
//!
//! Both functions apply `b *= 5; b *= b; b += b` on the accelerator. They
//! differ in where `b` comes from: [`transform_uploaded`] copies host data to
//! a fresh device array, [`transform_in_place`] borrows device memory owned
//! by someone else through an exchange descriptor and modifies it directly.

use fieldsnap_core::{Element, ExportedMut};
use fieldsnap_device::{Accelerator, DeviceArray, DeviceError, StridedView, StridedViewMut};

/// Upload `host` and transform the device copy. The host data is untouched.
pub fn transform_uploaded<T: Element>(
    acc: &Accelerator,
    host: &StridedView<'_, T>,
) -> Result<DeviceArray<T>, DeviceError> {
    let mut b = acc.upload(host)?;
    transform_view(acc, &mut b.view_mut())?;
    Ok(b)
}

/// Transform exchanged device memory in place, without copying.
pub fn transform_in_place<T: Element>(
    acc: &Accelerator,
    memory: ExportedMut<'_>,
) -> Result<(), DeviceError> {
    let mut view = StridedViewMut::<T>::from_exchange(memory, acc.device())?;
    transform_view(acc, &mut view)
}

/// `b *= 5; b *= b; b += b` on a view resident on `acc`.
pub fn transform_view<T: Element>(
    acc: &Accelerator,
    b: &mut StridedViewMut<'_, T>,
) -> Result<(), DeviceError> {
    acc.scale(b, T::from_f64(5.0))?;
    acc.square(b)?;
    acc.double(b)?;
    log::debug!("transformed {:?} on {}", b.shape(), acc.device());
    Ok(())
}
