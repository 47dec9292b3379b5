//! Library-agnostic buffer exchange.
//!
//! An [`ExchangeDescriptor`] describes array memory the way DLPack and the
//! NumPy array interface do: base pointer, byte offset, dtype, device, shape
//! and byte strides. [`Exported`] and [`ExportedMut`] pair a descriptor with
//! the lifetime of the borrow it was taken from, so any library can import the
//! memory without copying and without a dependency on the exporter.
//!
//! Importers never do pointer arithmetic themselves. They call
//! [`Exported::borrow_typed`] (or [`ExportedMut::into_typed_mut`]), which
//! checks dtype, device, alignment and layout and hands back an ordinary
//! slice plus the [`Layout`] that indexes into it.

use std::ffi::c_void;
use std::marker::PhantomData;
use std::ptr::NonNull;

use crate::device::Device;
use crate::dtype::{DType, Element};
use crate::error::{ExchangeError, LayoutError};
use crate::layout::{Dims, Layout, Strides};

/// Raw description of strided array memory.
#[derive(Clone, Debug)]
pub struct ExchangeDescriptor {
    /// Base address of the allocation.
    pub data: *mut c_void,
    /// Byte offset from `data` to element `[0, 0, ...]`.
    pub byte_offset: usize,
    /// Element type.
    pub dtype: DType,
    /// Device the memory lives on.
    pub device: Device,
    /// Extent of each axis.
    pub shape: Dims,
    /// Distance in bytes between consecutive elements along each axis.
    pub byte_strides: Strides,
    /// Whether the exporter forbids writes through this descriptor.
    pub read_only: bool,
}

impl ExchangeDescriptor {
    /// Element layout relative to the lowest addressed element.
    pub fn layout(&self) -> Result<Layout, LayoutError> {
        Layout::from_byte_strides(&self.shape, &self.byte_strides, self.dtype)
    }

    /// Number of axes.
    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// Number of elements described.
    pub fn len(&self) -> usize {
        self.shape.iter().product()
    }

    /// Returns `true` if the described array has no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn describe<T: Element>(
    storage: *const T,
    layout: &Layout,
    device: Device,
    read_only: bool,
) -> ExchangeDescriptor {
    ExchangeDescriptor {
        data: storage as *mut c_void,
        byte_offset: layout.offset() * T::DTYPE.size_bytes(),
        dtype: T::DTYPE,
        device,
        shape: layout.shape().iter().copied().collect(),
        byte_strides: layout.byte_strides(T::DTYPE),
        read_only,
    }
}

/// Validate `desc` for an import of `T` on `device`.
///
/// Returns the address of the lowest addressed element and the layout
/// relative to it.
fn resolve<T: Element>(
    desc: &ExchangeDescriptor,
    device: Device,
) -> Result<(*mut T, Layout), ExchangeError> {
    if desc.dtype != T::DTYPE {
        return Err(ExchangeError::DTypeMismatch {
            expected: T::DTYPE,
            found: desc.dtype,
        });
    }
    if desc.device != device {
        return Err(ExchangeError::DeviceMismatch {
            expected: device,
            found: desc.device,
        });
    }
    let layout = desc.layout()?;
    if layout.is_empty() {
        return Ok((NonNull::<T>::dangling().as_ptr(), layout));
    }
    if desc.data.is_null() {
        return Err(ExchangeError::NullPointer);
    }
    let origin = desc.data.cast::<u8>().wrapping_add(desc.byte_offset).cast::<T>();
    if !origin.is_aligned() {
        return Err(ExchangeError::Misaligned {
            address: origin as usize,
            align: T::DTYPE.align_bytes(),
        });
    }
    Ok((origin.wrapping_sub(layout.offset()), layout))
}

/// Typed shared borrow produced by an import.
#[derive(Debug)]
pub struct TypedBorrow<'a, T> {
    /// Storage from the lowest to the highest addressed element.
    pub data: &'a [T],
    /// Layout indexing into `data`.
    pub layout: Layout,
}

/// Typed exclusive borrow produced by an import.
#[derive(Debug)]
pub struct TypedBorrowMut<'a, T> {
    /// Storage from the lowest to the highest addressed element.
    pub data: &'a mut [T],
    /// Layout indexing into `data`.
    pub layout: Layout,
}

/// A descriptor for memory shared-borrowed for `'a`.
#[derive(Clone, Debug)]
pub struct Exported<'a> {
    desc: ExchangeDescriptor,
    _borrow: PhantomData<&'a [u8]>,
}

impl<'a> Exported<'a> {
    /// Wrap a raw descriptor received from foreign code.
    ///
    /// # Safety
    ///
    /// For every element addressable through `desc`, the memory must be
    /// initialised, valid for reads of `desc.dtype`, and not mutated through
    /// any other path for the whole of `'a`.
    #[allow(unsafe_code)]
    pub unsafe fn from_raw(desc: ExchangeDescriptor) -> Self {
        Self {
            desc,
            _borrow: PhantomData,
        }
    }

    /// Describe `layout` over a borrowed slice.
    ///
    /// `device` records where the slice lives; it is not verified.
    pub fn from_slice<T: Element>(
        data: &'a [T],
        layout: &Layout,
        device: Device,
    ) -> Result<Self, LayoutError> {
        layout.check_fits(data.len())?;
        Ok(Self {
            desc: describe(data.as_ptr(), layout, device, true),
            _borrow: PhantomData,
        })
    }

    /// The underlying descriptor.
    pub fn descriptor(&self) -> &ExchangeDescriptor {
        &self.desc
    }

    /// Device recorded in the descriptor.
    pub fn device(&self) -> Device {
        self.desc.device
    }

    /// Element type recorded in the descriptor.
    pub fn dtype(&self) -> DType {
        self.desc.dtype
    }

    /// Borrow the memory as `[T]` for an importer running on `device`.
    pub fn borrow_typed<T: Element>(
        &self,
        device: Device,
    ) -> Result<TypedBorrow<'a, T>, ExchangeError> {
        let (base, layout) = resolve::<T>(&self.desc, device)?;
        // SAFETY: `from_raw` callers promise every addressable element is
        // readable for 'a; `from_slice` checked the layout against a live
        // `&'a [T]`. `resolve` checked dtype, alignment and that `base` is
        // the lowest addressed element, so `span` elements from it are
        // exactly the addressable range.
        #[allow(unsafe_code)]
        let data = unsafe { std::slice::from_raw_parts(base.cast_const(), layout.span()) };
        Ok(TypedBorrow { data, layout })
    }
}

/// A descriptor for memory exclusively borrowed for `'a`.
#[derive(Debug)]
pub struct ExportedMut<'a> {
    desc: ExchangeDescriptor,
    _borrow: PhantomData<&'a mut [u8]>,
}

impl<'a> ExportedMut<'a> {
    /// Wrap a raw descriptor received from foreign code.
    ///
    /// # Safety
    ///
    /// For every element addressable through `desc`, the memory must be
    /// initialised and valid for reads and writes of `desc.dtype`, and no
    /// other path may read or write it for the whole of `'a`.
    #[allow(unsafe_code)]
    pub unsafe fn from_raw(desc: ExchangeDescriptor) -> Self {
        Self {
            desc,
            _borrow: PhantomData,
        }
    }

    /// Describe `layout` over an exclusively borrowed slice.
    pub fn from_slice_mut<T: Element>(
        data: &'a mut [T],
        layout: &Layout,
        device: Device,
    ) -> Result<Self, LayoutError> {
        layout.check_fits(data.len())?;
        Ok(Self {
            desc: describe(data.as_mut_ptr().cast_const(), layout, device, false),
            _borrow: PhantomData,
        })
    }

    /// The underlying descriptor.
    pub fn descriptor(&self) -> &ExchangeDescriptor {
        &self.desc
    }

    /// Device recorded in the descriptor.
    pub fn device(&self) -> Device {
        self.desc.device
    }

    /// Downgrade to a shared export for the duration of the reborrow.
    pub fn as_exported(&self) -> Exported<'_> {
        Exported {
            desc: ExchangeDescriptor {
                read_only: true,
                ..self.desc.clone()
            },
            _borrow: PhantomData,
        }
    }

    /// Borrow the memory as `[T]` for an importer running on `device`.
    pub fn into_typed_mut<T: Element>(
        self,
        device: Device,
    ) -> Result<TypedBorrowMut<'a, T>, ExchangeError> {
        if self.desc.read_only {
            return Err(ExchangeError::ReadOnly);
        }
        let (base, layout) = resolve::<T>(&self.desc, device)?;
        // SAFETY: as in `Exported::borrow_typed`, plus exclusivity for 'a
        // from `from_raw`'s contract or the `&'a mut [T]` in
        // `from_slice_mut`. Consuming `self` prevents a second borrow.
        #[allow(unsafe_code)]
        let data = unsafe { std::slice::from_raw_parts_mut(base, layout.span()) };
        Ok(TypedBorrowMut { data, layout })
    }
}

/// Types that can describe their memory for zero-copy import elsewhere.
pub trait Exportable {
    /// Describe this value's memory for the duration of a shared borrow.
    fn export(&self) -> Exported<'_>;
}

/// Types that can hand out their memory for in-place modification.
pub trait ExportableMut: Exportable {
    /// Describe this value's memory for the duration of an exclusive borrow.
    fn export_mut(&mut self) -> ExportedMut<'_>;
}

#[cfg(test)]
mod tests {
    use super::*;

    const ACCEL: Device = Device::accelerator(0);

    #[test]
    fn slice_export_round_trips() {
        let data = [1.0f64, 2.0, 3.0, 4.0, 5.0, 6.0];
        let layout = Layout::contiguous(&[2, 3]);
        let exported = Exported::from_slice(&data, &layout, ACCEL).unwrap();
        assert_eq!(exported.descriptor().byte_strides.as_slice(), &[24, 8]);
        let borrow = exported.borrow_typed::<f64>(ACCEL).unwrap();
        assert_eq!(borrow.data, &data);
        assert_eq!(borrow.layout, layout);
    }

    #[test]
    fn row_export_points_past_offset() {
        let data: Vec<f32> = (0..12).map(|v| v as f32).collect();
        let row = Layout::contiguous(&[3, 4]).select(0, 1).unwrap();
        let exported = Exported::from_slice(&data, &row, Device::Host).unwrap();
        assert_eq!(exported.descriptor().byte_offset, 16);
        let borrow = exported.borrow_typed::<f32>(Device::Host).unwrap();
        assert_eq!(borrow.data, &[4.0, 5.0, 6.0, 7.0]);
        assert_eq!(borrow.layout.offset(), 0);
    }

    #[test]
    fn dtype_and_device_are_checked() {
        let data = [0.0f32; 4];
        let exported = Exported::from_slice(&data, &Layout::contiguous(&[4]), ACCEL).unwrap();
        assert_eq!(
            exported.borrow_typed::<f64>(ACCEL).unwrap_err(),
            ExchangeError::DTypeMismatch {
                expected: DType::F64,
                found: DType::F32
            }
        );
        assert_eq!(
            exported.borrow_typed::<f32>(Device::Host).unwrap_err(),
            ExchangeError::DeviceMismatch {
                expected: Device::Host,
                found: ACCEL
            }
        );
    }

    #[test]
    fn raw_descriptor_with_gaps_and_negative_stride() {
        let storage = [10.0f64, -1.0, 11.0, -1.0, 12.0];
        let desc = ExchangeDescriptor {
            data: storage.as_ptr() as *mut c_void,
            byte_offset: 4 * 8,
            dtype: DType::F64,
            device: Device::Host,
            shape: Dims::from_slice(&[3]),
            byte_strides: Strides::from_slice(&[-16]),
            read_only: true,
        };
        // SAFETY: `storage` outlives `exported` and is never mutated.
        #[allow(unsafe_code)]
        let exported = unsafe { Exported::from_raw(desc) };
        let borrow = exported.borrow_typed::<f64>(Device::Host).unwrap();
        let values: Vec<f64> = borrow.layout.offsets().map(|o| borrow.data[o]).collect();
        assert_eq!(values, vec![12.0, 11.0, 10.0]);
    }

    #[test]
    fn null_and_misaligned_pointers_are_rejected() {
        let mut desc = ExchangeDescriptor {
            data: std::ptr::null_mut(),
            byte_offset: 0,
            dtype: DType::F64,
            device: Device::Host,
            shape: Dims::from_slice(&[2]),
            byte_strides: Strides::from_slice(&[8]),
            read_only: true,
        };
        #[allow(unsafe_code)]
        let exported = unsafe { Exported::from_raw(desc.clone()) };
        assert_eq!(
            exported.borrow_typed::<f64>(Device::Host).unwrap_err(),
            ExchangeError::NullPointer
        );

        let storage = [0.0f64; 4];
        desc.data = storage.as_ptr() as *mut c_void;
        desc.byte_offset = 1;
        #[allow(unsafe_code)]
        let exported = unsafe { Exported::from_raw(desc) };
        assert!(matches!(
            exported.borrow_typed::<f64>(Device::Host),
            Err(ExchangeError::Misaligned { align: 8, .. })
        ));
    }

    #[test]
    fn empty_descriptor_borrows_empty_slice() {
        let desc = ExchangeDescriptor {
            data: std::ptr::null_mut(),
            byte_offset: 0,
            dtype: DType::F32,
            device: Device::Host,
            shape: Dims::from_slice(&[0]),
            byte_strides: Strides::from_slice(&[4]),
            read_only: true,
        };
        #[allow(unsafe_code)]
        let exported = unsafe { Exported::from_raw(desc) };
        let borrow = exported.borrow_typed::<f32>(Device::Host).unwrap();
        assert!(borrow.data.is_empty());
    }

    #[test]
    fn mutable_export_writes_through() {
        let mut data = [1.0f64, 2.0, 3.0];
        let layout = Layout::contiguous(&[3]);
        let exported = ExportedMut::from_slice_mut(&mut data, &layout, ACCEL).unwrap();
        assert!(exported.as_exported().descriptor().read_only);
        let borrow = exported.into_typed_mut::<f64>(ACCEL).unwrap();
        for v in borrow.data.iter_mut() {
            *v *= 2.0;
        }
        assert_eq!(data, [2.0, 4.0, 6.0]);
    }

    #[test]
    fn read_only_raw_descriptor_refuses_mutable_import() {
        let mut storage = [0.0f32; 2];
        let desc = ExchangeDescriptor {
            data: storage.as_mut_ptr() as *mut c_void,
            byte_offset: 0,
            dtype: DType::F32,
            device: Device::Host,
            shape: Dims::from_slice(&[2]),
            byte_strides: Strides::from_slice(&[4]),
            read_only: true,
        };
        #[allow(unsafe_code)]
        let exported = unsafe { ExportedMut::from_raw(desc) };
        assert_eq!(
            exported.into_typed_mut::<f32>(Device::Host).unwrap_err(),
            ExchangeError::ReadOnly
        );
    }
}
