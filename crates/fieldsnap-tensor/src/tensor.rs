//! Borrowed and owned tensors.

use fieldsnap_core::{DType, Device, Dims, Element, Exportable, Exported, Layout};

use crate::error::TensorError;

/// A tensor viewing memory owned elsewhere.
///
/// Imported from an [`Exported`] descriptor; the tensor adopts the device
/// recorded in the descriptor and borrows the memory for `'a`.
#[derive(Clone, Debug)]
pub struct TensorRef<'a, T> {
    data: &'a [T],
    layout: Layout,
    device: Device,
}

impl<'a, T: Element> TensorRef<'a, T> {
    /// Import exchanged memory without copying.
    pub fn from_exchange(exported: Exported<'a>) -> Result<Self, TensorError> {
        let device = exported.device();
        let borrow = exported.borrow_typed::<T>(device)?;
        Ok(Self {
            data: borrow.data,
            layout: borrow.layout,
            device,
        })
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

    /// Returns `true` if the tensor has no elements.
    pub fn is_empty(&self) -> bool {
        self.layout.is_empty()
    }

    /// Device the tensor's memory lives on.
    pub fn device(&self) -> Device {
        self.device
    }

    /// Element type.
    pub fn dtype(&self) -> DType {
        T::DTYPE
    }

    /// `self[i, ...]`: the sub-tensor at index `i` of the first axis.
    pub fn index_axis0(&self, i: usize) -> Result<TensorRef<'a, T>, TensorError> {
        Ok(TensorRef {
            data: self.data,
            layout: self.layout.select(0, i)?,
            device: self.device,
        })
    }

    /// Elements in row-major order.
    pub fn values(&self) -> impl Iterator<Item = T> + '_ {
        self.layout.offsets().map(|at| self.data[at])
    }

    /// Gather the elements into a `Vec`.
    pub fn to_vec(&self) -> Vec<T> {
        self.values().collect()
    }

    /// Copy into an owned tensor on the same device.
    pub fn to_tensor(&self) -> Tensor<T> {
        Tensor {
            data: self.to_vec(),
            shape: self.shape().iter().copied().collect(),
            device: self.device,
        }
    }
}

/// An owned, contiguous tensor.
#[derive(Clone, Debug, PartialEq)]
pub struct Tensor<T> {
    data: Vec<T>,
    shape: Dims,
    device: Device,
}

impl<T: Element> Tensor<T> {
    /// Build a tensor from row-major `data`.
    pub fn from_vec(data: Vec<T>, shape: &[usize], device: Device) -> Result<Self, TensorError> {
        if shape.iter().product::<usize>() != data.len() {
            return Err(TensorError::ShapeMismatch {
                lhs: shape.to_vec(),
                rhs: vec![data.len()],
            });
        }
        Ok(Self {
            data,
            shape: shape.iter().copied().collect(),
            device,
        })
    }

    /// Extent of each axis.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Device the tensor lives on.
    pub fn device(&self) -> Device {
        self.device
    }

    /// Elements in row-major order.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Consume into the element vector.
    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    /// Borrow as a [`TensorRef`].
    pub fn view(&self) -> TensorRef<'_, T> {
        TensorRef {
            data: &self.data,
            layout: Layout::contiguous(&self.shape),
            device: self.device,
        }
    }
}

impl<T: Element> Exportable for Tensor<T> {
    fn export(&self) -> Exported<'_> {
        Exported::from_slice(&self.data, &Layout::contiguous(&self.shape), self.device)
            .expect("tensor length matches its shape")
    }
}
