//! Elementwise arithmetic and reductions.

use fieldsnap_core::Element;

use crate::error::TensorError;
use crate::tensor::{Tensor, TensorRef};

/// `lhs + rhs`, elementwise.
pub fn add<T: Element>(
    lhs: &TensorRef<'_, T>,
    rhs: &TensorRef<'_, T>,
) -> Result<Tensor<T>, TensorError> {
    elementwise(lhs, rhs, |a, b| a + b)
}

/// `lhs - rhs`, elementwise.
pub fn sub<T: Element>(
    lhs: &TensorRef<'_, T>,
    rhs: &TensorRef<'_, T>,
) -> Result<Tensor<T>, TensorError> {
    elementwise(lhs, rhs, |a, b| a - b)
}

/// Sum of every element. An empty tensor sums to zero.
pub fn reduce_sum<T: Element>(input: &TensorRef<'_, T>) -> T {
    input.values().fold(T::ZERO, |acc, v| acc + v)
}

fn elementwise<T: Element>(
    lhs: &TensorRef<'_, T>,
    rhs: &TensorRef<'_, T>,
    f: impl Fn(T, T) -> T,
) -> Result<Tensor<T>, TensorError> {
    if lhs.device() != rhs.device() {
        return Err(TensorError::DeviceMismatch {
            lhs: lhs.device(),
            rhs: rhs.device(),
        });
    }
    if lhs.shape() != rhs.shape() {
        return Err(TensorError::ShapeMismatch {
            lhs: lhs.shape().to_vec(),
            rhs: rhs.shape().to_vec(),
        });
    }
    let data = lhs.values().zip(rhs.values()).map(|(a, b)| f(a, b)).collect();
    Tensor::from_vec(data, lhs.shape(), lhs.device())
}
