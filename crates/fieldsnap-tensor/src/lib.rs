//! A small tensor library that consumes fieldsnap exchange descriptors.
//!
//! This crate deliberately depends only on `fieldsnap-core`: anything that
//! implements [`Exportable`](fieldsnap_core::Exportable) can be viewed as a
//! [`TensorRef`] without a copy, regardless of which library owns the memory.
//! Arithmetic produces owned [`Tensor`]s on the same device as the inputs.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod ops;
pub mod tensor;

pub use error::TensorError;
pub use ops::{add, reduce_sum, sub};
pub use tensor::{Tensor, TensorRef};
