//! Simulated accelerator memory for fieldsnap.
//!
//! An [`Accelerator`] owns an allocation ledger. Every [`DeviceArray`] it
//! creates is tagged with its [`Device`](fieldsnap_core::Device) and charged
//! to the ledger until dropped. Data crosses between host and device only
//! through [`Accelerator::upload`] and [`Accelerator::download`], and both
//! directions are counted.
//!
//! # Architecture
//!
//! ```text
//! Accelerator (cheap Clone handle)
//! ├── Arc<Ledger>  live/peak bytes, transfer counters, launch counter
//! ├── zeros / upload / download      → DeviceArray<T>, HostArray<T>
//! └── kernels: scale, square, double, add_assign, add, sub, sum
//!
//! StridedView / StridedViewMut       typed views over borrowed memory,
//!                                    from slices or exchange descriptors
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod accelerator;
pub mod array;
pub mod config;
pub mod error;
pub mod kernels;
pub mod view;

pub use accelerator::{Accelerator, DeviceStats};
pub use array::{DeviceArray, HostArray};
pub use config::AcceleratorConfig;
pub use error::DeviceError;
pub use view::{StridedView, StridedViewMut};
