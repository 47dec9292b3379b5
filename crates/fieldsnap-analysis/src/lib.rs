//! Analysis of collected snapshot buffers.
//!
//! [`analyze`] turns a [`SnapshotCollector`](fieldsnap_collect::SnapshotCollector)
//! into two figures and a [`ModeDecomposition`]: the field evolution sampled
//! every few timesteps, and the leading spatial modes of a reduced SVD
//! computed straight from the device buffer. [`analyze_exchange`] hands the
//! same buffer to `fieldsnap-tensor` through the exchange protocol and checks
//! that arithmetic on the shared memory behaves.
//!
//! Figures are plain data; attach a renderer of your choice.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod analyze;
pub mod config;
pub mod error;
pub mod figure;
pub mod grid;
pub mod interop;
pub mod svd;

pub use analyze::{analyze, decompose_collector, AnalysisReport};
pub use config::{AnalysisConfig, ColumnRange, RowSelection};
pub use error::AnalysisError;
pub use figure::{Figure, Series};
pub use grid::periodic_coordinates;
pub use interop::{analyze_exchange, InteropReport};
pub use svd::ModeDecomposition;
