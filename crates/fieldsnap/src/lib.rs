//! fieldsnap: collect snapshots of a simulated field on an accelerator and
//! analyse their spatial modes.
//!
//! This is the facade crate. It re-exports the public API of the fieldsnap
//! sub-crates and adds the host/device [`pipeline`] demos.
//!
//! # Quick start
//!
//! ```rust
//! use fieldsnap::prelude::*;
//!
//! let acc = Accelerator::new(AcceleratorConfig::default()).unwrap();
//! let mut collector = SnapshotCollector::<f64>::new(&acc, CollectorConfig::new(4, 6)).unwrap();
//!
//! for step in 0..4 {
//!     let field: Vec<f64> = (0..6).map(|i| (i + step) as f64).collect();
//!     let on_device = acc.upload_slice(&field, &[6]).unwrap();
//!     collector.collect(&on_device.view()).unwrap();
//! }
//!
//! let report = analyze(&collector, &AnalysisConfig::default()).unwrap();
//! assert_eq!(report.modes.len(), 3);
//! assert!(analyze_exchange(&collector).unwrap().residual_is_zero());
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `fieldsnap-core` | Element types, devices, layouts, exchange descriptors |
//! | [`device`] | `fieldsnap-device` | Simulated accelerator, device arrays, views, kernels |
//! | [`tensor`] | `fieldsnap-tensor` | Tensor library importing exchanged memory |
//! | [`collect`] | `fieldsnap-collect` | The snapshot collector |
//! | [`analysis`] | `fieldsnap-analysis` | Figures, SVD modes, exchange check |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Element types, devices, layouts and the exchange protocol (`fieldsnap-core`).
pub use fieldsnap_core as types;

/// Simulated accelerator, arrays, views and kernels (`fieldsnap-device`).
pub use fieldsnap_device as device;

/// Tensor library consuming exchange descriptors (`fieldsnap-tensor`).
pub use fieldsnap_tensor as tensor;

/// Snapshot collector (`fieldsnap-collect`).
pub use fieldsnap_collect as collect;

/// Mode decomposition and exchange checks (`fieldsnap-analysis`).
pub use fieldsnap_analysis as analysis;

pub mod pipeline;

/// Common imports for typical fieldsnap usage.
pub mod prelude {
    // Core types and traits
    pub use fieldsnap_core::{DType, Device, Element, Exportable, ExportableMut, Exported, Layout};

    // Device
    pub use fieldsnap_device::{
        Accelerator, AcceleratorConfig, DeviceArray, HostArray, StridedView, StridedViewMut,
    };

    // Collector
    pub use fieldsnap_collect::{CollectorConfig, OverflowPolicy, SnapshotCollector};

    // Analysis
    pub use fieldsnap_analysis::{
        analyze, analyze_exchange, AnalysisConfig, AnalysisReport, Figure, ModeDecomposition,
    };

    // Errors
    pub use fieldsnap_analysis::AnalysisError;
    pub use fieldsnap_collect::CollectError;
    pub use fieldsnap_device::DeviceError;

    // Pipeline
    pub use crate::pipeline::{transform_in_place, transform_uploaded, transform_view};
}
