//! Snapshot collection for fieldsnap.
//!
//! A [`SnapshotCollector`] owns a pre-allocated two-dimensional buffer on an
//! accelerator and a row cursor. Each [`collect`](SnapshotCollector::collect)
//! copies one 1-D field sample into the next row, device to device, and
//! advances the cursor. What happens once every row is used is governed by
//! [`OverflowPolicy`].

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod collector;
pub mod config;
pub mod error;

pub use collector::SnapshotCollector;
pub use config::{CollectorConfig, ConfigError, OverflowPolicy};
pub use error::CollectError;
