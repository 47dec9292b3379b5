//! Test fixtures for fieldsnap development.
//!
//! Provides sample generators and [`AdvectionDriver`], a tiny 1-D periodic
//! advection solver that plays the role of the external simulation feeding a
//! snapshot collector one field per timestep.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod driver;
pub mod fixtures;

pub use driver::AdvectionDriver;
pub use fixtures::{accelerator, constant_row, ramp_row, sine_row, upload_row};
