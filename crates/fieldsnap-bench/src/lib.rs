//! Benchmark profiles for fieldsnap.
//!
//! - [`reference_profile`]: the 2001 × 258 advection run used in the demo
//! - [`short_profile`]: the same grid over 200 steps for quicker iterations

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use fieldsnap_collect::{CollectorConfig, SnapshotCollector};
use fieldsnap_device::{Accelerator, AcceleratorConfig};
use fieldsnap_test_utils::AdvectionDriver;

/// Snapshots taken by [`reference_profile`].
pub const REFERENCE_STEPS: usize = 2001;

/// Run the standard advection driver for `steps` timesteps and collect a
/// snapshot before each one.
pub fn run_profile(steps: usize) -> (Accelerator, SnapshotCollector<f64>) {
    let acc = Accelerator::new(AcceleratorConfig::default()).unwrap();
    let mut driver = AdvectionDriver::standard();
    let config = CollectorConfig::new(steps, driver.width());
    let mut collector = SnapshotCollector::new(&acc, config).unwrap();
    for _ in 0..steps {
        collector.collect(&driver.view(acc.device())).unwrap();
        driver.step();
    }
    (acc, collector)
}

/// The full 2001-step run on the 256-cell grid.
pub fn reference_profile() -> (Accelerator, SnapshotCollector<f64>) {
    run_profile(REFERENCE_STEPS)
}

/// A 200-step run on the same grid.
pub fn short_profile() -> (Accelerator, SnapshotCollector<f64>) {
    run_profile(200)
}
