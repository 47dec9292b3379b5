//! Run a 1-D advection simulation for 2001 steps, collect every timestep on
//! the accelerator, then print the leading SVD modes.
//!
//! Run with `RUST_LOG=debug cargo run --example field_modes` to see the
//! allocation, transfer and SVD log lines.

use fieldsnap::prelude::*;
use fieldsnap_test_utils::AdvectionDriver;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let acc = Accelerator::new(AcceleratorConfig::default())?;
    let mut driver = AdvectionDriver::standard();
    let mut collector = SnapshotCollector::<f64>::new(&acc, CollectorConfig::default())?;

    while collector.cursor() < collector.capacity() {
        collector.collect(&driver.view(acc.device()))?;
        driver.step();
    }
    println!("collected {} snapshots of width {}", collector.cursor(), collector.width());

    let report = analyze(&collector, &AnalysisConfig::default())?;
    for series in report.evolution.series() {
        let peak = series.y.iter().copied().fold(f64::MIN, f64::max);
        println!("{:>14}: peak {peak:.4}", series.label);
    }

    let energy = report.decomposition.energy_fractions();
    for (k, series) in report.modes.series().enumerate() {
        println!(
            "{:>14}: sigma {:.4e}, energy {:.2}%",
            series.label,
            report.decomposition.singular_values()[k],
            energy[k] * 100.0
        );
    }

    let exchange = analyze_exchange(&collector)?;
    println!(
        "exchange on {}: residual zero = {}, row 0 sum = {:.6}",
        exchange.device,
        exchange.residual_is_zero(),
        exchange.row_sum
    );

    let stats = acc.stats();
    println!(
        "device: peak {} bytes, {} bytes to host, {} kernel launches",
        stats.peak_bytes, stats.device_to_host_bytes, stats.kernel_launches
    );
    Ok(())
}
