//! End-to-end collector behaviour against a simulated field driver.

use fieldsnap_collect::{CollectError, CollectorConfig, OverflowPolicy, SnapshotCollector};
use fieldsnap_core::{Device, Exportable, Exported, Layout};
use fieldsnap_device::StridedView;
use fieldsnap_test_utils::{accelerator, ramp_row, upload_row, AdvectionDriver};
use proptest::prelude::*;

#[test]
fn driver_run_fills_rows_in_order() {
    let acc = accelerator();
    let mut driver = AdvectionDriver::new(32, 0.5);
    let config = CollectorConfig::new(10, driver.width());
    let mut collector = SnapshotCollector::<f64>::new(&acc, config).unwrap();
    let mut expected = Vec::new();
    for _ in 0..10 {
        expected.extend_from_slice(driver.state());
        collector.collect(&driver.view(acc.device())).unwrap();
        driver.step();
    }
    assert_eq!(collector.cursor(), 10);
    assert_eq!(collector.to_host().unwrap().as_slice(), expected.as_slice());
    assert_eq!(
        collector.collect(&driver.view(acc.device())),
        Err(CollectError::CapacityExhausted { capacity: 10 })
    );
}

#[test]
fn round_trip_is_bit_identical() {
    let acc = accelerator();
    let pattern = [0.1f64, -0.0, f64::MIN_POSITIVE, 1.0e300, -7.25];
    let mut collector = SnapshotCollector::<f64>::new(&acc, CollectorConfig::new(1, 5)).unwrap();
    collector.collect(&upload_row(&acc, &pattern).view()).unwrap();
    let host = collector.to_host().unwrap();
    let bits: Vec<u64> = host.as_slice().iter().map(|v| v.to_bits()).collect();
    let expected: Vec<u64> = pattern.iter().map(|v| v.to_bits()).collect();
    assert_eq!(bits, expected);
}

#[test]
fn negative_stride_sample_through_exchange() {
    let acc = accelerator();
    let storage = upload_row(&acc, &ramp_row::<f32>(4, 1.0));
    let backing = storage.view().as_contiguous().unwrap();
    let reversed = Layout::new(&[4], &[-1], 3).unwrap();
    let sample = StridedView::new(backing, reversed, acc.device()).unwrap();
    let exported: Exported<'_> = sample.export();
    let mut collector = SnapshotCollector::<f32>::new(&acc, CollectorConfig::new(2, 4)).unwrap();
    collector.collect_exported(&exported).unwrap();
    assert_eq!(collector.row(0).unwrap().to_vec(), vec![4.0, 3.0, 2.0, 1.0]);
}

#[test]
fn sample_on_another_accelerator_is_rejected() {
    let acc = accelerator();
    let mut collector = SnapshotCollector::<f64>::new(&acc, CollectorConfig::new(2, 3)).unwrap();
    let data = [1.0f64, 2.0, 3.0];
    let elsewhere = StridedView::from_slice(&data, Device::accelerator(7));
    assert!(matches!(
        collector.collect_exported(&elsewhere.export()),
        Err(CollectError::DeviceMismatch { .. })
    ));
    assert_eq!(collector.cursor(), 0);
}

#[test]
fn default_collector_holds_the_full_run() {
    let acc = accelerator();
    let mut driver = AdvectionDriver::standard();
    let mut collector = SnapshotCollector::<f64>::new(&acc, CollectorConfig::default()).unwrap();
    while collector.cursor() < collector.capacity() {
        collector.collect(&driver.view(acc.device())).unwrap();
        driver.step();
    }
    assert_eq!(collector.cursor(), 2001);
    assert_eq!(collector.rows_filled(), 2001);
    assert!(!collector.has_wrapped());
}

proptest! {
    #[test]
    fn rows_match_samples_and_cursor_counts(
        rows in 1usize..12,
        width in 1usize..16,
        k_frac in 0.0f64..=1.0,
    ) {
        let acc = accelerator();
        let k = ((rows as f64) * k_frac) as usize;
        let mut collector =
            SnapshotCollector::<f64>::new(&acc, CollectorConfig::new(rows, width)).unwrap();
        for i in 0..k {
            let sample = upload_row(&acc, &ramp_row::<f64>(width, (i * 100) as f64));
            prop_assert_eq!(collector.collect(&sample.view()).unwrap(), i);
        }
        prop_assert_eq!(collector.cursor(), k);
        for i in 0..k {
            prop_assert_eq!(
                collector.row(i).unwrap().to_vec(),
                ramp_row::<f64>(width, (i * 100) as f64)
            );
        }
    }

    #[test]
    fn wrap_keeps_the_latest_capacity_samples(rows in 1usize..8, extra in 0usize..20) {
        let acc = accelerator();
        let config = CollectorConfig::new(rows, 1).with_overflow(OverflowPolicy::Wrap);
        let mut collector = SnapshotCollector::<f64>::new(&acc, config).unwrap();
        let total = rows + extra;
        for i in 0..total {
            collector.collect(&upload_row(&acc, &[i as f64]).view()).unwrap();
        }
        prop_assert_eq!(collector.cursor(), total);
        let host = collector.to_host().unwrap();
        for i in (total - rows)..total {
            prop_assert_eq!(host.as_slice()[i % rows], i as f64);
        }
    }

    #[test]
    fn grow_never_rejects(rows in 1usize..6, step in 1usize..4, total in 0usize..30) {
        let acc = accelerator();
        let config =
            CollectorConfig::new(rows, 2).with_overflow(OverflowPolicy::Grow { rows: step });
        let mut collector = SnapshotCollector::<f32>::new(&acc, config).unwrap();
        for i in 0..total {
            let sample = upload_row(&acc, &ramp_row::<f32>(2, i as f64));
            collector.collect(&sample.view()).unwrap();
        }
        prop_assert!(collector.capacity() >= total.max(rows));
        prop_assert_eq!(collector.rows_filled(), total);
    }
}
