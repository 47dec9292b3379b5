//! Sample generators and accelerator helpers.

use std::f64::consts::TAU;

use fieldsnap_core::Element;
use fieldsnap_device::{Accelerator, AcceleratorConfig, DeviceArray};

/// Accelerator 0 with no memory limit.
pub fn accelerator() -> Accelerator {
    Accelerator::new(AcceleratorConfig::default()).expect("default accelerator config is valid")
}

/// One period of `sin` sampled at `width` points, plus `phase`.
pub fn sine_row(width: usize, phase: f64) -> Vec<f64> {
    (0..width)
        .map(|i| (TAU * i as f64 / width as f64 + phase).sin())
        .collect()
}

/// `start, start + 1, ...` as `T`.
pub fn ramp_row<T: Element>(width: usize, start: f64) -> Vec<T> {
    (0..width).map(|i| T::from_f64(start + i as f64)).collect()
}

/// `width` copies of `value`.
pub fn constant_row<T: Element>(width: usize, value: f64) -> Vec<T> {
    vec![T::from_f64(value); width]
}

/// Upload `row` as a 1-D device array.
pub fn upload_row<T: Element>(acc: &Accelerator, row: &[T]) -> DeviceArray<T> {
    acc.upload_slice(row, &[row.len()])
        .expect("fixture row fits on the accelerator")
}
