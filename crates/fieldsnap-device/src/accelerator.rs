//! Accelerator context, allocation ledger and host/device transfer.

use std::fmt;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use fieldsnap_core::{Device, Element, Layout, LayoutError};

use crate::array::{DeviceArray, HostArray};
use crate::config::AcceleratorConfig;
use crate::error::DeviceError;
use crate::view::StridedView;

/// Shared accounting for one accelerator.
///
/// Arrays hold an `Arc<Ledger>` so their bytes are released on drop even if
/// the [`Accelerator`] handle that created them is gone.
#[derive(Debug)]
pub(crate) struct Ledger {
    limit: Option<usize>,
    live_bytes: AtomicUsize,
    peak_bytes: AtomicUsize,
    allocations: AtomicU64,
    h2d_bytes: AtomicU64,
    d2h_bytes: AtomicU64,
    launches: AtomicU64,
}

impl Ledger {
    fn new(limit: Option<usize>) -> Self {
        Self {
            limit,
            live_bytes: AtomicUsize::new(0),
            peak_bytes: AtomicUsize::new(0),
            allocations: AtomicU64::new(0),
            h2d_bytes: AtomicU64::new(0),
            d2h_bytes: AtomicU64::new(0),
            launches: AtomicU64::new(0),
        }
    }

    /// Charge `bytes` against the limit.
    pub(crate) fn reserve(&self, bytes: usize) -> Result<(), DeviceError> {
        let limit = self.limit.unwrap_or(usize::MAX);
        let previous = self
            .live_bytes
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |live| {
                live.checked_add(bytes).filter(|&total| total <= limit)
            })
            .map_err(|live| DeviceError::OutOfMemory {
                requested: bytes,
                available: limit.saturating_sub(live),
            })?;
        self.peak_bytes.fetch_max(previous + bytes, Ordering::AcqRel);
        self.allocations.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    pub(crate) fn release(&self, bytes: usize) {
        self.live_bytes.fetch_sub(bytes, Ordering::AcqRel);
    }
}

/// Point-in-time counters for an accelerator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DeviceStats {
    /// Bytes currently allocated.
    pub live_bytes: usize,
    /// High-water mark of `live_bytes`.
    pub peak_bytes: usize,
    /// Number of allocations (including growth) ever made.
    pub allocations: u64,
    /// Bytes copied host → device.
    pub host_to_device_bytes: u64,
    /// Bytes copied device → host.
    pub device_to_host_bytes: u64,
    /// Number of kernels launched.
    pub kernel_launches: u64,
}

/// Handle to a simulated accelerator.
///
/// Cloning is cheap and yields a handle to the same device and ledger.
#[derive(Clone)]
pub struct Accelerator {
    device: Device,
    ledger: Arc<Ledger>,
}

impl Accelerator {
    /// Create an accelerator context from a validated config.
    pub fn new(config: AcceleratorConfig) -> Result<Self, DeviceError> {
        config.validate()?;
        let device = Device::accelerator(config.ordinal);
        log::debug!(
            "accelerator {device} ready (limit: {:?} bytes)",
            config.memory_limit_bytes
        );
        Ok(Self {
            device,
            ledger: Arc::new(Ledger::new(config.memory_limit_bytes)),
        })
    }

    /// The device this accelerator allocates on.
    pub fn device(&self) -> Device {
        self.device
    }

    /// Snapshot of the ledger counters.
    pub fn stats(&self) -> DeviceStats {
        let l = &self.ledger;
        DeviceStats {
            live_bytes: l.live_bytes.load(Ordering::Acquire),
            peak_bytes: l.peak_bytes.load(Ordering::Acquire),
            allocations: l.allocations.load(Ordering::Relaxed),
            host_to_device_bytes: l.h2d_bytes.load(Ordering::Relaxed),
            device_to_host_bytes: l.d2h_bytes.load(Ordering::Relaxed),
            kernel_launches: l.launches.load(Ordering::Relaxed),
        }
    }

    /// Allocate a zero-filled device array.
    pub fn zeros<T: Element>(&self, shape: &[usize]) -> Result<DeviceArray<T>, DeviceError> {
        let len = checked_len(shape)?;
        let bytes = byte_len::<T>(len)?;
        self.ledger.reserve(bytes)?;
        log::debug!("{}: allocated {shape:?} {} ({bytes} bytes)", self.device, T::DTYPE);
        Ok(DeviceArray::from_parts(
            vec![T::ZERO; len],
            Layout::contiguous(shape),
            self.device,
            Arc::clone(&self.ledger),
        ))
    }

    /// Copy a host array to the device.
    pub fn upload<T: Element>(
        &self,
        host: &StridedView<'_, T>,
    ) -> Result<DeviceArray<T>, DeviceError> {
        if !host.device().is_host() {
            return Err(DeviceError::DeviceMismatch {
                expected: Device::Host,
                found: host.device(),
            });
        }
        let bytes = byte_len::<T>(host.len())?;
        self.ledger.reserve(bytes)?;
        let data = host.to_vec();
        self.ledger.h2d_bytes.fetch_add(bytes as u64, Ordering::Relaxed);
        log::debug!("{}: host -> device {:?} ({bytes} bytes)", self.device, host.shape());
        Ok(DeviceArray::from_parts(
            data,
            Layout::contiguous(host.shape()),
            self.device,
            Arc::clone(&self.ledger),
        ))
    }

    /// Copy a contiguous host slice with the given shape to the device.
    pub fn upload_slice<T: Element>(
        &self,
        host: &[T],
        shape: &[usize],
    ) -> Result<DeviceArray<T>, DeviceError> {
        if checked_len(shape)? != host.len() {
            return Err(LayoutError::ShapeMismatch {
                expected: shape.to_vec(),
                found: vec![host.len()],
            }
            .into());
        }
        let view = StridedView::new(host, Layout::contiguous(shape), Device::Host)?;
        self.upload(&view)
    }

    /// Copy a whole device array back to the host.
    pub fn download<T: Element>(
        &self,
        array: &DeviceArray<T>,
    ) -> Result<HostArray<T>, DeviceError> {
        self.download_view(&array.view())
    }

    /// Gather a strided device view into a contiguous host array.
    pub fn download_view<T: Element>(
        &self,
        view: &StridedView<'_, T>,
    ) -> Result<HostArray<T>, DeviceError> {
        self.check_resident(view.device())?;
        let data = view.to_vec();
        let bytes = byte_len::<T>(data.len())?;
        self.ledger.d2h_bytes.fetch_add(bytes as u64, Ordering::Relaxed);
        log::debug!("{}: device -> host {:?} ({bytes} bytes)", self.device, view.shape());
        Ok(HostArray::new(data, view.shape()))
    }

    /// Fail unless `device` is this accelerator.
    pub(crate) fn check_resident(&self, device: Device) -> Result<(), DeviceError> {
        if device != self.device {
            return Err(DeviceError::DeviceMismatch {
                expected: self.device,
                found: device,
            });
        }
        Ok(())
    }

    pub(crate) fn record_launch(&self, kernel: &'static str, elements: usize) {
        self.ledger.launches.fetch_add(1, Ordering::Relaxed);
        log::trace!("{}: launch {kernel} over {elements} elements", self.device);
    }
}

impl fmt::Debug for Accelerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Accelerator")
            .field("device", &self.device)
            .field("stats", &self.stats())
            .finish()
    }
}

pub(crate) fn checked_len(shape: &[usize]) -> Result<usize, DeviceError> {
    shape
        .iter()
        .try_fold(1usize, |acc, &n| acc.checked_mul(n))
        .ok_or(DeviceError::SizeOverflow)
}

pub(crate) fn byte_len<T: Element>(len: usize) -> Result<usize, DeviceError> {
    len.checked_mul(T::DTYPE.size_bytes())
        .ok_or(DeviceError::SizeOverflow)
}
