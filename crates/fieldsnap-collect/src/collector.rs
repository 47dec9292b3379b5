//! The snapshot collector.

use fieldsnap_core::{Element, Exportable, Exported};
use fieldsnap_device::{Accelerator, DeviceArray, HostArray, StridedView};

use crate::config::{CollectorConfig, OverflowPolicy};
use crate::error::CollectError;

/// A device-resident snapshot buffer plus a row cursor.
///
/// The buffer has shape `(capacity, width)` and lives on the accelerator the
/// collector was created with. Samples must already be on that accelerator;
/// collection is a device-to-device copy and never touches the host.
///
/// The collector is a plain value owned by the caller. Collecting needs
/// `&mut self`, so the buffer and cursor always change together.
#[derive(Debug)]
pub struct SnapshotCollector<T: Element = f64> {
    accelerator: Accelerator,
    buffer: DeviceArray<T>,
    config: CollectorConfig,
    cursor: usize,
}

impl<T: Element> SnapshotCollector<T> {
    /// Validate `config` and allocate a zeroed buffer on `accelerator`.
    pub fn new(accelerator: &Accelerator, config: CollectorConfig) -> Result<Self, CollectError> {
        config.validate()?;
        let buffer = accelerator.zeros::<T>(&[config.rows, config.width])?;
        log::debug!(
            "snapshot collector {}x{} {} on {} ({:?})",
            config.rows,
            config.width,
            T::DTYPE,
            accelerator.device(),
            config.overflow
        );
        Ok(Self {
            accelerator: accelerator.clone(),
            buffer,
            config,
            cursor: 0,
        })
    }

    /// Copy `sample` into the next row and advance the cursor.
    ///
    /// Returns the buffer row that was written. On error nothing changes.
    pub fn collect(&mut self, sample: &StridedView<'_, T>) -> Result<usize, CollectError> {
        let device = self.accelerator.device();
        if sample.device() != device {
            return Err(CollectError::DeviceMismatch {
                expected: device,
                found: sample.device(),
            });
        }
        if sample.ndim() != 1 {
            return Err(CollectError::NotOneDimensional {
                ndim: sample.ndim(),
            });
        }
        if sample.len() != self.width() {
            return Err(CollectError::WidthMismatch {
                expected: self.width(),
                found: sample.len(),
            });
        }
        let row = self.claim_row()?;
        let mut target = self.buffer.row_mut(row)?;
        self.accelerator.copy(&mut target, sample)?;
        self.cursor += 1;
        log::trace!("collected sample {} into row {row}", self.cursor - 1);
        Ok(row)
    }

    /// Borrow exchanged device memory as a sample and collect it.
    ///
    /// The descriptor's dtype, alignment and strides are validated before any
    /// element is read; the memory is only borrowed for the copy.
    pub fn collect_exported(&mut self, sample: &Exported<'_>) -> Result<usize, CollectError> {
        let device = self.accelerator.device();
        if sample.device() != device {
            return Err(CollectError::DeviceMismatch {
                expected: device,
                found: sample.device(),
            });
        }
        let view = StridedView::<T>::from_exchange(sample, device)?;
        self.collect(&view)
    }

    /// Row that the next sample goes to, growing the buffer if the policy says so.
    fn claim_row(&mut self) -> Result<usize, CollectError> {
        let capacity = self.capacity();
        if self.cursor < capacity {
            return Ok(self.cursor);
        }
        match self.config.overflow {
            OverflowPolicy::Reject => Err(CollectError::CapacityExhausted { capacity }),
            OverflowPolicy::Grow { rows } => {
                self.buffer.grow_rows(rows)?;
                log::debug!("snapshot buffer grown to {} rows", self.capacity());
                Ok(self.cursor)
            }
            OverflowPolicy::Wrap => {
                let row = self.cursor % capacity;
                if row == 0 {
                    log::debug!("snapshot buffer wrapped after {} samples", self.cursor);
                }
                Ok(row)
            }
        }
    }

    /// Number of successful collections since creation or the last reset.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Rows currently allocated.
    pub fn capacity(&self) -> usize {
        self.buffer.shape()[0]
    }

    /// Elements per row.
    pub fn width(&self) -> usize {
        self.config.width
    }

    /// Rows holding collected data.
    pub fn rows_filled(&self) -> usize {
        self.cursor.min(self.capacity())
    }

    /// `true` once a wrapping collector has overwritten its oldest row.
    pub fn has_wrapped(&self) -> bool {
        self.cursor > self.capacity()
    }

    /// The configuration the collector was built with.
    pub fn config(&self) -> &CollectorConfig {
        &self.config
    }

    /// The accelerator owning the buffer.
    pub fn accelerator(&self) -> &Accelerator {
        &self.accelerator
    }

    /// The whole device buffer.
    pub fn buffer(&self) -> &DeviceArray<T> {
        &self.buffer
    }

    /// Device view of row `index`.
    pub fn row(&self, index: usize) -> Result<StridedView<'_, T>, CollectError> {
        Ok(self.buffer.row(index)?)
    }

    /// Device view of the rows written so far, `(rows_filled, width)`.
    ///
    /// Rows are in buffer order. After a wrap that is not time order; use
    /// [`chronological_rows`](Self::chronological_rows) to walk them by timestep.
    pub fn filled(&self) -> Result<StridedView<'_, T>, CollectError> {
        Ok(self.buffer.slice_axis(0, 0..self.rows_filled())?)
    }

    /// `(timestep, row)` for every retained snapshot, oldest first.
    ///
    /// Timestep `t` is the `t`-th successful collection. Until a wrap, row `i`
    /// holds timestep `i`. After one, the oldest retained snapshot sits at
    /// row `cursor % capacity`.
    pub fn chronological_rows(&self) -> impl Iterator<Item = (usize, usize)> {
        let capacity = self.capacity();
        let filled = self.rows_filled();
        let (first_step, first_row) = if self.has_wrapped() {
            (self.cursor - capacity, self.cursor % capacity)
        } else {
            (0, 0)
        };
        (0..filled).map(move |k| (first_step + k, (first_row + k) % capacity))
    }

    /// Copy the whole buffer to the host.
    pub fn to_host(&self) -> Result<HostArray<T>, CollectError> {
        Ok(self.accelerator.download(&self.buffer)?)
    }

    /// Zero the buffer and rewind the cursor. Grown capacity is kept.
    pub fn reset(&mut self) {
        self.buffer.fill(T::ZERO);
        self.cursor = 0;
        log::debug!("snapshot collector reset ({} rows)", self.capacity());
    }
}

impl<T: Element> Exportable for SnapshotCollector<T> {
    fn export(&self) -> Exported<'_> {
        self.buffer.export()
    }
}

#[cfg(test)]
mod tests {
    use fieldsnap_core::{Device, ExchangeError, Layout};
    use fieldsnap_device::AcceleratorConfig;

    use super::*;

    fn accel() -> Accelerator {
        Accelerator::new(AcceleratorConfig::default()).unwrap()
    }

    fn collector(acc: &Accelerator, rows: usize, width: usize) -> SnapshotCollector {
        SnapshotCollector::new(acc, CollectorConfig::new(rows, width)).unwrap()
    }

    #[test]
    fn collect_writes_row_and_advances() {
        let acc = accel();
        let mut c = collector(&acc, 3, 4);
        let sample = acc.upload_slice(&[1.0, 2.0, 3.0, 4.0], &[4]).unwrap();
        assert_eq!(c.collect(&sample.view()).unwrap(), 0);
        assert_eq!(c.cursor(), 1);
        assert_eq!(c.row(0).unwrap().to_vec(), vec![1.0, 2.0, 3.0, 4.0]);
        assert_eq!(c.row(1).unwrap().to_vec(), vec![0.0; 4]);
    }

    #[test]
    fn host_sample_is_a_device_mismatch() {
        let acc = accel();
        let mut c = collector(&acc, 2, 2);
        let host = [1.0, 2.0];
        let err = c.collect(&StridedView::from_slice(&host, Device::Host)).unwrap_err();
        assert_eq!(
            err,
            CollectError::DeviceMismatch {
                expected: acc.device(),
                found: Device::Host
            }
        );
        assert_eq!(c.cursor(), 0);
    }

    #[test]
    fn shape_errors_leave_state_unchanged() {
        let acc = accel();
        let mut c = collector(&acc, 2, 3);
        let short = acc.zeros::<f64>(&[2]).unwrap();
        let square = acc.zeros::<f64>(&[3, 3]).unwrap();
        assert_eq!(
            c.collect(&short.view()).unwrap_err(),
            CollectError::WidthMismatch {
                expected: 3,
                found: 2
            }
        );
        assert_eq!(
            c.collect(&square.view()).unwrap_err(),
            CollectError::NotOneDimensional { ndim: 2 }
        );
        assert_eq!(c.cursor(), 0);
    }

    #[test]
    fn reject_policy_refuses_extra_sample() {
        let acc = accel();
        let mut c = collector(&acc, 2, 1);
        let sample = acc.upload_slice(&[7.0], &[1]).unwrap();
        c.collect(&sample.view()).unwrap();
        c.collect(&sample.view()).unwrap();
        assert_eq!(
            c.collect(&sample.view()).unwrap_err(),
            CollectError::CapacityExhausted { capacity: 2 }
        );
        assert_eq!(c.cursor(), 2);
    }

    #[test]
    fn grow_policy_extends_buffer() {
        let acc = accel();
        let config = CollectorConfig::new(1, 2).with_overflow(OverflowPolicy::Grow { rows: 3 });
        let mut c = SnapshotCollector::<f32>::new(&acc, config).unwrap();
        let sample = acc.upload_slice(&[1.0f32, 2.0], &[2]).unwrap();
        c.collect(&sample.view()).unwrap();
        assert_eq!(c.collect(&sample.view()).unwrap(), 1);
        assert_eq!(c.capacity(), 4);
        assert_eq!(c.row(0).unwrap().to_vec(), vec![1.0, 2.0]);
        assert_eq!(c.rows_filled(), 2);
    }

    #[test]
    fn wrap_policy_overwrites_oldest_row() {
        let acc = accel();
        let config = CollectorConfig::new(2, 1).with_overflow(OverflowPolicy::Wrap);
        let mut c = SnapshotCollector::<f64>::new(&acc, config).unwrap();
        for value in [1.0, 2.0, 3.0] {
            let sample = acc.upload_slice(&[value], &[1]).unwrap();
            c.collect(&sample.view()).unwrap();
        }
        assert_eq!(c.cursor(), 3);
        assert!(c.has_wrapped());
        assert_eq!(c.to_host().unwrap().as_slice(), &[3.0, 2.0]);
        assert_eq!(c.chronological_rows().collect::<Vec<_>>(), [(1, 1), (2, 0)]);
    }

    #[test]
    fn chronological_rows_follow_the_ring() {
        let acc = accel();
        let config = CollectorConfig::new(3, 1).with_overflow(OverflowPolicy::Wrap);
        let mut c = SnapshotCollector::<f64>::new(&acc, config).unwrap();
        assert_eq!(c.chronological_rows().count(), 0);
        for t in 0..2 {
            let sample = acc.upload_slice(&[t as f64], &[1]).unwrap();
            c.collect(&sample.view()).unwrap();
        }
        assert_eq!(c.chronological_rows().collect::<Vec<_>>(), [(0, 0), (1, 1)]);
        for t in 2..8 {
            let sample = acc.upload_slice(&[t as f64], &[1]).unwrap();
            c.collect(&sample.view()).unwrap();
        }
        let host = c.to_host().unwrap();
        let walked: Vec<(usize, f64)> = c
            .chronological_rows()
            .map(|(t, row)| (t, host.row(row).unwrap()[0]))
            .collect();
        assert_eq!(walked, [(5, 5.0), (6, 6.0), (7, 7.0)]);
    }

    #[test]
    fn collect_exported_validates_descriptor() {
        let acc = accel();
        let mut c = collector(&acc, 2, 3);
        let floats = acc.upload_slice(&[1.0f32, 2.0, 3.0], &[3]).unwrap();
        assert!(matches!(
            c.collect_exported(&floats.export()).unwrap_err(),
            CollectError::Exchange(ExchangeError::DTypeMismatch { .. })
        ));

        let storage = acc.upload_slice(&[1.0, 9.0, 2.0, 9.0, 3.0], &[5]).unwrap();
        let every_other = Layout::new(&[3], &[2], 0).unwrap();
        let backing = storage.view().as_contiguous().unwrap();
        let view = StridedView::new(backing, every_other, acc.device()).unwrap();
        assert_eq!(c.collect_exported(&view.export()).unwrap(), 0);
        assert_eq!(c.row(0).unwrap().to_vec(), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn reset_rewinds_and_zeroes() {
        let acc = accel();
        let mut c = collector(&acc, 2, 2);
        let sample = acc.upload_slice(&[5.0, 6.0], &[2]).unwrap();
        c.collect(&sample.view()).unwrap();
        c.reset();
        assert_eq!(c.cursor(), 0);
        assert!(c.to_host().unwrap().as_slice().iter().all(|&v| v == 0.0));
        assert_eq!(c.filled().unwrap().shape(), &[0, 2]);
    }
}
