//! Collector lifecycle and sample hand-off for C callers.
//!
//! A C simulation creates a collector, passes a raw pointer to its field
//! every timestep, and reads rows or singular values back at the end. The
//! pointer is treated as memory on the collector's accelerator; its dtype
//! and strides go through the same exchange validation as any other import.

use std::ffi::c_void;
use std::sync::Mutex;

use fieldsnap_analysis::{decompose_collector, AnalysisConfig};
use fieldsnap_collect::{CollectError, SnapshotCollector};
use fieldsnap_core::{Device, Element, ExchangeDescriptor, Exported};
use fieldsnap_device::Accelerator;
use smallvec::smallvec;

use crate::handle::HandleTable;
use crate::status::FieldsnapStatus;
use crate::types::{FieldsnapCollectorConfig, FieldsnapDType};

/// A collector of either element type.
enum AnyCollector {
    F32(SnapshotCollector<f32>),
    F64(SnapshotCollector<f64>),
}

/// Run `$body` with `$c` bound to the typed collector.
macro_rules! with_collector {
    ($any:expr, $c:ident => $body:expr) => {
        match $any {
            AnyCollector::F32($c) => $body,
            AnyCollector::F64($c) => $body,
        }
    };
}

impl AnyCollector {
    fn dtype(&self) -> FieldsnapDType {
        match self {
            Self::F32(_) => FieldsnapDType::F32,
            Self::F64(_) => FieldsnapDType::F64,
        }
    }

    fn collect_exported(&mut self, sample: &Exported<'_>) -> Result<usize, CollectError> {
        with_collector!(self, c => c.collect_exported(sample))
    }

    fn cursor(&self) -> usize {
        with_collector!(self, c => c.cursor())
    }

    fn capacity(&self) -> usize {
        with_collector!(self, c => c.capacity())
    }

    fn width(&self) -> usize {
        with_collector!(self, c => c.width())
    }

    fn device(&self) -> Device {
        with_collector!(self, c => c.accelerator().device())
    }

    /// Download row `index` widened to `f64`.
    fn read_row(&self, index: usize) -> Result<Vec<f64>, FieldsnapStatus> {
        with_collector!(self, c => {
            let view = c.row(index).map_err(|e| FieldsnapStatus::from(&e))?;
            let host = c
                .accelerator()
                .download_view(&view)
                .map_err(|e| FieldsnapStatus::from(&e))?;
            Ok(host.as_slice().iter().map(|v| v.to_f64()).collect())
        })
    }

    fn singular_values(&self) -> Result<Vec<f64>, FieldsnapStatus> {
        let config = AnalysisConfig::default();
        with_collector!(self, c => {
            let d = decompose_collector(c, &config).map_err(|e| FieldsnapStatus::from(&e))?;
            Ok(d.singular_values().to_vec())
        })
    }

    fn reset(&mut self) {
        with_collector!(self, c => c.reset())
    }
}

static COLLECTORS: Mutex<HandleTable<AnyCollector>> = Mutex::new(HandleTable::new());

/// Write the default collector configuration (2001 × 258 `f64` rows,
/// reject on overflow, accelerator 0, no memory cap) to `out`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn fieldsnap_collector_config_default(out: *mut FieldsnapCollectorConfig) -> i32 {
    ffi_guard!({
        if out.is_null() {
            return FieldsnapStatus::InvalidArgument as i32;
        }
        // SAFETY: out is a valid, writable FieldsnapCollectorConfig per caller contract.
        unsafe { out.write(FieldsnapCollectorConfig::default()) };
        FieldsnapStatus::Ok as i32
    })
}

/// Create a collector and write its handle to `handle_out`.
///
/// The collector owns its own accelerator context; the zeroed buffer is
/// allocated there.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn fieldsnap_collector_create(
    config: *const FieldsnapCollectorConfig,
    handle_out: *mut u64,
) -> i32 {
    ffi_guard!({
        if config.is_null() || handle_out.is_null() {
            return FieldsnapStatus::InvalidArgument as i32;
        }
        // SAFETY: config points to an initialised FieldsnapCollectorConfig.
        let config = unsafe { config.read() };
        let (acc_config, collector_config, dtype) = match config.resolve() {
            Ok(parts) => parts,
            Err(status) => return status as i32,
        };
        let accelerator = match Accelerator::new(acc_config) {
            Ok(a) => a,
            Err(e) => return FieldsnapStatus::from(&e) as i32,
        };
        let created = match dtype {
            FieldsnapDType::F32 => {
                SnapshotCollector::new(&accelerator, collector_config).map(AnyCollector::F32)
            }
            FieldsnapDType::F64 => {
                SnapshotCollector::new(&accelerator, collector_config).map(AnyCollector::F64)
            }
        };
        let collector = match created {
            Ok(c) => c,
            Err(e) => return FieldsnapStatus::from(&e) as i32,
        };

        let handle = ffi_lock!(COLLECTORS).insert(collector);
        log::debug!("collector handle {handle:#x} created");
        // SAFETY: handle_out is valid per caller contract.
        unsafe { *handle_out = handle };
        FieldsnapStatus::Ok as i32
    })
}

/// Destroy a collector. A second destroy returns `InvalidHandle`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn fieldsnap_collector_destroy(handle: u64) -> i32 {
    ffi_guard!({
        match ffi_lock!(COLLECTORS).remove(handle) {
            Some(_) => FieldsnapStatus::Ok as i32,
            None => FieldsnapStatus::InvalidHandle as i32,
        }
    })
}

/// Collect `len` elements starting at `data`, `byte_stride` bytes apart.
///
/// `data` addresses element 0 and must live on the collector's accelerator.
/// Negative strides are allowed. On success the written row is stored in
/// `row_out` if it is non-null. On failure the collector is unchanged.
///
/// The memory is only read during the call.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn fieldsnap_collect(
    handle: u64,
    data: *const c_void,
    len: usize,
    byte_stride: isize,
    dtype: i32,
    row_out: *mut usize,
) -> i32 {
    ffi_guard!({
        let Some(dtype) = FieldsnapDType::from_raw(dtype) else {
            return FieldsnapStatus::InvalidArgument as i32;
        };
        let mut table = ffi_lock!(COLLECTORS);
        let Some(collector) = table.get_mut(handle) else {
            return FieldsnapStatus::InvalidHandle as i32;
        };
        let desc = ExchangeDescriptor {
            data: data.cast_mut(),
            byte_offset: 0,
            dtype: dtype.into(),
            device: collector.device(),
            shape: smallvec![len],
            byte_strides: smallvec![byte_stride],
            read_only: true,
        };
        // SAFETY: the caller guarantees every element addressed by
        // (data, len, byte_stride) is initialised and not written for the
        // duration of this call; the Exported does not outlive it.
        let sample = unsafe { Exported::from_raw(desc) };
        let row = match collector.collect_exported(&sample) {
            Ok(row) => row,
            Err(e) => return FieldsnapStatus::from(&e) as i32,
        };
        if !row_out.is_null() {
            // SAFETY: row_out is valid per caller contract.
            unsafe { *row_out = row };
        }
        FieldsnapStatus::Ok as i32
    })
}

/// Write the number of successful collections to `out`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn fieldsnap_collector_cursor(handle: u64, out: *mut usize) -> i32 {
    ffi_guard!({
        if out.is_null() {
            return FieldsnapStatus::InvalidArgument as i32;
        }
        let table = ffi_lock!(COLLECTORS);
        let Some(collector) = table.get(handle) else {
            return FieldsnapStatus::InvalidHandle as i32;
        };
        // SAFETY: out is valid per caller contract.
        unsafe { *out = collector.cursor() };
        FieldsnapStatus::Ok as i32
    })
}

/// Write the allocated row count and row width to `rows_out` and `width_out`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn fieldsnap_collector_shape(
    handle: u64,
    rows_out: *mut usize,
    width_out: *mut usize,
) -> i32 {
    ffi_guard!({
        if rows_out.is_null() || width_out.is_null() {
            return FieldsnapStatus::InvalidArgument as i32;
        }
        let table = ffi_lock!(COLLECTORS);
        let Some(collector) = table.get(handle) else {
            return FieldsnapStatus::InvalidHandle as i32;
        };
        // SAFETY: both pointers are valid per caller contract.
        unsafe {
            *rows_out = collector.capacity();
            *width_out = collector.width();
        }
        FieldsnapStatus::Ok as i32
    })
}

/// Copy row `row` to the host as `f64` values.
///
/// `out` must have room for `cap` values; the row width is required.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn fieldsnap_collector_read_row(
    handle: u64,
    row: usize,
    out: *mut f64,
    cap: usize,
) -> i32 {
    ffi_guard!({
        if out.is_null() {
            return FieldsnapStatus::InvalidArgument as i32;
        }
        let table = ffi_lock!(COLLECTORS);
        let Some(collector) = table.get(handle) else {
            return FieldsnapStatus::InvalidHandle as i32;
        };
        if row >= collector.capacity() {
            return FieldsnapStatus::InvalidArgument as i32;
        }
        if cap < collector.width() {
            return FieldsnapStatus::BufferTooSmall as i32;
        }
        let values = match collector.read_row(row) {
            Ok(v) => v,
            Err(status) => return status as i32,
        };
        // SAFETY: out points to at least cap >= values.len() writable f64s.
        unsafe { std::ptr::copy_nonoverlapping(values.as_ptr(), out, values.len()) };
        FieldsnapStatus::Ok as i32
    })
}

/// Decompose the buffer with the default analysis settings (every row,
/// first and last column dropped) and copy the singular values, largest
/// first, to `out`.
///
/// The number of values is always written to `n_out`, so a caller can
/// retry after `BufferTooSmall`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn fieldsnap_collector_singular_values(
    handle: u64,
    out: *mut f64,
    cap: usize,
    n_out: *mut usize,
) -> i32 {
    ffi_guard!({
        if out.is_null() || n_out.is_null() {
            return FieldsnapStatus::InvalidArgument as i32;
        }
        let table = ffi_lock!(COLLECTORS);
        let Some(collector) = table.get(handle) else {
            return FieldsnapStatus::InvalidHandle as i32;
        };
        let values = match collector.singular_values() {
            Ok(v) => v,
            Err(status) => return status as i32,
        };
        // SAFETY: n_out is valid per caller contract.
        unsafe { *n_out = values.len() };
        if cap < values.len() {
            return FieldsnapStatus::BufferTooSmall as i32;
        }
        // SAFETY: out points to at least cap >= values.len() writable f64s.
        unsafe { std::ptr::copy_nonoverlapping(values.as_ptr(), out, values.len()) };
        FieldsnapStatus::Ok as i32
    })
}

/// Zero the buffer and rewind the cursor.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn fieldsnap_collector_reset(handle: u64) -> i32 {
    ffi_guard!({
        let mut table = ffi_lock!(COLLECTORS);
        match table.get_mut(handle) {
            Some(collector) => {
                collector.reset();
                FieldsnapStatus::Ok as i32
            }
            None => FieldsnapStatus::InvalidHandle as i32,
        }
    })
}

/// Write the collector's element type (a `FieldsnapDType` value) to `out`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn fieldsnap_collector_dtype(handle: u64, out: *mut i32) -> i32 {
    ffi_guard!({
        if out.is_null() {
            return FieldsnapStatus::InvalidArgument as i32;
        }
        let table = ffi_lock!(COLLECTORS);
        let Some(collector) = table.get(handle) else {
            return FieldsnapStatus::InvalidHandle as i32;
        };
        // SAFETY: out is valid per caller contract.
        unsafe { *out = collector.dtype() as i32 };
        FieldsnapStatus::Ok as i32
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FieldsnapOverflow;

    const OK: i32 = FieldsnapStatus::Ok as i32;

    fn create(rows: usize, width: usize, dtype: FieldsnapDType) -> u64 {
        let config = FieldsnapCollectorConfig {
            rows,
            width,
            dtype: dtype as i32,
            ..FieldsnapCollectorConfig::default()
        };
        let mut handle = 0;
        assert_eq!(fieldsnap_collector_create(&config, &mut handle), OK);
        handle
    }

    fn collect_f64(handle: u64, values: &[f64]) -> i32 {
        let mut row = usize::MAX;
        fieldsnap_collect(
            handle,
            values.as_ptr().cast(),
            values.len(),
            8,
            FieldsnapDType::F64 as i32,
            &mut row,
        )
    }

    fn read_row(handle: u64, row: usize, width: usize) -> Vec<f64> {
        let mut out = vec![f64::NAN; width];
        assert_eq!(fieldsnap_collector_read_row(handle, row, out.as_mut_ptr(), width), OK);
        out
    }

    #[test]
    fn default_config_round_trips() {
        let mut config = FieldsnapCollectorConfig {
            rows: 0,
            width: 0,
            overflow: 5,
            grow_rows: 0,
            dtype: 5,
            device_ordinal: 3,
            memory_limit_bytes: 1,
        };
        assert_eq!(fieldsnap_collector_config_default(&mut config), OK);
        assert_eq!(config, FieldsnapCollectorConfig::default());
        assert_eq!((config.rows, config.width), (2001, 258));
        assert_eq!(
            fieldsnap_collector_config_default(std::ptr::null_mut()),
            FieldsnapStatus::InvalidArgument as i32
        );
    }

    #[test]
    fn collect_and_read_back() {
        let h = create(3, 4, FieldsnapDType::F64);
        assert_eq!(collect_f64(h, &[1.0, 2.0, 3.0, 4.0]), OK);
        assert_eq!(collect_f64(h, &[5.0, 6.0, 7.0, 8.0]), OK);

        let mut cursor = 0;
        assert_eq!(fieldsnap_collector_cursor(h, &mut cursor), OK);
        assert_eq!(cursor, 2);
        assert_eq!(read_row(h, 1, 4), vec![5.0, 6.0, 7.0, 8.0]);
        assert_eq!(read_row(h, 2, 4), vec![0.0; 4]);

        let (mut rows, mut width) = (0, 0);
        assert_eq!(fieldsnap_collector_shape(h, &mut rows, &mut width), OK);
        assert_eq!((rows, width), (3, 4));
        assert_eq!(fieldsnap_collector_destroy(h), OK);
    }

    #[test]
    fn negative_stride_collects_reversed() {
        let h = create(1, 3, FieldsnapDType::F32);
        let storage = [1.0f32, 2.0, 3.0];
        let mut row = usize::MAX;
        let status = fieldsnap_collect(
            h,
            storage[2..].as_ptr().cast(),
            3,
            -4,
            FieldsnapDType::F32 as i32,
            &mut row,
        );
        assert_eq!(status, OK);
        assert_eq!(row, 0);
        assert_eq!(read_row(h, 0, 3), vec![3.0, 2.0, 1.0]);
        fieldsnap_collector_destroy(h);
    }

    #[test]
    fn strided_sample_skips_gaps() {
        let h = create(2, 2, FieldsnapDType::F64);
        let storage = [1.0f64, -1.0, 2.0, -1.0];
        let status = fieldsnap_collect(
            h,
            storage.as_ptr().cast(),
            2,
            16,
            FieldsnapDType::F64 as i32,
            std::ptr::null_mut(),
        );
        assert_eq!(status, OK);
        assert_eq!(read_row(h, 0, 2), vec![1.0, 2.0]);
        fieldsnap_collector_destroy(h);
    }

    #[test]
    fn rejected_samples_leave_cursor() {
        let h = create(1, 2, FieldsnapDType::F64);
        let floats = [1.0f32, 2.0];
        let dtype_mismatch = fieldsnap_collect(
            h,
            floats.as_ptr().cast(),
            2,
            4,
            FieldsnapDType::F32 as i32,
            std::ptr::null_mut(),
        );
        assert_eq!(dtype_mismatch, FieldsnapStatus::DTypeMismatch as i32);
        assert_eq!(collect_f64(h, &[1.0]), FieldsnapStatus::WidthMismatch as i32);
        let null = fieldsnap_collect(
            h,
            std::ptr::null(),
            2,
            8,
            FieldsnapDType::F64 as i32,
            std::ptr::null_mut(),
        );
        assert_eq!(null, FieldsnapStatus::NullPointer as i32);
        let bad_dtype = fieldsnap_collect(h, floats.as_ptr().cast(), 2, 4, 7, std::ptr::null_mut());
        assert_eq!(bad_dtype, FieldsnapStatus::InvalidArgument as i32);

        let mut cursor = usize::MAX;
        fieldsnap_collector_cursor(h, &mut cursor);
        assert_eq!(cursor, 0);
        fieldsnap_collector_destroy(h);
    }

    #[test]
    fn capacity_is_enforced_then_wraps() {
        let h = create(1, 1, FieldsnapDType::F64);
        assert_eq!(collect_f64(h, &[1.0]), OK);
        assert_eq!(collect_f64(h, &[2.0]), FieldsnapStatus::CapacityExhausted as i32);
        fieldsnap_collector_destroy(h);

        let config = FieldsnapCollectorConfig {
            rows: 2,
            width: 1,
            overflow: FieldsnapOverflow::Wrap as i32,
            ..FieldsnapCollectorConfig::default()
        };
        let mut h = 0;
        assert_eq!(fieldsnap_collector_create(&config, &mut h), OK);
        for v in [1.0, 2.0, 3.0] {
            assert_eq!(collect_f64(h, &[v]), OK);
        }
        assert_eq!(read_row(h, 0, 1), vec![3.0]);
        fieldsnap_collector_destroy(h);
    }

    #[test]
    fn stale_handle_is_invalid() {
        let h = create(1, 1, FieldsnapDType::F64);
        assert_eq!(fieldsnap_collector_destroy(h), OK);
        assert_eq!(fieldsnap_collector_destroy(h), FieldsnapStatus::InvalidHandle as i32);
        assert_eq!(collect_f64(h, &[1.0]), FieldsnapStatus::InvalidHandle as i32);
        assert_eq!(fieldsnap_collector_reset(h), FieldsnapStatus::InvalidHandle as i32);
        let mut cursor = 0;
        assert_eq!(
            fieldsnap_collector_cursor(h, &mut cursor),
            FieldsnapStatus::InvalidHandle as i32
        );
    }

    #[test]
    fn invalid_config_is_reported() {
        let config = FieldsnapCollectorConfig {
            rows: 0,
            ..FieldsnapCollectorConfig::default()
        };
        let mut h = 0;
        assert_eq!(
            fieldsnap_collector_create(&config, &mut h),
            FieldsnapStatus::ConfigError as i32
        );
        let tiny = FieldsnapCollectorConfig {
            rows: 10,
            width: 10,
            memory_limit_bytes: 16,
            ..FieldsnapCollectorConfig::default()
        };
        assert_eq!(
            fieldsnap_collector_create(&tiny, &mut h),
            FieldsnapStatus::OutOfMemory as i32
        );
    }

    #[test]
    fn read_row_checks_bounds_and_capacity() {
        let h = create(2, 3, FieldsnapDType::F64);
        let mut small = [0.0f64; 2];
        assert_eq!(
            fieldsnap_collector_read_row(h, 0, small.as_mut_ptr(), 2),
            FieldsnapStatus::BufferTooSmall as i32
        );
        let mut out = [0.0f64; 3];
        assert_eq!(
            fieldsnap_collector_read_row(h, 2, out.as_mut_ptr(), 3),
            FieldsnapStatus::InvalidArgument as i32
        );
        fieldsnap_collector_destroy(h);
    }

    #[test]
    fn singular_values_of_rank_one_buffer() {
        let h = create(3, 4, FieldsnapDType::F64);
        // Interior columns [1, 2] scaled per row: rank one.
        for scale in [1.0, 2.0, 2.0] {
            assert_eq!(collect_f64(h, &[9.0, scale, 2.0 * scale, 9.0]), OK);
        }
        let mut n = 0;
        let mut tiny = [0.0f64; 1];
        assert_eq!(
            fieldsnap_collector_singular_values(h, tiny.as_mut_ptr(), 1, &mut n),
            FieldsnapStatus::BufferTooSmall as i32
        );
        assert_eq!(n, 2);
        let mut values = [0.0f64; 2];
        assert_eq!(fieldsnap_collector_singular_values(h, values.as_mut_ptr(), 2, &mut n), OK);
        // ‖[1,2,2]‖ · ‖[1,2]‖ = 3 · √5.
        assert!((values[0] - 3.0 * 5.0f64.sqrt()).abs() < 1e-10);
        assert!(values[1].abs() < 1e-10);
        fieldsnap_collector_destroy(h);
    }

    #[test]
    fn reset_rewinds() {
        let h = create(2, 1, FieldsnapDType::F64);
        collect_f64(h, &[4.0]);
        assert_eq!(fieldsnap_collector_reset(h), OK);
        let mut cursor = 1;
        fieldsnap_collector_cursor(h, &mut cursor);
        assert_eq!(cursor, 0);
        assert_eq!(read_row(h, 0, 1), vec![0.0]);
        let mut dtype = -1;
        assert_eq!(fieldsnap_collector_dtype(h, &mut dtype), OK);
        assert_eq!(dtype, FieldsnapDType::F64 as i32);
        fieldsnap_collector_destroy(h);
    }
}
