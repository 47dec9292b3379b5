//! C FFI bindings for fieldsnap.
//!
//! Lets an external simulation loop hand raw field pointers to a snapshot
//! collector and read the results back. Collectors are addressed by opaque
//! `u64` handles; every entry point returns a [`FieldsnapStatus`] code and
//! never unwinds into C.
//!
//! This crate and `fieldsnap-core` are the only places that contain `unsafe`.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

/// Run an entry point body, turning a panic into `FieldsnapStatus::Panicked`.
macro_rules! ffi_guard {
    ($body:block) => {{
        match ::std::panic::catch_unwind(::std::panic::AssertUnwindSafe(|| -> i32 { $body })) {
            Ok(code) => code,
            Err(_) => {
                ::log::error!("panic caught at the fieldsnap FFI boundary");
                $crate::status::FieldsnapStatus::Panicked as i32
            }
        }
    }};
}

/// Lock a handle table, returning `InternalError` from the guarded body if
/// the mutex was poisoned.
macro_rules! ffi_lock {
    ($mutex:expr) => {
        match $mutex.lock() {
            Ok(guard) => guard,
            Err(_) => return $crate::status::FieldsnapStatus::InternalError as i32,
        }
    };
}

pub mod collector;
mod handle;
pub mod status;
pub mod types;

pub use status::FieldsnapStatus;
pub use types::{FieldsnapCollectorConfig, FieldsnapDType, FieldsnapOverflow};
