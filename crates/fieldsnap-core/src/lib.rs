//! Core types for the fieldsnap workspace.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the vocabulary shared by every other crate: element types, devices,
//! strided layouts, the library-agnostic buffer-exchange descriptor and
//! the errors those produce.
//!
//! `unsafe` is confined to [`exchange`], where a validated descriptor is
//! turned into a typed slice borrow.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod device;
pub mod dtype;
pub mod error;
pub mod exchange;
pub mod layout;

pub use device::Device;
pub use dtype::{DType, Element};
pub use error::{ExchangeError, LayoutError};
pub use exchange::{
    ExchangeDescriptor, Exportable, ExportableMut, Exported, ExportedMut, TypedBorrow,
    TypedBorrowMut,
};
pub use layout::{Dims, Layout, Strides};
