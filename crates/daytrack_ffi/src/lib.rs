//! Flutter-facing FFI crate.
//!
//! Exported functions live in [`api`]. The `frb_generated` glue is
//! produced by the bridge codegen and is not part of this source tree.

pub mod api;

pub use api::*;
