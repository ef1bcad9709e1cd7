//! Third-party dependency provisioning.
//!
//! A dependency is a fixed set of pinned archives plus a marker directory.
//! The marker's existence is the whole cache check: no checksum or version
//! comparison is made on cache hits.
//!
//! # Submodules
//!
//! - [`provision`] - `ensure()`, the presence-checked download and extract
//! - [`patch`] - positional header patches applied right after a download

pub mod patch;
pub mod provision;
mod types;

pub use patch::apply_patch;
pub use provision::{ensure, is_provisioned};
pub use types::*;
