//! terrabuild-lib: build orchestration for Terralistic
//!
//! This crate drives a full build of the Terralistic client and server:
//! - `fetch`: downloading and unpacking dependency archives
//! - `deps`: cached provisioning of third-party dependencies, with one-time patching
//! - `platform`: host detection and project/tool locations
//! - `build`: native build tool invocation
//! - `assemble`: replacing each target's output directory with fresh artifacts
//! - `launch`: starting the assembled client
//! - `pipeline`: the per-platform data and the stage sequence tying it together

pub mod assemble;
pub mod build;
pub mod consts;
pub mod deps;
pub mod error;
pub mod fetch;
pub mod launch;
pub mod pipeline;
pub mod platform;
pub mod util;

pub use error::{Error, Result};
