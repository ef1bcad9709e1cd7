//! Build targets and native build tool invocation.
//!
//! The orchestrator never looks inside the build: it runs CMake, make, NMake
//! or xcodebuild as out-of-process commands and reads their exit status.

pub mod invoke;
mod types;

pub use invoke::{build_target, default_jobs, invoke};
pub use types::*;
