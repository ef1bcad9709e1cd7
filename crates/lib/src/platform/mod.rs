//! Host platform detection and project locations.

pub mod os;
pub mod paths;

pub use os::HostPlatform;
pub use paths::{HostTools, ProjectPaths};
