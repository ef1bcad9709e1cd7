//! Shared utilities.
//!
//! Filesystem helpers used by provisioning and assembly, plus test helpers.

pub mod fs;

#[cfg(test)]
pub mod testutil;
