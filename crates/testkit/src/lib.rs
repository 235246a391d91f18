#![warn(missing_docs)]
//! Test support: scratch directories with model fixtures and canonical JSON comparison.

mod fixtures;
mod snapshot;

pub use fixtures::*;
pub use snapshot::*;
