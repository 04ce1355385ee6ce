//! Solver configuration.

pub mod options;
pub use options::{EtaChoice, KinOptions, PrintFlags};
