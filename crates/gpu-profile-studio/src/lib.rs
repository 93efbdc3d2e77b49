//! GPU Profile Studio library
//!
//! Turns GPU render stage slices and hardware counter samples from a
//! trace store into an analysis-ready profiling dataset.
//!
//! This exposes the internal modules for the CLI and for testing

pub mod aggregator;
pub mod commands;
pub mod counters;
pub mod output;
pub mod profiling;
pub mod slices;
pub mod store;
pub mod utils;

pub use profiling::{process_profiling_data, ProfilingData, ProfilingInputs};
