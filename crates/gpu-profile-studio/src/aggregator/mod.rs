//! Derived GPU performance counters.
//!
//! This module correlates grouped slices with counter tracks into
//! per render pass metrics (GPU time, wall time, averaged counters).

pub mod gpu_counters;

// Re-export main types and functions
pub use gpu_counters::{
    time_weighted_average, AggregateOp, CounterComputer, GpuCounters, GroupCounterComputer,
    GroupEntry, Metric, GPU_TIME_METRIC_ID, GPU_WALL_TIME_METRIC_ID,
};
