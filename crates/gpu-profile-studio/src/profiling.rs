//! Profiling data orchestration.
//!
//! Runs the slice stage and the counter stage independently, feeds
//! whatever succeeded to the derived counter computation, and always
//! returns an aggregate. A failed stage leaves its field empty.

use crate::aggregator::{CounterComputer, GpuCounters};
use crate::counters::{process_counters, CounterDescriptor, CounterTrack};
use crate::slices::{
    process_gpu_slices, GpuSlices, IdentifierRemapper, RenderPassLookup, SliceSource,
};
use crate::store::{QueryContext, TraceStore};
use crate::utils::config::{ProfilerConfig, SCHEMA_VERSION};
use crate::utils::error::QueryError;
use chrono::Utc;
use log::{error, info};
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Analysis-ready profiling dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfilingData {
    /// Schema version for compatibility checking
    pub version: String,

    /// Timestamp when the data was generated
    pub generated_at: String,

    /// Grouped and renamed slices, `None` if the slice stage failed
    pub slices: Option<GpuSlices>,

    /// Counter tracks by ascending id, `None` if the counter stage failed
    pub counters: Option<Vec<CounterTrack>>,

    /// Derived per render pass counters, `None` if they could not be computed
    pub gpu_counters: Option<GpuCounters>,
}

/// Collaborators of one profiling request
pub struct ProfilingInputs<'a> {
    pub store: &'a dyn TraceStore,
    pub slice_source: &'a dyn SliceSource,
    pub remapper: &'a dyn IdentifierRemapper,
    pub lookup: &'a dyn RenderPassLookup,
    pub descriptor: Option<&'a CounterDescriptor>,
    pub computer: &'a dyn CounterComputer,
}

/// Build the profiling dataset for one request
///
/// **Public** - main entry point of the library
///
/// Never fails: stage failures are logged where they happen and degrade
/// the aggregate to partial data.
pub fn process_profiling_data(
    ctx: &QueryContext,
    inputs: &ProfilingInputs<'_>,
    config: &ProfilerConfig,
) -> ProfilingData {
    let start_time = Instant::now();

    let slice_stage = || {
        process_gpu_slices(
            ctx,
            inputs.slice_source,
            inputs.store,
            inputs.remapper,
            inputs.lookup,
        )
    };
    let counter_stage =
        || process_counters(inputs.store, ctx, inputs.descriptor, config.parallel);

    let (slices, counters) = if config.parallel {
        rayon::join(slice_stage, counter_stage)
    } else {
        (slice_stage(), counter_stage())
    };

    let slices = stage_output("GPU slices", slices);
    let counters = stage_output("GPU counters", counters);

    let gpu_counters = match inputs
        .computer
        .compute(slices.as_ref(), counters.as_deref())
    {
        Ok(gpu_counters) => Some(gpu_counters),
        Err(e) => {
            error!(
                "Failed to calculate performance data based on GPU slices and counters: {}",
                e
            );
            None
        }
    };

    info!(
        "Profiling data ready in {:.2}s ({} slices, {} counter tracks)",
        start_time.elapsed().as_secs_f64(),
        slices.as_ref().map_or(0, |s| s.slices.len()),
        counters.as_ref().map_or(0, Vec::len)
    );

    ProfilingData {
        version: SCHEMA_VERSION.to_string(),
        generated_at: Utc::now().to_rfc3339(),
        slices,
        counters,
        gpu_counters,
    }
}

fn stage_output<T>(stage: &str, result: Result<T, QueryError>) -> Option<T> {
    match result {
        Ok(output) => Some(output),
        Err(e) => {
            error!("Failed to get {}: {}", stage, e);
            None
        }
    }
}
