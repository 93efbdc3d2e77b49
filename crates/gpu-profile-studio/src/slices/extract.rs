//! GPU slice extraction from the trace store.

use super::grouping::{group_render_passes, RenderPassLookup};
use super::handles::IdentifierRemapper;
use super::schema::{GpuSlices, GpuTrack, Slice, SliceData};
use super::submission::query_submission_order;
use crate::store::{QueryContext, TraceStore};
use crate::utils::config::{GPU_SLICES_QUERY, GPU_TRACKS_QUERY};
use crate::utils::error::QueryError;
use log::{debug, error, info, warn};

/// Produces the initial slice records of a request, in query order
pub trait SliceSource: Send + Sync {
    fn extract_slices(&self, ctx: &QueryContext) -> Result<SliceData, QueryError>;
}

/// Slice source reading render stage slices straight from a trace store
pub struct StoreSliceSource<'a> {
    store: &'a dyn TraceStore,
}

impl<'a> StoreSliceSource<'a> {
    pub fn new(store: &'a dyn TraceStore) -> Self {
        Self { store }
    }
}

impl SliceSource for StoreSliceSource<'_> {
    fn extract_slices(&self, ctx: &QueryContext) -> Result<SliceData, QueryError> {
        let result = self.store.query(ctx, GPU_SLICES_QUERY)?;
        let ids = result.long_values(0)?;
        let timestamps = result.long_values(1)?;
        let durations = result.long_values(2)?;
        let names = result.string_values(3)?;
        let depths = result.long_values(4)?;
        let track_ids = result.long_values(5)?;
        let submissions = result.long_values(6)?;
        let command_buffers = result.long_values(7)?;
        let render_passes = result.long_values(8)?;
        let render_targets = result.long_values(9)?;
        let contexts = result.long_values(10)?;

        let slices = (0..result.num_records())
            .map(|i| Slice {
                id: ids[i],
                ts: to_unsigned(timestamps[i]),
                dur: to_unsigned(durations[i]),
                name: names[i].clone(),
                depth: to_depth(depths[i]),
                track_id: track_ids[i],
                submission_id: submissions[i],
                command_buffer: command_buffers[i],
                render_pass: render_passes[i],
                render_target: render_targets[i],
                context: contexts[i],
                group_id: None,
            })
            .collect::<Vec<_>>();

        let tracks_result = self.store.query(ctx, GPU_TRACKS_QUERY)?;
        let track_ids = tracks_result.long_values(0)?;
        let track_names = tracks_result.string_values(1)?;
        let tracks = track_ids
            .iter()
            .zip(track_names)
            .map(|(&id, name)| GpuTrack {
                id,
                name: name.clone(),
            })
            .collect();

        debug!("Extracted {} GPU slices", slices.len());
        Ok(SliceData::new(slices, tracks))
    }
}

/// Convert a trace timestamp or duration to the unsigned time domain
///
/// Negative values never come from a valid trace; they clamp to 0.
pub fn to_unsigned(value: i64) -> u64 {
    u64::try_from(value).unwrap_or_else(|_| {
        warn!("Negative time value {} clamped to 0", value);
        0
    })
}

fn to_depth(value: i64) -> i32 {
    i32::try_from(value).unwrap_or_else(|_| {
        let clamped = if value < 0 { i32::MIN } else { i32::MAX };
        warn!("Slice depth {} out of range, clamped to {}", value, clamped);
        clamped
    })
}

/// Run the slice stage: extract, order submissions, remap, group
///
/// **Public** - slice half of the profiling pipeline
///
/// # Errors
/// Any query failure aborts the stage. Grouping anomalies are only logged.
pub fn process_gpu_slices(
    ctx: &QueryContext,
    source: &dyn SliceSource,
    store: &dyn TraceStore,
    remapper: &dyn IdentifierRemapper,
    lookup: &dyn RenderPassLookup,
) -> Result<GpuSlices, QueryError> {
    let mut data = source.extract_slices(ctx).map_err(|e| {
        error!("Extracting slice data failed: {}", e);
        e
    })?;

    let order = query_submission_order(store, ctx).map_err(|e| {
        error!("Resolving submission order failed: {}", e);
        e
    })?;

    remapper.map_identifiers(&mut data);

    let report = group_render_passes(&mut data, &order, lookup);
    info!(
        "Grouped {} GPU slices into {} render passes",
        report.slices, report.groups
    );

    Ok(data.into_gpu_slices())
}
