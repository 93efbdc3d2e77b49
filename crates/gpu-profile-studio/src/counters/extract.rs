//! Counter track extraction.
//!
//! Track metadata comes from one query; each track's samples come from a
//! second, per-track query. Output is always ordered by ascending track id,
//! whatever order the metadata query or the sample queries complete in.

use super::descriptor::{CounterDescriptor, CounterSpec};
use crate::slices::extract::to_unsigned;
use crate::store::{QueryContext, TraceStore};
use crate::utils::config::{counter_samples_query, COUNTER_TRACKS_QUERY};
use crate::utils::error::QueryError;
use log::{debug, error};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A counter time series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CounterTrack {
    pub id: u32,
    pub name: String,
    pub unit: String,
    pub description: String,

    /// Device spec matched by exact name, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spec: Option<CounterSpec>,

    /// Sample timestamps (ns), ascending
    pub timestamps: Vec<u64>,

    pub values: Vec<f64>,
}

/// Metadata row of a counter track
#[derive(Debug, Clone)]
struct TrackRow {
    id: i64,
    name: String,
    unit: String,
    description: String,
}

/// Extract all counter tracks with their samples
///
/// **Public** - counter half of the profiling pipeline
///
/// # Arguments
/// * `store` - Trace store to query
/// * `ctx` - Request query context
/// * `descriptor` - Optional device descriptor to attach specs from
/// * `parallel` - Issue per-track sample queries concurrently
///
/// # Errors
/// Any query failure aborts extraction; no partial list is returned.
pub fn process_counters(
    store: &dyn TraceStore,
    ctx: &QueryContext,
    descriptor: Option<&CounterDescriptor>,
    parallel: bool,
) -> Result<Vec<CounterTrack>, QueryError> {
    let mut rows = query_track_rows(store, ctx).map_err(|e| {
        error!("SQL query failed: {}: {}", COUNTER_TRACKS_QUERY, e);
        e
    })?;

    // Pin the output order instead of trusting the ORDER BY of the store
    rows.sort_by_key(|row| row.id);

    let specs: HashMap<&str, &CounterSpec> = descriptor
        .map(CounterDescriptor::specs_by_name)
        .unwrap_or_default();

    let build = |row: &TrackRow| -> Result<CounterTrack, QueryError> {
        let (timestamps, values) = query_samples(store, ctx, row.id)?;
        Ok(CounterTrack {
            id: row.id as u32,
            name: row.name.clone(),
            unit: row.unit.clone(),
            description: row.description.clone(),
            spec: specs.get(row.name.as_str()).map(|spec| (*spec).clone()),
            timestamps,
            values,
        })
    };

    // Both paths collect in `rows` order
    let counters = if parallel {
        rows.par_iter().map(build).collect::<Result<Vec<_>, _>>()
    } else {
        rows.iter().map(build).collect::<Result<Vec<_>, _>>()
    }?;

    debug!("Extracted {} counter tracks", counters.len());
    Ok(counters)
}

fn query_track_rows(store: &dyn TraceStore, ctx: &QueryContext) -> Result<Vec<TrackRow>, QueryError> {
    let result = store.query(ctx, COUNTER_TRACKS_QUERY)?;
    let ids = result.long_values(0)?;
    let names = result.string_values(1)?;
    let units = result.string_values(2)?;
    let descriptions = result.string_values(3)?;

    Ok((0..result.num_records())
        .map(|i| TrackRow {
            id: ids[i],
            name: names[i].clone(),
            unit: units[i].clone(),
            description: descriptions[i].clone(),
        })
        .collect())
}

fn query_samples(
    store: &dyn TraceStore,
    ctx: &QueryContext,
    track_id: i64,
) -> Result<(Vec<u64>, Vec<f64>), QueryError> {
    let query = counter_samples_query(track_id);
    let result = store.query(ctx, &query).map_err(|e| {
        error!("SQL query failed: {}: {}", query, e);
        e
    })?;

    let timestamps = result
        .long_values(0)?
        .iter()
        .map(|&ts| to_unsigned(ts))
        .collect();
    let values = result.double_values(1)?.to_vec();

    Ok((timestamps, values))
}
