//! Capture snapshot backed trace store.
//!
//! A snapshot is a JSON dump of the trace tables profiling reads, plus the
//! request's side inputs (render pass table, handle mapping, counter
//! descriptor). `SnapshotStore` answers the fixed set of profiling queries
//! over it; it is not a general SQL engine.

use super::result::{Column, QueryResult};
use super::{QueryContext, TraceStore};
use crate::counters::CounterDescriptor;
use crate::slices::{CommandRange, HandleMapping, HandleMappingItem, RenderPassKey, RenderPassTable};
use crate::utils::config::{
    COUNTER_SAMPLES_QUERY_PREFIX, COUNTER_SAMPLES_QUERY_SUFFIX, COUNTER_TRACKS_QUERY,
    GPU_SLICES_QUERY, GPU_TRACKS_QUERY, QUEUE_SUBMIT_QUERY,
};
use crate::utils::error::{QueryError, SnapshotError};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// One vkQueueSubmit record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionRow {
    pub submission_id: i64,
    pub command_buffer: i64,
}

/// One render stage slice record, with replay handles
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SliceRow {
    pub id: i64,
    pub ts: i64,
    pub dur: i64,
    pub name: String,
    #[serde(default)]
    pub depth: i64,
    pub track_id: i64,
    pub submission_id: i64,
    pub command_buffer: i64,
    pub render_pass: i64,
    pub render_target: i64,
    #[serde(default)]
    pub context: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackRow {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterTrackRow {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CounterSampleRow {
    pub track_id: i64,
    pub ts: i64,
    pub value: f64,
}

/// Render pass instance correlated with a command range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderPassRow {
    #[serde(flatten)]
    pub key: RenderPassKey,
    pub from: u64,
    pub to: u64,
}

/// Everything one profiling request reads
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CaptureSnapshot {
    #[serde(default)]
    pub submissions: Vec<SubmissionRow>,

    #[serde(default)]
    pub gpu_slices: Vec<SliceRow>,

    #[serde(default)]
    pub gpu_tracks: Vec<TrackRow>,

    #[serde(default)]
    pub counter_tracks: Vec<CounterTrackRow>,

    #[serde(default)]
    pub counter_samples: Vec<CounterSampleRow>,

    #[serde(default)]
    pub render_passes: Vec<RenderPassRow>,

    #[serde(default)]
    pub handle_mapping: Vec<HandleMappingItem>,

    #[serde(default)]
    pub counter_descriptor: Option<CounterDescriptor>,
}

impl CaptureSnapshot {
    /// Render pass lookup built from the snapshot's table
    pub fn render_pass_table(&self) -> RenderPassTable {
        self.render_passes
            .iter()
            .map(|row| (row.key, CommandRange::new(row.from, row.to)))
            .collect()
    }

    /// Handle remapper built from the snapshot's mapping items
    pub fn handle_mapping(&self) -> HandleMapping {
        self.handle_mapping.iter().cloned().collect()
    }
}

/// Load a capture snapshot from a JSON file
///
/// # Errors
/// * `SnapshotError::ReadFailed` - File cannot be opened
/// * `SnapshotError::InvalidFormat` - JSON does not match the snapshot layout
pub fn load_snapshot(path: impl AsRef<Path>) -> Result<CaptureSnapshot, SnapshotError> {
    let path = path.as_ref();
    debug!("Reading capture snapshot from: {}", path.display());

    let file = File::open(path)?;
    let snapshot: CaptureSnapshot = serde_json::from_reader(BufReader::new(file))?;

    info!(
        "Snapshot loaded: {} slices, {} submissions, {} counter tracks",
        snapshot.gpu_slices.len(),
        snapshot.submissions.len(),
        snapshot.counter_tracks.len()
    );

    Ok(snapshot)
}

/// Trace store answering the profiling queries from a snapshot
pub struct SnapshotStore<'a> {
    snapshot: &'a CaptureSnapshot,
}

impl<'a> SnapshotStore<'a> {
    pub fn new(snapshot: &'a CaptureSnapshot) -> Self {
        Self { snapshot }
    }

    fn queue_submits(&self, sql: &str) -> QueryResult {
        let mut rows: Vec<&SubmissionRow> = self.snapshot.submissions.iter().collect();
        rows.sort_by_key(|r| r.submission_id);

        QueryResult::new(
            sql,
            vec![
                Column::long("submission_id", rows.iter().map(|r| r.submission_id).collect()),
                Column::long("command_buffer", rows.iter().map(|r| r.command_buffer).collect()),
            ],
        )
    }

    fn counter_tracks(&self, sql: &str) -> QueryResult {
        let mut rows: Vec<&CounterTrackRow> = self.snapshot.counter_tracks.iter().collect();
        rows.sort_by_key(|r| r.id);

        QueryResult::new(
            sql,
            vec![
                Column::long("id", rows.iter().map(|r| r.id).collect()),
                Column::string("name", rows.iter().map(|r| r.name.clone()).collect()),
                Column::string("unit", rows.iter().map(|r| r.unit.clone()).collect()),
                Column::string(
                    "description",
                    rows.iter().map(|r| r.description.clone()).collect(),
                ),
            ],
        )
    }

    fn counter_samples(&self, sql: &str, track_id: i64) -> QueryResult {
        let mut rows: Vec<&CounterSampleRow> = self
            .snapshot
            .counter_samples
            .iter()
            .filter(|r| r.track_id == track_id)
            .collect();
        rows.sort_by_key(|r| r.ts);

        QueryResult::new(
            sql,
            vec![
                Column::long("ts", rows.iter().map(|r| r.ts).collect()),
                Column::double("value", rows.iter().map(|r| r.value).collect()),
            ],
        )
    }

    fn gpu_slices(&self, sql: &str) -> QueryResult {
        let mut rows: Vec<&SliceRow> = self.snapshot.gpu_slices.iter().collect();
        // Stable, so equal timestamps keep their recorded order
        rows.sort_by_key(|r| r.ts);

        QueryResult::new(
            sql,
            vec![
                Column::long("id", rows.iter().map(|r| r.id).collect()),
                Column::long("ts", rows.iter().map(|r| r.ts).collect()),
                Column::long("dur", rows.iter().map(|r| r.dur).collect()),
                Column::string("name", rows.iter().map(|r| r.name.clone()).collect()),
                Column::long("depth", rows.iter().map(|r| r.depth).collect()),
                Column::long("track_id", rows.iter().map(|r| r.track_id).collect()),
                Column::long("submission_id", rows.iter().map(|r| r.submission_id).collect()),
                Column::long("command_buffer", rows.iter().map(|r| r.command_buffer).collect()),
                Column::long("render_pass", rows.iter().map(|r| r.render_pass).collect()),
                Column::long("render_target", rows.iter().map(|r| r.render_target).collect()),
                Column::long("context", rows.iter().map(|r| r.context).collect()),
            ],
        )
    }

    fn gpu_tracks(&self, sql: &str) -> QueryResult {
        let mut rows: Vec<&TrackRow> = self.snapshot.gpu_tracks.iter().collect();
        rows.sort_by_key(|r| r.id);

        QueryResult::new(
            sql,
            vec![
                Column::long("id", rows.iter().map(|r| r.id).collect()),
                Column::string("name", rows.iter().map(|r| r.name.clone()).collect()),
            ],
        )
    }
}

/// Track id of a counter samples query, if `sql` is one
fn parse_counter_samples_query(sql: &str) -> Option<i64> {
    sql.strip_prefix(COUNTER_SAMPLES_QUERY_PREFIX)?
        .strip_suffix(COUNTER_SAMPLES_QUERY_SUFFIX)?
        .trim()
        .parse()
        .ok()
}

impl TraceStore for SnapshotStore<'_> {
    fn query(&self, ctx: &QueryContext, sql: &str) -> Result<QueryResult, QueryError> {
        ctx.check()?;

        let result = match sql {
            QUEUE_SUBMIT_QUERY => self.queue_submits(sql),
            COUNTER_TRACKS_QUERY => self.counter_tracks(sql),
            GPU_SLICES_QUERY => self.gpu_slices(sql),
            GPU_TRACKS_QUERY => self.gpu_tracks(sql),
            _ => match parse_counter_samples_query(sql) {
                Some(track_id) => self.counter_samples(sql, track_id),
                None => {
                    return Err(QueryError::Execution {
                        query: sql.to_string(),
                        reason: "unsupported query".to_string(),
                    })
                }
            },
        };

        debug!("Query returned {} rows: {}", result.num_records(), sql);
        Ok(result)
    }
}
