//! Shared fixtures for integration tests.

#![allow(dead_code)]

use gpu_profile_studio::slices::{CommandRange, RenderPassKey, Slice, SliceData};
use gpu_profile_studio::store::{Column, QueryContext, QueryResult, TraceStore};
use gpu_profile_studio::utils::config::{
    counter_samples_query, COUNTER_TRACKS_QUERY, QUEUE_SUBMIT_QUERY,
};
use gpu_profile_studio::utils::error::QueryError;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

/// Trace store answering canned results per query text
#[derive(Default)]
pub struct ScriptedStore {
    results: HashMap<String, QueryResult>,
    failing: HashSet<String>,
    issued: Mutex<Vec<String>>,
}

impl ScriptedStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_result(mut self, result: QueryResult) -> Self {
        self.results.insert(result.query().to_string(), result);
        self
    }

    pub fn failing(mut self, query: &str) -> Self {
        self.failing.insert(query.to_string());
        self
    }

    pub fn with_submissions(self, rows: &[(i64, i64)]) -> Self {
        self.with_result(QueryResult::new(
            QUEUE_SUBMIT_QUERY,
            vec![
                Column::long("submission_id", rows.iter().map(|r| r.0).collect()),
                Column::long("command_buffer", rows.iter().map(|r| r.1).collect()),
            ],
        ))
    }

    /// Counter tracks in the given row order, as the store would return them
    pub fn with_counter_tracks(self, tracks: &[(i64, &str)]) -> Self {
        self.with_result(QueryResult::new(
            COUNTER_TRACKS_QUERY,
            vec![
                Column::long("id", tracks.iter().map(|t| t.0).collect()),
                Column::string("name", tracks.iter().map(|t| t.1.to_string()).collect()),
                Column::string("unit", tracks.iter().map(|_| "%".to_string()).collect()),
                Column::string(
                    "description",
                    tracks.iter().map(|t| format!("{} counter", t.1)).collect(),
                ),
            ],
        ))
    }

    pub fn with_samples(self, track_id: i64, samples: &[(i64, f64)]) -> Self {
        self.with_result(QueryResult::new(
            counter_samples_query(track_id),
            vec![
                Column::long("ts", samples.iter().map(|s| s.0).collect()),
                Column::double("value", samples.iter().map(|s| s.1).collect()),
            ],
        ))
    }

    /// Queries issued so far
    pub fn issued(&self) -> Vec<String> {
        self.issued.lock().unwrap().clone()
    }
}

impl TraceStore for ScriptedStore {
    fn query(&self, ctx: &QueryContext, sql: &str) -> Result<QueryResult, QueryError> {
        ctx.check()?;
        self.issued.lock().unwrap().push(sql.to_string());

        if self.failing.contains(sql) {
            return Err(QueryError::Execution {
                query: sql.to_string(),
                reason: "scripted failure".to_string(),
            });
        }

        self.results
            .get(sql)
            .cloned()
            .ok_or_else(|| QueryError::Execution {
                query: sql.to_string(),
                reason: "no such table".to_string(),
            })
    }
}

/// A depth-0 slice on track 1 with context 0
pub fn slice(
    id: i64,
    name: &str,
    submission_id: i64,
    command_buffer: i64,
    render_pass: i64,
    render_target: i64,
) -> Slice {
    Slice {
        id,
        ts: id as u64 * 100,
        dur: 50,
        name: name.to_string(),
        depth: 0,
        track_id: 1,
        submission_id,
        command_buffer,
        render_pass,
        render_target,
        context: 0,
        group_id: None,
    }
}

pub fn slice_data(slices: Vec<Slice>) -> SliceData {
    SliceData::new(slices, Vec::new())
}

pub fn key(
    submission_order: u32,
    command_buffer: u64,
    render_pass: u64,
    render_target: u64,
) -> RenderPassKey {
    RenderPassKey {
        submission_order,
        command_buffer,
        render_pass,
        render_target,
    }
}

pub fn range(from: u64, to: u64) -> CommandRange {
    CommandRange::new(from, to)
}
