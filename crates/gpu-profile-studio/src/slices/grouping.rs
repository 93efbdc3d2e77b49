//! Render pass grouping of GPU slices.
//!
//! Only the `vertex` and `fragment` stage slices of a render pass can be
//! matched against the synchronization data. Every other slice (barriers,
//! secondary work) is attributed to the most recently matched render pass,
//! so a single forward pass carries the current group along.
//!
//! # Algorithm
//! 1. Resolve the slice's submission order
//! 2. Look up its `RenderPassKey`
//! 3. On a boundary slice with a match, rename it and open (or reuse) a group
//! 4. Assign the current group to the slice

use super::schema::{CommandRange, SliceData};
use super::submission::SubmissionOrder;
use crate::utils::config::BOUNDARY_SLICE_NAMES;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Identifies one render pass instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RenderPassKey {
    pub submission_order: u32,
    pub command_buffer: u64,
    pub render_pass: u64,
    pub render_target: u64,
}

/// Correlates a render pass instance with a command index range
///
/// Backed by a prior synchronization analysis; `None` means no correlated
/// range was found.
pub trait RenderPassLookup: Send + Sync {
    fn lookup(&self, key: &RenderPassKey) -> Option<CommandRange>;
}

/// Table-backed render pass lookup
#[derive(Debug, Clone, Default)]
pub struct RenderPassTable {
    entries: HashMap<RenderPassKey, CommandRange>,
}

impl RenderPassTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: RenderPassKey, range: CommandRange) {
        self.entries.insert(key, range);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(RenderPassKey, CommandRange)> for RenderPassTable {
    fn from_iter<T: IntoIterator<Item = (RenderPassKey, CommandRange)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl RenderPassLookup for RenderPassTable {
    fn lookup(&self, key: &RenderPassKey) -> Option<CommandRange> {
        self.entries.get(key).copied()
    }
}

/// Outcome counters of one grouping pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GroupingReport {
    pub slices: usize,
    pub groups: usize,

    /// Slices whose submission id had no resolved order
    pub mismatched_submissions: usize,

    /// Slices reached before any group was established
    pub ungrouped: usize,
}

/// Whether `name` is a stage slice that opens a render pass group
pub fn is_boundary_slice(name: &str) -> bool {
    BOUNDARY_SLICE_NAMES.contains(&name)
}

/// Assign render pass groups to slices in place
///
/// Slices are processed in their stored order. Matched boundary slices are
/// renamed to `"{from}-{to} {name}"`. A slice whose submission id has no
/// resolved order skips the lookup but still inherits the current group.
pub fn group_render_passes(
    data: &mut SliceData,
    order: &SubmissionOrder,
    lookup: &dyn RenderPassLookup,
) -> GroupingReport {
    let mut report = GroupingReport {
        slices: data.slices.len(),
        ..Default::default()
    };
    let mut current: Option<u32> = None;

    for i in 0..data.slices.len() {
        let slice = &data.slices[i];

        match order.get(slice.submission_id) {
            Some(submission_order) => {
                let key = RenderPassKey {
                    submission_order,
                    command_buffer: slice.command_buffer as u64,
                    render_pass: slice.render_pass as u64,
                    render_target: slice.render_target as u64,
                };

                let matched = lookup
                    .lookup(&key)
                    .filter(|range| !range.is_empty() && is_boundary_slice(&slice.name));

                if let Some(range) = matched {
                    let renamed = format!("{} {}", range, slice.name);
                    data.slices[i].name = renamed;
                    current = Some(data.create_or_get_group(key, range));
                }
            }
            None => {
                warn!(
                    "Encountered submission ID mismatch {}",
                    slice.submission_id
                );
                report.mismatched_submissions += 1;
            }
        }

        let slice = &mut data.slices[i];
        if current.is_none() {
            warn!(
                "Group missing for slice {} at submission {}, commandBuffer {}, renderPass {}, renderTarget {}",
                slice.name,
                slice.submission_id,
                slice.command_buffer,
                slice.render_pass,
                slice.render_target
            );
            report.ungrouped += 1;
        }
        slice.group_id = current;
    }

    report.groups = data.groups().len();
    debug!(
        "Grouped {} slices into {} render passes ({} mismatched, {} ungrouped)",
        report.slices, report.groups, report.mismatched_submissions, report.ungrouped
    );

    report
}
