//! GPU slice data definitions.
//!
//! `SliceData` is the mutable working set of one request (slices are
//! renamed and grouped in place); `GpuSlices` is what ends up in the
//! profiling output.

use super::grouping::RenderPassKey;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// A single GPU render stage slice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slice {
    pub id: i64,

    /// Start timestamp (ns)
    pub ts: u64,

    /// Duration (ns)
    pub dur: u64,

    pub name: String,

    /// Nesting depth on its track (0 = top level)
    pub depth: i32,

    pub track_id: i64,

    /// External submission id this slice was executed under
    pub submission_id: i64,

    pub command_buffer: i64,
    pub render_pass: i64,
    pub render_target: i64,

    /// Device handle
    pub context: i64,

    /// Render pass group, `None` until one has been established
    #[serde(default)]
    pub group_id: Option<u32>,
}

impl Slice {
    /// End timestamp (ns)
    pub fn end(&self) -> u64 {
        self.ts.saturating_add(self.dur)
    }
}

/// A GPU track slices are placed on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GpuTrack {
    pub id: i64,
    pub name: String,
}

/// Half-open `[from, to)` range into the synchronization-derived command order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CommandRange {
    pub from: u64,
    pub to: u64,
}

impl CommandRange {
    pub fn new(from: u64, to: u64) -> Self {
        Self { from, to }
    }

    pub fn is_empty(&self) -> bool {
        self.from >= self.to
    }
}

impl fmt::Display for CommandRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.from, self.to)
    }
}

/// Slices of one render pass instance, grouped for aggregation and display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub id: u32,

    /// "RenderPass {id}, RenderTarget {id}"
    pub name: String,

    pub range: CommandRange,
}

/// Slice working set of one profiling request
#[derive(Debug, Clone, Default)]
pub struct SliceData {
    pub slices: Vec<Slice>,
    pub tracks: Vec<GpuTrack>,
    groups: Vec<Group>,
    group_index: HashMap<RenderPassKey, u32>,
}

impl SliceData {
    /// Create slice data in query order with no groups
    pub fn new(slices: Vec<Slice>, tracks: Vec<GpuTrack>) -> Self {
        Self {
            slices,
            tracks,
            groups: Vec::new(),
            group_index: HashMap::new(),
        }
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    /// Return the group for `key`, creating it on first use
    ///
    /// Group ids are dense and assigned in creation order starting at 0.
    pub fn create_or_get_group(&mut self, key: RenderPassKey, range: CommandRange) -> u32 {
        if let Some(&id) = self.group_index.get(&key) {
            return id;
        }

        let id = self.groups.len() as u32;
        self.groups.push(Group {
            id,
            name: format!(
                "RenderPass {}, RenderTarget {}",
                key.render_pass, key.render_target
            ),
            range,
        });
        self.group_index.insert(key, id);
        id
    }

    /// Convert to the output representation
    pub fn into_gpu_slices(self) -> GpuSlices {
        GpuSlices {
            slices: self.slices,
            tracks: self.tracks,
            groups: self.groups,
        }
    }
}

/// Grouped and renamed slices as written to the profiling output
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GpuSlices {
    pub slices: Vec<Slice>,
    pub tracks: Vec<GpuTrack>,
    pub groups: Vec<Group>,
}
