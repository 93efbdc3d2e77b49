//! GPU slice processing.
//!
//! This module handles:
//! - Extracting render stage slices from the trace store
//! - Mapping replay handles back to trace handles
//! - Resolving the dense submission order
//! - Grouping slices by render pass

pub mod extract;
pub mod grouping;
pub mod handles;
pub mod schema;
pub mod submission;

// Re-export main types
pub use extract::{process_gpu_slices, SliceSource, StoreSliceSource};
pub use grouping::{
    group_render_passes, GroupingReport, RenderPassKey, RenderPassLookup, RenderPassTable,
};
pub use handles::{HandleMapping, HandleMappingItem, IdentifierRemapper};
pub use schema::{CommandRange, GpuSlices, GpuTrack, Group, Slice, SliceData};
pub use submission::{query_submission_order, SubmissionOrder};
