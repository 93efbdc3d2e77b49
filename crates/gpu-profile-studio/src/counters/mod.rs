//! GPU counter tracks and device counter descriptors.

pub mod descriptor;
pub mod extract;

// Re-export main types
pub use descriptor::{CounterDescriptor, CounterSpec};
pub use extract::{process_counters, CounterTrack};
