//! Replay handle to trace handle remapping.
//!
//! Slices recorded during replay carry the handles the replay created.
//! The synchronization data is keyed by the handles of the original
//! trace, so identifiers have to be mapped back before grouping.

use super::schema::{Slice, SliceData};
use log::error;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const DEVICE_HANDLE: &str = "VkDevice";
pub const FRAMEBUFFER_HANDLE: &str = "VkFramebuffer";
pub const COMMAND_BUFFER_HANDLE: &str = "VkCommandBuffer";
pub const RENDER_PASS_HANDLE: &str = "VkRenderPass";

/// Rewrites slice identifiers in place
pub trait IdentifierRemapper: Send + Sync {
    fn map_identifiers(&self, data: &mut SliceData);
}

/// One trace object a replay handle corresponds to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandleMappingItem {
    pub handle_type: String,
    pub replay_value: u64,
    pub trace_value: u64,
}

/// Replay handle -> trace objects table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HandleMapping {
    items: HashMap<u64, Vec<HandleMappingItem>>,
}

impl HandleMapping {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Trace value of `replay_handle` for the given handle type
    pub fn trace_handle(&self, replay_handle: u64, handle_type: &str) -> Option<u64> {
        self.items
            .get(&replay_handle)?
            .iter()
            .find(|item| item.handle_type == handle_type)
            .map(|item| item.trace_value)
    }

    /// Replace `handle` with its trace value; unknown handles are left as-is
    fn remap(&self, handle: &mut i64, handle_type: &str) {
        let replay_handle = *handle as u64;
        let Some(items) = self.items.get(&replay_handle) else {
            error!("{} not found in replay: {}", handle_type, handle);
            return;
        };

        match items.iter().find(|item| item.handle_type == handle_type) {
            Some(item) => *handle = item.trace_value as i64,
            None => error!("Incorrect Handle type for {}: {}", handle_type, handle),
        }
    }

    fn remap_slice(&self, slice: &mut Slice) {
        self.remap(&mut slice.context, DEVICE_HANDLE);
        self.remap(&mut slice.render_target, FRAMEBUFFER_HANDLE);
        self.remap(&mut slice.command_buffer, COMMAND_BUFFER_HANDLE);
        self.remap(&mut slice.render_pass, RENDER_PASS_HANDLE);
    }
}

impl FromIterator<HandleMappingItem> for HandleMapping {
    fn from_iter<T: IntoIterator<Item = HandleMappingItem>>(iter: T) -> Self {
        let mut items: HashMap<u64, Vec<HandleMappingItem>> = HashMap::new();
        for item in iter {
            items.entry(item.replay_value).or_default().push(item);
        }
        Self { items }
    }
}

impl IdentifierRemapper for HandleMapping {
    fn map_identifiers(&self, data: &mut SliceData) {
        for slice in &mut data.slices {
            self.remap_slice(slice);
        }
    }
}
