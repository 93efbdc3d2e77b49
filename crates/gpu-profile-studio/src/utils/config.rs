//! Configuration and constants for profiling.

use super::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Current output schema version
pub const SCHEMA_VERSION: &str = "1.0.0";

/// Slice names that open a render pass group
pub const BOUNDARY_SLICE_NAMES: &[&str] = &["vertex", "fragment"];

/// Submission ordering (one row per vkQueueSubmit)
pub const QUEUE_SUBMIT_QUERY: &str = "SELECT submission_id, command_buffer FROM gpu_slice s \
     JOIN track t ON s.track_id = t.id \
     WHERE s.name = 'vkQueueSubmit' AND t.name = 'Vulkan Events' \
     ORDER BY submission_id";

/// Counter track metadata
pub const COUNTER_TRACKS_QUERY: &str =
    "SELECT id, name, unit, description FROM gpu_counter_track ORDER BY id";

// Counter samples are queried per track: prefix + track id + suffix
pub const COUNTER_SAMPLES_QUERY_PREFIX: &str = "SELECT ts, value FROM counter c WHERE c.track_id = ";
pub const COUNTER_SAMPLES_QUERY_SUFFIX: &str = " ORDER BY ts";

/// Render stage slices
pub const GPU_SLICES_QUERY: &str = "SELECT id, ts, dur, name, depth, track_id, submission_id, \
     command_buffer, render_pass, render_target, context FROM gpu_slice \
     WHERE render_target IS NOT NULL ORDER BY ts";

/// GPU tracks the render stage slices live on
pub const GPU_TRACKS_QUERY: &str = "SELECT id, name FROM gpu_track ORDER BY id";

/// Build the sample query for one counter track
pub fn counter_samples_query(track_id: i64) -> String {
    format!(
        "{}{}{}",
        COUNTER_SAMPLES_QUERY_PREFIX, track_id, COUNTER_SAMPLES_QUERY_SUFFIX
    )
}

/// Profiler settings, loadable from TOML
///
/// ```toml
/// parallel = false
/// query_timeout_ms = 5000
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ProfilerConfig {
    /// Run the slice and counter stages (and per-track sample queries) on the rayon pool
    #[serde(default = "default_parallel")]
    pub parallel: bool,

    /// Deadline applied to every trace store query of a request
    #[serde(default)]
    pub query_timeout_ms: Option<u64>,
}

fn default_parallel() -> bool {
    true
}

impl Default for ProfilerConfig {
    fn default() -> Self {
        Self {
            parallel: default_parallel(),
            query_timeout_ms: None,
        }
    }
}

impl ProfilerConfig {
    /// Query deadline as a duration, if configured
    pub fn query_timeout(&self) -> Option<Duration> {
        self.query_timeout_ms.map(Duration::from_millis)
    }

    /// Reject settings that can never succeed
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.query_timeout_ms == Some(0) {
            return Err(ConfigError::Invalid(
                "query_timeout_ms must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Load profiler settings from a TOML file
///
/// # Errors
/// * `ConfigError::ReadFailed` - If file cannot be read
/// * `ConfigError::ParseFailed` - If TOML is invalid
/// * `ConfigError::Invalid` - If a value is out of range
pub fn load_config(path: impl AsRef<Path>) -> Result<ProfilerConfig, ConfigError> {
    let contents = fs::read_to_string(path)?;
    let config: ProfilerConfig = toml::from_str(&contents)?;
    config.validate()?;
    Ok(config)
}
