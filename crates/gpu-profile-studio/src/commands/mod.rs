//! CLI command implementations.
//!
//! Each command is implemented in its own module.
//! Commands orchestrate the various library components to perform user tasks.

pub mod models;
pub mod process;
pub mod utils;

// Re-export main command functions
pub use models::ProcessArgs;
pub use process::{execute_process, validate_args};
pub use utils::{display_schema, display_version, validate_profiling_file};
