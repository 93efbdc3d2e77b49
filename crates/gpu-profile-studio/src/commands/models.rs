use std::path::PathBuf;

/// Arguments for the process command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone)]
pub struct ProcessArgs {
    /// Capture snapshot JSON to profile
    pub capture: PathBuf,

    /// Output path for the profiling data JSON
    pub output_json: PathBuf,

    /// Optional profiler configuration file (TOML)
    pub config_file: Option<PathBuf>,

    /// Force sequential stage execution
    pub sequential: bool,

    /// Query deadline override in milliseconds
    pub timeout_ms: Option<u64>,

    /// Print text summary to stdout
    pub print_summary: bool,
}

impl Default for ProcessArgs {
    fn default() -> Self {
        Self {
            capture: PathBuf::new(),
            output_json: PathBuf::from("profiling.json"),
            config_file: None,
            sequential: false,
            timeout_ms: None,
            print_summary: false,
        }
    }
}
