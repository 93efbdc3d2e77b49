//! GPU Profile Studio CLI
//!
//! Builds render pass grouped profiling data from GPU capture snapshots.

use anyhow::Result;
use clap::{Parser, Subcommand};
use env_logger::Env;
use std::path::PathBuf;

use gpu_profile_studio::commands::{
    display_schema, display_version, execute_process, validate_args, validate_profiling_file,
    ProcessArgs,
};

/// GPU Profile Studio - render pass profiling for GPU traces
#[derive(Parser, Debug)]
#[command(name = "gpu-profile")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Build profiling data from a capture snapshot
    Process {
        /// Capture snapshot JSON
        #[arg(short, long)]
        capture: PathBuf,

        /// Output path for profiling data JSON (placed in artifacts/ by default)
        #[arg(short, long, default_value = "artifacts/profiling.json")]
        output: PathBuf,

        /// Profiler configuration file (TOML)
        #[arg(long, env = "GPU_PROFILE_CONFIG")]
        config: Option<PathBuf>,

        /// Run slice and counter stages one after the other
        #[arg(long)]
        sequential: bool,

        /// Deadline for trace store queries in milliseconds
        #[arg(long)]
        timeout_ms: Option<u64>,

        /// Print text summary to stdout
        #[arg(long)]
        summary: bool,
    },

    /// Validate a profiling data JSON file
    Validate {
        /// Path to profiling data JSON file
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Display schema information
    Schema {
        /// Show full schema details
        #[arg(long)]
        show: bool,
    },

    /// Display version information
    Version,
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    match cli.command {
        Commands::Process {
            capture,
            mut output,
            config,
            sequential,
            timeout_ms,
            summary,
        } => {
            // Ensure output goes to artifacts/ if no directory is specified
            if output
                .parent()
                .map(|p| p.as_os_str().is_empty())
                .unwrap_or(true)
            {
                output = PathBuf::from("artifacts").join(output);
            }

            let args = ProcessArgs {
                capture,
                output_json: output,
                config_file: config,
                sequential,
                timeout_ms,
                print_summary: summary,
            };

            validate_args(&args)?;
            log::debug!("Process args: {:?}", args);

            execute_process(args)?;
        }

        Commands::Validate { file } => {
            validate_profiling_file(file)?;
        }

        Commands::Schema { show } => {
            display_schema(show);
        }

        Commands::Version => {
            display_version();
        }
    }

    Ok(())
}
