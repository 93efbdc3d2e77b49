//! Process command implementation.
//!
//! The process command:
//! 1. Loads the profiler configuration
//! 2. Loads the capture snapshot
//! 3. Builds the profiling collaborators over it
//! 4. Runs slice grouping and counter extraction
//! 5. Writes the profiling data JSON

use crate::aggregator::GroupCounterComputer;
use crate::commands::models::ProcessArgs;
use crate::output::write_profiling_data;
use crate::profiling::{process_profiling_data, ProfilingData, ProfilingInputs};
use crate::slices::StoreSliceSource;
use crate::store::{load_snapshot, QueryContext, SnapshotStore};
use crate::utils::config::{load_config, ProfilerConfig};
use anyhow::{Context, Result};
use colored::*;
use log::{debug, info};
use std::time::Instant;

/// Execute the process command
///
/// **Public** - main entry point called from main.rs
///
/// # Errors
/// * Configuration or snapshot loading failures
/// * File write errors
///
/// Stage failures inside profiling are not errors here; they show up as
/// missing sections in the output.
pub fn execute_process(args: ProcessArgs) -> Result<()> {
    let start_time = Instant::now();

    let config = resolve_config(&args)?;
    debug!("Profiler config: {:?}", config);

    info!("Loading capture snapshot: {}", args.capture.display());
    let snapshot = load_snapshot(&args.capture).context("Failed to load capture snapshot")?;

    let store = SnapshotStore::new(&snapshot);
    let slice_source = StoreSliceSource::new(&store);
    let remapper = snapshot.handle_mapping();
    let lookup = snapshot.render_pass_table();
    let computer = GroupCounterComputer;

    let inputs = ProfilingInputs {
        store: &store,
        slice_source: &slice_source,
        remapper: &remapper,
        lookup: &lookup,
        descriptor: snapshot.counter_descriptor.as_ref(),
        computer: &computer,
    };

    let ctx = match config.query_timeout() {
        Some(timeout) => QueryContext::with_timeout(timeout),
        None => QueryContext::new(),
    };

    info!("Processing profiling data...");
    let data = process_profiling_data(&ctx, &inputs, &config);

    write_profiling_data(&data, &args.output_json)
        .context("Failed to write profiling data JSON")?;
    info!("✓ Profiling data written to: {}", args.output_json.display());

    if args.print_summary {
        print_summary(&data);
    }

    info!(
        "Process completed in {:.2}s",
        start_time.elapsed().as_secs_f64()
    );
    Ok(())
}

/// Merge the config file (if any) with CLI overrides
fn resolve_config(args: &ProcessArgs) -> Result<ProfilerConfig> {
    let mut config = match &args.config_file {
        Some(path) => load_config(path)
            .with_context(|| format!("Failed to load config file {}", path.display()))?,
        None => ProfilerConfig::default(),
    };

    if args.sequential {
        config.parallel = false;
    }
    if args.timeout_ms.is_some() {
        config.query_timeout_ms = args.timeout_ms;
    }

    config.validate()?;
    Ok(config)
}

/// Print a human-readable summary to stdout.
fn print_summary(data: &ProfilingData) {
    println!();
    println!("{}", "GPU PROFILING SUMMARY".bold());
    println!("  Schema:   v{}", data.version);

    match &data.slices {
        Some(slices) => {
            let ungrouped = slices
                .slices
                .iter()
                .filter(|s| s.group_id.is_none())
                .count();
            println!("  Slices:   {}", slices.slices.len());
            println!("  Groups:   {}", slices.groups.len());
            if ungrouped > 0 {
                println!(
                    "  {}",
                    format!("{} slices without a render pass group", ungrouped).yellow()
                );
            }
            for group in &slices.groups {
                println!("    [{}] {} ({})", group.id, group.name, group.range);
            }
        }
        None => println!("  Slices:   {}", "unavailable".red()),
    }

    match &data.counters {
        Some(counters) => {
            println!("  Counters: {}", counters.len());
            for counter in counters {
                let spec = if counter.spec.is_some() { "" } else { " (no spec)" };
                println!(
                    "    [{}] {} {} samples{}",
                    counter.id,
                    counter.name,
                    counter.values.len(),
                    spec.dimmed()
                );
            }
        }
        None => println!("  Counters: {}", "unavailable".red()),
    }

    if data.gpu_counters.is_none() {
        println!("  Derived:  {}", "unavailable".red());
    }
    println!();
}

/// Validate process arguments
///
/// **Public** - can be called before execute_process for early validation
pub fn validate_args(args: &ProcessArgs) -> Result<()> {
    if args.capture.as_os_str().is_empty() {
        anyhow::bail!("Capture snapshot path cannot be empty");
    }

    if args.output_json.as_os_str().is_empty() {
        anyhow::bail!("Output path cannot be empty");
    }

    if args.timeout_ms == Some(0) {
        anyhow::bail!("timeout must be greater than 0");
    }

    Ok(())
}
