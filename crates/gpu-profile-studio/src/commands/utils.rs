use crate::output::read_profiling_data;
use crate::utils::config::SCHEMA_VERSION;
use anyhow::Result;
use std::path::PathBuf;

/// Validate a profiling data JSON file
pub fn validate_profiling_file(file_path: PathBuf) -> Result<()> {
    println!("Validating profiling data: {}", file_path.display());

    let data = read_profiling_data(&file_path)?;

    println!("✓ Valid profiling data JSON");
    println!("  Version: {}", data.version);
    println!("  Generated: {}", data.generated_at);
    match &data.slices {
        Some(slices) => {
            println!("  Slices: {}", slices.slices.len());
            println!("  Render Pass Groups: {}", slices.groups.len());
        }
        None => println!("  Slices: unavailable"),
    }
    match &data.counters {
        Some(counters) => println!("  Counter Tracks: {}", counters.len()),
        None => println!("  Counter Tracks: unavailable"),
    }
    match &data.gpu_counters {
        Some(gpu_counters) => println!("  Derived Metrics: {}", gpu_counters.metrics.len()),
        None => println!("  Derived Metrics: unavailable"),
    }

    Ok(())
}

/// Display schema information
pub fn display_schema(show_details: bool) {
    println!("GPU Profile Studio Profiling Data Schema");
    println!("Current Version: {}", SCHEMA_VERSION);
    println!();

    if show_details {
        println!("Schema Structure:");
        println!("  version: string           - Schema version (e.g., '1.0.0')");
        println!("  generated_at: string      - RFC 3339 timestamp");
        println!("  slices: object?           - Absent if slice extraction failed");
        println!("    slices: array           - GPU slices in query order");
        println!("      name: string          - '{{from}}-{{to}} {{stage}}' for render pass boundaries");
        println!("      group_id: number?     - Render pass group, null if none established");
        println!("    tracks: array           - GPU tracks (id, name)");
        println!("    groups: array           - Render pass groups (id, name, range)");
        println!("  counters: array?          - Counter tracks by ascending id");
        println!("    spec: object?           - Device counter spec matched by name");
        println!("    timestamps: array       - Sample timestamps (ns)");
        println!("    values: array           - Sample values");
        println!("  gpu_counters: object?     - Derived per render pass metrics");
        println!("    metrics: array          - Metric definitions");
        println!("    entries: array          - Per group metric values");
    } else {
        println!("Use --show for detailed schema information");
    }
}

/// Display version information
pub fn display_version() {
    println!("GPU Profile Studio v{}", env!("CARGO_PKG_VERSION"));
    println!("Profiling Data Schema: v{}", SCHEMA_VERSION);
    println!();
    println!("Render pass grouping and counter extraction for GPU traces.");
}
