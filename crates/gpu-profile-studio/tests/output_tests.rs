use gpu_profile_studio::counters::CounterTrack;
use gpu_profile_studio::output::validate_path;
use gpu_profile_studio::output::{read_profiling_data, write_profiling_data};
use gpu_profile_studio::slices::{CommandRange, GpuSlices, Group};
use gpu_profile_studio::utils::error::OutputError;
use gpu_profile_studio::ProfilingData;
use std::path::Path;
use tempfile::{NamedTempFile, TempDir};

fn create_test_data() -> ProfilingData {
    ProfilingData {
        version: "1.0.0".to_string(),
        generated_at: "2026-01-01T00:00:00Z".to_string(),
        slices: Some(GpuSlices {
            slices: Vec::new(),
            tracks: Vec::new(),
            groups: vec![Group {
                id: 0,
                name: "RenderPass 10, RenderTarget 20".to_string(),
                range: CommandRange::new(1, 2),
            }],
        }),
        counters: Some(vec![CounterTrack {
            id: 5,
            name: "GPU Utilization".to_string(),
            unit: "%".to_string(),
            description: String::new(),
            spec: None,
            timestamps: vec![10, 20],
            values: vec![0.5, 0.25],
        }]),
        gpu_counters: None,
    }
}

#[test]
fn test_write_and_read_profiling_data() {
    let data = create_test_data();
    let temp_file = NamedTempFile::new().unwrap();
    let path = temp_file.path();

    write_profiling_data(&data, path).unwrap();
    let loaded = read_profiling_data(path).unwrap();

    assert_eq!(loaded, data);
}

#[test]
fn test_missing_sections_serialize_as_null() {
    let mut data = create_test_data();
    data.slices = None;

    let json = serde_json::to_value(&data).unwrap();
    assert!(json["slices"].is_null());
    assert!(json["gpu_counters"].is_null());
    // Unmatched specs are omitted
    assert!(json["counters"][0].get("spec").is_none());
}

#[test]
fn test_write_creates_parent_directories() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("artifacts").join("profiling.json");

    write_profiling_data(&create_test_data(), &path).unwrap();
    assert!(path.exists());
}

#[test]
fn test_validate_output_path_empty() {
    let result = validate_path(Path::new(""));
    assert!(result.is_err());
}

#[test]
fn test_validate_output_path_directory() {
    let dir = TempDir::new().unwrap();
    assert!(validate_path(dir.path()).is_err());
}

#[test]
fn test_read_invalid_json() {
    let temp_file = NamedTempFile::new().unwrap();
    std::fs::write(temp_file.path(), "{ not json").unwrap();

    assert!(read_profiling_data(temp_file.path()).is_err());
}

#[cfg(target_os = "linux")]
#[test]
fn test_write_reports_flush_failure() {
    // Writes to /dev/full fail with ENOSPC once the buffer is flushed
    let path = Path::new("/dev/full");
    if !path.exists() {
        return;
    }

    let result = write_profiling_data(&create_test_data(), path);
    assert!(matches!(result, Err(OutputError::WriteFailed(_))));
}
