mod common;

use common::{slice, slice_data, ScriptedStore};
use gpu_profile_studio::aggregator::{
    CounterComputer, GpuCounters, GroupCounterComputer, GPU_TIME_METRIC_ID,
    GPU_WALL_TIME_METRIC_ID,
};
use gpu_profile_studio::counters::{CounterDescriptor, CounterSpec, CounterTrack};
use gpu_profile_studio::slices::{
    GpuSlices, HandleMapping, RenderPassKey, RenderPassTable, SliceData, SliceSource,
    StoreSliceSource,
};
use gpu_profile_studio::store::snapshot::{
    CounterSampleRow, CounterTrackRow, RenderPassRow, SliceRow, SubmissionRow, TrackRow,
};
use gpu_profile_studio::store::{CaptureSnapshot, QueryContext, SnapshotStore};
use gpu_profile_studio::utils::config::{ProfilerConfig, COUNTER_TRACKS_QUERY};
use gpu_profile_studio::utils::error::{ProfileError, QueryError};
use gpu_profile_studio::{process_profiling_data, ProfilingInputs};
use pretty_assertions::assert_eq;

fn slice_row(id: i64, name: &str, submission_id: i64, cb: i64, rp: i64, rt: i64) -> SliceRow {
    SliceRow {
        id,
        ts: id * 100,
        dur: 50,
        name: name.to_string(),
        depth: 0,
        track_id: 1,
        submission_id,
        command_buffer: cb,
        render_pass: rp,
        render_target: rt,
        context: 0,
    }
}

fn render_pass(order: u32, cb: u64, rp: u64, rt: u64, from: u64, to: u64) -> RenderPassRow {
    RenderPassRow {
        key: RenderPassKey {
            submission_order: order,
            command_buffer: cb,
            render_pass: rp,
            render_target: rt,
        },
        from,
        to,
    }
}

fn capture() -> CaptureSnapshot {
    CaptureSnapshot {
        submissions: vec![
            SubmissionRow {
                submission_id: 102,
                command_buffer: 6,
            },
            SubmissionRow {
                submission_id: 100,
                command_buffer: 5,
            },
            SubmissionRow {
                submission_id: 101,
                command_buffer: 0,
            },
        ],
        gpu_slices: vec![
            slice_row(0, "vertex", 100, 5, 10, 20),
            slice_row(1, "barrier", 100, 5, 10, 20),
            slice_row(2, "fragment", 102, 6, 11, 21),
        ],
        gpu_tracks: vec![TrackRow {
            id: 1,
            name: "GPU Queue 0".to_string(),
        }],
        counter_tracks: vec![
            CounterTrackRow {
                id: 9,
                name: "Fragment Cycles".to_string(),
                unit: "cycles".to_string(),
                description: String::new(),
            },
            CounterTrackRow {
                id: 3,
                name: "GPU Utilization".to_string(),
                unit: "%".to_string(),
                description: String::new(),
            },
        ],
        counter_samples: vec![
            CounterSampleRow {
                track_id: 3,
                ts: 100,
                value: 4.0,
            },
            CounterSampleRow {
                track_id: 3,
                ts: 0,
                value: 2.0,
            },
            CounterSampleRow {
                track_id: 3,
                ts: 300,
                value: 0.0,
            },
        ],
        render_passes: vec![
            render_pass(0, 5, 10, 20, 1, 2),
            render_pass(1, 6, 11, 21, 3, 4),
        ],
        handle_mapping: Vec::new(),
        counter_descriptor: Some(CounterDescriptor {
            specs: vec![CounterSpec {
                counter_id: 30,
                name: "GPU Utilization".to_string(),
                description: "Busy time".to_string(),
                numerator_units: vec!["percent".to_string()],
                denominator_units: Vec::new(),
                select_by_default: true,
            }],
        }),
    }
}

fn run(snapshot: &CaptureSnapshot, ctx: &QueryContext, config: &ProfilerConfig) -> gpu_profile_studio::ProfilingData {
    let store = SnapshotStore::new(snapshot);
    let source = StoreSliceSource::new(&store);
    let remapper = snapshot.handle_mapping();
    let lookup = snapshot.render_pass_table();

    let inputs = ProfilingInputs {
        store: &store,
        slice_source: &source,
        remapper: &remapper,
        lookup: &lookup,
        descriptor: snapshot.counter_descriptor.as_ref(),
        computer: &GroupCounterComputer,
    };
    process_profiling_data(ctx, &inputs, config)
}

#[test]
fn test_snapshot_end_to_end() {
    let data = run(&capture(), &QueryContext::new(), &ProfilerConfig::default());

    let slices = data.slices.expect("slices");
    let names: Vec<&str> = slices.slices.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["1-2 vertex", "barrier", "3-4 fragment"]);
    let groups: Vec<Option<u32>> = slices.slices.iter().map(|s| s.group_id).collect();
    assert_eq!(groups, vec![Some(0), Some(0), Some(1)]);
    assert_eq!(slices.tracks.len(), 1);

    let counters = data.counters.expect("counters");
    let ids: Vec<u32> = counters.iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![3, 9]);
    assert_eq!(counters[0].timestamps, vec![0, 100, 300]);
    assert!(counters[0].spec.is_some());
    assert!(counters[1].spec.is_none());
    assert!(counters[1].values.is_empty());

    let gpu_counters = data.gpu_counters.expect("gpu counters");
    assert_eq!(gpu_counters.metrics.len(), 4);
    assert_eq!(gpu_counters.entries.len(), 2);

    let group0 = &gpu_counters.entries[0].metric_values;
    assert_eq!(group0[&GPU_TIME_METRIC_ID], 100.0);
    assert_eq!(group0[&GPU_WALL_TIME_METRIC_ID], 150.0);
    // [0,50) at 2.0 and [100,150) at 4.0
    assert_eq!(group0[&2], 3.0);
    // Fragment Cycles has no samples
    assert!(!group0.contains_key(&3));

    let group1 = &gpu_counters.entries[1].metric_values;
    assert_eq!(group1[&GPU_TIME_METRIC_ID], 50.0);
    assert_eq!(group1[&2], 4.0);
}

#[test]
fn test_parallel_and_sequential_agree() {
    let snapshot = capture();
    let parallel = run(&snapshot, &QueryContext::new(), &ProfilerConfig::default());
    let sequential = run(
        &snapshot,
        &QueryContext::new(),
        &ProfilerConfig {
            parallel: false,
            query_timeout_ms: None,
        },
    );

    assert_eq!(parallel.slices, sequential.slices);
    assert_eq!(parallel.counters, sequential.counters);
    assert_eq!(parallel.gpu_counters, sequential.gpu_counters);
}

#[test]
fn test_cancelled_request_still_returns_aggregate() {
    let ctx = QueryContext::new();
    ctx.cancel();

    let data = run(&capture(), &ctx, &ProfilerConfig::default());

    assert!(data.slices.is_none());
    assert!(data.counters.is_none());
    assert!(data.gpu_counters.is_none());
    assert_eq!(data.version, "1.0.0");
}

struct FixedSlices(SliceData);

impl SliceSource for FixedSlices {
    fn extract_slices(&self, _ctx: &QueryContext) -> Result<SliceData, QueryError> {
        Ok(self.0.clone())
    }
}

struct FailingComputer;

impl CounterComputer for FailingComputer {
    fn compute(
        &self,
        _slices: Option<&GpuSlices>,
        _counters: Option<&[CounterTrack]>,
    ) -> Result<GpuCounters, ProfileError> {
        Err(ProfileError::MissingSlices)
    }
}

#[test]
fn test_counter_failure_keeps_slices() {
    let store = ScriptedStore::new()
        .with_submissions(&[(100, 5)])
        .failing(COUNTER_TRACKS_QUERY);
    let source = FixedSlices(slice_data(vec![slice(0, "vertex", 100, 5, 10, 20)]));
    let lookup: RenderPassTable = vec![(common::key(0, 5, 10, 20), common::range(0, 4))]
        .into_iter()
        .collect();

    for parallel in [false, true] {
        let inputs = ProfilingInputs {
            store: &store,
            slice_source: &source,
            remapper: &HandleMapping::default(),
            lookup: &lookup,
            descriptor: None,
            computer: &GroupCounterComputer,
        };
        let config = ProfilerConfig {
            parallel,
            query_timeout_ms: None,
        };

        let data = process_profiling_data(&QueryContext::new(), &inputs, &config);

        assert!(data.counters.is_none());
        let slices = data.slices.expect("slices");
        assert_eq!(slices.slices[0].name, "0-4 vertex");
        // Time metrics only
        assert_eq!(data.gpu_counters.expect("gpu counters").metrics.len(), 2);
    }
}

#[test]
fn test_slice_failure_keeps_counters() {
    let store = ScriptedStore::new()
        .with_counter_tracks(&[(1, "GPU Utilization")])
        .with_samples(1, &[(0, 1.0)]);
    let source = StoreSliceSource::new(&store);

    let inputs = ProfilingInputs {
        store: &store,
        slice_source: &source,
        remapper: &HandleMapping::default(),
        lookup: &RenderPassTable::new(),
        descriptor: None,
        computer: &GroupCounterComputer,
    };

    let data = process_profiling_data(&QueryContext::new(), &inputs, &ProfilerConfig::default());

    assert!(data.slices.is_none());
    assert_eq!(data.counters.expect("counters").len(), 1);
    // Derived counters need slices
    assert!(data.gpu_counters.is_none());
}

#[test]
fn test_computer_failure_is_not_fatal() {
    let snapshot = capture();
    let store = SnapshotStore::new(&snapshot);
    let source = StoreSliceSource::new(&store);
    let lookup = snapshot.render_pass_table();

    let inputs = ProfilingInputs {
        store: &store,
        slice_source: &source,
        remapper: &HandleMapping::default(),
        lookup: &lookup,
        descriptor: None,
        computer: &FailingComputer,
    };

    let data = process_profiling_data(&QueryContext::new(), &inputs, &ProfilerConfig::default());

    assert!(data.slices.is_some());
    assert!(data.counters.is_some());
    assert!(data.gpu_counters.is_none());
}

#[test]
fn test_computer_rejects_malformed_counter() {
    let slices = slice_data(vec![slice(0, "vertex", 100, 5, 10, 20)]).into_gpu_slices();
    let counters = vec![CounterTrack {
        id: 4,
        name: "Broken".to_string(),
        unit: String::new(),
        description: String::new(),
        spec: None,
        timestamps: vec![0, 1],
        values: vec![1.0],
    }];

    let result = GroupCounterComputer.compute(Some(&slices), Some(&counters));
    assert!(matches!(result, Err(ProfileError::MalformedCounter(4))));
}

#[test]
fn test_computer_skips_ungrouped_slices() {
    let slices = slice_data(vec![slice(0, "vertex", 100, 5, 10, 20)]).into_gpu_slices();

    let gpu_counters = GroupCounterComputer.compute(Some(&slices), None).unwrap();

    assert!(gpu_counters.entries.is_empty());
    assert_eq!(gpu_counters.metrics.len(), 2);
}

#[test]
fn test_computer_saturates_huge_durations() {
    let slices: Vec<_> = (0..3)
        .map(|id| {
            let mut s = slice(id, "draw", 100, 5, 10, 20);
            s.ts = 0;
            s.dur = i64::MAX as u64;
            s.group_id = Some(0);
            s
        })
        .collect();
    let slices = slice_data(slices).into_gpu_slices();
    let counters = vec![CounterTrack {
        id: 1,
        name: "Clock".to_string(),
        unit: String::new(),
        description: String::new(),
        spec: None,
        timestamps: vec![0, u64::MAX],
        values: vec![1.0, 0.0],
    }];

    let gpu_counters = GroupCounterComputer
        .compute(Some(&slices), Some(&counters))
        .unwrap();

    let group0 = &gpu_counters.entries[0].metric_values;
    assert_eq!(group0[&GPU_TIME_METRIC_ID], u64::MAX as f64);
    assert_eq!(group0[&GPU_WALL_TIME_METRIC_ID], i64::MAX as f64);
    assert_eq!(group0[&2], 1.0);
}
