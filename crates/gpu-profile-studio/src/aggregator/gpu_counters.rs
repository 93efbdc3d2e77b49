//! Per render pass GPU performance counters.
//!
//! Correlates grouped slices with counter samples: every group gets its
//! GPU time, wall time and the time-weighted average of each counter over
//! the intervals its top-level slices were executing.

use crate::counters::CounterTrack;
use crate::slices::{GpuSlices, Slice};
use crate::utils::error::ProfileError;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const GPU_TIME_METRIC_ID: u32 = 0;
pub const GPU_WALL_TIME_METRIC_ID: u32 = 1;

// Counter metrics are numbered after the fixed time metrics
const FIRST_COUNTER_METRIC_ID: u32 = 2;

/// How a metric's per-slice contributions combine into a group value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregateOp {
    Summed,
    TimeWeightedAvg,
}

/// Definition of one derived metric
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    pub id: u32,
    pub name: String,
    pub unit: String,
    pub op: AggregateOp,

    /// Counter track the metric was derived from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub counter_id: Option<u32>,
}

/// Metric values of one render pass group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupEntry {
    pub group_id: u32,

    /// Metric id -> value; metrics with no data are absent
    pub metric_values: BTreeMap<u32, f64>,
}

/// Derived GPU performance counters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GpuCounters {
    pub metrics: Vec<Metric>,
    pub entries: Vec<GroupEntry>,
}

/// Computes derived counters from the slice and counter stage outputs
///
/// Either input may be absent when its stage failed.
pub trait CounterComputer: Send + Sync {
    fn compute(
        &self,
        slices: Option<&GpuSlices>,
        counters: Option<&[CounterTrack]>,
    ) -> Result<GpuCounters, ProfileError>;
}

/// Default computer: time metrics plus one averaged metric per counter track
#[derive(Debug, Clone, Copy, Default)]
pub struct GroupCounterComputer;

impl CounterComputer for GroupCounterComputer {
    fn compute(
        &self,
        slices: Option<&GpuSlices>,
        counters: Option<&[CounterTrack]>,
    ) -> Result<GpuCounters, ProfileError> {
        let slices = slices.ok_or(ProfileError::MissingSlices)?;
        let counters = counters.unwrap_or_default();

        for counter in counters {
            if counter.timestamps.len() != counter.values.len() {
                return Err(ProfileError::MalformedCounter(counter.id));
            }
        }

        let metrics = build_metrics(counters);

        let mut by_group: BTreeMap<u32, Vec<&Slice>> = BTreeMap::new();
        for slice in &slices.slices {
            if let Some(group_id) = slice.group_id {
                by_group.entry(group_id).or_default().push(slice);
            }
        }

        let entries: Vec<GroupEntry> = by_group
            .into_iter()
            .map(|(group_id, group_slices)| GroupEntry {
                group_id,
                metric_values: group_metric_values(&group_slices, counters),
            })
            .collect();

        debug!(
            "Computed {} metrics for {} groups",
            metrics.len(),
            entries.len()
        );

        Ok(GpuCounters { metrics, entries })
    }
}

fn build_metrics(counters: &[CounterTrack]) -> Vec<Metric> {
    let mut metrics = vec![
        Metric {
            id: GPU_TIME_METRIC_ID,
            name: "GPU Time".to_string(),
            unit: "ns".to_string(),
            op: AggregateOp::Summed,
            counter_id: None,
        },
        Metric {
            id: GPU_WALL_TIME_METRIC_ID,
            name: "GPU Wall Time".to_string(),
            unit: "ns".to_string(),
            op: AggregateOp::Summed,
            counter_id: None,
        },
    ];

    metrics.extend(counters.iter().enumerate().map(|(i, counter)| Metric {
        id: FIRST_COUNTER_METRIC_ID + i as u32,
        name: counter.name.clone(),
        unit: counter.unit.clone(),
        op: AggregateOp::TimeWeightedAvg,
        counter_id: Some(counter.id),
    }));

    metrics
}

fn group_metric_values(slices: &[&Slice], counters: &[CounterTrack]) -> BTreeMap<u32, f64> {
    let mut values = BTreeMap::new();

    // Nested slices overlap their parents; only top-level ones add time
    let top_level: Vec<&Slice> = slices.iter().copied().filter(|s| s.depth == 0).collect();

    // Durations may reach i64::MAX, so the total saturates
    let gpu_time = top_level
        .iter()
        .fold(0u64, |acc, s| acc.saturating_add(s.dur));
    values.insert(GPU_TIME_METRIC_ID, gpu_time as f64);

    let start = slices.iter().map(|s| s.ts).min();
    let end = slices.iter().map(|s| s.end()).max();
    if let (Some(start), Some(end)) = (start, end) {
        values.insert(GPU_WALL_TIME_METRIC_ID, end.saturating_sub(start) as f64);
    }

    for (i, counter) in counters.iter().enumerate() {
        let mut weighted = 0.0;
        let mut covered = 0.0;
        for slice in &top_level {
            if let Some((sum, time)) =
                weighted_sum(&counter.timestamps, &counter.values, slice.ts, slice.end())
            {
                weighted += sum;
                covered += time as f64;
            }
        }
        if covered > 0.0 {
            values.insert(FIRST_COUNTER_METRIC_ID + i as u32, weighted / covered);
        }
    }

    values
}

/// Time-weighted sum of a step series over `[start, end)`
///
/// Sample `i` holds its value from `timestamps[i]` until `timestamps[i + 1]`;
/// the last sample has no extent. Returns the weighted sum and the covered
/// time, or `None` if the series does not overlap the interval.
fn weighted_sum(timestamps: &[u64], values: &[f64], start: u64, end: u64) -> Option<(f64, u64)> {
    let mut sum = 0.0;
    let mut covered = 0u64;

    for (window, value) in timestamps.windows(2).zip(values) {
        let lo = window[0].max(start);
        let hi = window[1].min(end);
        if hi > lo {
            let overlap = hi - lo;
            sum += value * overlap as f64;
            covered = covered.saturating_add(overlap);
        }
    }

    (covered > 0).then_some((sum, covered))
}

/// Time-weighted average of a step series over `[start, end)`
pub fn time_weighted_average(
    timestamps: &[u64],
    values: &[f64],
    start: u64,
    end: u64,
) -> Option<f64> {
    weighted_sum(timestamps, values, start, end).map(|(sum, covered)| sum / covered as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_average_over_single_step() {
        let avg = time_weighted_average(&[0, 100], &[4.0, 9.0], 10, 50).unwrap();
        assert_eq!(avg, 4.0);
    }

    #[test]
    fn test_average_across_steps() {
        // [0,10) = 2.0, [10,20) = 6.0; interval [5,15) covers 5ns of each
        let avg = time_weighted_average(&[0, 10, 20], &[2.0, 6.0, 1.0], 5, 15).unwrap();
        assert_eq!(avg, 4.0);
    }

    #[test]
    fn test_no_overlap() {
        assert_eq!(time_weighted_average(&[0, 10], &[1.0, 1.0], 10, 20), None);
        assert_eq!(time_weighted_average(&[5], &[1.0], 0, 20), None);
        assert_eq!(time_weighted_average(&[], &[], 0, 20), None);
    }
}
