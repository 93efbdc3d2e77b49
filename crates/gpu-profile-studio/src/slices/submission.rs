//! Dense submission ordering from vkQueueSubmit records.
//!
//! Submission ids reported by the driver are sparse and may contain
//! spurious entries without a command buffer. The render pass lookup is
//! keyed by the position of a submission among the real ones, so we
//! rebuild that position here.

use crate::store::{QueryContext, TraceStore};
use crate::utils::config::QUEUE_SUBMIT_QUERY;
use crate::utils::error::QueryError;
use log::{debug, warn};
use std::collections::HashMap;

/// Immutable submission id -> order mapping for one request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmissionOrder {
    order: HashMap<i64, u32>,
    spurious: usize,
}

impl SubmissionOrder {
    /// Resolve orders from `(submission_id, command_buffer)` pairs
    ///
    /// Pairs are expected in ascending submission id order. Entries with a
    /// zero command buffer are skipped without consuming an order value.
    pub fn resolve<I>(submissions: I) -> Self
    where
        I: IntoIterator<Item = (i64, i64)>,
    {
        let mut order = HashMap::new();
        let mut spurious = 0;
        let mut next: u32 = 0;

        for (submission_id, command_buffer) in submissions {
            if command_buffer == 0 {
                warn!(
                    "Spurious vkQueueSubmit slice with submission id {}",
                    submission_id
                );
                spurious += 1;
                continue;
            }
            order.insert(submission_id, next);
            next += 1;
        }

        debug!(
            "Resolved {} submissions ({} spurious)",
            order.len(),
            spurious
        );

        Self { order, spurious }
    }

    /// Order of `submission_id`, if it was a real submission
    pub fn get(&self, submission_id: i64) -> Option<u32> {
        self.order.get(&submission_id).copied()
    }

    /// Number of submissions that received an order
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Number of spurious submissions skipped
    pub fn spurious(&self) -> usize {
        self.spurious
    }
}

/// Query the trace store for queue submissions and resolve their order
pub fn query_submission_order(
    store: &dyn TraceStore,
    ctx: &QueryContext,
) -> Result<SubmissionOrder, QueryError> {
    let result = store.query(ctx, QUEUE_SUBMIT_QUERY)?;
    let ids = result.long_values(0)?;
    let command_buffers = result.long_values(1)?;

    Ok(SubmissionOrder::resolve(
        ids.iter().copied().zip(command_buffers.iter().copied()),
    ))
}
