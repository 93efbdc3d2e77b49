//! Trace store query interface.
//!
//! This module defines:
//! - The `TraceStore` capability every extraction stage queries through
//! - Columnar query results with typed column accessors
//! - The per-request `QueryContext` carrying cancellation and deadline
//! - A snapshot-backed store for running captures from JSON

pub mod result;
pub mod snapshot;

use crate::utils::error::QueryError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

// Re-export main types
pub use result::{Column, ColumnValues, QueryResult};
pub use snapshot::{load_snapshot, CaptureSnapshot, SnapshotStore};

/// A queryable trace store
///
/// Implementations must call `ctx.check()` before doing any work so that
/// cancelled or expired requests abort promptly.
pub trait TraceStore: Send + Sync {
    fn query(&self, ctx: &QueryContext, sql: &str) -> Result<QueryResult, QueryError>;
}

/// Cancellation and deadline state shared by every query of one request
///
/// Clones share the cancellation flag, so cancelling any clone cancels
/// all in-flight stages of the request.
#[derive(Debug, Clone, Default)]
pub struct QueryContext {
    cancelled: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl QueryContext {
    /// Create a context with no deadline
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context whose queries fail once `timeout` has elapsed
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
            deadline: Some(Instant::now() + timeout),
        }
    }

    /// Cancel every query issued through this context (or its clones)
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Fail if the request was cancelled or its deadline has passed
    pub fn check(&self) -> Result<(), QueryError> {
        if self.is_cancelled() {
            return Err(QueryError::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Err(QueryError::DeadlineExceeded),
            _ => Ok(()),
        }
    }
}
