use crate::github::IssueRecord;
use serde::Serialize;

/// Summary of how quickly issues and pull requests were closed.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct ActivityMetrics {
    /// Number of closed records the average is taken over.
    pub count: usize,
    /// Number of records that are still open. These are not part of `count`.
    pub open_count: usize,
    /// Mean close latency in seconds, or `None` when nothing was closed.
    pub average_close_seconds: Option<f64>,
}

/// Elapsed time between creation and closure in whole seconds, rounded up.
///
/// Returns `None` for records that are still open.
pub fn close_latency_seconds(record: &IssueRecord) -> Option<i64> {
    let closed_at = record.closed_at?;
    let elapsed = (closed_at - record.created_at).abs();

    let secs = elapsed.num_seconds();
    if elapsed.subsec_nanos() > 0 {
        Some(secs + 1)
    } else {
        Some(secs)
    }
}

/// Aggregates close latency over a set of issue records.
///
/// Open records are excluded from both `count` and the average and are
/// reported in `open_count` instead.
pub fn aggregate(records: &[IssueRecord]) -> ActivityMetrics {
    let latencies: Vec<i64> = records.iter().filter_map(close_latency_seconds).collect();

    let count = latencies.len();
    let average_close_seconds = if count == 0 {
        None
    } else {
        let total: i64 = latencies.iter().sum();
        Some(total as f64 / count as f64)
    };

    ActivityMetrics {
        count,
        open_count: records.len() - count,
        average_close_seconds,
    }
}
