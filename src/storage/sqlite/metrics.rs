//! Storage operation metrics.

use std::time::Instant;

/// Records `storage_operations_total` and `storage_operation_duration_ms`
/// for one operation, labelled by backend, operation and status.
pub fn record_operation_metrics(
    backend: &'static str,
    operation: &'static str,
    start: Instant,
    status: &'static str,
) {
    metrics::counter!(
        "storage_operations_total",
        "backend" => backend,
        "operation" => operation,
        "status" => status
    )
    .increment(1);
    metrics::histogram!(
        "storage_operation_duration_ms",
        "backend" => backend,
        "operation" => operation,
        "status" => status
    )
    .record(start.elapsed().as_secs_f64() * 1000.0);
}

/// Maps a result to its metrics status label.
pub const fn status_of<T>(result: &crate::Result<T>) -> &'static str {
    if result.is_ok() { "success" } else { "error" }
}
