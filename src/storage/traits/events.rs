//! Critical event sink trait.

use crate::Result;
use crate::models::CriticalEvent;

/// Append-only sink for high-severity events.
pub trait CriticalEventSink: Send + Sync {
    /// Records an event and returns its identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails. Callers on the request path log
    /// and count the failure instead of propagating it.
    fn record(&self, event: &CriticalEvent) -> Result<String>;
}
