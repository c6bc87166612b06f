//! Storage traits.
//!
//! The pipeline reads conversation history and guidance rows and writes
//! critical events through these seams; persistence mechanics stay behind
//! them.

mod events;
mod guidance;
mod messages;

pub use events::CriticalEventSink;
pub use guidance::GuidanceStore;
pub use messages::MessageStore;
