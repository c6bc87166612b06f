//! Storage layer.
//!
//! Three seams, each a trait in [`traits`]:
//!
//! | Trait | Role |
//! |-------|------|
//! | [`MessageStore`] | Ordered per-user conversation log |
//! | [`GuidanceStore`] | Emotion to techniques/warnings lookup |
//! | [`CriticalEventSink`] | Append-only high-severity events |
//!
//! [`SqliteStore`] and [`InMemoryStore`] implement all three.

mod memory;
pub mod sqlite;
pub mod traits;

pub use memory::InMemoryStore;
pub use sqlite::SqliteStore;
pub use traits::{CriticalEventSink, GuidanceStore, MessageStore};
