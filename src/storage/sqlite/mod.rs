//! `SQLite` storage backend.
//!
//! - `connection`: mutex handling with poison recovery, pragmas, transactions
//! - `metrics`: per-operation storage metrics
//! - [`SqliteStore`]: the store itself

mod connection;
mod metrics;
mod store;

pub use connection::{
    BUSY_TIMEOUT_MS, acquire_lock, configure_connection, open_connection, with_transaction,
};
pub use metrics::{record_operation_metrics, status_of};
pub use store::SqliteStore;
