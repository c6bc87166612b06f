//! `SQLite`-backed message, guidance and critical-event store.

use super::connection::{acquire_lock, configure_connection, open_connection, with_transaction};
use super::metrics::{record_operation_metrics, status_of};
use crate::models::{
    AlertLevel, ConversationTurn, CriticalEvent, EmotionCount, ExtendedEmotion, Guidance,
    MessageId, NewMessage, Role, UNLABELED_EMOTION,
};
use crate::storage::traits::{CriticalEventSink, GuidanceStore, MessageStore};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Instant;
use tracing::instrument;

const BACKEND: &str = "sqlite";

/// `SQLite` store implementing every storage trait over one database.
///
/// # Schema
///
/// - `messages`: the conversation log; `seq` gives insertion order, which
///   breaks ties between messages stored in the same millisecond
/// - `guidance`: one row per extended emotion
/// - `critical_events`: append-only high-severity events
///
/// The connection is guarded by a `Mutex` because `rusqlite::Connection` is
/// not `Sync`; WAL mode and the busy timeout absorb contention from other
/// processes.
pub struct SqliteStore {
    conn: Mutex<Connection>,
    db_path: Option<PathBuf>,
}

impl SqliteStore {
    /// Opens (or creates) a store at `db_path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn new(db_path: impl Into<PathBuf>) -> Result<Self> {
        let db_path = db_path.into();
        let conn = open_connection(&db_path)?;
        let store = Self {
            conn: Mutex::new(conn),
            db_path: Some(db_path),
        };
        store.initialize()?;
        Ok(store)
    }

    /// Creates an in-memory store.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|e| Error::OperationFailed {
            operation: "open_sqlite_in_memory".to_string(),
            cause: e.to_string(),
        })?;
        let store = Self {
            conn: Mutex::new(conn),
            db_path: None,
        };
        store.initialize()?;
        Ok(store)
    }

    /// Returns the database path (`None` for in-memory).
    #[must_use]
    pub fn db_path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    fn initialize(&self) -> Result<()> {
        let conn = acquire_lock(&self.conn);
        configure_connection(&conn)?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS messages (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                id TEXT NOT NULL UNIQUE,
                user_id TEXT NOT NULL,
                role TEXT NOT NULL,
                content TEXT NOT NULL,
                emotion TEXT,
                model_used TEXT,
                created_at INTEGER NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_messages_user_seq ON messages(user_id, seq DESC);
            CREATE INDEX IF NOT EXISTS idx_messages_user_created ON messages(user_id, created_at);

            CREATE TABLE IF NOT EXISTS guidance (
                emotion TEXT PRIMARY KEY,
                techniques TEXT,
                warnings TEXT,
                updated_at INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS critical_events (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                message_id TEXT NOT NULL,
                event_type TEXT NOT NULL,
                description TEXT NOT NULL,
                alert_level TEXT NOT NULL,
                handled INTEGER NOT NULL DEFAULT 0,
                created_at INTEGER NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_critical_events_user ON critical_events(user_id, created_at DESC);",
        )
        .map_err(|e| Error::OperationFailed {
            operation: "create_schema".to_string(),
            cause: e.to_string(),
        })
    }

    /// Lists a user's critical events, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails.
    #[instrument(skip(self), fields(operation = "critical_events", backend = BACKEND))]
    pub fn critical_events(&self, user_id: &str) -> Result<Vec<CriticalEvent>> {
        let start = Instant::now();
        let result = (|| {
            let conn = acquire_lock(&self.conn);
            let mut stmt = conn
                .prepare(
                    "SELECT user_id, message_id, event_type, description, alert_level, handled
                     FROM critical_events
                     WHERE user_id = ?1
                     ORDER BY created_at DESC, rowid DESC",
                )
                .map_err(query_error("prepare_critical_events"))?;

            let rows = stmt
                .query_map(params![user_id], |row| {
                    let level: String = row.get(4)?;
                    Ok(CriticalEvent {
                        user_id: row.get(0)?,
                        message_id: MessageId::new(row.get::<_, String>(1)?),
                        event_type: row.get(2)?,
                        description: row.get(3)?,
                        alert_level: AlertLevel::parse(&level).unwrap_or_default(),
                        handled: row.get(5)?,
                    })
                })
                .map_err(query_error("critical_events"))?;

            rows.collect::<rusqlite::Result<Vec<_>>>()
                .map_err(query_error("critical_events"))
        })();

        record_operation_metrics(BACKEND, "critical_events", start, status_of(&result));
        result
    }
}

impl MessageStore for SqliteStore {
    #[instrument(skip(self, message), fields(operation = "append", backend = BACKEND, role = message.role.as_str()))]
    fn append(&self, message: &NewMessage) -> Result<MessageId> {
        let start = Instant::now();
        let result = (|| {
            let conn = acquire_lock(&self.conn);
            let id = message.id.clone().unwrap_or_else(MessageId::generate);

            with_transaction(&conn, || {
                conn.execute(
                    "INSERT INTO messages (id, user_id, role, content, emotion, model_used, created_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                    params![
                        id.as_str(),
                        message.user_id,
                        message.role.as_str(),
                        message.content,
                        message.emotion.as_deref(),
                        message.model_used.as_deref(),
                        Utc::now().timestamp_millis(),
                    ],
                )
                .map_err(query_error("insert_message"))?;
                Ok(())
            })?;

            Ok(id)
        })();

        record_operation_metrics(BACKEND, "append", start, status_of(&result));
        result
    }

    #[instrument(skip(self), fields(operation = "recent_turns", backend = BACKEND))]
    fn recent_turns(&self, user_id: &str, limit: usize) -> Result<Vec<ConversationTurn>> {
        let start = Instant::now();
        let result = (|| {
            let conn = acquire_lock(&self.conn);
            let mut stmt = conn
                .prepare(
                    "SELECT role, content FROM messages
                     WHERE user_id = ?1
                     ORDER BY seq DESC
                     LIMIT ?2",
                )
                .map_err(query_error("prepare_recent_turns"))?;

            let limit = i64::try_from(limit).unwrap_or(i64::MAX);
            let rows = stmt
                .query_map(params![user_id, limit], |row| {
                    Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
                })
                .map_err(query_error("recent_turns"))?
                .collect::<rusqlite::Result<Vec<_>>>()
                .map_err(query_error("recent_turns"))?;

            rows.into_iter()
                .map(|(role, content)| {
                    let role = Role::parse(&role).ok_or_else(|| Error::OperationFailed {
                        operation: "decode_role".to_string(),
                        cause: format!("unknown role '{role}'"),
                    })?;
                    Ok(ConversationTurn::new(role, content))
                })
                .collect()
        })();

        record_operation_metrics(BACKEND, "recent_turns", start, status_of(&result));
        result
    }

    #[instrument(skip(self), fields(operation = "emotion_counts", backend = BACKEND))]
    fn emotion_counts(&self, user_id: &str, since: DateTime<Utc>) -> Result<Vec<EmotionCount>> {
        let start = Instant::now();
        let result = (|| {
            let conn = acquire_lock(&self.conn);
            let mut stmt = conn
                .prepare(
                    "SELECT COALESCE(NULLIF(TRIM(emotion), ''), ?3) AS label, COUNT(*) AS n
                     FROM messages
                     WHERE user_id = ?1 AND role = 'user' AND created_at >= ?2
                     GROUP BY label
                     ORDER BY n DESC, label ASC",
                )
                .map_err(query_error("prepare_emotion_counts"))?;

            let rows = stmt
                .query_map(
                    params![user_id, since.timestamp_millis(), UNLABELED_EMOTION],
                    |row| {
                        let count: i64 = row.get(1)?;
                        Ok(EmotionCount {
                            emotion: row.get(0)?,
                            count: u64::try_from(count).unwrap_or(0),
                        })
                    },
                )
                .map_err(query_error("emotion_counts"))?;

            rows.collect::<rusqlite::Result<Vec<_>>>()
                .map_err(query_error("emotion_counts"))
        })();

        record_operation_metrics(BACKEND, "emotion_counts", start, status_of(&result));
        result
    }
}

impl GuidanceStore for SqliteStore {
    #[instrument(skip(self), fields(operation = "lookup", backend = BACKEND, emotion = %emotion))]
    fn lookup(&self, emotion: &ExtendedEmotion) -> Result<Option<Guidance>> {
        let start = Instant::now();
        let result = (|| {
            let conn = acquire_lock(&self.conn);
            conn.query_row(
                "SELECT techniques, warnings FROM guidance WHERE emotion = ?1",
                params![emotion.as_str()],
                |row| {
                    Ok(Guidance {
                        techniques: row.get(0)?,
                        warnings: row.get(1)?,
                    })
                },
            )
            .optional()
            .map_err(query_error("lookup_guidance"))
        })();

        record_operation_metrics(BACKEND, "lookup", start, status_of(&result));
        result
    }

    #[instrument(skip(self, guidance), fields(operation = "upsert", backend = BACKEND, emotion = %emotion))]
    fn upsert(&self, emotion: &ExtendedEmotion, guidance: &Guidance) -> Result<()> {
        let start = Instant::now();
        let result = (|| {
            let conn = acquire_lock(&self.conn);
            with_transaction(&conn, || {
                conn.execute(
                    "INSERT INTO guidance (emotion, techniques, warnings, updated_at)
                     VALUES (?1, ?2, ?3, ?4)
                     ON CONFLICT(emotion) DO UPDATE SET
                        techniques = excluded.techniques,
                        warnings = excluded.warnings,
                        updated_at = excluded.updated_at",
                    params![
                        emotion.as_str(),
                        guidance.techniques.as_deref(),
                        guidance.warnings.as_deref(),
                        Utc::now().timestamp_millis(),
                    ],
                )
                .map_err(query_error("upsert_guidance"))?;
                Ok(())
            })
        })();

        record_operation_metrics(BACKEND, "upsert", start, status_of(&result));
        result
    }
}

impl CriticalEventSink for SqliteStore {
    #[instrument(skip(self, event), fields(operation = "record", backend = BACKEND, event_type = %event.event_type))]
    fn record(&self, event: &CriticalEvent) -> Result<String> {
        let start = Instant::now();
        let result = (|| {
            let conn = acquire_lock(&self.conn);
            let id = uuid::Uuid::now_v7().to_string();

            with_transaction(&conn, || {
                conn.execute(
                    "INSERT INTO critical_events
                        (id, user_id, message_id, event_type, description, alert_level, handled, created_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                    params![
                        id,
                        event.user_id,
                        event.message_id.as_str(),
                        event.event_type,
                        event.description,
                        event.alert_level.as_str(),
                        event.handled,
                        Utc::now().timestamp_millis(),
                    ],
                )
                .map_err(query_error("insert_critical_event"))?;
                Ok(())
            })?;

            Ok(id)
        })();

        record_operation_metrics(BACKEND, "record", start, status_of(&result));
        result
    }
}

fn query_error(operation: &'static str) -> impl Fn(rusqlite::Error) -> Error {
    move |e| Error::OperationFailed {
        operation: operation.to_string(),
        cause: e.to_string(),
    }
}
