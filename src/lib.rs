//! # sqlite-rw
//!
//! SQLite through SQLx with SQLite's concurrency model made explicit: one
//! write connection, a pool of read-only connections, a forward-only
//! migration runner and a few query helpers.
//!
//! This crate re-exports [`sqlx_sqlite_rw`] (pools, transactions, migrations)
//! and [`sqlx_sqlite_rw_toolkit`] (nullable timestamps, `LIMIT`/`OFFSET`)
//! under one name, along with the `sqlx` and `time` versions they are built
//! against.
//!
//! ```no_run
//! use sqlite_rw::{NullTime, SqliteDatabase, MemorySource, format_limit_offset};
//!
//! # async fn example() -> sqlite_rw::Result<()> {
//! let db = SqliteDatabase::open("data/app.db", None).await?;
//! db.migrate(&MemorySource::from([(
//!    "migration/00001_init.sql",
//!    "CREATE TABLE notes (id INTEGER PRIMARY KEY, body TEXT, created_at TEXT, deleted_at TEXT);",
//! )]))
//! .await?;
//!
//! let mut tx = db.begin_write().await?;
//! sqlx::query("INSERT INTO notes (body, created_at, deleted_at) VALUES (?, ?, ?)")
//!    .bind("hello")
//!    .bind(NullTime::new(tx.now()))
//!    .bind(NullTime::NULL)
//!    .execute(&mut *tx)
//!    .await?;
//! tx.commit().await?;
//!
//! let mut tx = db.begin_read().await?;
//! let sql = format!("SELECT body FROM notes ORDER BY id {}", format_limit_offset(20, 0));
//! let bodies: Vec<String> = sqlx::query_scalar(&sql).fetch_all(&mut *tx).await?;
//! tx.rollback().await?;
//!
//! db.close().await?;
//! # Ok(())
//! # }
//! ```

pub use sqlx_sqlite_rw::{
   Clock, DirSource, Error, MEMORY_LOCATION, MIGRATION_DIR, MIGRATION_EXTENSION, MemorySource,
   Result, ScriptSource, SqliteDatabase, SqliteDatabaseConfig, SystemClock, Tx, TxMode,
   WriteGuard,
};
pub use sqlx_sqlite_rw_toolkit::{NullTime, format_limit_offset};

/// Toolkit errors, kept separate from the pool manager's [`Error`].
pub use sqlx_sqlite_rw_toolkit::Error as ToolkitError;

pub use sqlx;
pub use sqlx_sqlite_rw;
pub use sqlx_sqlite_rw_toolkit;
pub use time;
