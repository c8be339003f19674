//! # sqlx-sqlite-rw
//!
//! A minimal wrapper around SQLx that makes SQLite's single-writer model
//! explicit.
//!
//! ## Core Types
//!
//! - **[`SqliteDatabase`]**: Main database type with separate read and write connection pools
//! - **[`SqliteDatabaseConfig`]**: Configuration for connection pool settings
//! - **[`Tx`]**: A transaction with a timestamp frozen at begin
//! - **[`WriteGuard`]**: RAII guard ensuring exclusive write access
//! - **[`ScriptSource`]**: Where migration scripts come from ([`DirSource`], [`MemorySource`])
//! - **[`Clock`]**: Replaceable time source
//! - **[`Error`]**: Error type for database operations
//!
//! ## Architecture
//!
//! - **Dual pools**: Separate read-only pool (max 10 connections) and write pool (exactly 1 connection)
//! - **WAL mode**: Enabled when the database is opened, so readers never wait on the writer
//! - **Exclusive writes**: `BEGIN IMMEDIATE` on the single write connection
//! - **Forward-only migrations**: `migration/*.sql` scripts applied once, in name order
//!
//! ## Usage
//!
//! ```no_run
//! use sqlx_sqlite_rw::{DirSource, SqliteDatabase};
//!
//! #[tokio::main]
//! async fn main() -> sqlx_sqlite_rw::Result<()> {
//!    let db = SqliteDatabase::open("data/app.db", None).await?;
//!    db.migrate(&DirSource::new("db")).await?;
//!
//!    let mut tx = db.begin_write().await?;
//!    sqlx::query("INSERT INTO users (name, created_at) VALUES (?, ?)")
//!       .bind("Alice")
//!       .bind(tx.now())
//!       .execute(&mut *tx)
//!       .await?;
//!    tx.commit().await?;
//!
//!    let mut tx = db.begin_read().await?;
//!    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
//!       .fetch_one(&mut *tx)
//!       .await?;
//!    tx.rollback().await?;
//!    assert_eq!(count, 1);
//!
//!    db.close().await?;
//!    Ok(())
//! }
//! ```

mod clock;
mod config;
mod database;
mod error;
mod migrate;
mod source;
mod transaction;
mod write_guard;

// Re-export public types
pub use clock::{Clock, SystemClock};
pub use config::SqliteDatabaseConfig;
pub use database::{MEMORY_LOCATION, SqliteDatabase};
pub use error::{Error, Result};
pub use migrate::{MIGRATION_DIR, MIGRATION_EXTENSION};
pub use source::{DirSource, MemorySource, ScriptSource};
pub use transaction::{Tx, TxMode};
pub use write_guard::WriteGuard;
