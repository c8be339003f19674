//! SQLite database with a single-connection write pool and a read-only pool

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::clock::{Clock, SystemClock};
use crate::config::SqliteDatabaseConfig;
use crate::error::{Error, Result};
use crate::transaction::{Tx, TxMode};
use crate::write_guard::WriteGuard;

/// Location string that selects a shared in-memory database.
pub const MEMORY_LOCATION: &str = ":memory:";

/// Distinguishes in-memory databases opened by this process.
static MEMORY_SEQ: AtomicU64 = AtomicU64::new(0);

/// SQLite database with separate pools for writers and readers.
///
/// ## Architecture
///
/// The database maintains two connection pools against the same storage:
/// - **`write_pool`**: exactly one read-write connection, held for the life of
///   the database. All mutations go through it, so writes are serialized here
///   rather than by `SQLITE_BUSY` retries.
/// - **`read_pool`**: up to `max_read_connections` read-only connections for
///   concurrent reads. Under WAL, readers never block on the writer.
///
/// ## State Management
///
/// - **`lifetime`**: cancelled by [`close`](Self::close); pending `begin_*`
///   calls observe it and fail with [`Error::DatabaseClosed`]
/// - **`closed`**: prevents use after the database has been closed
/// - **`clock`**: time source for transaction timestamps
///
/// ## Usage Pattern
///
/// ```text
/// 1. Open the database (creates the parent directory and both pools)
/// 2. Run migrations through the write pool
/// 3. begin_write() for anything that mutates, begin_read() for queries
/// 4. Close the database when done
/// ```
pub struct SqliteDatabase {
   /// Pool of read-only connections for concurrent reads
   read_pool: Pool<Sqlite>,

   /// Single read-write connection pool (max_connections=1) for serialized writes
   write_pool: Pool<Sqlite>,

   /// Cancelled when the database closes
   lifetime: CancellationToken,

   /// Marks database as closed to prevent further operations
   closed: AtomicBool,

   /// Database file path, or `None` for the in-memory database
   path: Option<PathBuf>,

   clock: Arc<dyn Clock>,
}

impl SqliteDatabase {
   /// Open the database at `location`.
   ///
   /// `location` is a file path, or [`MEMORY_LOCATION`] for an in-memory
   /// database shared by both pools. The parent directory of a file path is
   /// created if missing, as is the database file itself.
   ///
   /// # Errors
   ///
   /// - [`Error::EmptyLocation`] if `location` is empty; no pool is opened
   /// - [`Error::InvalidConfig`] if `config` has no read connections
   /// - [`Error::Io`] if the parent directory cannot be created
   /// - [`Error::Sqlx`] if either pool fails to open. The write pool is
   ///   closed again when only the read pool fails.
   ///
   /// # Example
   ///
   /// ```no_run
   /// use sqlx_sqlite_rw::SqliteDatabase;
   ///
   /// # async fn example() -> sqlx_sqlite_rw::Result<()> {
   /// let db = SqliteDatabase::open("data/app.db", None).await?;
   ///
   /// let mut tx = db.begin_write().await?;
   /// sqlx::query("INSERT INTO events (created_at) VALUES (?)")
   ///    .bind(tx.now())
   ///    .execute(&mut *tx)
   ///    .await?;
   /// tx.commit().await?;
   ///
   /// db.close().await?;
   /// # Ok(())
   /// # }
   /// ```
   pub async fn open(location: &str, config: Option<SqliteDatabaseConfig>) -> Result<Self> {
      if location.is_empty() {
         return Err(Error::EmptyLocation);
      }

      let config = config.unwrap_or_default();
      config.validate()?;

      let (write_options, read_options, path) = if location == MEMORY_LOCATION {
         // A named memdb database is shared by every connection that opens
         // the same name in this process. Unlike a shared-cache database it
         // uses ordinary file locking, so readers are not blocked by an open
         // write transaction.
         let name = format!("/sqlite-rw-{}", MEMORY_SEQ.fetch_add(1, Ordering::Relaxed));
         let write_options = SqliteConnectOptions::new()
            .filename(&name)
            .vfs("memdb")
            .create_if_missing(true)
            .foreign_keys(true)
            .busy_timeout(config.busy_timeout);
         let read_options = write_options.clone().pragma("query_only", "ON");

         (write_options, read_options, None)
      } else {
         let path = PathBuf::from(location);
         create_parent_dir(&path)?;

         let write_options = SqliteConnectOptions::new()
            .filename(&path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .foreign_keys(true)
            .busy_timeout(config.busy_timeout);

         // The writer has already switched the file to WAL; a read-only
         // connection cannot change the journal mode anyway.
         let read_options = SqliteConnectOptions::new()
            .filename(&path)
            .read_only(true)
            .foreign_keys(true)
            .busy_timeout(config.busy_timeout);

         (write_options, read_options, Some(path))
      };

      // Connecting eagerly creates the database and enables WAL before any
      // read-only connection looks at it.
      let write_pool = SqlitePoolOptions::new()
         .max_connections(1)
         .min_connections(1)
         .idle_timeout(None)
         .max_lifetime(None)
         .connect_with(write_options)
         .await?;

      let read_pool = connect_read_pool(&write_pool, read_options, &config).await?;

      debug!(location, "Opened SQLite database");

      Ok(Self {
         read_pool,
         write_pool,
         lifetime: CancellationToken::new(),
         closed: AtomicBool::new(false),
         path,
         clock: Arc::new(SystemClock),
      })
   }

   /// Replace the time source used for transaction timestamps.
   pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
      self.clock = Arc::new(clock);
      self
   }

   /// The database file path, or `None` for an in-memory database.
   pub fn path(&self) -> Option<&Path> {
      self.path.as_deref()
   }

   pub fn is_memory(&self) -> bool {
      self.path.is_none()
   }

   pub fn is_closed(&self) -> bool {
      self.closed.load(Ordering::Acquire)
   }

   /// A token cancelled when the database closes.
   ///
   /// Background work tied to this database can select on it to stop
   /// promptly at shutdown. Cancelling the returned token does not close the
   /// database.
   pub fn lifetime(&self) -> CancellationToken {
      self.lifetime.child_token()
   }

   /// Get a reference to the read-only connection pool.
   pub fn read_pool(&self) -> Result<&Pool<Sqlite>> {
      if self.is_closed() {
         return Err(Error::DatabaseClosed);
      }
      Ok(&self.read_pool)
   }

   /// Acquire the write connection outside of a transaction.
   ///
   /// Waits until any open write transaction or other guard is released.
   pub async fn acquire_writer(&self) -> Result<WriteGuard> {
      let pool = self.write_pool()?;
      let conn = tokio::select! {
         biased;
         _ = self.lifetime.cancelled() => return Err(Error::DatabaseClosed),
         conn = pool.acquire() => conn?,
      };
      Ok(WriteGuard::new(conn))
   }

   /// Begin a read-write transaction using `BEGIN IMMEDIATE`.
   ///
   /// The write lock is claimed up front, so contention with another process
   /// surfaces here (after the busy timeout) instead of on the first write
   /// statement. Within this process, a second call waits until the current
   /// write transaction ends.
   pub async fn begin_write(&self) -> Result<Tx> {
      let pool = self.write_pool()?;
      let tx = tokio::select! {
         biased;
         _ = self.lifetime.cancelled() => return Err(Error::DatabaseClosed),
         tx = pool.begin_with("BEGIN IMMEDIATE") => tx?,
      };

      debug!("Began write transaction");
      Ok(Tx::new(tx, TxMode::Write, self.clock.now()))
   }

   /// Begin a read-only transaction using a deferred `BEGIN`.
   ///
   /// Runs concurrently with other readers and with an open write
   /// transaction; it sees the database as of its first read.
   pub async fn begin_read(&self) -> Result<Tx> {
      let pool = self.read_pool()?;
      let tx = tokio::select! {
         biased;
         _ = self.lifetime.cancelled() => return Err(Error::DatabaseClosed),
         tx = pool.begin() => tx?,
      };

      debug!("Began read transaction");
      Ok(Tx::new(tx, TxMode::Read, self.clock.now()))
   }

   /// Close both pools.
   ///
   /// Cancels the lifetime token first so pending `begin_*` calls return.
   /// Must not be called while transactions are open: pool close waits for
   /// checked-out connections to be returned. Closing twice is a no-op.
   pub async fn close(&self) -> Result<()> {
      if self.closed.swap(true, Ordering::AcqRel) {
         return Ok(());
      }

      self.lifetime.cancel();

      // Pool::close cannot fail; both pools are always closed.
      self.write_pool.close().await;
      self.read_pool.close().await;

      debug!(path = ?self.path, "Closed SQLite database");
      Ok(())
   }

   /// Close the database and delete its files.
   ///
   /// Removes the database file and its `-wal` and `-shm` companions. Files
   /// that do not exist are ignored. For an in-memory database this is the
   /// same as [`close`](Self::close).
   pub async fn remove(&self) -> Result<()> {
      self.close().await?;

      let Some(path) = &self.path else {
         return Ok(());
      };

      for suffix in ["", "-wal", "-shm"] {
         let mut file = path.clone().into_os_string();
         file.push(suffix);

         match tokio::fs::remove_file(&file).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
         }
      }

      debug!(path = ?path, "Removed SQLite database files");
      Ok(())
   }

   fn write_pool(&self) -> Result<&Pool<Sqlite>> {
      if self.is_closed() {
         return Err(Error::DatabaseClosed);
      }
      Ok(&self.write_pool)
   }
}

impl std::fmt::Debug for SqliteDatabase {
   fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
      f.debug_struct("SqliteDatabase")
         .field("path", &self.path)
         .field("closed", &self.is_closed())
         .finish_non_exhaustive()
   }
}

/// Open the read pool. The write pool is closed if this fails, so a failed
/// `open` leaves no connection behind.
async fn connect_read_pool(
   write_pool: &Pool<Sqlite>,
   options: SqliteConnectOptions,
   config: &SqliteDatabaseConfig,
) -> Result<Pool<Sqlite>> {
   let result = SqlitePoolOptions::new()
      .max_connections(config.max_read_connections)
      .min_connections(config.idle_read_connections.min(config.max_read_connections))
      .idle_timeout(Some(config.read_idle_timeout))
      .connect_with(options)
      .await;

   match result {
      Ok(pool) => Ok(pool),
      Err(e) => {
         write_pool.close().await;
         Err(e.into())
      }
   }
}

/// Create the directory that will hold the database file.
fn create_parent_dir(path: &Path) -> std::io::Result<()> {
   let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) else {
      return Ok(());
   };

   let mut builder = std::fs::DirBuilder::new();
   builder.recursive(true);

   #[cfg(unix)]
   {
      use std::os::unix::fs::DirBuilderExt;
      builder.mode(0o700);
   }

   builder.create(parent)
}
