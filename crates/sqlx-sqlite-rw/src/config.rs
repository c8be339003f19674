//! Configuration for SQLite database connection pools

use std::time::Duration;

use serde::{Deserialize, Deserializer};

use crate::error::{Error, Result};

/// Configuration for SqliteDatabase connection pools
///
/// The write pool is not configurable: it always holds exactly one connection
/// for the lifetime of the database.
///
/// When deserialized, the timeouts are given as integer milliseconds:
///
/// ```json
/// { "max_read_connections": 4, "busy_timeout": 2500 }
/// ```
///
/// # Examples
///
/// ```
/// use sqlx_sqlite_rw::SqliteDatabaseConfig;
/// use std::time::Duration;
///
/// // Use defaults
/// let config = SqliteDatabaseConfig::default();
///
/// // Override just one field
/// let config = SqliteDatabaseConfig {
///    max_read_connections: 3,
///    ..Default::default()
/// };
/// assert_eq!(config.busy_timeout, Duration::from_secs(5));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SqliteDatabaseConfig {
   /// Maximum number of concurrent read connections
   ///
   /// This controls the size of the read-only connection pool.
   /// Higher values allow more concurrent read queries but consume more resources.
   ///
   /// Default: 10
   pub max_read_connections: u32,

   /// Number of read connections kept open while idle
   ///
   /// These connections are opened eagerly by `SqliteDatabase::open` and
   /// kept for the life of the pool. Connections above this count are
   /// closed after `read_idle_timeout`. Values above `max_read_connections`
   /// are capped to it.
   ///
   /// Default: 5
   pub idle_read_connections: u32,

   /// Idle timeout for read connections beyond `idle_read_connections`
   ///
   /// Default: 30 seconds
   #[serde(deserialize_with = "duration_from_millis")]
   pub read_idle_timeout: Duration,

   /// How long a connection waits on a locked database before failing
   /// with `SQLITE_BUSY`
   ///
   /// Default: 5 seconds
   #[serde(deserialize_with = "duration_from_millis")]
   pub busy_timeout: Duration,
}

impl Default for SqliteDatabaseConfig {
   fn default() -> Self {
      Self {
         max_read_connections: 10,
         idle_read_connections: 5,
         read_idle_timeout: Duration::from_secs(30),
         busy_timeout: Duration::from_secs(5),
      }
   }
}

impl SqliteDatabaseConfig {
   /// Reject settings the pools cannot be built with.
   pub fn validate(&self) -> Result<()> {
      if self.max_read_connections == 0 {
         return Err(Error::InvalidConfig(
            "max_read_connections must be at least 1".into(),
         ));
      }
      Ok(())
   }
}

fn duration_from_millis<'de, D>(deserializer: D) -> std::result::Result<Duration, D::Error>
where
   D: Deserializer<'de>,
{
   u64::deserialize(deserializer).map(Duration::from_millis)
}
