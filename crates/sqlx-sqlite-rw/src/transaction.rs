//! Transactions with a timestamp frozen at begin

use std::ops::{Deref, DerefMut};

use sqlx::sqlite::SqliteConnection;
use sqlx::{Sqlite, Transaction};
use time::{Duration, OffsetDateTime, UtcOffset};
use tracing::debug;

use crate::Result;

/// Which pool a transaction was started on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxMode {
   /// `BEGIN IMMEDIATE` on the write connection
   Write,
   /// Deferred `BEGIN` on a read-only connection
   Read,
}

/// An open transaction.
///
/// Dereferences to [`SqliteConnection`], so statements run with
/// `sqlx::query(..).execute(&mut *tx)`. End it with [`Tx::commit`] or
/// [`Tx::rollback`]; a `Tx` dropped without either is rolled back.
///
/// [`Tx::now`] returns the instant the transaction began, in UTC and
/// truncated to whole seconds. Every statement in the transaction should use
/// it as "the current time".
#[must_use = "if unused, the transaction is immediately rolled back"]
pub struct Tx {
   inner: Transaction<'static, Sqlite>,
   mode: TxMode,
   now: OffsetDateTime,
}

impl Tx {
   pub(crate) fn new(inner: Transaction<'static, Sqlite>, mode: TxMode, now: OffsetDateTime) -> Self {
      Self {
         inner,
         mode,
         now: truncate_to_second(now),
      }
   }

   /// The transaction's timestamp, frozen at begin.
   pub fn now(&self) -> OffsetDateTime {
      self.now
   }

   pub fn mode(&self) -> TxMode {
      self.mode
   }

   /// Commit this transaction
   pub async fn commit(self) -> Result<()> {
      self.inner.commit().await?;
      debug!(mode = ?self.mode, "Transaction committed");
      Ok(())
   }

   /// Rollback this transaction
   pub async fn rollback(self) -> Result<()> {
      self.inner.rollback().await?;
      debug!(mode = ?self.mode, "Transaction rolled back");
      Ok(())
   }
}

impl Deref for Tx {
   type Target = SqliteConnection;

   fn deref(&self) -> &Self::Target {
      &self.inner
   }
}

impl DerefMut for Tx {
   fn deref_mut(&mut self) -> &mut Self::Target {
      &mut self.inner
   }
}

fn truncate_to_second(t: OffsetDateTime) -> OffsetDateTime {
   let utc = t.to_offset(UtcOffset::UTC);
   utc - Duration::nanoseconds(i64::from(utc.nanosecond()))
}

#[cfg(test)]
mod tests {
   use super::*;
   use time::macros::datetime;

   #[test]
   fn test_truncate_drops_subseconds() {
      let t = datetime!(2025-01-15 12:00:00.987_654_321 UTC);
      assert_eq!(truncate_to_second(t), datetime!(2025-01-15 12:00:00 UTC));
   }

   #[test]
   fn test_truncate_normalizes_to_utc() {
      let t = datetime!(2025-01-15 14:30:05.5 +02:00);
      let got = truncate_to_second(t);

      assert_eq!(got.offset(), UtcOffset::UTC);
      assert_eq!(got, datetime!(2025-01-15 12:30:05 UTC));
   }
}
