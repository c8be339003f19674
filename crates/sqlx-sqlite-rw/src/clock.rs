//! Replaceable time source

use time::OffsetDateTime;

/// Source of the current instant.
///
/// Transactions read the clock once when they begin. Any
/// `Fn() -> OffsetDateTime` closure is a clock, which keeps test
/// substitution to a one-liner:
///
/// ```
/// use sqlx_sqlite_rw::Clock;
/// use time::OffsetDateTime;
///
/// let fixed = OffsetDateTime::UNIX_EPOCH;
/// let clock = move || fixed;
/// assert_eq!(clock.now(), fixed);
/// ```
pub trait Clock: Send + Sync {
   fn now(&self) -> OffsetDateTime;
}

/// The system wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
   fn now(&self) -> OffsetDateTime {
      OffsetDateTime::now_utc()
   }
}

impl<F> Clock for F
where
   F: Fn() -> OffsetDateTime + Send + Sync,
{
   fn now(&self) -> OffsetDateTime {
      self()
   }
}
