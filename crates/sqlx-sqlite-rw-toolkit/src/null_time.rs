//! Nullable timestamps stored as RFC 3339 text.
//!
//! SQLite has no timestamp type. [`NullTime`] stores an optional instant as
//! UTC RFC 3339 text (`2025-01-15T12:00:00Z`) and `NULL` when absent.
//!
//! ```no_run
//! use sqlx_sqlite_rw_toolkit::NullTime;
//! use sqlx::SqlitePool;
//!
//! # async fn example(pool: &SqlitePool) -> Result<(), sqlx::Error> {
//! let deleted_at: NullTime = sqlx::query_scalar("SELECT deleted_at FROM users WHERE id = ?")
//!    .bind(1)
//!    .fetch_one(pool)
//!    .await?;
//!
//! if let Some(when) = deleted_at.get() {
//!    println!("deleted at {when}");
//! }
//! # Ok(())
//! # }
//! ```

use sqlx::encode::IsNull;
use sqlx::error::BoxDynError;
use sqlx::sqlite::{SqliteTypeInfo, SqliteValueRef};
use sqlx::{Database, Decode, Encode, Sqlite, Type, TypeInfo, ValueRef};
use time::format_description::well_known::Rfc3339;
use time::{OffsetDateTime, UtcOffset};
use tracing::trace;

use crate::{Error, Result};

/// An optional instant with a text storage codec.
///
/// - Decoding `NULL` gives an absent value.
/// - Decoding `TEXT` parses RFC 3339. Text that does not parse also gives an
///   absent value rather than an error, so a malformed timestamp cannot be
///   told apart from `NULL`.
/// - Decoding any other SQLite type fails with [`Error::UnexpectedType`].
/// - Encoding an absent value binds `NULL`; a present one binds the instant
///   converted to UTC as RFC 3339 text. Sub-second digits are written only
///   when non-zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct NullTime(pub Option<OffsetDateTime>);

impl NullTime {
   /// An absent timestamp.
   pub const NULL: NullTime = NullTime(None);

   pub fn new(value: OffsetDateTime) -> Self {
      Self(Some(value))
   }

   pub fn get(&self) -> Option<OffsetDateTime> {
      self.0
   }

   pub fn is_absent(&self) -> bool {
      self.0.is_none()
   }

   /// Decode stored text. Unparseable text is treated as absent.
   pub fn from_text(text: &str) -> Self {
      match OffsetDateTime::parse(text, &Rfc3339) {
         Ok(value) => Self(Some(value)),
         Err(e) => {
            trace!(text, error = %e, "Unparseable timestamp decoded as absent");
            Self(None)
         }
      }
   }

   /// Encode for storage: `None` for absent, UTC RFC 3339 text otherwise.
   pub fn to_text(&self) -> Result<Option<String>> {
      match self.0 {
         None => Ok(None),
         Some(value) => Ok(Some(value.to_offset(UtcOffset::UTC).format(&Rfc3339)?)),
      }
   }
}

impl From<OffsetDateTime> for NullTime {
   fn from(value: OffsetDateTime) -> Self {
      Self(Some(value))
   }
}

impl From<Option<OffsetDateTime>> for NullTime {
   fn from(value: Option<OffsetDateTime>) -> Self {
      Self(value)
   }
}

impl From<NullTime> for Option<OffsetDateTime> {
   fn from(value: NullTime) -> Self {
      value.0
   }
}

impl Type<Sqlite> for NullTime {
   fn type_info() -> SqliteTypeInfo {
      <String as Type<Sqlite>>::type_info()
   }

   // Type checking happens in decode so a mismatch can name the stored type
   fn compatible(_ty: &SqliteTypeInfo) -> bool {
      true
   }
}

impl<'q> Encode<'q, Sqlite> for NullTime {
   fn encode_by_ref(
      &self,
      buf: &mut <Sqlite as Database>::ArgumentBuffer<'q>,
   ) -> std::result::Result<IsNull, BoxDynError> {
      match self.to_text()? {
         Some(text) => <String as Encode<'q, Sqlite>>::encode(text, buf),
         None => Ok(IsNull::Yes),
      }
   }
}

impl<'r> Decode<'r, Sqlite> for NullTime {
   fn decode(value: SqliteValueRef<'r>) -> std::result::Result<Self, BoxDynError> {
      if value.is_null() {
         return Ok(Self(None));
      }

      let type_name = value.type_info().name().to_string();
      if type_name != "TEXT" {
         return Err(Box::new(Error::UnexpectedType(type_name)));
      }

      let text = <&str as Decode<'r, Sqlite>>::decode(value)?;
      Ok(Self::from_text(text))
   }
}
