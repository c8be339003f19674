//! Error types for sqlx-sqlite-rw

use thiserror::Error;

/// Errors that may occur when working with sqlx-sqlite-rw
#[derive(Error, Debug)]
pub enum Error {
   /// The database location was empty
   #[error("database location required")]
   EmptyLocation,

   /// The pool configuration cannot be used
   #[error("invalid database config: {0}")]
   InvalidConfig(String),

   /// IO error when creating the database directory or reading migration
   /// scripts. Standard library IO errors are converted to this variant.
   #[error("IO error: {0}")]
   Io(#[from] std::io::Error),

   /// Error from the sqlx library. Standard sqlx errors are converted to this variant
   #[error("Sqlx error: {0}")]
   Sqlx(#[from] sqlx::Error),

   /// Database has been closed and cannot be used
   #[error("Database has been closed")]
   DatabaseClosed,

   /// The migrations bookkeeping table could not be created
   #[error("cannot create migrations table: {0}")]
   MigrationsTable(#[source] sqlx::Error),

   /// A migration script failed; nothing after it was applied
   #[error("migration error: name={name:?} err={source}")]
   Migration {
      name: String,
      #[source]
      source: Box<Error>,
   },
}

impl Error {
   /// Machine-readable error code.
   pub fn error_code(&self) -> String {
      match self {
         Error::EmptyLocation => "EMPTY_LOCATION".to_string(),
         Error::InvalidConfig(_) => "INVALID_CONFIG".to_string(),
         Error::Io(_) => "IO_ERROR".to_string(),
         Error::Sqlx(e) => {
            if let Some(code) = e.as_database_error().and_then(|db_err| db_err.code()) {
               return format!("SQLITE_{}", code);
            }
            "SQLX_ERROR".to_string()
         }
         Error::DatabaseClosed => "DATABASE_CLOSED".to_string(),
         Error::MigrationsTable(_) => "MIGRATIONS_TABLE".to_string(),
         Error::Migration { .. } => "MIGRATION_FAILED".to_string(),
      }
   }

   /// Name of the failing migration script, if this is a migration error.
   pub fn migration_name(&self) -> Option<&str> {
      match self {
         Error::Migration { name, .. } => Some(name),
         _ => None,
      }
   }
}

/// A type alias for Results with our Error type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
   use super::*;

   #[test]
   fn test_error_code_empty_location() {
      assert_eq!(Error::EmptyLocation.error_code(), "EMPTY_LOCATION");
      assert_eq!(Error::EmptyLocation.to_string(), "database location required");
   }

   #[test]
   fn test_error_code_sqlx_non_database() {
      let err = Error::Sqlx(sqlx::Error::RowNotFound);
      assert_eq!(err.error_code(), "SQLX_ERROR");
   }

   #[test]
   fn test_migration_error_names_script() {
      let err = Error::Migration {
         name: "migration/00002_posts.sql".into(),
         source: Box::new(Error::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "missing",
         ))),
      };

      assert_eq!(err.error_code(), "MIGRATION_FAILED");
      assert_eq!(err.migration_name(), Some("migration/00002_posts.sql"));
      assert!(err.to_string().contains(r#"name="migration/00002_posts.sql""#));
      assert!(err.to_string().contains("missing"));
   }

   #[test]
   fn test_migration_name_absent_for_other_errors() {
      assert_eq!(Error::DatabaseClosed.migration_name(), None);
   }
}
