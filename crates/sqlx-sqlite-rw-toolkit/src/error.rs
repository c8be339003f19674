/// Result type alias for toolkit operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for SQLite toolkit operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
   /// Error from SQLx operations.
   #[error(transparent)]
   Sqlx(#[from] sqlx::Error),

   /// A stored value had a SQLite type the codec cannot decode.
   #[error("NullTime: cannot decode SQLite {0} value to a timestamp")]
   UnexpectedType(String),

   /// A timestamp could not be formatted as RFC 3339 (for example, a year
   /// outside 0000-9999).
   #[error("NullTime: cannot format timestamp: {0}")]
   Format(#[from] time::error::Format),
}

impl Error {
   /// Extract a structured error code from the error type.
   ///
   /// This provides machine-readable error codes for error handling.
   pub fn error_code(&self) -> String {
      match self {
         Error::Sqlx(e) => {
            if let Some(code) = e.as_database_error().and_then(|db_err| db_err.code()) {
               return format!("SQLITE_{}", code);
            }
            "SQLX_ERROR".to_string()
         }
         Error::UnexpectedType(_) => "UNEXPECTED_TYPE".to_string(),
         Error::Format(_) => "TIME_FORMAT".to_string(),
      }
   }
}

#[cfg(test)]
mod tests {
   use super::*;

   #[test]
   fn test_error_code_unexpected_type() {
      let err = Error::UnexpectedType("INTEGER".into());
      assert_eq!(err.error_code(), "UNEXPECTED_TYPE");
      assert!(err.to_string().contains("INTEGER"));
   }

   #[test]
   fn test_error_code_sqlx_non_database() {
      // RowNotFound is not a database error, so no SQLite code
      let err = Error::Sqlx(sqlx::Error::RowNotFound);
      assert_eq!(err.error_code(), "SQLX_ERROR");
   }
}
