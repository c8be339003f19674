//! LIMIT/OFFSET clause formatting.
//!
//! # Example
//!
//! ```
//! use sqlx_sqlite_rw_toolkit::format_limit_offset;
//!
//! let sql = format!(
//!    "SELECT id, title FROM posts ORDER BY id {}",
//!    format_limit_offset(20, 40)
//! );
//! assert_eq!(sql, "SELECT id, title FROM posts ORDER BY id LIMIT 20 OFFSET 40");
//! ```

/// Format a `LIMIT`/`OFFSET` clause.
///
/// Non-positive values mean "not set": with neither set the result is empty,
/// so it can be appended to a query unconditionally.
pub fn format_limit_offset(limit: i64, offset: i64) -> String {
   if limit > 0 && offset > 0 {
      format!("LIMIT {} OFFSET {}", limit, offset)
   } else if limit > 0 {
      format!("LIMIT {}", limit)
   } else if offset > 0 {
      format!("OFFSET {}", offset)
   } else {
      String::new()
   }
}
