//! # sqlx-sqlite-rw-toolkit
//!
//! Small helpers for SQLite queries written against SQLx:
//!
//! - **[`NullTime`]**: an optional timestamp stored as UTC RFC 3339 text
//! - **[`format_limit_offset`]**: a `LIMIT`/`OFFSET` clause for offset pagination
//!
//! Both work with any SQLite executor, including the transactions handed out
//! by `sqlx-sqlite-rw`.

mod error;
mod null_time;
mod pagination;

pub use error::{Error, Result};
pub use null_time::NullTime;
pub use pagination::format_limit_offset;
