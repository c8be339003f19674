use std::fs;
use std::time::Duration;

use sqlite_rw::{
   DirSource, NullTime, SqliteDatabase, SqliteDatabaseConfig, Tx, TxMode, format_limit_offset,
};
use tempfile::TempDir;
use time::OffsetDateTime;
use time::macros::datetime;

const NOTES_SCHEMA: &str = r#"
CREATE TABLE notes (
   id INTEGER PRIMARY KEY,
   body TEXT NOT NULL,
   created_at TEXT NOT NULL,
   deleted_at TEXT
);
"#;

/// A scripts directory with one migration creating the `notes` table.
fn write_scripts(root: &TempDir) -> DirSource {
   let scripts = root.path().join("db");
   fs::create_dir_all(scripts.join("migration")).unwrap();
   fs::write(scripts.join("migration/00001_notes.sql"), NOTES_SCHEMA).unwrap();
   DirSource::new(scripts)
}

fn fixed_clock() -> OffsetDateTime {
   datetime!(2025-03-01 08:30:15.987 +01:00)
}

async fn open_notes_db(root: &TempDir) -> SqliteDatabase {
   let db_path = root.path().join("data/notes.db");
   let db = SqliteDatabase::open(db_path.to_str().unwrap(), None)
      .await
      .unwrap()
      .with_clock(fixed_clock);
   db.migrate(&write_scripts(root)).await.unwrap();
   db
}

async fn insert_note(tx: &mut Tx, body: &str) {
   let created_at = NullTime::new(tx.now());
   sqlx::query("INSERT INTO notes (body, created_at) VALUES (?, ?)")
      .bind(body)
      .bind(created_at)
      .execute(&mut **tx)
      .await
      .unwrap();
}

#[tokio::test]
async fn write_then_read_back_with_frozen_time() {
   let root = TempDir::new().unwrap();
   let db = open_notes_db(&root).await;

   let mut tx = db.begin_write().await.unwrap();
   assert_eq!(tx.mode(), TxMode::Write);
   insert_note(&mut tx, "first").await;
   insert_note(&mut tx, "second").await;
   tx.commit().await.unwrap();

   let mut tx = db.begin_read().await.unwrap();
   let rows: Vec<(String, NullTime, NullTime)> =
      sqlx::query_as("SELECT body, created_at, deleted_at FROM notes ORDER BY id")
         .fetch_all(&mut *tx)
         .await
         .unwrap();
   let stored: Vec<String> = sqlx::query_scalar("SELECT created_at FROM notes")
      .fetch_all(&mut *tx)
      .await
      .unwrap();
   tx.rollback().await.unwrap();

   let expected = datetime!(2025-03-01 07:30:15 UTC);
   assert_eq!(rows.len(), 2);
   for (_, created_at, deleted_at) in &rows {
      assert_eq!(created_at.get(), Some(expected));
      assert!(deleted_at.is_absent());
   }
   assert_eq!(stored, vec!["2025-03-01T07:30:15Z"; 2]);

   db.close().await.unwrap();
}

#[tokio::test]
async fn soft_delete_and_page_live_notes() {
   let root = TempDir::new().unwrap();
   let db = open_notes_db(&root).await;

   let mut tx = db.begin_write().await.unwrap();
   for i in 1..=9 {
      insert_note(&mut tx, &format!("note {i}")).await;
   }
   tx.commit().await.unwrap();

   // Soft-delete every third note
   let mut tx = db.begin_write().await.unwrap();
   let deleted_at = NullTime::new(tx.now());
   sqlx::query("UPDATE notes SET deleted_at = ? WHERE id % 3 = 0")
      .bind(deleted_at)
      .execute(&mut *tx)
      .await
      .unwrap();
   tx.commit().await.unwrap();

   let mut pages = Vec::new();
   let mut offset = 0;
   loop {
      let sql = format!(
         "SELECT id FROM notes WHERE deleted_at IS NULL ORDER BY id {}",
         format_limit_offset(4, offset)
      );
      let mut tx = db.begin_read().await.unwrap();
      let page: Vec<i64> = sqlx::query_scalar(&sql).fetch_all(&mut *tx).await.unwrap();
      tx.rollback().await.unwrap();

      if page.is_empty() {
         break;
      }
      offset += page.len() as i64;
      pages.push(page);
   }

   assert_eq!(pages, vec![vec![1, 2, 4, 5], vec![7, 8]]);

   db.close().await.unwrap();
}

#[tokio::test]
async fn data_and_migrations_survive_reopen() {
   let root = TempDir::new().unwrap();

   let db = open_notes_db(&root).await;
   let mut tx = db.begin_write().await.unwrap();
   insert_note(&mut tx, "persisted").await;
   tx.commit().await.unwrap();
   db.close().await.unwrap();

   // Reopening migrates again; the applied script must not run twice
   let db = open_notes_db(&root).await;
   let mut tx = db.begin_read().await.unwrap();
   let (body, created_at): (String, NullTime) =
      sqlx::query_as("SELECT body, created_at FROM notes")
         .fetch_one(&mut *tx)
         .await
         .unwrap();
   let applied: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM migrations")
      .fetch_one(&mut *tx)
      .await
      .unwrap();
   tx.rollback().await.unwrap();

   assert_eq!(body, "persisted");
   assert_eq!(created_at.get(), Some(datetime!(2025-03-01 07:30:15 UTC)));
   assert_eq!(applied, 1);

   db.remove().await.unwrap();
   assert!(!root.path().join("data/notes.db").exists());
}

#[tokio::test]
async fn readers_proceed_while_writer_holds_the_lock() {
   let root = TempDir::new().unwrap();
   let db = open_notes_db(&root).await;

   let mut writer = db.begin_write().await.unwrap();
   insert_note(&mut writer, "uncommitted").await;

   // A second writer waits for the first
   let second = tokio::time::timeout(Duration::from_millis(200), db.begin_write()).await;
   assert!(second.is_err(), "second writer should block");

   // Readers do not, and see the committed state only
   let mut reader = tokio::time::timeout(Duration::from_secs(2), db.begin_read())
      .await
      .expect("reader should not block")
      .unwrap();
   let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM notes")
      .fetch_one(&mut *reader)
      .await
      .unwrap();
   assert_eq!(count, 0);

   let err = sqlx::query("DELETE FROM notes")
      .execute(&mut *reader)
      .await
      .unwrap_err();
   assert!(err.as_database_error().is_some(), "read transaction must reject writes");
   reader.rollback().await.unwrap();

   writer.commit().await.unwrap();

   let mut tx = db.begin_write().await.unwrap();
   let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM notes")
      .fetch_one(&mut *tx)
      .await
      .unwrap();
   tx.rollback().await.unwrap();
   assert_eq!(count, 1);

   db.close().await.unwrap();
}

#[tokio::test]
async fn small_read_pool_from_config() {
   let root = TempDir::new().unwrap();
   let config = SqliteDatabaseConfig {
      max_read_connections: 1,
      idle_read_connections: 1,
      ..Default::default()
   };
   let db = SqliteDatabase::open(root.path().join("one.db").to_str().unwrap(), Some(config))
      .await
      .unwrap();

   let held = db.begin_read().await.unwrap();
   let blocked = tokio::time::timeout(Duration::from_millis(200), db.begin_read()).await;
   assert!(blocked.is_err(), "read pool of one should be exhausted");
   held.rollback().await.unwrap();

   let tx = db.begin_read().await.unwrap();
   assert_eq!(tx.mode(), TxMode::Read);
   tx.rollback().await.unwrap();

   db.close().await.unwrap();
}
