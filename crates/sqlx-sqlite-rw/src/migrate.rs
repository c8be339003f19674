//! Forward-only migration runner

use tracing::{debug, trace};

use crate::database::SqliteDatabase;
use crate::error::{Error, Result};
use crate::source::ScriptSource;

/// Directory inside a [`ScriptSource`] that holds migration scripts.
pub const MIGRATION_DIR: &str = "migration";

/// Extension a file needs to be picked up as a migration script.
pub const MIGRATION_EXTENSION: &str = ".sql";

impl SqliteDatabase {
   /// Apply every pending migration script from `source`.
   ///
   /// Scripts are the `*.sql` files directly under `migration/`, applied in
   /// lexicographic order of their names, so a zero-padded numeric prefix
   /// (`migration/00001_init.sql`, `migration/00002_users.sql`) sets the
   /// order. Each script runs once: its name is recorded in the
   /// `migrations` table in the same write transaction that executed it.
   ///
   /// Running again with the same or more scripts only applies the new ones.
   ///
   /// # Errors
   ///
   /// Stops at the first failing script and returns
   /// [`Error::Migration`] naming it. Scripts before it stay applied; the
   /// failing one is rolled back and nothing after it runs.
   pub async fn migrate<S: ScriptSource>(&self, source: &S) -> Result<()> {
      {
         let mut writer = self.acquire_writer().await?;
         sqlx::query("CREATE TABLE IF NOT EXISTS migrations (name TEXT PRIMARY KEY)")
            .execute(&mut *writer)
            .await
            .map_err(Error::MigrationsTable)?;
      }

      let mut names: Vec<String> = source
         .list(MIGRATION_DIR)?
         .into_iter()
         .filter(|name| name.ends_with(MIGRATION_EXTENSION))
         .collect();
      names.sort();

      debug!(count = names.len(), "Running migrations");

      for name in names {
         if let Err(e) = self.migrate_script(source, &name).await {
            return Err(Error::Migration {
               name,
               source: Box::new(e),
            });
         }
      }

      Ok(())
   }

   async fn migrate_script<S: ScriptSource>(&self, source: &S, name: &str) -> Result<()> {
      // Dropping the transaction on any early return rolls it back
      let mut tx = self.begin_write().await?;

      let applied: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM migrations WHERE name = ?")
         .bind(name)
         .fetch_one(&mut *tx)
         .await?;
      if applied != 0 {
         trace!(name, "Migration already applied");
         return tx.rollback().await;
      }

      let script = source.read(name)?;
      if !script.trim().is_empty() {
         sqlx::raw_sql(&script).execute(&mut *tx).await?;
      }

      sqlx::query("INSERT INTO migrations (name) VALUES (?)")
         .bind(name)
         .execute(&mut *tx)
         .await?;

      tx.commit().await?;
      debug!(name, "Applied migration");
      Ok(())
   }
}
