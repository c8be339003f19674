//! Collections of migration scripts

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

/// A read-only, hierarchical collection of named text files.
///
/// Names are `/`-separated paths relative to the collection root, such as
/// `migration/00001_init.sql`.
pub trait ScriptSource {
   /// Names of the files directly inside `dir`.
   ///
   /// A missing directory is an empty listing, not an error.
   fn list(&self, dir: &str) -> io::Result<Vec<String>>;

   /// Full text of the file called `name`.
   fn read(&self, name: &str) -> io::Result<String>;
}

impl<S: ScriptSource + ?Sized> ScriptSource for &S {
   fn list(&self, dir: &str) -> io::Result<Vec<String>> {
      (**self).list(dir)
   }

   fn read(&self, name: &str) -> io::Result<String> {
      (**self).read(name)
   }
}

/// Scripts stored under a directory on disk.
#[derive(Debug, Clone)]
pub struct DirSource {
   root: PathBuf,
}

impl DirSource {
   pub fn new(root: impl Into<PathBuf>) -> Self {
      Self { root: root.into() }
   }

   pub fn root(&self) -> &Path {
      &self.root
   }
}

impl ScriptSource for DirSource {
   fn list(&self, dir: &str) -> io::Result<Vec<String>> {
      let entries = match std::fs::read_dir(self.root.join(dir)) {
         Ok(entries) => entries,
         Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
         Err(e) => return Err(e),
      };

      let mut names = Vec::new();
      for entry in entries {
         let entry = entry?;
         // Follows symlinks, so a linked script is listed like a plain file
         if !std::fs::metadata(entry.path())?.is_file() {
            continue;
         }
         let file_name = entry.file_name().into_string().map_err(|name| {
            io::Error::new(
               io::ErrorKind::InvalidData,
               format!("script name is not valid UTF-8: {name:?}"),
            )
         })?;
         names.push(format!("{}/{}", dir.trim_end_matches('/'), file_name));
      }
      Ok(names)
   }

   fn read(&self, name: &str) -> io::Result<String> {
      std::fs::read_to_string(self.root.join(name))
   }
}

/// Scripts held in memory, keyed by name.
///
/// Useful for tests and for scripts embedded with `include_str!`:
///
/// ```
/// use sqlx_sqlite_rw::MemorySource;
///
/// let source = MemorySource::from([
///    ("migration/00001_init.sql", "CREATE TABLE users (id INTEGER PRIMARY KEY);"),
/// ]);
/// assert_eq!(source.len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
   files: BTreeMap<String, String>,
}

impl MemorySource {
   pub fn new() -> Self {
      Self::default()
   }

   /// Add or replace a file.
   pub fn insert(&mut self, name: impl Into<String>, text: impl Into<String>) {
      self.files.insert(name.into(), text.into());
   }

   pub fn len(&self) -> usize {
      self.files.len()
   }

   pub fn is_empty(&self) -> bool {
      self.files.is_empty()
   }
}

impl<N, T> FromIterator<(N, T)> for MemorySource
where
   N: Into<String>,
   T: Into<String>,
{
   fn from_iter<I: IntoIterator<Item = (N, T)>>(iter: I) -> Self {
      Self {
         files: iter
            .into_iter()
            .map(|(name, text)| (name.into(), text.into()))
            .collect(),
      }
   }
}

impl<N, T, const LEN: usize> From<[(N, T); LEN]> for MemorySource
where
   N: Into<String>,
   T: Into<String>,
{
   fn from(files: [(N, T); LEN]) -> Self {
      files.into_iter().collect()
   }
}

impl ScriptSource for MemorySource {
   fn list(&self, dir: &str) -> io::Result<Vec<String>> {
      let prefix = format!("{}/", dir.trim_end_matches('/'));
      Ok(self
         .files
         .keys()
         .filter(|name| {
            name
               .strip_prefix(&prefix)
               .is_some_and(|rest| !rest.is_empty() && !rest.contains('/'))
         })
         .cloned()
         .collect())
   }

   fn read(&self, name: &str) -> io::Result<String> {
      self.files.get(name).cloned().ok_or_else(|| {
         io::Error::new(io::ErrorKind::NotFound, format!("no such script: {}", name))
      })
   }
}
