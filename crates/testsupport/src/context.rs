//! Isolated seeding environments.
//!
//! A [`SeedContext`] pairs a temporary directory with a [`DatabaseBuilder`]
//! rooted in it. Scripts written through the context and databases built by
//! it disappear when the context is dropped.

use common::{SeedConfig, SeedResult};
use database::{DatabaseBuilder, ScriptSource};
use rusqlite::Connection;
use std::{
    fs,
    path::{Path, PathBuf},
};
use tempfile::TempDir;

/// A temporary directory plus a builder that creates databases inside it.
///
/// # Example
///
/// ```
/// use testsupport::prelude::*;
///
/// let ctx = SeedContext::new().unwrap();
/// let schema = ctx.write_script("schema.sql", "CREATE TABLE t (id INTEGER);").unwrap();
/// let conn = ctx.build("demo", [schema]).unwrap();
/// assert_table_exists(&conn, "t");
/// ```
pub struct SeedContext {
    dir: TempDir,
    builder: DatabaseBuilder,
}

impl SeedContext {
    /// Create a context with default seeding policies.
    pub fn new() -> SeedResult<Self> {
        let dir = tempfile::tempdir()?;
        let builder = DatabaseBuilder::new(dir.path());
        Ok(Self { dir, builder })
    }

    /// Create a context using `config` for everything except the directory,
    /// which always points at the context's temporary directory.
    pub fn with_config(config: SeedConfig) -> SeedResult<Self> {
        let dir = tempfile::tempdir()?;
        let config = SeedConfig {
            testdir: dir.path().to_path_buf(),
            ..config
        };
        Ok(Self {
            dir,
            builder: DatabaseBuilder::with_config(config),
        })
    }

    pub fn builder(&self) -> &DatabaseBuilder {
        &self.builder
    }

    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    /// Write `sql` to `file_name` inside the context directory.
    pub fn write_script(&self, file_name: &str, sql: &str) -> SeedResult<PathBuf> {
        let path = self.dir.path().join(file_name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, sql)?;
        Ok(path)
    }

    /// Build the database `name` from `sources`.
    pub fn build<I, S>(&self, name: &str, sources: I) -> SeedResult<Connection>
    where
        I: IntoIterator<Item = S>,
        S: Into<ScriptSource>,
    {
        self.builder.build_database(name, sources)
    }

    pub fn database_path(&self, name: &str) -> PathBuf {
        self.builder.database_path(name)
    }
}
