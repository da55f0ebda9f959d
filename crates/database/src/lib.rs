//! Builds disposable SQLite databases from SQL fixture scripts.
//!
//! A [`DatabaseBuilder`] owns a base directory. Each call to
//! [`DatabaseBuilder::build_database`] recreates `{testdir}/{name}.db`, runs
//! every statement of every source in order, and hands back the open
//! connection. A failing statement leaves no database file behind.

mod functions;

pub use functions::ScalarFunction;

use common::{SeedConfig, SeedError, SeedResult, SourcePolicy};
use functions::Registrations;
use parser::StatementScanner;
use rusqlite::Connection;
use std::{
    fmt, fs,
    fs::File,
    io::{self, BufReader, Read},
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Where a fixture script comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ScriptSource {
    /// A script file on disk.
    File(PathBuf),
    /// Script text held in memory; `label` names it in logs and errors.
    Inline { label: String, sql: String },
}

impl ScriptSource {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        ScriptSource::File(path.into())
    }

    pub fn inline(label: impl Into<String>, sql: impl Into<String>) -> Self {
        ScriptSource::Inline {
            label: label.into(),
            sql: sql.into(),
        }
    }
}

impl fmt::Display for ScriptSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScriptSource::File(path) => write!(f, "{}", path.display()),
            ScriptSource::Inline { label, .. } => write!(f, "<{label}>"),
        }
    }
}

impl From<&str> for ScriptSource {
    fn from(path: &str) -> Self {
        ScriptSource::File(PathBuf::from(path))
    }
}

impl From<String> for ScriptSource {
    fn from(path: String) -> Self {
        ScriptSource::File(PathBuf::from(path))
    }
}

impl From<&Path> for ScriptSource {
    fn from(path: &Path) -> Self {
        ScriptSource::File(path.to_path_buf())
    }
}

impl From<PathBuf> for ScriptSource {
    fn from(path: PathBuf) -> Self {
        ScriptSource::File(path)
    }
}

impl From<&PathBuf> for ScriptSource {
    fn from(path: &PathBuf) -> Self {
        ScriptSource::File(path.clone())
    }
}

/// Creates seeded fixture databases under one directory.
///
/// Functions and extensions registered on the builder are captured the first
/// time a database is built; registrations made after that are ignored. The
/// builder can be shared between threads.
///
/// # Example
///
/// ```no_run
/// use database::{DatabaseBuilder, ScalarFunction};
///
/// let builder = DatabaseBuilder::new("testdata");
/// builder.register_fn(ScalarFunction::new("double", 1, true, |ctx| {
///     Ok(ctx.get::<i64>(0)? * 2)
/// }));
///
/// let conn = builder
///     .build_database("test1", ["testdata/schema.sql", "testdata/employees.sql"])
///     .unwrap();
/// let n: i64 = conn.query_row("SELECT count(*) FROM employees", [], |r| r.get(0)).unwrap();
/// # let _ = n;
/// ```
pub struct DatabaseBuilder {
    id: Uuid,
    config: SeedConfig,
    pending: Mutex<Registrations>,
    installed: Mutex<Option<Arc<Registrations>>>,
}

impl DatabaseBuilder {
    /// Builder rooted at `testdir` with the default policies.
    pub fn new(testdir: impl AsRef<Path>) -> Self {
        Self::with_config(SeedConfig::in_dir(testdir))
    }

    pub fn with_config(config: SeedConfig) -> Self {
        Self {
            id: Uuid::new_v4(),
            config,
            pending: Mutex::new(Registrations::default()),
            installed: Mutex::new(None),
        }
    }

    /// Unique id of this builder, attached to its log events.
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn config(&self) -> &SeedConfig {
        &self.config
    }

    /// Location of the database `name` would be built at.
    pub fn database_path(&self, name: &str) -> PathBuf {
        self.config.database_path(name)
    }

    /// Add a scalar function to every database this builder creates.
    ///
    /// Must be called before the first `build_database`; later calls are
    /// ignored.
    pub fn register_fn(&self, function: ScalarFunction) {
        let name = function.name().to_string();
        let accepted = self.with_pending(|pending| pending.add_function(function));
        if !accepted {
            debug!(builder = %self.id, function = %name, "ignoring late function registration");
        }
    }

    /// Load the SQLite extension at `path` into every database this builder
    /// creates. Same timing rules as [`DatabaseBuilder::register_fn`].
    pub fn register_extension(&self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        if !self.with_pending(|pending| pending.add_extension(path)) {
            debug!(builder = %self.id, extension = %path.display(), "ignoring late extension registration");
        }
    }

    /// Run `f` on the pending registrations unless the latch has closed.
    ///
    /// The latch lock is held across the update, in the same order
    /// `registrations` takes both locks, so a registration either lands
    /// before the snapshot or is reported as late.
    fn with_pending(&self, f: impl FnOnce(&mut Registrations)) -> bool {
        let Ok(installed) = self.installed.lock() else {
            warn!(builder = %self.id, "engine latch poisoned");
            return false;
        };
        if installed.is_some() {
            return false;
        }
        match self.pending.lock() {
            Ok(mut pending) => {
                f(&mut pending);
                true
            }
            Err(_) => {
                warn!(builder = %self.id, "registration lock poisoned");
                false
            }
        }
    }

    /// Returns true once the first database has been built.
    pub fn is_initialized(&self) -> bool {
        self.installed
            .lock()
            .map(|installed| installed.is_some())
            .unwrap_or(true)
    }

    /// Names of the functions applied to new connections; empty until the
    /// first build.
    pub fn installed_functions(&self) -> Vec<String> {
        match self.installed.lock() {
            Ok(installed) => installed
                .as_ref()
                .map(|regs| regs.function_names())
                .unwrap_or_default(),
            Err(_) => Vec::new(),
        }
    }

    /// Recreate `{testdir}/{name}.db` and run every source against it, in order.
    ///
    /// Returns the open connection; the caller owns it. On any error the
    /// connection is closed and the database file removed, except that under
    /// [`SourcePolicy::BestEffort`] an unopenable source after the first one
    /// only ends the source list.
    pub fn build_database<I, S>(&self, name: &str, sources: I) -> SeedResult<Connection>
    where
        I: IntoIterator<Item = S>,
        S: Into<ScriptSource>,
    {
        let path = self.database_path(name);
        fs::create_dir_all(&self.config.testdir)?;
        remove_database(&path)?;

        let registrations = self.registrations()?;
        let conn = Connection::open(&path)?;
        if let Err(err) = registrations.apply(&conn) {
            discard(conn, &path);
            return Err(err.into());
        }

        let sources: Vec<ScriptSource> = sources.into_iter().map(Into::into).collect();
        match self.seed(&conn, &sources) {
            Ok(statements) => {
                info!(
                    builder = %self.id,
                    database = %path.display(),
                    sources = sources.len(),
                    statements,
                    "database ready"
                );
                Ok(conn)
            }
            Err(err) => {
                warn!(builder = %self.id, database = %path.display(), error = %err, "seeding failed");
                discard(conn, &path);
                Err(err)
            }
        }
    }

    /// Capture the pending registrations exactly once.
    fn registrations(&self) -> SeedResult<Arc<Registrations>> {
        let mut installed = self
            .installed
            .lock()
            .map_err(|_| SeedError::Poisoned("engine latch"))?;
        if let Some(registrations) = installed.as_ref() {
            return Ok(Arc::clone(registrations));
        }

        let pending = self
            .pending
            .lock()
            .map_err(|_| SeedError::Poisoned("pending registrations"))?;
        let registrations = Arc::new(pending.clone());
        info!(
            builder = %self.id,
            functions = registrations.function_count(),
            extensions = registrations.extension_count(),
            "engine initialized"
        );
        *installed = Some(Arc::clone(&registrations));
        Ok(registrations)
    }

    /// Run every source in order, returning the number of statements executed.
    fn seed(&self, conn: &Connection, sources: &[ScriptSource]) -> SeedResult<usize> {
        let mut executed = 0;
        for (file_index, source) in sources.iter().enumerate() {
            let reader: Box<dyn Read + '_> = match source {
                ScriptSource::File(path) => match File::open(path) {
                    Ok(file) => Box::new(BufReader::new(file)),
                    Err(err) => {
                        if file_index > 0 && self.config.source_policy == SourcePolicy::BestEffort {
                            warn!(
                                source = %path.display(),
                                error = %err,
                                skipped = sources.len() - file_index,
                                "cannot open source, skipping the rest"
                            );
                            break;
                        }
                        return Err(SeedError::SourceOpen {
                            path: path.clone(),
                            source: err,
                        });
                    }
                },
                ScriptSource::Inline { sql, .. } => Box::new(sql.as_bytes()),
            };

            info!(source = %source, "reading");
            executed += self.run_script(conn, source, reader)?;
        }
        Ok(executed)
    }

    fn run_script(&self, conn: &Connection, source: &ScriptSource, reader: impl Read) -> SeedResult<usize> {
        let mut count = 0;
        for statement in StatementScanner::with_config(reader, &self.config) {
            let statement = statement?;
            count += 1;
            debug!(source = %source, index = count, "executing statement");
            if let Err(err) = conn.execute_batch(&statement) {
                return Err(SeedError::Execution {
                    origin: source.to_string(),
                    index: count,
                    statement,
                    source: err,
                });
            }
        }
        Ok(count)
    }
}

impl fmt::Debug for DatabaseBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseBuilder")
            .field("id", &self.id)
            .field("config", &self.config)
            .field("initialized", &self.is_initialized())
            .finish()
    }
}

/// Remove a database file left over from an earlier run.
fn remove_database(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Ok(()) => {
            debug!(database = %path.display(), "removed stale database");
            Ok(())
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err),
    }
}

/// Close `conn` and delete its backing file after a failed build.
fn discard(conn: Connection, path: &Path) {
    if let Err((_conn, err)) = conn.close() {
        warn!(database = %path.display(), error = %err, "closing failed database");
    }
    if let Err(err) = remove_database(path) {
        warn!(database = %path.display(), error = %err, "removing failed database");
    }
}
