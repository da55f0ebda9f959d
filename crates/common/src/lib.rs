
pub mod pretty;

use serde::{Deserialize, Serialize};
use std::{
    io,
    path::{Path, PathBuf},
    str::Utf8Error,
};
use thiserror::Error;

/// File extension given to every seeded database.
pub const DATABASE_EXTENSION: &str = "db";

/// Largest statement the incremental scanner buffers before giving up.
pub const DEFAULT_MAX_STATEMENT_BYTES: usize = 64 * 1024;

/// What the seeder does when a script file cannot be opened.
///
/// Examples:
/// - `SourcePolicy::BestEffort` keeps whatever was seeded before the missing file.
/// - `SourcePolicy::FailFast` removes the database and reports the missing file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourcePolicy {
    /// An unopenable first source is an error; a later one is logged and ends
    /// the source list.
    #[default]
    BestEffort,
    /// Any unopenable source is an error.
    FailFast,
}

/// What the scanner does with non-comment text left after the last delimiter.
///
/// Examples:
/// - `"SELECT 1;\nSELECT 2"` drops `SELECT 2` under `Ignore`.
/// - `"SELECT 1;\nSELECT 2"` fails with `SeedError::Unterminated` under `Reject`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrailingInput {
    #[default]
    Ignore,
    Reject,
}

/// Canonical error type shared across the seeding crates.
#[derive(Error, Debug)]
pub enum SeedError {
    #[error("cannot open source {}: {source}", .path.display())]
    SourceOpen {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("exec: statement {index} of {origin}: {source}")]
    Execution {
        origin: String,
        index: usize,
        statement: String,
        #[source]
        source: rusqlite::Error,
    },
    #[error("unterminated statement at end of input: {0}")]
    Unterminated(String),
    #[error("statement exceeds the {limit} byte scan buffer")]
    TooLong { limit: usize },
    #[error("script is not valid UTF-8: {0}")]
    Utf8(#[from] Utf8Error),
    #[error("engine: {0}")]
    Engine(#[from] rusqlite::Error),
    #[error("lock poisoned: {0}")]
    Poisoned(&'static str),
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl SeedError {
    /// Returns true if a statement was rejected by the engine.
    pub fn is_execution(&self) -> bool {
        matches!(self, SeedError::Execution { .. })
    }

    /// Returns the statement text that failed, if this is an execution error.
    pub fn statement(&self) -> Option<&str> {
        match self {
            SeedError::Execution { statement, .. } => Some(statement),
            _ => None,
        }
    }
}

/// Result alias that carries a `SeedError`.
pub type SeedResult<T> = Result<T, SeedError>;

/// Runtime configuration for seeding fixture databases.
///
/// # Example
/// ```
/// use common::{SeedConfig, SourcePolicy, TrailingInput};
///
/// let config = SeedConfig::builder()
///     .testdir("target/fixtures")
///     .source_policy(SourcePolicy::FailFast)
///     .trailing_input(TrailingInput::Reject)
///     .build();
/// assert!(config.database_path("users").ends_with("users.db"));
/// ```
#[derive(Clone, Debug, Serialize, Deserialize, bon::Builder)]
#[serde(default)]
pub struct SeedConfig {
    /// Directory where `{name}.db` files are created.
    #[builder(into, default = PathBuf::from("testdata"))]
    pub testdir: PathBuf,
    #[builder(default)]
    pub source_policy: SourcePolicy,
    #[builder(default)]
    pub trailing_input: TrailingInput,
    /// Upper bound on the scanner buffer; one statement must fit in it.
    #[builder(default = DEFAULT_MAX_STATEMENT_BYTES)]
    pub max_statement_bytes: usize,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            testdir: PathBuf::from("testdata"),
            source_policy: SourcePolicy::default(),
            trailing_input: TrailingInput::default(),
            max_statement_bytes: DEFAULT_MAX_STATEMENT_BYTES,
        }
    }
}

impl SeedConfig {
    /// Configuration rooted at `testdir` with every other field defaulted.
    pub fn in_dir(testdir: impl AsRef<Path>) -> Self {
        Self {
            testdir: testdir.as_ref().to_path_buf(),
            ..Self::default()
        }
    }

    /// Deterministic location of the database named `name`.
    pub fn database_path(&self, name: &str) -> PathBuf {
        self.testdir.join(format!("{name}.{DATABASE_EXTENSION}"))
    }
}

/// Convenient re-exports for downstream crates.
pub mod prelude {
    pub use crate::{
        SeedConfig, SeedError, SeedResult, SourcePolicy, TrailingInput,
        pretty::{RecordBatch, TableStyleKind},
    };
}
