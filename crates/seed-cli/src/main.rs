//! Command-line front end for building seeded fixture databases.
//!
//! `seeddb NAME SOURCES...` recreates `{dir}/{NAME}.db` and runs every
//! statement of every source file against it, in order.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use common::{
    SeedConfig, SourcePolicy, TrailingInput,
    pretty::{self, TableStyleKind},
};
use database::DatabaseBuilder;
use rusqlite::Connection;
use serde::Serialize;
use std::{fs, path::PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run(Args::parse()) {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let config = load_config(&args)?;
    let builder = DatabaseBuilder::with_config(config);
    info!(builder = %builder.id(), name = %args.name, sources = args.sources.len(), "building");

    let conn = builder
        .build_database(&args.name, &args.sources)
        .with_context(|| format!("failed to build database '{}'", args.name))?;
    println!("{}", builder.database_path(&args.name).display());

    if args.summary {
        let counts = table_counts(&conn).context("failed to summarize database")?;
        match args.format {
            OutputFormat::Table => {
                println!("{}", render_counts(&counts, args.style.into()));
            }
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&counts)?);
            }
        }
    }

    Ok(())
}

#[derive(Parser, Debug)]
#[command(name = "seeddb")]
#[command(about = "Build a SQLite fixture database from SQL scripts", long_about = None)]
struct Args {
    /// Database name; the file is created as `{dir}/{name}.db`
    name: String,
    /// SQL script files, run in order
    #[arg(required = true)]
    sources: Vec<PathBuf>,
    /// Directory the database is created in
    #[arg(short, long)]
    dir: Option<PathBuf>,
    /// JSON file holding seeding configuration; flags override it
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Fail when any source cannot be opened
    #[arg(long)]
    fail_fast: bool,
    /// Fail on text after the last statement delimiter
    #[arg(long)]
    reject_trailing: bool,
    /// Largest statement the scanner accepts, in bytes
    #[arg(long)]
    max_statement_bytes: Option<usize>,
    /// Print per-table row counts after building
    #[arg(long)]
    summary: bool,
    /// Output format for the summary (table or json)
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,
    /// Style used for table rendering
    #[arg(long, value_enum, default_value_t = CliTableStyle::Modern)]
    style: CliTableStyle,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum CliTableStyle {
    Modern,
    Ascii,
    Plain,
}

impl From<CliTableStyle> for TableStyleKind {
    fn from(value: CliTableStyle) -> Self {
        match value {
            CliTableStyle::Modern => TableStyleKind::Modern,
            CliTableStyle::Ascii => TableStyleKind::Ascii,
            CliTableStyle::Plain => TableStyleKind::Plain,
        }
    }
}

/// Configuration from `--config` (or defaults), with flags applied on top.
fn load_config(args: &Args) -> Result<SeedConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read config at {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("invalid config at {}", path.display()))?
        }
        None => SeedConfig::default(),
    };

    if let Some(dir) = &args.dir {
        config.testdir = dir.clone();
    }
    if args.fail_fast {
        config.source_policy = SourcePolicy::FailFast;
    }
    if args.reject_trailing {
        config.trailing_input = TrailingInput::Reject;
    }
    if let Some(limit) = args.max_statement_bytes {
        config.max_statement_bytes = limit;
    }
    Ok(config)
}

#[derive(Debug, PartialEq, Eq, Serialize)]
struct TableCount {
    table: String,
    rows: i64,
}

fn table_counts(conn: &Connection) -> rusqlite::Result<Vec<TableCount>> {
    let mut stmt = conn.prepare(
        "SELECT name FROM sqlite_master \
         WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
    )?;
    let tables = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    tables
        .into_iter()
        .map(|table| {
            let rows = conn.query_row(
                &format!("SELECT count(*) FROM \"{}\"", table.replace('"', "\"\"")),
                [],
                |row| row.get(0),
            )?;
            Ok(TableCount { table, rows })
        })
        .collect()
}

fn render_counts(counts: &[TableCount], style: TableStyleKind) -> String {
    let rows = counts
        .iter()
        .map(|c| vec![c.table.clone(), c.rows.to_string()])
        .collect();
    pretty::render_string_table(&["Table", "Rows"], rows, style)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("seeddb").chain(argv.iter().copied())).unwrap()
    }

    #[test]
    fn sources_are_required() {
        assert!(Args::try_parse_from(["seeddb", "test1"]).is_err());
    }

    #[test]
    fn defaults_without_flags() {
        let config = load_config(&parse(&["test1", "schema.sql"])).unwrap();
        assert_eq!(config.testdir, PathBuf::from("testdata"));
        assert_eq!(config.source_policy, SourcePolicy::BestEffort);
        assert_eq!(config.trailing_input, TrailingInput::Ignore);
    }

    #[test]
    fn flags_override_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("seed.json");
        fs::write(&file, r#"{"testdir": "from_file", "max_statement_bytes": 128}"#).unwrap();

        let args = parse(&[
            "--config",
            file.to_str().unwrap(),
            "--fail-fast",
            "--reject-trailing",
            "--dir",
            "from_flag",
            "test1",
            "a.sql",
            "b.sql",
        ]);
        let config = load_config(&args).unwrap();

        assert_eq!(args.sources.len(), 2);
        assert_eq!(config.testdir, PathBuf::from("from_flag"));
        assert_eq!(config.max_statement_bytes, 128);
        assert_eq!(config.source_policy, SourcePolicy::FailFast);
        assert_eq!(config.trailing_input, TrailingInput::Reject);
    }

    #[test]
    fn invalid_config_is_reported_with_path() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("broken.json");
        fs::write(&file, "{ not json").unwrap();

        let err = load_config(&parse(&["-c", file.to_str().unwrap(), "t", "a.sql"])).unwrap_err();
        assert!(format!("{err:#}").contains("broken.json"));
    }

    #[test]
    fn run_builds_database_and_counts_rows() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("seed.sql");
        fs::write(
            &script,
            "CREATE TABLE b (id INTEGER);\nCREATE TABLE a (id INTEGER);\nINSERT INTO a VALUES (1);\nINSERT INTO a VALUES (2);\n",
        )
        .unwrap();

        let args = parse(&[
            "--dir",
            dir.path().to_str().unwrap(),
            "--summary",
            "--format",
            "json",
            "fixture",
            script.to_str().unwrap(),
        ]);
        run(args).unwrap();

        let conn = Connection::open(dir.path().join("fixture.db")).unwrap();
        assert_eq!(
            table_counts(&conn).unwrap(),
            vec![
                TableCount { table: "a".into(), rows: 2 },
                TableCount { table: "b".into(), rows: 0 },
            ]
        );
    }

    #[test]
    fn counts_render_as_table() {
        let counts = vec![TableCount { table: "users".into(), rows: 3 }];
        let rendered = render_counts(&counts, TableStyleKind::Ascii);
        assert!(rendered.contains("users"));
        assert!(rendered.contains("Rows"));
    }
}
