//! Custom assertion helpers for testing.
//!
//! Provides assertion functions for common seeded-database checks.

use common::{SeedError, SeedResult};
use rusqlite::Connection;
use std::path::Path;

/// Assert that `table` holds exactly `expected` rows.
///
/// # Example
///
/// ```
/// use rusqlite::Connection;
/// use testsupport::prelude::*;
///
/// let conn = Connection::open_in_memory().unwrap();
/// conn.execute_batch("CREATE TABLE t (id INTEGER); INSERT INTO t VALUES (1);").unwrap();
/// assert_row_count(&conn, "t", 1);
/// ```
pub fn assert_row_count(conn: &Connection, table: &str, expected: i64) {
    let actual: i64 = conn
        .query_row(&format!("SELECT count(*) FROM \"{table}\""), [], |row| row.get(0))
        .unwrap_or_else(|e| panic!("counting rows of '{table}' failed: {e}"));
    assert_eq!(
        actual, expected,
        "Row count mismatch for '{}': expected {}, got {}",
        table, expected, actual
    );
}

/// Assert that a table named `table` exists.
pub fn assert_table_exists(conn: &Connection, table: &str) {
    let found: i64 = conn
        .query_row(
            "SELECT count(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
            [table],
            |row| row.get(0),
        )
        .expect("sqlite_master query failed");
    assert!(found > 0, "Expected table '{}' to exist", table);
}

/// Assert that no database file exists at `path`.
pub fn assert_database_absent(path: &Path) {
    assert!(
        !path.exists(),
        "Expected no database at {}, but the file exists",
        path.display()
    );
}

/// Assert that an operation returns an error containing a specific substring.
///
/// # Example
///
/// ```
/// use testsupport::prelude::*;
///
/// let result: Result<(), common::SeedError> =
///     Err(common::SeedError::Unterminated("INSERT INTO t".into()));
/// assert_error_contains(result, "unterminated");
/// ```
pub fn assert_error_contains<T>(result: SeedResult<T>, expected_msg: &str) {
    match result {
        Ok(_) => panic!("Expected error containing '{}', but got Ok", expected_msg),
        Err(e) => {
            let error_msg = e.to_string();
            assert!(
                error_msg.contains(expected_msg),
                "Expected error containing '{}', but got: {}",
                expected_msg,
                error_msg
            );
        }
    }
}

/// Assert that a build failed while executing statement `index` of a source
/// whose name contains `origin`, and return the failing statement text.
pub fn assert_execution_error<T>(result: SeedResult<T>, origin: &str, index: usize) -> String {
    match result {
        Err(SeedError::Execution {
            origin: actual_origin,
            index: actual_index,
            statement,
            ..
        }) => {
            assert!(
                actual_origin.contains(origin),
                "Expected failure in '{}', but it was in '{}'",
                origin,
                actual_origin
            );
            assert_eq!(
                actual_index, index,
                "Expected statement {} to fail, but statement {} did",
                index, actual_index
            );
            statement
        }
        Err(other) => panic!("Expected execution error, got: {other}"),
        Ok(_) => panic!("Expected execution error, but got Ok"),
    }
}
