//! Common fixture scripts.
//!
//! The employees dataset is a cut-down version of the well-known MySQL
//! sample database: four departments, twelve employees and two salary
//! periods each. Ten employees never earn 50000 or more.

use crate::context::SeedContext;
use common::SeedResult;
use database::ScriptSource;
use std::path::PathBuf;

pub const SCHEMA_SQL: &str = include_str!("../tests/testdata/schema.sql");
pub const DEPARTMENTS_SQL: &str = include_str!("../tests/testdata/departments.sql");
pub const EMPLOYEES_SQL: &str = include_str!("../tests/testdata/employees.sql");
pub const DEPT_EMP_SQL: &str = include_str!("../tests/testdata/dept_emp.sql");
pub const DEPT_MANAGER_SQL: &str = include_str!("../tests/testdata/dept_manager.sql");
pub const TITLES_SQL: &str = include_str!("../tests/testdata/titles.sql");
pub const SALARIES_SQL: &str = include_str!("../tests/testdata/salaries1.sql");

/// File names and contents of the employees dataset, in load order.
pub const EMPLOYEES_SCRIPTS: [(&str, &str); 7] = [
    ("schema.sql", SCHEMA_SQL),
    ("departments.sql", DEPARTMENTS_SQL),
    ("employees.sql", EMPLOYEES_SQL),
    ("dept_emp.sql", DEPT_EMP_SQL),
    ("dept_manager.sql", DEPT_MANAGER_SQL),
    ("titles.sql", TITLES_SQL),
    ("salaries1.sql", SALARIES_SQL),
];

/// Expected row counts per table once the dataset is loaded.
pub const EMPLOYEES_ROW_COUNTS: [(&str, i64); 6] = [
    ("departments", 4),
    ("employees", 12),
    ("dept_emp", 12),
    ("dept_manager", 4),
    ("titles", 12),
    ("salaries", 24),
];

/// The employees dataset as in-memory sources.
///
/// # Example
///
/// ```
/// use testsupport::prelude::*;
///
/// let ctx = SeedContext::new().unwrap();
/// let conn = ctx.build("company", employees_sources()).unwrap();
/// assert_row_count(&conn, "employees", 12);
/// ```
pub fn employees_sources() -> Vec<ScriptSource> {
    EMPLOYEES_SCRIPTS
        .iter()
        .map(|(name, sql)| ScriptSource::inline(*name, *sql))
        .collect()
}

/// Write the employees dataset into the context directory and return the
/// file paths in load order.
pub fn write_employees_scripts(ctx: &SeedContext) -> SeedResult<Vec<PathBuf>> {
    EMPLOYEES_SCRIPTS
        .iter()
        .map(|(name, sql)| ctx.write_script(name, sql))
        .collect()
}

/// A single-table schema for small tests.
pub fn users_schema() -> ScriptSource {
    ScriptSource::inline(
        "users_schema",
        "CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT NOT NULL, age INTEGER);",
    )
}

/// `INSERT` statements for `users`, one per `(name, age)` pair, ids from 1.
///
/// ```
/// let sql = testsupport::fixtures::users_rows(&[("Alice", 30), ("Bob", 25)]);
/// assert_eq!(
///     sql,
///     "INSERT INTO users VALUES (1, 'Alice', 30);\nINSERT INTO users VALUES (2, 'Bob', 25);\n"
/// );
/// ```
pub fn users_rows(users: &[(&str, i64)]) -> String {
    users
        .iter()
        .enumerate()
        .map(|(i, (name, age))| {
            format!(
                "INSERT INTO users VALUES ({}, '{}', {});\n",
                i + 1,
                name.replace('\'', "''"),
                age
            )
        })
        .collect()
}
