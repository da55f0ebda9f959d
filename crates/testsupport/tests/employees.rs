//! Example: query code tested against a database seeded from fixture files.

use anyhow::Result;
use database::DatabaseBuilder;
use pretty_assertions::assert_eq;
use rusqlite::Connection;
use std::{collections::HashMap, path::PathBuf};
use testsupport::prelude::*;

/// Data access code under test.
struct Storage<'a> {
    conn: &'a Connection,
}

impl<'a> Storage<'a> {
    fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Highest salary per employee, for employees who never reached `salary`.
    fn salaries_below(&self, salary: i64) -> rusqlite::Result<HashMap<i64, i64>> {
        let mut stmt = self.conn.prepare(
            "SELECT emp_no, max(salary) AS max_salary FROM salaries \
             GROUP BY emp_no HAVING max(salary) < ?1",
        )?;
        let rows = stmt.query_map([salary], |row| Ok((row.get(0)?, row.get(1)?)))?;
        rows.collect()
    }
}

fn testdata() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests").join("testdata")
}

fn build_company(dir: &std::path::Path) -> Result<Connection> {
    let data = testdata();
    let builder = DatabaseBuilder::new(dir);
    let conn = builder.build_database(
        "test1",
        [
            "schema.sql",
            "departments.sql",
            "employees.sql",
            "dept_emp.sql",
            "dept_manager.sql",
            "titles.sql",
            "salaries1.sql",
        ]
        .map(|file| data.join(file)),
    )?;
    Ok(conn)
}

#[test]
fn salaries_below_50000() -> Result<()> {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let conn = build_company(dir.path())?;

    let salaries = Storage::new(&conn).salaries_below(50_000)?;
    assert_eq!(salaries.len(), 10);
    assert_eq!(salaries.get(&10009), Some(&49_998));
    assert!(!salaries.contains_key(&10011));
    assert!(!salaries.contains_key(&10012));
    Ok(())
}

#[test]
fn salaries_below_threshold_excludes_everyone_at_or_above_it() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let conn = build_company(dir.path())?;
    let storage = Storage::new(&conn);

    assert!(storage.salaries_below(30_000)?.is_empty());
    assert_eq!(storage.salaries_below(49_998)?.len(), 9);
    assert_eq!(storage.salaries_below(100_000)?.len(), 12);
    Ok(())
}

#[test]
fn file_and_inline_fixtures_agree() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let from_files = build_company(dir.path())?;

    let ctx = SeedContext::new()?;
    let inline = ctx.build("inline", employees_sources())?;

    let query = "SELECT emp_no, salary FROM salaries ORDER BY emp_no, from_date";
    assert_eq!(query_batch(&from_files, query)?, query_batch(&inline, query)?);
    Ok(())
}

#[test]
fn managers_join_departments() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let conn = build_company(dir.path())?;

    let output = run_sql_script_with_connection(
        "SELECT d.dept_name, e.last_name FROM dept_manager m \
         JOIN departments d ON d.dept_no = m.dept_no \
         JOIN employees e ON e.emp_no = m.emp_no \
         WHERE m.dept_no = 'd004';",
        &conn,
    )?;
    assert!(output.contains("'Production'"));
    assert!(output.contains("'Facello'"));
    Ok(())
}
