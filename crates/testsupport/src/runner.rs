//! SQL script execution for snapshot testing.
//!
//! Splits a multi-statement script with the seeding tokenizer, runs each
//! statement, and captures pretty-printed output suitable for use with the
//! `insta` snapshot testing framework.

use common::{
    pretty::{self, RecordBatch, TableStyleKind},
    SeedError, SeedResult,
};
use rusqlite::{types::Value, Connection};

/// Execute a SQL script against a fresh in-memory database and return
/// pretty-printed output.
///
/// Queries render as tables, data changes as `N row(s) affected.`, other
/// statements as `OK.`. A failing statement is reported inline as
/// `Error: ...` and the script carries on with the next one.
///
/// # Example
///
/// ```
/// use testsupport::prelude::*;
///
/// let output = run_sql_script(r#"
///     CREATE TABLE users (id INTEGER, name TEXT, age INTEGER);
///     INSERT INTO users VALUES (1, 'Alice', 30);
///     INSERT INTO users VALUES (2, 'Bob', 25);
///     SELECT name FROM users WHERE age > 25;
/// "#).unwrap();
///
/// assert!(output.contains("'Alice'"));
/// assert!(!output.contains("'Bob'"));
/// ```
pub fn run_sql_script(sql: &str) -> SeedResult<String> {
    let conn = Connection::open_in_memory()?;
    run_sql_script_with_connection(sql, &conn)
}

/// Execute a SQL script against an existing connection, such as one returned
/// by a seeding build.
///
/// # Example
///
/// ```
/// use testsupport::prelude::*;
///
/// let ctx = SeedContext::new().unwrap();
/// let conn = ctx.build("company", employees_sources()).unwrap();
/// let output = run_sql_script_with_connection(
///     "SELECT dept_name FROM departments WHERE dept_no = 'd002';",
///     &conn,
/// ).unwrap();
/// assert!(output.contains("'Finance'"));
/// ```
pub fn run_sql_script_with_connection(sql: &str, conn: &Connection) -> SeedResult<String> {
    let mut output = String::new();
    let mut statements = parser::split_script(sql);

    for statement in statements.by_ref() {
        let rendered = match execute_statement(conn, statement) {
            Ok(text) => text,
            Err(e) => format!("Error: {}", e),
        };
        push_line(&mut output, &rendered);
    }

    let rest = statements.remainder().trim();
    if !parser::is_insignificant(rest.as_bytes()) {
        let e = SeedError::Unterminated(rest.to_string());
        push_line(&mut output, &format!("Error: {}", e));
    }

    Ok(output)
}

/// Run a single query and collect every row.
pub fn query_batch(conn: &Connection, sql: &str) -> SeedResult<RecordBatch> {
    let mut stmt = conn.prepare(sql)?;
    let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
    let width = columns.len();
    let rows = stmt
        .query_map([], |row| {
            (0..width)
                .map(|i| row.get::<_, Value>(i))
                .collect::<rusqlite::Result<Vec<_>>>()
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(RecordBatch { columns, rows })
}

fn execute_statement(conn: &Connection, sql: &str) -> SeedResult<String> {
    let mut stmt = conn.prepare(sql)?;
    if stmt.column_count() > 0 {
        drop(stmt);
        let batch = query_batch(conn, sql)?;
        return Ok(pretty::render_record_batch(&batch, TableStyleKind::Modern));
    }

    let affected = stmt.execute([])?;
    if changes_rows(sql) {
        Ok(format!("{} row(s) affected.", affected))
    } else {
        Ok("OK.".into())
    }
}

/// Returns true for statements whose change count is meaningful.
fn changes_rows(sql: &str) -> bool {
    let keyword = sql
        .split(|c: char| c.is_whitespace() || c == '(')
        .find(|word| !word.is_empty())
        .unwrap_or_default();
    ["INSERT", "UPDATE", "DELETE", "REPLACE"]
        .iter()
        .any(|k| keyword.eq_ignore_ascii_case(k))
}

fn push_line(output: &mut String, text: &str) {
    if !output.is_empty() {
        output.push('\n');
    }
    output.push_str(text);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn ddl_and_dml_report_status() {
        let output = run_sql_script(
            "CREATE TABLE t (id INTEGER);\n\
             INSERT INTO t VALUES (1);\n\
             INSERT INTO t SELECT id + 1 FROM t;\n\
             UPDATE t SET id = id * 10;\n",
        )
        .unwrap();
        assert_eq!(
            output,
            "OK.\n1 row(s) affected.\n1 row(s) affected.\n2 row(s) affected."
        );
    }

    #[test]
    fn errors_are_inline_and_execution_continues() {
        let output = run_sql_script(
            "CREATE TABLE t (id INTEGER);\nINSERT INTO nope VALUES (1);\nDELETE FROM t;",
        )
        .unwrap();
        let lines: Vec<_> = output.lines().collect();
        assert_eq!(lines[0], "OK.");
        assert!(lines[1].starts_with("Error: "));
        assert!(lines[1].contains("nope"));
        assert_eq!(lines[2], "0 row(s) affected.");
    }

    #[test]
    fn trailing_text_is_reported() {
        let output = run_sql_script("CREATE TABLE t (id INTEGER);\nINSERT INTO t VALUES (1)").unwrap();
        assert_eq!(
            output,
            "OK.\nError: unterminated statement at end of input: INSERT INTO t VALUES (1)"
        );
    }

    #[test]
    fn trailing_comment_is_not_reported() {
        let output = run_sql_script("CREATE TABLE t (id INTEGER);\n-- done").unwrap();
        assert_eq!(output, "OK.");
    }

    #[test]
    fn query_batch_collects_typed_values() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE t (i INTEGER, r REAL, s TEXT, b BLOB, n TEXT);\
             INSERT INTO t VALUES (1, 2.5, 'x', x'ff', NULL);",
        )
        .unwrap();

        let batch = query_batch(&conn, "SELECT * FROM t").unwrap();
        assert_eq!(batch.columns, vec!["i", "r", "s", "b", "n"]);
        assert_eq!(
            batch.rows,
            vec![vec![
                Value::Integer(1),
                Value::Real(2.5),
                Value::Text("x".into()),
                Value::Blob(vec![0xff]),
                Value::Null,
            ]]
        );
    }

    #[test]
    fn keyword_detection() {
        assert!(changes_rows("insert into t values (1);"));
        assert!(changes_rows("  DELETE FROM t;"));
        assert!(!changes_rows("CREATE TABLE t (id INTEGER);"));
        assert!(!changes_rows("PRAGMA foreign_keys = ON;"));
    }
}
