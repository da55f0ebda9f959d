//! Test setup macros for reducing seeding boilerplate.

/// Creates a [`SeedContext`](crate::context::SeedContext) and a seeded
/// connection in one line.
///
/// # Syntax
///
/// ```text
/// seed_db!(ctx, conn, sql: "CREATE TABLE ...;")
/// seed_db!(ctx, conn, "name", [source1, source2, ...])
/// seed_db!(ctx, conn, employees)
/// ```
///
/// Sources may be anything convertible into a `ScriptSource`: paths are
/// read as files.
///
/// # Examples
///
/// ```
/// use testsupport::{seed_db, prelude::*};
///
/// seed_db!(ctx, conn, sql: "CREATE TABLE t (id INTEGER); INSERT INTO t VALUES (7);");
/// assert_row_count(&conn, "t", 1);
/// assert!(ctx.database_path("test").exists());
/// ```
///
/// ```
/// use testsupport::{seed_db, prelude::*};
///
/// seed_db!(ctx, conn, "users", [users_schema(), ScriptSource::inline("rows", users_rows(&[("Ada", 36)]))]);
/// assert_row_count(&conn, "users", 1);
/// ```
#[macro_export]
macro_rules! seed_db {
    ($ctx:ident, $conn:ident, sql: $sql:expr) => {
        let $ctx = $crate::context::SeedContext::new().unwrap();
        let $conn = $ctx
            .build("test", [$crate::ScriptSource::inline("test", $sql)])
            .unwrap();
    };

    ($ctx:ident, $conn:ident, employees) => {
        let $ctx = $crate::context::SeedContext::new().unwrap();
        let $conn = $ctx
            .build("employees", $crate::fixtures::employees_sources())
            .unwrap();
    };

    ($ctx:ident, $conn:ident, $name:expr, [$($source:expr),+ $(,)?]) => {
        let $ctx = $crate::context::SeedContext::new().unwrap();
        let $conn = $ctx
            .build($name, [$($crate::ScriptSource::from($source)),+])
            .unwrap();
    };
}
