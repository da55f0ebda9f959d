//! Test support utilities for seeding fixture databases.
//!
//! This crate provides:
//! - Isolated seeding contexts backed by a temporary directory
//! - The employees fixture dataset as SQL scripts
//! - SQL script execution with pretty-printed output for snapshot testing
//! - Property-based generators for SQL scripts with known statements
//! - Assertion helpers for seeded databases
//!
//! # Example Usage
//!
//! ```no_run
//! use testsupport::prelude::*;
//!
//! #[test]
//! fn departments_are_seeded() {
//!     let ctx = SeedContext::new().unwrap();
//!     let conn = ctx.build("company", employees_sources()).unwrap();
//!     assert_row_count(&conn, "departments", 4);
//! }
//! ```

pub mod assertions;
pub mod context;
pub mod fixtures;
pub mod logging;
pub mod macros;
pub mod proptest_generators;
pub mod runner;

pub use database::ScriptSource;

/// Convenient re-exports for common testing patterns.
pub mod prelude {
    pub use crate::assertions::*;
    pub use crate::context::*;
    pub use crate::fixtures::*;
    pub use crate::logging::init_tracing;
    pub use crate::runner::*;
    pub use crate::ScriptSource;
}
