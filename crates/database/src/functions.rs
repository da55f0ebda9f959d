//! Scalar functions and loadable extensions installed on seeded connections.

use rusqlite::{
    functions::{Context, FunctionFlags},
    types::Value,
    Connection, LoadExtensionGuard,
};
use std::{
    fmt,
    panic::AssertUnwindSafe,
    path::{Path, PathBuf},
    sync::Arc,
};
use tracing::debug;

type Implementation = dyn Fn(&Context<'_>) -> rusqlite::Result<Value> + Send + Sync + 'static;

/// A caller-supplied SQL scalar function.
///
/// `pure` functions are declared deterministic to the engine, which lets it
/// cache results and use them in indexes and constraints.
///
/// # Example
///
/// ```
/// use database::ScalarFunction;
///
/// let double = ScalarFunction::new("double", 1, true, |ctx| {
///     let n: i64 = ctx.get(0)?;
///     Ok(n * 2)
/// });
/// assert_eq!(double.name(), "double");
/// assert!(double.is_pure());
/// ```
#[derive(Clone)]
pub struct ScalarFunction {
    name: String,
    n_args: i32,
    pure: bool,
    implementation: Arc<Implementation>,
}

impl ScalarFunction {
    /// Wrap `f` as a function of `n_args` arguments (`-1` for any number).
    pub fn new<F, T>(name: impl Into<String>, n_args: i32, pure: bool, f: F) -> Self
    where
        F: Fn(&Context<'_>) -> rusqlite::Result<T> + Send + Sync + 'static,
        T: Into<Value>,
    {
        Self {
            name: name.into(),
            n_args,
            pure,
            implementation: Arc::new(move |ctx: &Context<'_>| f(ctx).map(Into::<Value>::into)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn n_args(&self) -> i32 {
        self.n_args
    }

    pub fn is_pure(&self) -> bool {
        self.pure
    }

    pub fn flags(&self) -> FunctionFlags {
        if self.pure {
            FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC
        } else {
            FunctionFlags::SQLITE_UTF8
        }
    }

    /// Register this function on `conn`.
    pub(crate) fn install(&self, conn: &Connection) -> rusqlite::Result<()> {
        let implementation = AssertUnwindSafe(Arc::clone(&self.implementation));
        conn.create_scalar_function(self.name.as_str(), self.n_args, self.flags(), move |ctx| {
            let implementation = &implementation;
            (*implementation.0)(ctx)
        })?;
        debug!(function = %self.name, n_args = self.n_args, pure = self.pure, "registered function");
        Ok(())
    }
}

impl fmt::Debug for ScalarFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScalarFunction")
            .field("name", &self.name)
            .field("n_args", &self.n_args)
            .field("pure", &self.pure)
            .finish_non_exhaustive()
    }
}

/// Everything applied to a connection right after it is opened.
#[derive(Clone, Debug, Default)]
pub(crate) struct Registrations {
    functions: Vec<ScalarFunction>,
    extensions: Vec<PathBuf>,
}

impl Registrations {
    /// Add `function`, replacing an earlier one with the same name.
    pub(crate) fn add_function(&mut self, function: ScalarFunction) {
        match self.functions.iter_mut().find(|f| f.name == function.name) {
            Some(existing) => *existing = function,
            None => self.functions.push(function),
        }
    }

    pub(crate) fn add_extension(&mut self, path: &Path) {
        if !self.extensions.iter().any(|p| p == path) {
            self.extensions.push(path.to_path_buf());
        }
    }

    pub(crate) fn function_names(&self) -> Vec<String> {
        self.functions.iter().map(|f| f.name.clone()).collect()
    }

    pub(crate) fn function_count(&self) -> usize {
        self.functions.len()
    }

    pub(crate) fn extension_count(&self) -> usize {
        self.extensions.len()
    }

    /// Load extensions, then register functions, on a fresh connection.
    pub(crate) fn apply(&self, conn: &Connection) -> rusqlite::Result<()> {
        if !self.extensions.is_empty() {
            // SAFETY: extension paths come from the code that configured the
            // builder; loading is switched back off when the guard drops.
            let _guard = unsafe { LoadExtensionGuard::new(conn)? };
            for path in &self.extensions {
                unsafe { conn.load_extension(path, None::<&str>)? };
                debug!(extension = %path.display(), "loaded extension");
            }
        }

        for function in &self.functions {
            function.install(conn)?;
        }
        Ok(())
    }
}
