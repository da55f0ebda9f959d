//! Property-based test generators using proptest.
//!
//! Strategies produce SQL scripts together with the statements a correct
//! tokenizer must recover from them.

use proptest::prelude::*;

/// Runs of spaces, tabs and line breaks, possibly empty.
pub fn arb_whitespace() -> impl Strategy<Value = String> {
    "[ \t\r\n]{0,4}"
}

/// A `--` line comment including its terminating newline. The body may
/// contain delimiters, which must be ignored.
pub fn arb_comment() -> impl Strategy<Value = String> {
    "[ A-Za-z0-9;'-]{0,20}".prop_map(|body| format!("--{body}\n"))
}

/// Insignificant text: whitespace and comments in any mix.
pub fn arb_separator() -> impl Strategy<Value = String> {
    prop::collection::vec(prop_oneof![arb_whitespace(), arb_comment()], 0..4)
        .prop_map(|parts| parts.concat())
}

/// A single statement, delimiter included. It never starts with whitespace
/// or a dash and holds exactly one `;`.
///
/// # Example
///
/// ```
/// use proptest::prelude::*;
/// use testsupport::proptest_generators::arb_statement;
///
/// proptest! {
///     #[test]
///     fn statements_end_with_delimiter(stmt in arb_statement()) {
///         prop_assert!(stmt.ends_with(';'));
///     }
/// }
/// ```
pub fn arb_statement() -> impl Strategy<Value = String> {
    "[A-Za-z][A-Za-z0-9_(), '=*\n-]{0,30}".prop_map(|body| format!("{body};"))
}

/// A script and the statements it contains, in order.
///
/// The script may end with a comment lacking its newline.
///
/// # Example
///
/// ```
/// use proptest::prelude::*;
/// use testsupport::proptest_generators::arb_script;
///
/// proptest! {
///     #[test]
///     fn recovers_statements((script, expected) in arb_script()) {
///         let got: Vec<&str> = parser::split_script(&script).collect();
///         prop_assert_eq!(got, expected);
///     }
/// }
/// ```
pub fn arb_script() -> impl Strategy<Value = (String, Vec<String>)> {
    (
        prop::collection::vec((arb_separator(), arb_statement()), 0..8),
        arb_separator(),
        prop::option::of("[ A-Za-z0-9;]{0,10}"),
    )
        .prop_map(|(pairs, tail, open_comment)| {
            let mut script = String::new();
            let mut statements = Vec::with_capacity(pairs.len());
            for (separator, statement) in pairs {
                script.push_str(&separator);
                script.push_str(&statement);
                statements.push(statement);
            }
            script.push_str(&tail);
            if let Some(body) = open_comment {
                script.push_str("--");
                script.push_str(&body);
            }
            (script, statements)
        })
}
