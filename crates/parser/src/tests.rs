use super::*;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn stmts(script: &str) -> Vec<&str> {
    split_script(script).collect()
}

#[test]
fn comment_then_statement() {
    assert_eq!(stmts("-- note\nSELECT 1;"), vec!["SELECT 1;"]);
}

#[test]
fn adjacent_statements_split_in_order() {
    assert_eq!(
        stmts("INSERT INTO t VALUES (1);INSERT INTO t VALUES (2);"),
        vec!["INSERT INTO t VALUES (1);", "INSERT INTO t VALUES (2);"]
    );
}

#[test]
fn whitespace_and_comments_only_yield_nothing() {
    let script = "  \t\r\n-- one\n-- two\n\n   -- three without newline";
    assert!(stmts(script).is_empty());
    assert_eq!(split_statement(script.as_bytes(), true), Split::NeedMore);
    assert!(is_insignificant(script.as_bytes()));
}

#[test]
fn unterminated_comment_in_partial_chunk_needs_more() {
    let step = split_statement(b"-- incomplete", false);
    assert_eq!(step, Split::NeedMore);
    assert_eq!(step.advance(), 0);
    assert_eq!(step.statement(), None);
}

#[test]
fn unterminated_comment_in_final_chunk_extends_to_end() {
    assert_eq!(skip_insignificant(b"  -- tail", true), Some(9));
    assert_eq!(skip_insignificant(b"  -- tail", false), None);
}

#[test]
fn empty_final_buffer_is_done() {
    assert_eq!(split_statement(b"", true), Split::Done);
    assert_eq!(split_statement(b"", false), Split::NeedMore);
}

#[test]
fn advance_is_relative_to_buffer_start() {
    let data = b"\n\n-- seed\n  CREATE TABLE t (id INT);\nSELECT 1;";
    match split_statement(data, false) {
        Split::Statement { advance, statement } => {
            assert_eq!(statement, b"CREATE TABLE t (id INT);");
            assert_eq!(advance, 36);
            assert_eq!(data[advance - 1], DELIMITER);
        }
        other => panic!("expected statement, got {other:?}"),
    }
}

#[test]
fn missing_delimiter_needs_more_even_when_final() {
    assert_eq!(split_statement(b"SELECT 1", true), Split::NeedMore);
    assert_eq!(split_statement(b"SELECT 1", false), Split::NeedMore);
}

#[test]
fn single_dash_at_end_is_not_a_comment() {
    assert_eq!(skip_insignificant(b"  -", false), Some(2));
    assert_eq!(split_statement(b"-", false), Split::NeedMore);
    assert_eq!(split_statement(b"-", true), Split::NeedMore);
    assert!(!is_insignificant(b"-"));
}

#[test]
fn single_dash_starts_a_statement() {
    assert_eq!(stmts("-1 AS x;"), vec!["-1 AS x;"]);
}

#[test]
fn empty_statement_is_not_returned() {
    assert_eq!(split_statement(b";SELECT 1;", true), Split::NeedMore);
    assert_eq!(split_statement(b"  ;", true), Split::NeedMore);
}

#[test]
fn comments_inside_statements_are_kept() {
    assert_eq!(
        stmts("SELECT 1 -- inline\n, 2;"),
        vec!["SELECT 1 -- inline\n, 2;"]
    );
}

#[test]
fn remainder_holds_unconsumed_text() {
    let script = "SELECT 1;\n-- trailing\nSELECT 2";
    let mut it = split_script(script);
    assert_eq!(it.next(), Some("SELECT 1;"));
    assert_eq!(it.next(), None);
    assert_eq!(it.consumed(), 9);
    assert_eq!(it.remainder(), "\n-- trailing\nSELECT 2");
}

#[test]
fn multibyte_text_survives_splitting() {
    assert_eq!(
        stmts("INSERT INTO t VALUES ('Grüße');\n-- ü\nINSERT INTO t VALUES ('日本');"),
        vec![
            "INSERT INTO t VALUES ('Grüße');",
            "INSERT INTO t VALUES ('日本');"
        ]
    );
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_advance_stays_in_bounds(data in prop::collection::vec(any::<u8>(), 0..256), at_eof in any::<bool>()) {
        match split_statement(&data, at_eof) {
            Split::Statement { advance, statement } => {
                prop_assert!(advance <= data.len());
                prop_assert_eq!(data[advance - 1], DELIMITER);
                prop_assert!(statement.len() > 1);
                prop_assert_eq!(statement, &data[advance - statement.len()..advance]);
                prop_assert!(is_insignificant(&data[..advance - statement.len()]));
            }
            Split::NeedMore | Split::Done => {}
        }
    }

    #[test]
    fn prop_final_chunk_never_needs_more_for_a_delimited_prefix(
        prefix in "[ \t\r\n]{0,8}",
        body in "[A-Za-z0-9][A-Za-z0-9 ]{0,19}",
    ) {
        let script = format!("{prefix}{body};");
        let step = split_statement(script.as_bytes(), true);
        prop_assert_eq!(step.advance(), script.len());
    }
}
