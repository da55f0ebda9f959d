//! Splits SQL scripts into individually executable statements.
//!
//! Statements end at `;`. Whitespace and `--` line comments between
//! statements are skipped; nothing inside a statement is interpreted, so a
//! `;` inside a string literal or a trailing comment ends the statement.

mod scanner;
#[cfg(test)]
mod tests;

pub use scanner::StatementScanner;

/// Byte that terminates every statement.
pub const DELIMITER: u8 = b';';

/// Outcome of one tokenizer step over a script buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Split<'a> {
    /// A complete statement. `advance` is the offset one past its delimiter,
    /// measured from the start of the buffer.
    Statement { advance: usize, statement: &'a [u8] },
    /// The buffer holds no complete statement; supply more bytes, or stop if
    /// none will arrive.
    NeedMore,
    /// The buffer is empty and final.
    Done,
}

impl<'a> Split<'a> {
    /// Bytes consumed by this step.
    pub fn advance(&self) -> usize {
        match self {
            Split::Statement { advance, .. } => *advance,
            Split::NeedMore | Split::Done => 0,
        }
    }

    /// The statement text, delimiter included.
    pub fn statement(&self) -> Option<&'a [u8]> {
        match self {
            Split::Statement { statement, .. } => Some(*statement),
            Split::NeedMore | Split::Done => None,
        }
    }
}

/// Length of the whitespace and line comments at the start of `data`.
///
/// Returns `None` when a comment runs to the end of a non-final buffer, since
/// its end cannot be known yet. In a final buffer an unterminated comment
/// extends to the end of input.
pub fn skip_insignificant(data: &[u8], at_eof: bool) -> Option<usize> {
    let mut start = 0;
    while start < data.len() {
        match data[start] {
            b' ' | b'\t' | b'\n' | b'\r' => start += 1,
            b'-' if data.get(start + 1) == Some(&b'-') => {
                match data[start..].iter().position(|&b| b == b'\n') {
                    Some(newline) => start += newline + 1,
                    None if at_eof => start = data.len(),
                    None => return None,
                }
            }
            _ => break,
        }
    }
    Some(start)
}

/// Returns true if `data` holds nothing but whitespace and line comments.
pub fn is_insignificant(data: &[u8]) -> bool {
    skip_insignificant(data, true) == Some(data.len())
}

/// Extract the next statement from `data`.
///
/// `at_eof` tells the tokenizer that no bytes will ever be appended to
/// `data`. A buffer without a delimiter after the skipped prefix yields
/// `NeedMore` even when final; callers decide what to do with the rest.
///
/// # Example
///
/// ```
/// use parser::{split_statement, Split};
///
/// let script = b"-- note\nSELECT 1;\nSELECT 2;";
/// let step = split_statement(script, true);
/// assert_eq!(step.statement(), Some(&b"SELECT 1;"[..]));
/// assert_eq!(step.advance(), 17);
///
/// assert_eq!(split_statement(b"-- incomplete", false), Split::NeedMore);
/// ```
pub fn split_statement(data: &[u8], at_eof: bool) -> Split<'_> {
    if at_eof && data.is_empty() {
        return Split::Done;
    }

    let Some(start) = skip_insignificant(data, at_eof) else {
        return Split::NeedMore;
    };

    match data[start..].iter().position(|&b| b == DELIMITER) {
        Some(offset) if offset > 0 => {
            let end = start + offset + 1;
            Split::Statement {
                advance: end,
                statement: &data[start..end],
            }
        }
        _ => Split::NeedMore,
    }
}

/// Iterate over the statements of a complete, in-memory script.
///
/// # Example
///
/// ```
/// let statements: Vec<&str> =
///     parser::split_script("INSERT INTO t VALUES (1);INSERT INTO t VALUES (2);").collect();
/// assert_eq!(statements, ["INSERT INTO t VALUES (1);", "INSERT INTO t VALUES (2);"]);
/// ```
pub fn split_script(script: &str) -> Statements<'_> {
    Statements {
        rest: script,
        consumed: 0,
    }
}

/// Iterator returned by [`split_script`].
#[derive(Clone, Debug)]
pub struct Statements<'a> {
    rest: &'a str,
    consumed: usize,
}

impl<'a> Statements<'a> {
    /// Text not yet claimed by a statement.
    pub fn remainder(&self) -> &'a str {
        self.rest
    }

    /// Bytes of the script consumed so far.
    pub fn consumed(&self) -> usize {
        self.consumed
    }
}

impl<'a> Iterator for Statements<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        match split_statement(self.rest.as_bytes(), true) {
            Split::Statement { advance, statement } => {
                // Split points sit next to ASCII bytes, so both are char boundaries.
                let text = &self.rest[advance - statement.len()..advance];
                self.rest = &self.rest[advance..];
                self.consumed += advance;
                Some(text)
            }
            Split::NeedMore | Split::Done => None,
        }
    }
}
