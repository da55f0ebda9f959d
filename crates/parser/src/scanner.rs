use crate::{DELIMITER, Split, is_insignificant, skip_insignificant, split_statement};
use common::{DEFAULT_MAX_STATEMENT_BYTES, SeedConfig, SeedError, SeedResult, TrailingInput};
use std::io::{self, Read};
use tracing::warn;

const START_BUFFER_BYTES: usize = 4096;

/// Pulls statements out of a reader, a chunk at a time.
///
/// The scanner keeps unconsumed bytes in a buffer that starts at 4 KiB and
/// doubles whenever a statement does not fit, up to `max_statement_bytes`.
/// Whitespace and comments between statements are released as soon as they
/// are seen, so only statement text counts against the limit. An empty
/// statement (a `;` with nothing before it) ends the input and is handled by
/// the trailing-input policy. It yields `SeedResult<String>` and stops after
/// the first error.
///
/// # Example
///
/// ```
/// use parser::StatementScanner;
///
/// let script = "CREATE TABLE t (id INT);\n-- rows\nINSERT INTO t VALUES (1);\n";
/// let statements = StatementScanner::new(script.as_bytes())
///     .collect::<Result<Vec<_>, _>>()
///     .unwrap();
/// assert_eq!(statements, ["CREATE TABLE t (id INT);", "INSERT INTO t VALUES (1);"]);
/// ```
pub struct StatementScanner<R> {
    reader: R,
    buf: Vec<u8>,
    start: usize,
    end: usize,
    eof: bool,
    done: bool,
    consumed: usize,
    max_statement_bytes: usize,
    trailing_input: TrailingInput,
}

impl<R: Read> StatementScanner<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::new(),
            start: 0,
            end: 0,
            eof: false,
            done: false,
            consumed: 0,
            max_statement_bytes: DEFAULT_MAX_STATEMENT_BYTES,
            trailing_input: TrailingInput::default(),
        }
    }

    /// Scanner that applies the buffer limit and trailing-input policy of `config`.
    pub fn with_config(reader: R, config: &SeedConfig) -> Self {
        Self::new(reader)
            .max_statement_bytes(config.max_statement_bytes)
            .trailing_input(config.trailing_input)
    }

    pub fn max_statement_bytes(mut self, limit: usize) -> Self {
        self.max_statement_bytes = limit;
        self
    }

    pub fn trailing_input(mut self, policy: TrailingInput) -> Self {
        self.trailing_input = policy;
        self
    }

    /// Bytes of input consumed so far: returned statements plus the
    /// whitespace and comments skipped around them.
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    /// Read the next statement, or `None` once input is exhausted.
    pub fn next_statement(&mut self) -> SeedResult<Option<String>> {
        while !self.done {
            let data = &self.buf[self.start..self.end];
            match split_statement(data, self.eof) {
                Split::Statement { advance, statement } => {
                    let text = std::str::from_utf8(statement)?.to_owned();
                    self.start += advance;
                    self.consumed += advance;
                    return Ok(Some(text));
                }
                Split::Done => self.done = true,
                Split::NeedMore if self.eof => {
                    self.done = true;
                    self.finish()?;
                }
                Split::NeedMore => {
                    let skip = skip_insignificant(data, false);
                    if skip.is_some_and(|n| data.get(n) == Some(&DELIMITER)) {
                        self.done = true;
                        self.empty_statement()?;
                    } else {
                        if let Some(n) = skip {
                            self.start += n;
                            self.consumed += n;
                        }
                        self.fill()?;
                    }
                }
            }
        }
        Ok(None)
    }

    /// Apply the trailing-input policy to whatever follows the last statement.
    fn finish(&self) -> SeedResult<()> {
        let rest = &self.buf[self.start..self.end];
        if is_insignificant(rest) {
            return Ok(());
        }

        let text = String::from_utf8_lossy(rest).trim().to_string();
        match self.trailing_input {
            TrailingInput::Ignore => {
                warn!(trailing = %text, "dropping text without a statement delimiter");
                Ok(())
            }
            TrailingInput::Reject => Err(SeedError::Unterminated(text)),
        }
    }

    /// Apply the trailing-input policy to input that continues after an
    /// empty statement.
    fn empty_statement(&self) -> SeedResult<()> {
        let text = String::from_utf8_lossy(&self.buf[self.start..self.end])
            .trim()
            .to_string();
        match self.trailing_input {
            TrailingInput::Ignore => {
                warn!(trailing = %text, "empty statement, dropping the rest of the input");
                Ok(())
            }
            TrailingInput::Reject => Err(SeedError::Unterminated(text)),
        }
    }

    /// Read more input, compacting and growing the buffer as needed.
    fn fill(&mut self) -> SeedResult<()> {
        if self.start > 0 {
            self.buf.copy_within(self.start..self.end, 0);
            self.end -= self.start;
            self.start = 0;
        }

        if self.end == self.buf.len() {
            if self.buf.len() >= self.max_statement_bytes {
                return Err(SeedError::TooLong {
                    limit: self.max_statement_bytes,
                });
            }
            let len = (self.buf.len() * 2)
                .max(START_BUFFER_BYTES)
                .min(self.max_statement_bytes);
            self.buf.resize(len, 0);
        }

        loop {
            match self.reader.read(&mut self.buf[self.end..]) {
                Ok(0) => {
                    self.eof = true;
                    return Ok(());
                }
                Ok(n) => {
                    self.end += n;
                    return Ok(());
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }
}

impl<R: Read> Iterator for StatementScanner<R> {
    type Item = SeedResult<String>;

    fn next(&mut self) -> Option<Self::Item> {
        let next = self.next_statement();
        if next.is_err() {
            self.done = true;
        }
        next.transpose()
    }
}
