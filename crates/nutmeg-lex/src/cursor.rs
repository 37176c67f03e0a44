//! UTF-8 positioned cursor over the source text.
//!
//! Every matcher in this crate reads through a single `Cursor` rather than
//! indexing the source directly. It tracks line/column alongside the byte
//! offset and exposes a nesting mark stack so a matcher can speculatively
//! scan ahead (an interpolation, a radix suffix that turns out not to be
//! one) and cleanly back out.

/// Snapshot of cursor state, pushed by [`Cursor::mark`] and restored by
/// [`Cursor::reset`]/[`Cursor::pop_mark`].
#[derive(Clone, Copy, Debug)]
struct Snapshot {
    byte_pos: usize,
    line: u32,
    column: u32,
}

/// Sentinel returned by `peek`/`peek_n` past the end of input. Matchers
/// treat it as "no match" the same way they treat any other character that
/// doesn't belong to their grammar; since `source` is always a valid `&str`
/// there is no separate malformed-UTF-8 case to thread through the API.
pub const EOF: char = '\0';

pub struct Cursor<'a> {
    source: &'a str,
    byte_pos: usize,
    line: u32,
    column: u32,
    marks: Vec<Snapshot>,
}

impl<'a> Cursor<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            byte_pos: 0,
            line: 1,
            column: 1,
            marks: Vec::new(),
        }
    }

    pub fn source(&self) -> &'a str {
        self.source
    }

    pub fn byte_pos(&self) -> usize {
        self.byte_pos
    }

    pub fn line(&self) -> u32 {
        self.line
    }

    pub fn column(&self) -> u32 {
        self.column
    }

    pub fn position(&self) -> nutmeg_util::Position {
        nutmeg_util::Position::new(self.line, self.column)
    }

    pub fn has_more(&self) -> bool {
        self.byte_pos < self.source.len()
    }

    /// The character at the cursor, or [`EOF`] if exhausted.
    pub fn peek(&self) -> char {
        self.source[self.byte_pos..].chars().next().unwrap_or(EOF)
    }

    /// The character `k` positions ahead of the cursor (0 == `peek`).
    pub fn peek_n(&self, k: usize) -> char {
        self.source[self.byte_pos..].chars().nth(k).unwrap_or(EOF)
    }

    /// Consumes and returns the current rune, updating line/column.
    ///
    /// A `\r\n` pair is treated as a single line terminator: calling
    /// `consume` while positioned on `\r` followed by `\n` eats both bytes,
    /// advances the line counter once, and returns `\n`.
    pub fn consume(&mut self) -> char {
        let c = self.peek();
        if c == EOF {
            return EOF;
        }
        if c == '\r' && self.peek_n(1) == '\n' {
            self.byte_pos += 2;
            self.line += 1;
            self.column = 1;
            return '\n';
        }
        self.byte_pos += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        c
    }

    /// Advances by exactly `n_bytes`, decoding each rune in the window to
    /// keep line/column accurate (used by matchers that know the byte width
    /// of what they want to skip ahead of time, e.g. a fixed-width escape).
    pub fn advance(&mut self, n_bytes: usize) {
        let target = self.byte_pos + n_bytes;
        while self.byte_pos < target && self.has_more() {
            self.consume();
        }
    }

    /// Pushes the current position. Marks nest.
    pub fn mark(&mut self) {
        self.marks.push(Snapshot {
            byte_pos: self.byte_pos,
            line: self.line,
            column: self.column,
        });
    }

    /// Pops the innermost mark and rewinds the cursor to it.
    pub fn reset(&mut self) {
        if let Some(s) = self.marks.pop() {
            self.byte_pos = s.byte_pos;
            self.line = s.line;
            self.column = s.column;
        }
    }

    /// Pops the innermost mark without moving the cursor and returns the
    /// source slice between the mark and the current position.
    pub fn pop_mark(&mut self) -> &'a str {
        let s = self.marks.pop().expect("pop_mark without a matching mark");
        &self.source[s.byte_pos..self.byte_pos]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracks_line_and_column() {
        let mut c = Cursor::new("ab\ncd");
        assert_eq!(c.consume(), 'a');
        assert_eq!((c.line(), c.column()), (1, 2));
        assert_eq!(c.consume(), 'b');
        assert_eq!(c.consume(), '\n');
        assert_eq!((c.line(), c.column()), (2, 1));
        assert_eq!(c.consume(), 'c');
        assert_eq!((c.line(), c.column()), (2, 2));
    }

    #[test]
    fn crlf_counts_as_one_terminator() {
        let mut c = Cursor::new("a\r\nb");
        c.consume();
        assert_eq!(c.consume(), '\n');
        assert_eq!((c.line(), c.column()), (2, 1));
        assert_eq!(c.byte_pos(), 3);
    }

    #[test]
    fn mark_reset_rewinds() {
        let mut c = Cursor::new("hello");
        c.consume();
        c.consume();
        c.mark();
        c.consume();
        c.consume();
        c.reset();
        assert_eq!(c.byte_pos(), 2);
        assert_eq!(c.peek(), 'l');
    }

    #[test]
    fn pop_mark_returns_slice_without_rewinding() {
        let mut c = Cursor::new("hello world");
        c.mark();
        for _ in 0..5 {
            c.consume();
        }
        let slice = c.pop_mark();
        assert_eq!(slice, "hello");
        assert_eq!(c.peek(), ' ');
    }

    #[test]
    fn nested_marks() {
        let mut c = Cursor::new("abcdef");
        c.mark();
        c.consume();
        c.consume();
        c.mark();
        c.consume();
        c.consume();
        assert_eq!(c.pop_mark(), "cd");
        assert_eq!(c.pop_mark(), "abcd");
    }

    #[test]
    fn peek_past_end_is_eof_sentinel() {
        let c = Cursor::new("a");
        assert_eq!(c.peek_n(5), EOF);
    }
}
