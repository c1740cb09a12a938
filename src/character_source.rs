//! Character-level view of a source string with line/column bookkeeping.

use std::fmt::Display;
use std::iter::Peekable;
use std::str::Chars;

/// A 1-based location in the source text.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Position {
        return Position { line, column };
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        return write!(f, "{}:{}", self.line, self.column);
    }
}

/// Raised when the source contains a character no token can start with.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct LexError {
    pub message: String,
    pub position: Position,
}

impl Display for LexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        return write!(f, "{} {}", self.message, self.position);
    }
}

/// Yields the characters of a source string one at a time.
pub struct CharacterSource<'a> {
    chars: Peekable<Chars<'a>>,
    line: usize,
    column: usize,
}

impl<'a> CharacterSource<'a> {
    pub fn new(source: &'a str) -> CharacterSource<'a> {
        return CharacterSource {
            chars: source.chars().peekable(),
            line: 1,
            column: 1,
        };
    }

    /// Consumes the next character, or returns `None` at the end of input.
    pub fn next(&mut self) -> Option<char> {
        let ch = self.chars.next()?;

        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }

        return Some(ch);
    }

    pub fn peek(&mut self) -> Option<char> {
        return self.chars.peek().copied();
    }

    pub fn eof(&mut self) -> bool {
        return self.peek().is_none();
    }

    /// Position of the next unread character.
    pub fn position(&self) -> Position {
        return Position::new(self.line, self.column);
    }

    /// Builds a `LexError` located at the current position.
    pub fn fail(&self, message: &str) -> LexError {
        return LexError {
            message: String::from(message),
            position: self.position(),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Test if next and peek walk the input in order.
    #[test]
    fn test_next_and_peek() {
        let mut source = CharacterSource::new("ab");

        assert_eq!(source.peek(), Some('a'));
        assert_eq!(source.next(), Some('a'));
        assert_eq!(source.peek(), Some('b'));
        assert_eq!(source.next(), Some('b'));
        assert!(source.eof());
        assert_eq!(source.next(), None);
        assert_eq!(source.peek(), None);
    }

    // Test if line and column counters follow newlines.
    #[test]
    fn test_position_tracking() {
        let mut source = CharacterSource::new("xy\nz");
        assert_eq!(source.position(), Position::new(1, 1));

        source.next();
        source.next();
        assert_eq!(source.position(), Position::new(1, 3));

        source.next();
        assert_eq!(source.position(), Position::new(2, 1));

        source.next();
        assert_eq!(source.position(), Position::new(2, 2));
    }

    // Test if fail reports the current position.
    #[test]
    fn test_fail_carries_position() {
        let mut source = CharacterSource::new("\n  ?");
        source.next();
        source.next();
        source.next();

        let lex_error = source.fail("Can't handle character: ?");

        assert_eq!(lex_error.position, Position::new(2, 3));
        assert_eq!(format!("{}", lex_error), "Can't handle character: ? 2:3");
    }
}
