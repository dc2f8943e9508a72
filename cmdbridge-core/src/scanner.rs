//! Character scanner shared by the backend lexers.
//!
//! Tracks line/column as it advances so that every token a lexer produces can
//! carry an exact [`Position`]. The scanner knows nothing about any grammar;
//! backend lexers drive it and decide what each character run means.

use crate::error::{BridgeError, BridgeResult};
use crate::token::{Position, Token, TokenKind};

pub struct Scanner {
    input: Vec<char>,
    position: usize,
    line: usize,
    column: usize,
    current_char: Option<char>,
}

impl Scanner {
    pub fn new(input: &str) -> Self {
        let chars: Vec<char> = input.chars().collect();
        let current_char = chars.first().copied();

        Self {
            input: chars,
            position: 0,
            line: 1,
            column: 1,
            current_char,
        }
    }

    pub fn current_char(&self) -> Option<char> {
        self.current_char
    }

    pub fn peek(&self) -> Option<char> {
        self.peek_at(1)
    }

    pub fn peek_at(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }

    /// Character just before the current one.
    pub fn previous(&self) -> Option<char> {
        self.position
            .checked_sub(1)
            .and_then(|i| self.input.get(i).copied())
    }

    pub fn position(&self) -> Position {
        Position::new(self.line, self.column, self.position)
    }

    pub fn is_at_end(&self) -> bool {
        self.current_char.is_none()
    }

    /// True when the remaining input starts with `s`.
    pub fn starts_with(&self, s: &str) -> bool {
        s.chars()
            .enumerate()
            .all(|(i, c)| self.peek_at(i) == Some(c))
    }

    pub fn advance(&mut self) {
        if let Some(ch) = self.current_char {
            if ch == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
            self.position += 1;
            self.current_char = self.input.get(self.position).copied();
        }
    }

    pub fn advance_by(&mut self, n: usize) {
        for _ in 0..n {
            self.advance();
        }
    }

    /// Skips whitespace. Newlines are kept when the grammar uses them as
    /// statement separators.
    pub fn skip_whitespace(&mut self, keep_newlines: bool) {
        while let Some(ch) = self.current_char {
            if ch.is_whitespace() && !(keep_newlines && ch == '\n') {
                self.advance();
            } else {
                break;
            }
        }
    }

    /// Skips to the end of the line, leaving the newline itself in place.
    pub fn skip_line_comment(&mut self) {
        while let Some(ch) = self.current_char {
            if ch == '\n' {
                break;
            }
            self.advance();
        }
    }

    /// Skips a `/* ... */` comment. The scanner must sit on the opening `/`.
    pub fn skip_block_comment(&mut self) -> BridgeResult<()> {
        let start = self.position();
        self.advance_by(2);
        while let Some(ch) = self.current_char {
            if ch == '*' && self.peek() == Some('/') {
                self.advance_by(2);
                return Ok(());
            }
            self.advance();
        }
        Err(BridgeError::lex(start, "unterminated block comment"))
    }

    /// Reads a numeric literal, optionally with a leading `-`.
    ///
    /// A literal with a fractional part or an exponent is a `Float` token,
    /// anything else is an `Integer`. The token text is the literal as written.
    pub fn read_number(&mut self) -> BridgeResult<Token> {
        let start = self.position();
        let mut text = String::new();
        let mut is_float = false;

        if self.current_char == Some('-') {
            text.push('-');
            self.advance();
        }

        self.read_digits(&mut text);

        if self.current_char == Some('.') && self.peek().is_some_and(|c| c.is_ascii_digit()) {
            is_float = true;
            text.push('.');
            self.advance();
            self.read_digits(&mut text);
        }

        if matches!(self.current_char, Some('e') | Some('E')) {
            let signed = matches!(self.peek(), Some('+') | Some('-'));
            let digit_at = if signed { 2 } else { 1 };
            if self.peek_at(digit_at).is_some_and(|c| c.is_ascii_digit()) {
                is_float = true;
                for _ in 0..digit_at {
                    if let Some(ch) = self.current_char {
                        text.push(ch);
                    }
                    self.advance();
                }
                self.read_digits(&mut text);
            }
        }

        if text == "-" || text.is_empty() {
            return Err(BridgeError::lex(start, "expected digits"));
        }

        let kind = if is_float {
            TokenKind::Float
        } else {
            TokenKind::Integer
        };
        Ok(Token::new(kind, text, start))
    }

    fn read_digits(&mut self, out: &mut String) {
        while let Some(ch) = self.current_char {
            if ch.is_ascii_digit() {
                out.push(ch);
                self.advance();
            } else {
                break;
            }
        }
    }

    /// Reads a quoted string starting at the opening quote and returns its
    /// unescaped content.
    ///
    /// Backslash escapes are always honoured. With `doubled_quote_escape` a
    /// doubled quote character (`''`) stands for one quote, as in SQL.
    pub fn read_quoted(&mut self, doubled_quote_escape: bool) -> BridgeResult<String> {
        let start = self.position();
        let quote = match self.current_char {
            Some(q) => q,
            None => return Err(BridgeError::lex(start, "expected string")),
        };
        self.advance();

        let mut string = String::new();

        while let Some(ch) = self.current_char {
            if ch == quote {
                if doubled_quote_escape && self.peek() == Some(quote) {
                    string.push(quote);
                    self.advance_by(2);
                } else {
                    self.advance();
                    return Ok(string);
                }
            } else if ch == '\\' {
                let escape_at = self.position();
                self.advance();
                match self.current_char {
                    Some('u') => {
                        self.advance();
                        string.push(self.read_unicode_escape(escape_at)?);
                    }
                    Some(escaped) => {
                        string.push(match escaped {
                            'n' => '\n',
                            't' => '\t',
                            'r' => '\r',
                            'b' => '\u{8}',
                            'f' => '\u{c}',
                            '0' => '\0',
                            other => other,
                        });
                        self.advance();
                    }
                    None => break,
                }
            } else {
                string.push(ch);
                self.advance();
            }
        }

        Err(BridgeError::lex(start, "unterminated string"))
    }

    fn read_unicode_escape(&mut self, escape_at: Position) -> BridgeResult<char> {
        let mut hex = String::with_capacity(4);
        for _ in 0..4 {
            match self.current_char {
                Some(c) if c.is_ascii_hexdigit() => {
                    hex.push(c);
                    self.advance();
                }
                _ => return Err(BridgeError::lex(escape_at, "invalid unicode escape")),
            }
        }
        u32::from_str_radix(&hex, 16)
            .ok()
            .and_then(char::from_u32)
            .ok_or_else(|| BridgeError::lex(escape_at, "invalid unicode escape"))
    }

    /// Reads characters while `accept` holds.
    pub fn read_while<F>(&mut self, accept: F) -> String
    where
        F: Fn(char) -> bool,
    {
        let mut word = String::new();
        while let Some(ch) = self.current_char {
            if accept(ch) {
                word.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        word
    }

    /// Consumes `len` characters and returns a token of `kind` for them.
    pub fn single(&mut self, kind: TokenKind, len: usize) -> Token {
        let start = self.position();
        let text: String = self.input[self.position..(self.position + len).min(self.input.len())]
            .iter()
            .collect();
        self.advance_by(len);
        Token::new(kind, text, start)
    }

    pub fn unexpected_char(&self) -> BridgeError {
        match self.current_char {
            Some(ch) => BridgeError::lex(self.position(), format!("unexpected character '{}'", ch)),
            None => BridgeError::lex(self.position(), "unexpected end of input"),
        }
    }
}

/// Identifier characters common to every grammar.
pub fn is_identifier_start(ch: char) -> bool {
    ch.is_alphabetic() || ch == '_'
}

pub fn is_identifier_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positions_track_lines() {
        let mut s = Scanner::new("ab\ncd");
        s.advance_by(3);
        assert_eq!(s.current_char(), Some('c'));
        assert_eq!(s.position(), Position::new(2, 1, 3));
        s.advance();
        assert_eq!(s.position(), Position::new(2, 2, 4));
    }

    #[test]
    fn test_numbers() {
        let tok = Scanner::new("26").read_number().unwrap();
        assert_eq!((tok.kind, tok.text.as_str()), (TokenKind::Integer, "26"));

        let tok = Scanner::new("26.0").read_number().unwrap();
        assert_eq!((tok.kind, tok.text.as_str()), (TokenKind::Float, "26.0"));

        let tok = Scanner::new("1e3").read_number().unwrap();
        assert_eq!((tok.kind, tok.text.as_str()), (TokenKind::Float, "1e3"));

        let tok = Scanner::new("-2.5E-3,").read_number().unwrap();
        assert_eq!((tok.kind, tok.text.as_str()), (TokenKind::Float, "-2.5E-3"));
    }

    #[test]
    fn test_number_stops_before_member_access() {
        let mut s = Scanner::new("1.x");
        let tok = s.read_number().unwrap();
        assert_eq!(tok.text, "1");
        assert_eq!(s.current_char(), Some('.'));
    }

    #[test]
    fn test_exponent_needs_digits() {
        let mut s = Scanner::new("3em");
        let tok = s.read_number().unwrap();
        assert_eq!((tok.kind, tok.text.as_str()), (TokenKind::Integer, "3"));
        assert_eq!(s.current_char(), Some('e'));
    }

    #[test]
    fn test_quoted_strings() {
        assert_eq!(Scanner::new("\"abc\"").read_quoted(false).unwrap(), "abc");
        assert_eq!(
            Scanner::new(r#""a\"b\n""#).read_quoted(false).unwrap(),
            "a\"b\n"
        );
        assert_eq!(Scanner::new("'it''s'").read_quoted(true).unwrap(), "it's");
        assert_eq!(Scanner::new(r#""é""#).read_quoted(false).unwrap(), "é");
    }

    #[test]
    fn test_unterminated_string() {
        assert!(Scanner::new("\"abc").read_quoted(false).is_err());

        let mut s = Scanner::new("x \"abc");
        s.advance_by(2);
        let err = s.read_quoted(false).unwrap_err();
        assert_eq!(err.position(), Some(Position::new(1, 3, 2)));
    }

    #[test]
    fn test_block_comment() {
        let mut s = Scanner::new("/* hi */x");
        s.skip_block_comment().unwrap();
        assert_eq!(s.current_char(), Some('x'));

        let mut s = Scanner::new("/* never closed");
        assert!(s.skip_block_comment().is_err());
    }

    #[test]
    fn test_skip_whitespace_keeps_newlines() {
        let mut s = Scanner::new("  \n x");
        s.skip_whitespace(true);
        assert_eq!(s.current_char(), Some('\n'));
        s.skip_whitespace(false);
        assert_eq!(s.current_char(), Some('x'));
    }

    #[test]
    fn test_starts_with() {
        let s = Scanner::new("/*+ hint */");
        assert!(s.starts_with("/*+"));
        assert!(!s.starts_with("/**"));
    }
}
