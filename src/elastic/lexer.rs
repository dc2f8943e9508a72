use cmdbridge_core::scanner::{is_identifier_char, is_identifier_start};
use cmdbridge_core::{BridgeError, BridgeResult, Scanner, Token, TokenKind};

pub const METHODS: [&str; 5] = ["GET", "POST", "PUT", "DELETE", "HEAD"];

/// Lexer for `METHOD /path?query {body}` request statements.
///
/// The request line is context sensitive: right after a method keyword the
/// lexer switches to path mode, where everything up to the next whitespace
/// is path text except `?` placeholders.
pub struct ElasticLexer {
    scanner: Scanner,
    expect_method: bool,
    in_hint: bool,
}

impl ElasticLexer {
    pub fn new(input: &str) -> Self {
        Self {
            scanner: Scanner::new(input),
            expect_method: true,
            in_hint: false,
        }
    }

    pub fn tokenize(&mut self) -> BridgeResult<Vec<Token>> {
        let mut tokens = Vec::new();

        loop {
            self.skip_trivia()?;
            let Some(ch) = self.scanner.current_char() else {
                if self.in_hint {
                    return Err(BridgeError::lex(self.scanner.position(), "unterminated hint block"));
                }
                tokens.push(Token::eof(self.scanner.position()));
                return Ok(tokens);
            };

            if self.scanner.starts_with("/*+") && !self.in_hint {
                tokens.push(self.scanner.single(TokenKind::HintStart, 3));
                self.in_hint = true;
                continue;
            }
            if self.in_hint && self.scanner.starts_with("*/") {
                tokens.push(self.scanner.single(TokenKind::HintEnd, 2));
                self.in_hint = false;
                continue;
            }

            let token = self.next_token(ch)?;
            let is_method = self.expect_method
                && !self.in_hint
                && token.kind == TokenKind::Identifier
                && METHODS.iter().any(|m| token.text.eq_ignore_ascii_case(m));

            if token.kind == TokenKind::Semicolon && !self.in_hint {
                self.expect_method = true;
            } else if !self.in_hint {
                self.expect_method = false;
            }

            tokens.push(token);

            if is_method {
                self.read_path(&mut tokens);
            }
        }
    }

    fn skip_trivia(&mut self) -> BridgeResult<()> {
        loop {
            self.scanner.skip_whitespace(false);
            if self.scanner.starts_with("/*") && !self.scanner.starts_with("/*+") {
                self.scanner.skip_block_comment()?;
            } else if self.scanner.starts_with("--") {
                self.scanner.skip_line_comment();
            } else {
                return Ok(());
            }
        }
    }

    fn next_token(&mut self, ch: char) -> BridgeResult<Token> {
        let pos = self.scanner.position();
        let token = match ch {
            '"' | '\'' => Token::new(TokenKind::String, self.scanner.read_quoted(false)?, pos),
            c if c.is_ascii_digit() => self.scanner.read_number()?,
            '-' if self.scanner.peek().is_some_and(|c| c.is_ascii_digit()) => {
                self.scanner.read_number()?
            }
            c if is_identifier_start(c) || c == '$' || c == '@' => {
                let word = self
                    .scanner
                    .read_while(|c| is_identifier_char(c) || matches!(c, '$' | '@' | '.' | '-'));
                let kind = if word.eq_ignore_ascii_case("true") || word.eq_ignore_ascii_case("false") {
                    TokenKind::Boolean
                } else if word.eq_ignore_ascii_case("null") {
                    TokenKind::Null
                } else {
                    TokenKind::Identifier
                };
                Token::new(kind, word, pos)
            }
            '?' => self.scanner.single(TokenKind::Placeholder, 1),
            '{' => self.scanner.single(TokenKind::LeftBrace, 1),
            '}' => self.scanner.single(TokenKind::RightBrace, 1),
            '[' => self.scanner.single(TokenKind::LeftBracket, 1),
            ']' => self.scanner.single(TokenKind::RightBracket, 1),
            ',' => self.scanner.single(TokenKind::Comma, 1),
            ':' => self.scanner.single(TokenKind::Colon, 1),
            ';' => self.scanner.single(TokenKind::Semicolon, 1),
            '=' => self.scanner.single(TokenKind::Operator, 1),
            _ => return Err(self.scanner.unexpected_char()),
        };
        Ok(token)
    }

    /// Reads the request path following a method keyword.
    ///
    /// A `?` that follows path text and is followed by a letter or `_` opens
    /// the query string; every other `?` is a placeholder.
    fn read_path(&mut self, tokens: &mut Vec<Token>) {
        while matches!(self.scanner.current_char(), Some(' ') | Some('\t')) {
            self.scanner.advance();
        }

        let mut in_query = false;
        let mut text = String::new();
        let mut text_pos = self.scanner.position();
        let mut first = true;

        while let Some(ch) = self.scanner.current_char() {
            if ch.is_whitespace() || ch == ';' {
                break;
            }
            if first && matches!(ch, '{' | '[') {
                break;
            }
            first = false;

            if ch == '?' {
                let opens_query = !in_query
                    && !text.is_empty()
                    && self
                        .scanner
                        .peek()
                        .is_some_and(|c| c.is_alphabetic() || c == '_');
                if opens_query {
                    in_query = true;
                    text.push(ch);
                    self.scanner.advance();
                    continue;
                }
                if !text.is_empty() {
                    tokens.push(Token::new(TokenKind::Path, std::mem::take(&mut text), text_pos));
                }
                tokens.push(self.scanner.single(TokenKind::Placeholder, 1));
                text_pos = self.scanner.position();
                continue;
            }

            if text.is_empty() {
                text_pos = self.scanner.position();
            }
            text.push(ch);
            self.scanner.advance();
        }

        if !text.is_empty() {
            tokens.push(Token::new(TokenKind::Path, text, text_pos));
        }
    }
}
