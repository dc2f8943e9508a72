use cmdbridge_core::scanner::is_identifier_char;
use cmdbridge_core::{BridgeResult, Scanner, Token, TokenKind};

/// Lexer for mongo shell statements.
///
/// A newline separates statements only outside brackets and only when the
/// next line does not continue a call chain with `.`.
pub struct MongoLexer {
    scanner: Scanner,
    depth: usize,
}

impl MongoLexer {
    pub fn new(input: &str) -> Self {
        Self {
            scanner: Scanner::new(input),
            depth: 0,
        }
    }

    pub fn tokenize(&mut self) -> BridgeResult<Vec<Token>> {
        let mut tokens = Vec::new();

        loop {
            self.skip_trivia()?;
            let pos = self.scanner.position();

            let token = match self.scanner.current_char() {
                None => {
                    tokens.push(Token::eof(pos));
                    return Ok(tokens);
                }
                Some('\n') => {
                    let newline = self.scanner.single(TokenKind::Newline, 1);
                    if self.depth > 0 || self.continues_chain()? {
                        continue;
                    }
                    newline
                }
                Some('"') | Some('\'') => {
                    Token::new(TokenKind::String, self.scanner.read_quoted(false)?, pos)
                }
                Some(c) if c.is_ascii_digit() => self.scanner.read_number()?,
                Some('-') if self.scanner.peek().is_some_and(|c| c.is_ascii_digit()) => {
                    self.scanner.read_number()?
                }
                Some(c) if c.is_alphabetic() || c == '_' || c == '$' => {
                    let word = self.scanner.read_while(|c| is_identifier_char(c) || c == '$');
                    let kind = match word.as_str() {
                        "true" | "false" => TokenKind::Boolean,
                        "null" | "undefined" => TokenKind::Null,
                        _ => TokenKind::Identifier,
                    };
                    Token::new(kind, word, pos)
                }
                Some('{') => self.open(TokenKind::LeftBrace),
                Some('[') => self.open(TokenKind::LeftBracket),
                Some('(') => self.open(TokenKind::LeftParen),
                Some('}') => self.close(TokenKind::RightBrace),
                Some(']') => self.close(TokenKind::RightBracket),
                Some(')') => self.close(TokenKind::RightParen),
                Some(',') => self.scanner.single(TokenKind::Comma, 1),
                Some(':') => self.scanner.single(TokenKind::Colon, 1),
                Some('.') => self.scanner.single(TokenKind::Dot, 1),
                Some(';') => self.scanner.single(TokenKind::Semicolon, 1),
                Some('?') => self.scanner.single(TokenKind::Placeholder, 1),
                Some(_) => return Err(self.scanner.unexpected_char()),
            };
            tokens.push(token);
        }
    }

    fn open(&mut self, kind: TokenKind) -> Token {
        self.depth += 1;
        self.scanner.single(kind, 1)
    }

    fn close(&mut self, kind: TokenKind) -> Token {
        self.depth = self.depth.saturating_sub(1);
        self.scanner.single(kind, 1)
    }

    /// Skips blank space (newlines excluded) and comments.
    fn skip_trivia(&mut self) -> BridgeResult<()> {
        loop {
            self.scanner.skip_whitespace(true);
            if self.scanner.starts_with("//") {
                self.scanner.skip_line_comment();
            } else if self.scanner.starts_with("/*") {
                self.scanner.skip_block_comment()?;
            } else {
                return Ok(());
            }
        }
    }

    /// After a newline: true when the next significant character is `.`.
    fn continues_chain(&mut self) -> BridgeResult<bool> {
        loop {
            self.scanner.skip_whitespace(false);
            if self.scanner.starts_with("//") {
                self.scanner.skip_line_comment();
            } else if self.scanner.starts_with("/*") {
                self.scanner.skip_block_comment()?;
            } else {
                return Ok(self.scanner.current_char() == Some('.'));
            }
        }
    }
}
