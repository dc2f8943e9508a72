use crate::error::{BridgeError, BridgeResult};
use crate::token::{Position, Token, TokenKind};

/// Read position over a lexed token stream.
///
/// The stream always ends with an `Eof` token; reading past it keeps
/// returning that token.
pub struct TokenCursor {
    tokens: Vec<Token>,
    position: usize,
    eof: Token,
}

impl TokenCursor {
    pub fn new(tokens: Vec<Token>) -> Self {
        let eof_position = tokens.last().map(|t| t.position).unwrap_or_default();
        Self {
            tokens,
            position: 0,
            eof: Token::eof(eof_position),
        }
    }

    pub fn current_token(&self) -> &Token {
        self.tokens.get(self.position).unwrap_or(&self.eof)
    }

    pub fn peek_token(&self, offset: usize) -> &Token {
        self.tokens.get(self.position + offset).unwrap_or(&self.eof)
    }

    pub fn current_kind(&self) -> TokenKind {
        self.current_token().kind
    }

    pub fn current_position(&self) -> Position {
        self.current_token().position
    }

    pub fn advance(&mut self) -> Token {
        let token = self.current_token().clone();
        if self.position < self.tokens.len() {
            self.position += 1;
        }
        token
    }

    pub fn check(&self, kind: TokenKind) -> bool {
        self.current_kind() == kind
    }

    pub fn check_operator(&self, op: &str) -> bool {
        let tok = self.current_token();
        tok.kind == TokenKind::Operator && tok.text == op
    }

    pub fn is_at_end(&self) -> bool {
        self.check(TokenKind::Eof)
    }

    /// Consumes the current token if it has the given kind.
    pub fn eat(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consumes the current token if it is the given keyword.
    pub fn eat_keyword(&mut self, keyword: &str) -> bool {
        if self.current_token().is_keyword(keyword) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub fn expect(&mut self, kind: TokenKind) -> BridgeResult<Token> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(kind.describe()))
        }
    }

    pub fn expect_identifier(&mut self) -> BridgeResult<String> {
        if self.check(TokenKind::Identifier) {
            Ok(self.advance().text)
        } else {
            Err(self.unexpected("identifier"))
        }
    }

    /// Syntax error at the current token: `expected X, found Y`.
    pub fn unexpected(&self, expected: &str) -> BridgeError {
        let tok = self.current_token();
        BridgeError::syntax(
            tok.position,
            format!("expected {}, found {}", expected, tok.describe()),
        )
    }

    /// Skips statement separators (`;` and newline tokens).
    pub fn skip_separators(&mut self) {
        while matches!(self.current_kind(), TokenKind::Semicolon | TokenKind::Newline) {
            self.advance();
        }
    }

    /// True at a statement separator or the end of input.
    pub fn at_statement_end(&self) -> bool {
        matches!(
            self.current_kind(),
            TokenKind::Semicolon | TokenKind::Newline | TokenKind::Eof
        )
    }
}
