use cmdbridge_core::scanner::{is_identifier_char, is_identifier_start};
use cmdbridge_core::{BridgeError, BridgeResult, Scanner, Token, TokenKind};

/// Lexer for SQL-like vector database statements.
///
/// Operators come out as [`TokenKind::Operator`] with their text. A `-`
/// directly before a digit is read as part of the number when it sits in
/// operand position (after an operator, an opening bracket, a comma or at
/// the start of a statement).
pub struct MilvusLexer {
    scanner: Scanner,
    in_hint: bool,
}

impl MilvusLexer {
    pub fn new(input: &str) -> Self {
        Self {
            scanner: Scanner::new(input),
            in_hint: false,
        }
    }

    pub fn tokenize(&mut self) -> BridgeResult<Vec<Token>> {
        let mut tokens: Vec<Token> = Vec::new();

        loop {
            self.skip_trivia()?;
            let pos = self.scanner.position();

            let Some(ch) = self.scanner.current_char() else {
                if self.in_hint {
                    return Err(BridgeError::lex(pos, "unterminated hint block"));
                }
                tokens.push(Token::eof(pos));
                return Ok(tokens);
            };

            if !self.in_hint && self.scanner.starts_with("/*+") {
                tokens.push(self.scanner.single(TokenKind::HintStart, 3));
                self.in_hint = true;
                continue;
            }
            if self.in_hint && self.scanner.starts_with("*/") {
                tokens.push(self.scanner.single(TokenKind::HintEnd, 2));
                self.in_hint = false;
                continue;
            }

            let token = match ch {
                '\'' | '"' => Token::new(TokenKind::String, self.scanner.read_quoted(true)?, pos),
                '`' => self.read_quoted_identifier()?,
                c if c.is_ascii_digit() => self.scanner.read_number()?,
                '-' if self.scanner.peek().is_some_and(|c| c.is_ascii_digit())
                    && operand_position(tokens.last()) =>
                {
                    self.scanner.read_number()?
                }
                c if is_identifier_start(c) => {
                    let word = self.scanner.read_while(is_identifier_char);
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
                '(' => self.scanner.single(TokenKind::LeftParen, 1),
                ')' => self.scanner.single(TokenKind::RightParen, 1),
                '[' => self.scanner.single(TokenKind::LeftBracket, 1),
                ']' => self.scanner.single(TokenKind::RightBracket, 1),
                '{' => self.scanner.single(TokenKind::LeftBrace, 1),
                '}' => self.scanner.single(TokenKind::RightBrace, 1),
                ',' => self.scanner.single(TokenKind::Comma, 1),
                '.' => self.scanner.single(TokenKind::Dot, 1),
                ':' => self.scanner.single(TokenKind::Colon, 1),
                ';' => self.scanner.single(TokenKind::Semicolon, 1),
                _ => self.read_operator()?,
            };
            tokens.push(token);
        }
    }

    fn skip_trivia(&mut self) -> BridgeResult<()> {
        loop {
            self.scanner.skip_whitespace(false);
            if self.scanner.starts_with("--") {
                self.scanner.skip_line_comment();
            } else if self.scanner.starts_with("/*") && !self.scanner.starts_with("/*+") {
                self.scanner.skip_block_comment()?;
            } else {
                return Ok(());
            }
        }
    }

    /// `` `name` ``, kept with its backticks so it is re-emitted verbatim.
    fn read_quoted_identifier(&mut self) -> BridgeResult<Token> {
        let pos = self.scanner.position();
        self.scanner.advance();
        let name = self.scanner.read_while(|c| c != '`');
        if self.scanner.current_char() != Some('`') {
            return Err(BridgeError::lex(pos, "unterminated quoted identifier"));
        }
        self.scanner.advance();
        Ok(Token::new(TokenKind::Identifier, format!("`{}`", name), pos))
    }

    fn read_operator(&mut self) -> BridgeResult<Token> {
        const TWO_CHAR: [&str; 7] = ["==", "!=", "<>", "<=", ">=", "&&", "||"];
        if let Some(op) = TWO_CHAR.iter().find(|op| self.scanner.starts_with(op)) {
            return Ok(self.scanner.single(TokenKind::Operator, op.len()));
        }
        match self.scanner.current_char() {
            Some('=' | '<' | '>' | '+' | '-' | '*' | '/' | '%' | '!') => {
                Ok(self.scanner.single(TokenKind::Operator, 1))
            }
            _ => Err(self.scanner.unexpected_char()),
        }
    }
}

fn operand_position(previous: Option<&Token>) -> bool {
    match previous {
        None => true,
        Some(token) => matches!(
            token.kind,
            TokenKind::Operator
                | TokenKind::LeftParen
                | TokenKind::LeftBracket
                | TokenKind::LeftBrace
                | TokenKind::Comma
                | TokenKind::Colon
                | TokenKind::Semicolon
                | TokenKind::HintEnd
        ) || (token.kind == TokenKind::Identifier && is_operand_keyword(&token.text)),
    }
}

/// Keywords that are directly followed by an operand.
fn is_operand_keyword(word: &str) -> bool {
    ["LIMIT", "OFFSET", "AND", "OR", "NOT", "IN", "LIKE", "VALUES", "BY"]
        .iter()
        .any(|k| word.eq_ignore_ascii_case(k))
}
