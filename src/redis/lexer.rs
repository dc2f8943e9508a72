use cmdbridge_core::{BridgeResult, Scanner, Token, TokenKind};

/// Lexer for `COMMAND arg arg ...` lines.
///
/// Unquoted words are kept verbatim as identifier tokens, numbers included.
/// A lone `?` is a placeholder; a `?` inside a word is ordinary text.
pub struct RedisLexer {
    scanner: Scanner,
}

impl RedisLexer {
    pub fn new(input: &str) -> Self {
        Self {
            scanner: Scanner::new(input),
        }
    }

    pub fn tokenize(&mut self) -> BridgeResult<Vec<Token>> {
        let mut tokens = Vec::new();

        loop {
            self.scanner.skip_whitespace(true);
            let pos = self.scanner.position();

            let token = match self.scanner.current_char() {
                None => {
                    tokens.push(Token::eof(pos));
                    return Ok(tokens);
                }
                Some('\n') => self.scanner.single(TokenKind::Newline, 1),
                Some(';') => self.scanner.single(TokenKind::Semicolon, 1),
                Some('"') | Some('\'') => {
                    Token::new(TokenKind::String, self.scanner.read_quoted(false)?, pos)
                }
                Some('?') if self.word_ends_at(1) => self.scanner.single(TokenKind::Placeholder, 1),
                Some(_) => {
                    let word = self
                        .scanner
                        .read_while(|c| !c.is_whitespace() && c != ';' && c != '"' && c != '\'');
                    Token::new(TokenKind::Identifier, word, pos)
                }
            };
            tokens.push(token);
        }
    }

    fn word_ends_at(&self, offset: usize) -> bool {
        match self.scanner.peek_at(offset) {
            None => true,
            Some(c) => c.is_whitespace() || c == ';',
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(input: &str) -> Vec<(TokenKind, String)> {
        RedisLexer::new(input)
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|t| (t.kind, t.text))
            .collect()
    }

    #[test]
    fn test_words_are_verbatim() {
        let tokens = lex("SET user:1 1.50");
        assert_eq!(tokens[0], (TokenKind::Identifier, "SET".to_string()));
        assert_eq!(tokens[1], (TokenKind::Identifier, "user:1".to_string()));
        assert_eq!(tokens[2], (TokenKind::Identifier, "1.50".to_string()));
        assert_eq!(tokens[3].0, TokenKind::Eof);
    }

    #[test]
    fn test_placeholders() {
        let tokens = lex("HSET ? field? ?");
        assert_eq!(tokens[1].0, TokenKind::Placeholder);
        assert_eq!(tokens[2], (TokenKind::Identifier, "field?".to_string()));
        assert_eq!(tokens[3].0, TokenKind::Placeholder);
    }

    #[test]
    fn test_quoted_and_separators() {
        let tokens = lex("SET k \"hello world\";GET k\nDEL k");
        assert_eq!(tokens[2], (TokenKind::String, "hello world".to_string()));
        assert_eq!(tokens[3].0, TokenKind::Semicolon);
        assert_eq!(tokens[6].0, TokenKind::Newline);
    }

    #[test]
    fn test_unterminated_quote() {
        assert!(RedisLexer::new("SET k 'oops").tokenize().is_err());
    }
}
