use cmdbridge_core::{
    parse_hints, parse_value, BridgeError, BridgeResult, CommandNode, Fragment, LiteralOptions,
    Position, Token, TokenCursor, TokenKind, ValueTree,
};

/// Keywords a statement may start with.
pub const STATEMENT_KEYWORDS: [&str; 17] = [
    "SELECT", "INSERT", "UPSERT", "DELETE", "CREATE", "DROP", "ALTER", "SHOW", "LOAD", "RELEASE",
    "RENAME", "GRANT", "REVOKE", "COUNT", "USE", "DESC", "DESCRIBE",
];

/// Where the previous piece of SQL text ended, for re-spacing.
#[derive(Clone, Copy)]
enum Previous {
    Start,
    /// Raw token ending at this character offset.
    Raw(usize),
    /// A literal value whose source length is not tracked.
    Value,
}

/// Accumulates the statement as text runs and literal values.
struct SqlText {
    fragments: Vec<Fragment>,
    text: String,
    previous: Previous,
}

impl SqlText {
    fn new() -> Self {
        Self {
            fragments: Vec::new(),
            text: String::new(),
            previous: Previous::Start,
        }
    }

    /// One space wherever the source had whitespace between tokens.
    fn separate(&mut self, token: &Token) {
        let spaced = match self.previous {
            Previous::Start => false,
            Previous::Raw(end) => token.position.offset > end,
            Previous::Value => !matches!(
                token.kind,
                TokenKind::RightParen | TokenKind::RightBracket | TokenKind::Comma | TokenKind::Dot
            ),
        };
        if spaced {
            self.text.push(' ');
        }
    }

    fn push_token(&mut self, token: &Token, text: &str) {
        self.separate(token);
        self.text.push_str(text);
        self.previous = Previous::Raw(token.position.offset + token.text.chars().count());
    }

    fn push_value(&mut self, value: ValueTree) {
        if !self.text.is_empty() {
            self.fragments.push(Fragment::Text(std::mem::take(&mut self.text)));
        }
        self.fragments.push(Fragment::Value(value));
        self.previous = Previous::Value;
    }

    fn finish(mut self) -> Vec<Fragment> {
        if !self.text.is_empty() {
            self.fragments.push(Fragment::Text(self.text));
        }
        self.fragments
    }
}

/// Parses SQL-like statements into command nodes whose target is the
/// statement text split into raw runs and literal values.
///
/// The statement is not analysed beyond its leading keyword and bracket
/// balance; the server parses the rest. Inside a `WHERE` clause a bare `=`
/// becomes `==`.
pub struct MilvusParser {
    cursor: TokenCursor,
}

impl MilvusParser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            cursor: TokenCursor::new(tokens),
        }
    }

    pub fn parse(&mut self) -> BridgeResult<Vec<CommandNode>> {
        let mut commands = Vec::new();

        self.cursor.skip_separators();
        while !self.cursor.is_at_end() {
            commands.push(self.parse_statement()?);
            self.cursor.skip_separators();
        }

        Ok(commands)
    }

    fn parse_statement(&mut self) -> BridgeResult<CommandNode> {
        let hints = if self.cursor.check(TokenKind::HintStart) {
            parse_hints(&mut self.cursor)?
        } else {
            Vec::new()
        };

        let keyword = self.cursor.current_token().clone();
        if keyword.kind != TokenKind::Identifier {
            return Err(self.cursor.unexpected("statement keyword"));
        }
        if !STATEMENT_KEYWORDS.iter().any(|k| keyword.text.eq_ignore_ascii_case(k)) {
            return Err(BridgeError::syntax(
                keyword.position,
                format!("unsupported statement '{}'", keyword.text),
            ));
        }

        let mut sql = SqlText::new();
        let mut open_parens: Vec<Position> = Vec::new();
        let mut in_where = false;

        while !self.cursor.at_statement_end() {
            let token = self.cursor.current_token().clone();
            match token.kind {
                k if k.starts_value() => {
                    sql.separate(&token);
                    let value = parse_value(&mut self.cursor, LiteralOptions::relaxed())?;
                    sql.push_value(value);
                    continue;
                }
                TokenKind::LeftParen => open_parens.push(token.position),
                TokenKind::RightParen => {
                    if open_parens.pop().is_none() {
                        return Err(BridgeError::syntax(token.position, "unbalanced ')'"));
                    }
                }
                TokenKind::RightBracket | TokenKind::RightBrace | TokenKind::Colon => {
                    return Err(self.cursor.unexpected("SQL text"));
                }
                TokenKind::HintStart | TokenKind::HintEnd => {
                    return Err(self.cursor.unexpected("SQL text"));
                }
                TokenKind::Identifier if token.is_keyword("WHERE") => in_where = true,
                _ => {}
            }

            let text = if in_where && token.kind == TokenKind::Operator && token.text == "=" {
                "=="
            } else {
                token.text.as_str()
            };
            sql.push_token(&token, text);
            self.cursor.advance();
        }

        if let Some(position) = open_parens.pop() {
            return Err(BridgeError::syntax(position, "unclosed '('"));
        }

        Ok(CommandNode::new(keyword.text.to_ascii_uppercase(), keyword.position)
            .with_hints(hints)
            .with_target(sql.finish()))
    }
}
