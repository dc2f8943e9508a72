use cmdbridge_core::{
    parse_value, BridgeError, BridgeResult, CommandNode, Fragment, LiteralOptions, ObjectKey,
    PlaceholderKind, Token, TokenCursor, TokenKind, ValueTree,
};

/// Body key holding the operation's positional arguments.
pub const ARGUMENTS_KEY: &str = "arguments";

/// Cursor methods that may follow an operation call.
pub const CURSOR_MODIFIERS: [&str; 8] = [
    "sort",
    "limit",
    "skip",
    "projection",
    "hint",
    "collation",
    "maxTimeMS",
    "batchSize",
];

/// Operations that return a cursor and so accept [`CURSOR_MODIFIERS`].
pub const CURSOR_OPERATIONS: [&str; 1] = ["find"];

/// Verbs for the non-call statements.
pub const SHOW_VERB: &str = "show";
pub const USE_VERB: &str = "use";

/// Parses mongo shell statements into command nodes.
///
/// A collection operation keeps the collection as its single target
/// fragment; a database operation has no target. The body is an object with
/// the call arguments under [`ARGUMENTS_KEY`] followed by any cursor
/// modifiers in source order.
pub struct MongoParser {
    cursor: TokenCursor,
}

impl MongoParser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            cursor: TokenCursor::new(tokens),
        }
    }

    fn options() -> LiteralOptions {
        LiteralOptions::relaxed().with_calls()
    }

    pub fn parse(&mut self) -> BridgeResult<Vec<CommandNode>> {
        let mut commands = Vec::new();

        self.cursor.skip_separators();
        while !self.cursor.is_at_end() {
            commands.push(self.parse_statement()?);

            if !self.cursor.at_statement_end() {
                return Err(self.cursor.unexpected("';' or end of line"));
            }
            self.cursor.skip_separators();
        }

        Ok(commands)
    }

    fn parse_statement(&mut self) -> BridgeResult<CommandNode> {
        let position = self.cursor.current_position();

        if self.cursor.eat_keyword(SHOW_VERB) {
            let what = self.cursor.expect_identifier()?;
            return Ok(CommandNode::new(SHOW_VERB, position)
                .with_target(vec![Fragment::Value(ValueTree::Str(what))]));
        }

        if self.cursor.eat_keyword(USE_VERB) {
            let name = match self.cursor.current_kind() {
                TokenKind::Identifier | TokenKind::String => ValueTree::Str(self.cursor.advance().text),
                TokenKind::Placeholder => {
                    self.cursor.advance();
                    ValueTree::Placeholder(PlaceholderKind::Command)
                }
                _ => return Err(self.cursor.unexpected("database name")),
            };
            return Ok(CommandNode::new(USE_VERB, position).with_target(vec![Fragment::Value(name)]));
        }

        if !self.cursor.eat_keyword("db") {
            return Err(self.cursor.unexpected("'db', 'show' or 'use'"));
        }

        let collection = self.parse_collection()?;

        let operation = self.cursor.expect_identifier()?;
        let args = self.parse_arguments()?;

        let mut body = vec![(ObjectKey::Name(ARGUMENTS_KEY.to_string()), ValueTree::Array(args))];

        while self.cursor.eat(TokenKind::Dot) {
            let modifier_token = self.cursor.current_token().clone();
            let modifier = self.cursor.expect_identifier()?;
            if !CURSOR_OPERATIONS.contains(&operation.as_str()) {
                return Err(BridgeError::syntax(
                    modifier_token.position,
                    format!("{}() does not return a cursor, '{}' is not allowed", operation, modifier),
                ));
            }
            if !CURSOR_MODIFIERS.contains(&modifier.as_str()) {
                return Err(BridgeError::syntax(
                    modifier_token.position,
                    format!("unsupported cursor method '{}'", modifier),
                ));
            }
            let mut args = self.parse_arguments()?;
            if args.len() != 1 {
                return Err(BridgeError::syntax(
                    modifier_token.position,
                    format!("{}() takes exactly one argument", modifier),
                ));
            }
            let value = args.remove(0);
            ValueTree::insert_entry(&mut body, ObjectKey::Name(modifier), value);
        }

        let target = match collection {
            Some(tree) => vec![Fragment::Value(tree)],
            None => Vec::new(),
        };

        Ok(CommandNode::new(operation, position)
            .with_target(target)
            .with_body(ValueTree::Object(body)))
    }

    /// Parses what follows `db`, leaving the cursor on the operation name.
    ///
    /// Returns `None` for database-level operations (`db.op(...)`).
    fn parse_collection(&mut self) -> BridgeResult<Option<ValueTree>> {
        if self.cursor.eat(TokenKind::LeftBracket) {
            let name = self.collection_name()?;
            self.cursor.expect(TokenKind::RightBracket)?;
            self.cursor.expect(TokenKind::Dot)?;
            return Ok(Some(name));
        }

        self.cursor.expect(TokenKind::Dot)?;

        if self.cursor.current_token().is_keyword("getCollection")
            && self.cursor.peek_token(1).is(TokenKind::LeftParen)
        {
            self.cursor.advance();
            self.cursor.expect(TokenKind::LeftParen)?;
            let name = self.collection_name()?;
            self.cursor.expect(TokenKind::RightParen)?;
            self.cursor.expect(TokenKind::Dot)?;
            return Ok(Some(name));
        }

        // db.op(...) is a database operation.
        if self.cursor.check(TokenKind::Identifier) && self.cursor.peek_token(1).is(TokenKind::LeftParen) {
            return Ok(None);
        }

        // Dotted collection names: db.system.users.find() -> "system.users".
        let mut parts = vec![self.cursor.expect_identifier()?];
        self.cursor.expect(TokenKind::Dot)?;
        while self.cursor.check(TokenKind::Identifier) && !self.cursor.peek_token(1).is(TokenKind::LeftParen) {
            parts.push(self.cursor.advance().text);
            self.cursor.expect(TokenKind::Dot)?;
        }
        Ok(Some(ValueTree::Str(parts.join("."))))
    }

    fn collection_name(&mut self) -> BridgeResult<ValueTree> {
        match self.cursor.current_kind() {
            TokenKind::String => Ok(ValueTree::Str(self.cursor.advance().text)),
            TokenKind::Placeholder => {
                self.cursor.advance();
                Ok(ValueTree::Placeholder(PlaceholderKind::Command))
            }
            _ => Err(self.cursor.unexpected("collection name")),
        }
    }

    /// `( value, ... )`
    fn parse_arguments(&mut self) -> BridgeResult<Vec<ValueTree>> {
        self.cursor.expect(TokenKind::LeftParen)?;
        let mut args = Vec::new();

        while !self.cursor.check(TokenKind::RightParen) {
            args.push(parse_value(&mut self.cursor, Self::options())?);
            if !self.cursor.eat(TokenKind::Comma) {
                break;
            }
        }
        self.cursor.expect(TokenKind::RightParen)?;

        Ok(args)
    }
}
