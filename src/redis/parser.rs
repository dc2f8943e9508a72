use cmdbridge_core::{
    BridgeResult, CommandNode, Fragment, PlaceholderKind, Token, TokenCursor, TokenKind, ValueTree,
};

pub struct RedisParser {
    cursor: TokenCursor,
}

impl RedisParser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            cursor: TokenCursor::new(tokens),
        }
    }

    pub fn parse(&mut self) -> BridgeResult<Vec<CommandNode>> {
        let mut commands = Vec::new();

        self.cursor.skip_separators();
        while !self.cursor.is_at_end() {
            commands.push(self.parse_command()?);
            self.cursor.skip_separators();
        }

        Ok(commands)
    }

    fn parse_command(&mut self) -> BridgeResult<CommandNode> {
        let name = self.cursor.current_token().clone();
        if name.kind != TokenKind::Identifier {
            return Err(self.cursor.unexpected("command name"));
        }
        self.cursor.advance();

        let mut args = Vec::new();
        while !self.cursor.at_statement_end() {
            let token = self.cursor.advance();
            let value = match token.kind {
                TokenKind::Placeholder => ValueTree::Placeholder(PlaceholderKind::Command),
                _ => ValueTree::Str(token.text),
            };
            args.push(Fragment::Value(value));
        }

        Ok(CommandNode::new(name.text.to_ascii_uppercase(), name.position).with_target(args))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::redis::lexer::RedisLexer;

    fn parse(input: &str) -> BridgeResult<Vec<CommandNode>> {
        let tokens = RedisLexer::new(input).tokenize()?;
        RedisParser::new(tokens).parse()
    }

    #[test]
    fn test_set_with_placeholder() {
        let cmds = parse("set key ?").unwrap();
        assert_eq!(cmds[0].verb, "SET");
        assert_eq!(
            cmds[0].target,
            vec![
                Fragment::Value(ValueTree::Str("key".into())),
                Fragment::Value(ValueTree::Placeholder(PlaceholderKind::Command)),
            ]
        );
    }

    #[test]
    fn test_statements_split_on_newline_and_semicolon() {
        let cmds = parse("SET a 1; SET b 2\n\nGET a\n").unwrap();
        let verbs: Vec<&str> = cmds.iter().map(|c| c.verb.as_str()).collect();
        assert_eq!(verbs, vec!["SET", "SET", "GET"]);
        assert_eq!(cmds[2].position.line, 3);
    }

    #[test]
    fn test_command_name_must_be_a_word() {
        let err = parse("\"SET\" a b").unwrap_err();
        assert!(err.to_string().contains("expected command name"));

        assert!(parse("? a").is_err());
    }

    #[test]
    fn test_empty_statement() {
        assert!(parse("  ;\n").unwrap().is_empty());
    }
}
