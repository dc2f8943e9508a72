//! The contract every backend grammar implements.
//!
//! A backend supplies its lexer, parser, function table and emitter. The
//! pipeline entry points (`parse`, `inventory`, `materialize_and_emit`) are
//! provided on top of those and behave the same for every backend.

use crate::ast::{CommandNode, ParseResult};
use crate::error::{BridgeError, BridgeResult, Diagnostic, DiagnosticKind};
use crate::functions::FunctionTable;
use crate::inventory::{inventory, Inventory};
use crate::materialize::{materialize, ExtraArguments, MaterializedCommand};
use crate::token::{Position, Token};
use serde_json::Value;

pub trait Grammar {
    /// Backend-specific dispatch unit handed to the transport.
    type Unit;

    fn name(&self) -> &'static str;

    fn tokenize(&self, text: &str) -> BridgeResult<Vec<Token>>;

    fn parse_tokens(&self, tokens: Vec<Token>) -> BridgeResult<Vec<CommandNode>>;

    fn functions(&self) -> &FunctionTable;

    fn extra_arguments(&self) -> ExtraArguments {
        ExtraArguments::Tolerate
    }

    fn emit(&self, commands: Vec<MaterializedCommand>) -> BridgeResult<Vec<Self::Unit>>;

    /// Lexes and parses a raw statement. Failures end up as diagnostics on
    /// the result, never as a partial command list.
    fn parse(&self, text: &str) -> ParseResult {
        let parsed = self
            .tokenize(text)
            .and_then(|tokens| self.parse_tokens(tokens));

        match parsed {
            Ok(commands) => {
                let result = ParseResult::parsed(commands);
                tracing::debug!(
                    backend = self.name(),
                    commands = result.commands.len(),
                    placeholders = result.placeholder_count,
                    "parsed statement"
                );
                result
            }
            Err(err) => {
                let diagnostic = to_diagnostic(err);
                tracing::debug!(backend = self.name(), %diagnostic, "statement rejected");
                ParseResult::failed(diagnostic)
            }
        }
    }

    fn inventory(&self, result: &ParseResult) -> Inventory {
        inventory(&result.commands)
    }

    fn materialize_and_emit(&self, result: &ParseResult, args: &[Value]) -> BridgeResult<Vec<Self::Unit>> {
        self.materialize_and_emit_with(result, args, self.extra_arguments())
    }

    fn materialize_and_emit_with(
        &self,
        result: &ParseResult,
        args: &[Value],
        extra: ExtraArguments,
    ) -> BridgeResult<Vec<Self::Unit>> {
        let commands = materialize(result, args, self.functions(), extra)?;
        self.emit(commands)
    }
}

fn to_diagnostic(err: BridgeError) -> Diagnostic {
    match err.into_diagnostic() {
        Ok(diagnostic) => diagnostic,
        Err(other) => Diagnostic {
            kind: DiagnosticKind::Syntax,
            position: Position::default(),
            message: other.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::TokenCursor;
    use crate::literal::{parse_value, LiteralOptions};
    use crate::scanner::Scanner;
    use crate::token::TokenKind;
    use serde_json::json;

    /// `verb value; verb value` with JSON values.
    struct Toy {
        functions: FunctionTable,
    }

    impl Grammar for Toy {
        type Unit = (String, Value);

        fn name(&self) -> &'static str {
            "toy"
        }

        fn tokenize(&self, text: &str) -> BridgeResult<Vec<Token>> {
            let mut s = Scanner::new(text);
            let mut tokens = Vec::new();
            loop {
                s.skip_whitespace(false);
                let pos = s.position();
                let tok = match s.current_char() {
                    None => {
                        tokens.push(Token::eof(pos));
                        return Ok(tokens);
                    }
                    Some('"') => Token::new(TokenKind::String, s.read_quoted(false)?, pos),
                    Some(c) if c.is_ascii_digit() => s.read_number()?,
                    Some('?') => s.single(TokenKind::Placeholder, 1),
                    Some('{') => s.single(TokenKind::LeftBrace, 1),
                    Some('}') => s.single(TokenKind::RightBrace, 1),
                    Some(':') => s.single(TokenKind::Colon, 1),
                    Some(',') => s.single(TokenKind::Comma, 1),
                    Some(';') => s.single(TokenKind::Semicolon, 1),
                    Some(c) if c.is_alphabetic() => {
                        Token::new(TokenKind::Identifier, s.read_while(char::is_alphabetic), pos)
                    }
                    _ => return Err(s.unexpected_char()),
                };
                tokens.push(tok);
            }
        }

        fn parse_tokens(&self, tokens: Vec<Token>) -> BridgeResult<Vec<CommandNode>> {
            let mut cursor = TokenCursor::new(tokens);
            let mut commands = Vec::new();
            cursor.skip_separators();
            while !cursor.is_at_end() {
                let pos = cursor.current_position();
                let verb = cursor.expect_identifier()?;
                let body = parse_value(&mut cursor, LiteralOptions::json())?;
                commands.push(CommandNode::new(verb, pos).with_body(body));
                if !cursor.at_statement_end() {
                    return Err(cursor.unexpected("';'"));
                }
                cursor.skip_separators();
            }
            Ok(commands)
        }

        fn functions(&self) -> &FunctionTable {
            &self.functions
        }

        fn emit(&self, commands: Vec<MaterializedCommand>) -> BridgeResult<Vec<Self::Unit>> {
            Ok(commands
                .into_iter()
                .map(|c| (c.verb, c.body.unwrap_or(Value::Null)))
                .collect())
        }
    }

    fn toy() -> Toy {
        Toy {
            functions: FunctionTable::new(),
        }
    }

    #[test]
    fn test_pipeline() {
        let g = toy();
        let result = g.parse("put {\"a\": ?}; get ?");
        assert!(result.is_ok());
        assert_eq!(result.placeholder_count, 2);

        let inv = g.inventory(&result);
        assert_eq!(inv.counts.nested, 1);
        assert_eq!(inv.counts.command, 1);
        assert_eq!(inv, g.inventory(&result));

        let units = g.materialize_and_emit(&result, &[json!(1), json!("k")]).unwrap();
        assert_eq!(
            units,
            vec![
                ("put".to_string(), json!({"a": 1})),
                ("get".to_string(), json!("k"))
            ]
        );
    }

    #[test]
    fn test_syntax_error_becomes_diagnostic() {
        let result = toy().parse("put {\"a\": }");
        assert_eq!(result.number_of_syntax_errors(), 1);
        assert!(result.commands.is_empty());
        assert_eq!(result.diagnostics[0].position, Position::new(1, 11, 10));
    }

    #[test]
    fn test_lex_error_becomes_diagnostic() {
        let result = toy().parse("put #");
        assert_eq!(result.diagnostics[0].kind, DiagnosticKind::Lex);
        assert_eq!(result.diagnostics[0].position.column, 5);
    }

    #[test]
    fn test_strict_mode_rejects_surplus() {
        let g = toy();
        let result = g.parse("get ?");
        assert!(g.materialize_and_emit(&result, &[json!(1), json!(2)]).is_ok());
        assert!(g
            .materialize_and_emit_with(&result, &[json!(1), json!(2)], ExtraArguments::Reject)
            .is_err());
    }
}
