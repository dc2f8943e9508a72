use super::lexer::METHODS;
use cmdbridge_core::{
    parse_hints, parse_value, BridgeError, BridgeResult, CommandNode, Fragment, LiteralOptions,
    PlaceholderKind, Token, TokenCursor, TokenKind, ValueTree,
};

/// Endpoints whose request body is newline-delimited JSON.
pub const NDJSON_ENDPOINTS: [&str; 2] = ["_msearch", "_bulk"];

/// True when a segment of the path, before any query string, equals one of `names`.
pub fn has_endpoint(path: &str, names: &[&str]) -> bool {
    let endpoint = path.split('?').next().unwrap_or(path);
    endpoint.split('/').any(|segment| names.contains(&segment))
}

pub struct ElasticParser {
    cursor: TokenCursor,
}

impl ElasticParser {
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

            if !self.cursor.at_statement_end() {
                return Err(self.cursor.unexpected("';' or end of input"));
            }
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

        let method_token = self.cursor.current_token().clone();
        let is_method = method_token.kind == TokenKind::Identifier
            && METHODS.iter().any(|m| method_token.text.eq_ignore_ascii_case(m));
        if !is_method {
            return Err(self.cursor.unexpected("HTTP method"));
        }
        self.cursor.advance();

        let target = self.parse_path()?;
        let path: String = target
            .iter()
            .map(|f| match f {
                Fragment::Text(t) => t.as_str(),
                Fragment::Value(_) => "*",
            })
            .collect();
        let ndjson = has_endpoint(&path, &NDJSON_ENDPOINTS);

        let mut bodies = Vec::new();
        while !self.cursor.at_statement_end() {
            if bodies.len() == 1 && !ndjson {
                return Err(BridgeError::syntax(
                    self.cursor.current_position(),
                    "multiple bodies are only allowed for _msearch and _bulk",
                ));
            }
            bodies.push(parse_value(&mut self.cursor, LiteralOptions::relaxed())?);
        }

        let mut command = CommandNode::new(method_token.text.to_ascii_uppercase(), method_token.position)
            .with_target(target)
            .with_hints(hints);

        if ndjson && !bodies.is_empty() {
            command = command.with_body(ValueTree::Array(bodies));
        } else if let Some(body) = bodies.pop() {
            command = command.with_body(body);
        }

        Ok(command)
    }

    /// Collects the contiguous run of path text and placeholders.
    fn parse_path(&mut self) -> BridgeResult<Vec<Fragment>> {
        let mut target = Vec::new();
        let mut end_offset: Option<usize> = None;

        loop {
            let token = self.cursor.current_token();
            let adjacent = end_offset.map_or(true, |end| token.position.offset == end);
            if !adjacent {
                break;
            }
            match token.kind {
                TokenKind::Path => {
                    end_offset = Some(token.position.offset + token.text.chars().count());
                    target.push(Fragment::Text(token.text.clone()));
                }
                TokenKind::Placeholder => {
                    end_offset = Some(token.position.offset + 1);
                    target.push(Fragment::Value(ValueTree::Placeholder(PlaceholderKind::Command)));
                }
                _ => break,
            }
            self.cursor.advance();
        }

        if target.is_empty() {
            return Err(self.cursor.unexpected("request path"));
        }
        Ok(target)
    }
}
