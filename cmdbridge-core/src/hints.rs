//! Leading `/*+ ... */` hint blocks.

use crate::ast::Hint;
use crate::cursor::TokenCursor;
use crate::error::BridgeResult;
use crate::literal::{parse_value, LiteralOptions};
use crate::token::TokenKind;
use crate::value::ValueTree;

/// Parses `/*+ name[=value] (;|,) ... */`. A bare name means `true`, a bare
/// word value is taken as a string.
pub fn parse_hints(cursor: &mut TokenCursor) -> BridgeResult<Vec<Hint>> {
    cursor.expect(TokenKind::HintStart)?;
    let mut hints = Vec::new();

    loop {
        while cursor.eat(TokenKind::Semicolon) || cursor.eat(TokenKind::Comma) {}
        if cursor.eat(TokenKind::HintEnd) {
            break;
        }

        let name = cursor.expect_identifier()?;
        let value = if cursor.check_operator("=") {
            cursor.advance();
            if cursor.check(TokenKind::Identifier) {
                ValueTree::Str(cursor.advance().text)
            } else {
                parse_value(cursor, LiteralOptions::relaxed())?
            }
        } else {
            ValueTree::Bool(true)
        };
        hints.push(Hint { name, value });

        if !matches!(
            cursor.current_kind(),
            TokenKind::Semicolon | TokenKind::Comma | TokenKind::HintEnd
        ) {
            return Err(cursor.unexpected("'*/'"));
        }
    }

    Ok(hints)
}
