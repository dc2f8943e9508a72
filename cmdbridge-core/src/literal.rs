//! Value literal parser shared by the grammars.
//!
//! Parses JSON-like literals (objects, arrays, scalars, placeholders and,
//! where a grammar allows them, constructor calls) from a [`TokenCursor`]
//! into a [`ValueTree`].

use crate::cursor::TokenCursor;
use crate::error::{BridgeError, BridgeResult};
use crate::token::TokenKind;
use crate::value::{ObjectKey, PlaceholderKind, ValueTree};

/// Grammar-specific relaxations of strict JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct LiteralOptions {
    /// Unquoted identifiers are accepted as object keys.
    pub bare_keys: bool,
    /// `name(args...)` is parsed as a [`ValueTree::Call`].
    pub calls: bool,
    /// A trailing comma before `}` or `]` is accepted.
    pub trailing_commas: bool,
}

impl LiteralOptions {
    pub fn json() -> Self {
        Self::default()
    }

    pub fn relaxed() -> Self {
        Self {
            bare_keys: true,
            calls: false,
            trailing_commas: true,
        }
    }

    pub fn with_calls(mut self) -> Self {
        self.calls = true;
        self
    }
}

/// Parses one value standing for a whole operand. A `?` here is a
/// command-level placeholder.
pub fn parse_value(cursor: &mut TokenCursor, options: LiteralOptions) -> BridgeResult<ValueTree> {
    parse_value_as(cursor, options, PlaceholderKind::Command)
}

fn parse_nested(cursor: &mut TokenCursor, options: LiteralOptions) -> BridgeResult<ValueTree> {
    parse_value_as(cursor, options, PlaceholderKind::Nested)
}

fn parse_value_as(
    cursor: &mut TokenCursor,
    options: LiteralOptions,
    placeholder: PlaceholderKind,
) -> BridgeResult<ValueTree> {
    let token = cursor.current_token().clone();
    match token.kind {
        TokenKind::LeftBrace => parse_object(cursor, options),
        TokenKind::LeftBracket => parse_array(cursor, options),
        TokenKind::String => {
            cursor.advance();
            Ok(ValueTree::Str(token.text))
        }
        TokenKind::Integer | TokenKind::Float => {
            cursor.advance();
            number(&token.text, token.position)
        }
        TokenKind::Operator if token.text == "-" => {
            let next = cursor.peek_token(1).clone();
            if matches!(next.kind, TokenKind::Integer | TokenKind::Float) {
                cursor.advance();
                cursor.advance();
                number(&format!("-{}", next.text), token.position)
            } else {
                Err(cursor.unexpected("value"))
            }
        }
        TokenKind::Boolean => {
            cursor.advance();
            Ok(ValueTree::Bool(token.text.eq_ignore_ascii_case("true")))
        }
        TokenKind::Null => {
            cursor.advance();
            Ok(ValueTree::Null)
        }
        TokenKind::Placeholder => {
            cursor.advance();
            Ok(ValueTree::Placeholder(placeholder))
        }
        TokenKind::Identifier if options.calls => parse_call(cursor, options),
        _ => Err(cursor.unexpected("value")),
    }
}

fn number(text: &str, position: crate::token::Position) -> BridgeResult<ValueTree> {
    ValueTree::from_number_literal(text).map_err(|message| BridgeError::syntax(position, message))
}

fn parse_object(cursor: &mut TokenCursor, options: LiteralOptions) -> BridgeResult<ValueTree> {
    cursor.expect(TokenKind::LeftBrace)?;
    let mut entries = Vec::new();

    loop {
        if cursor.eat(TokenKind::RightBrace) {
            break;
        }

        let key = match cursor.current_kind() {
            TokenKind::String => ObjectKey::Name(cursor.advance().text),
            TokenKind::Placeholder => {
                cursor.advance();
                ObjectKey::Placeholder(PlaceholderKind::Nested)
            }
            TokenKind::Identifier
            | TokenKind::Boolean
            | TokenKind::Null
            | TokenKind::Integer
                if options.bare_keys =>
            {
                ObjectKey::Name(cursor.advance().text)
            }
            _ => return Err(cursor.unexpected("object key")),
        };

        cursor.expect(TokenKind::Colon)?;
        let value = parse_nested(cursor, options)?;
        ValueTree::insert_entry(&mut entries, key, value);

        if cursor.eat(TokenKind::Comma) {
            if !options.trailing_commas && cursor.check(TokenKind::RightBrace) {
                return Err(cursor.unexpected("object key"));
            }
            continue;
        }
        if cursor.eat(TokenKind::RightBrace) {
            break;
        }
        return Err(cursor.unexpected("',' or '}'"));
    }

    Ok(ValueTree::Object(entries))
}

fn parse_array(cursor: &mut TokenCursor, options: LiteralOptions) -> BridgeResult<ValueTree> {
    cursor.expect(TokenKind::LeftBracket)?;
    let mut items = Vec::new();

    loop {
        if cursor.eat(TokenKind::RightBracket) {
            break;
        }

        items.push(parse_nested(cursor, options)?);

        if cursor.eat(TokenKind::Comma) {
            if !options.trailing_commas && cursor.check(TokenKind::RightBracket) {
                return Err(cursor.unexpected("value"));
            }
            continue;
        }
        if cursor.eat(TokenKind::RightBracket) {
            break;
        }
        return Err(cursor.unexpected("',' or ']'"));
    }

    Ok(ValueTree::Array(items))
}

/// `Name(arg, ...)`, optionally preceded by `new`.
fn parse_call(cursor: &mut TokenCursor, options: LiteralOptions) -> BridgeResult<ValueTree> {
    if cursor.current_token().is_keyword("new") && cursor.peek_token(1).is(TokenKind::Identifier) {
        cursor.advance();
    }

    let name_token = cursor.current_token().clone();
    if !cursor.peek_token(1).is(TokenKind::LeftParen) {
        return Err(cursor.unexpected("value"));
    }
    cursor.advance();
    cursor.expect(TokenKind::LeftParen)?;

    let mut args = Vec::new();
    while !cursor.check(TokenKind::RightParen) {
        args.push(parse_nested(cursor, options)?);
        if !cursor.eat(TokenKind::Comma) {
            break;
        }
    }
    cursor.expect(TokenKind::RightParen)?;

    Ok(ValueTree::Call {
        name: name_token.text,
        args,
    })
}
