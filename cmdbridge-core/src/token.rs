use serde::Serialize;

/// Location of a token in the raw statement text.
///
/// `line` and `column` are 1-based; `offset` is the 0-based character index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
    pub offset: usize,
}

impl Position {
    pub fn new(line: usize, column: usize, offset: usize) -> Self {
        Self {
            line,
            column,
            offset,
        }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::new(1, 1, 0)
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Literals and identifiers
    Identifier,
    String,  // text holds the unescaped content, quotes stripped
    Integer, // text holds the literal as written
    Float,
    Boolean,
    Null,
    Placeholder, // ?

    // Backend-specific runs of text
    Path,     // /index/_doc/1 (search engine request line)
    Operator, // =, ==, !=, <, <=, >, >=, +, -, *, /, %

    // Hint block
    HintStart, // /*+
    HintEnd,   // */

    // Delimiters
    LeftBrace,    // {
    RightBrace,   // }
    LeftBracket,  // [
    RightBracket, // ]
    LeftParen,    // (
    RightParen,   // )
    Comma,        // ,
    Colon,        // :
    Dot,          // .
    Semicolon,    // ;
    Newline,      // statement separator for line-oriented grammars

    // Special
    Eof,
}

impl TokenKind {
    /// Human readable name used in syntax errors.
    pub fn describe(&self) -> &'static str {
        match self {
            TokenKind::Identifier => "identifier",
            TokenKind::String => "string",
            TokenKind::Integer => "integer",
            TokenKind::Float => "float",
            TokenKind::Boolean => "boolean",
            TokenKind::Null => "null",
            TokenKind::Placeholder => "'?'",
            TokenKind::Path => "path",
            TokenKind::Operator => "operator",
            TokenKind::HintStart => "'/*+'",
            TokenKind::HintEnd => "'*/'",
            TokenKind::LeftBrace => "'{'",
            TokenKind::RightBrace => "'}'",
            TokenKind::LeftBracket => "'['",
            TokenKind::RightBracket => "']'",
            TokenKind::LeftParen => "'('",
            TokenKind::RightParen => "')'",
            TokenKind::Comma => "','",
            TokenKind::Colon => "':'",
            TokenKind::Dot => "'.'",
            TokenKind::Semicolon => "';'",
            TokenKind::Newline => "end of line",
            TokenKind::Eof => "end of input",
        }
    }

    /// Tokens that may start a value literal.
    pub fn starts_value(&self) -> bool {
        matches!(
            self,
            TokenKind::String
                | TokenKind::Integer
                | TokenKind::Float
                | TokenKind::Boolean
                | TokenKind::Null
                | TokenKind::Placeholder
                | TokenKind::LeftBrace
                | TokenKind::LeftBracket
        )
    }
}

/// A lexical token. Immutable once produced by a lexer.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub position: Position,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, position: Position) -> Self {
        Self {
            kind,
            text: text.into(),
            position,
        }
    }

    pub fn eof(position: Position) -> Self {
        Self::new(TokenKind::Eof, "", position)
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }

    /// Case-insensitive keyword check against an identifier token.
    pub fn is_keyword(&self, keyword: &str) -> bool {
        self.kind == TokenKind::Identifier && self.text.eq_ignore_ascii_case(keyword)
    }

    pub fn describe(&self) -> String {
        match self.kind {
            TokenKind::Eof | TokenKind::Newline => self.kind.describe().to_string(),
            TokenKind::String => format!("string \"{}\"", self.text),
            _ => format!("'{}'", self.text),
        }
    }
}
