//! cmdbridge Core - Backend-independent statement pipeline.
//!
//! This crate holds everything the command translation layer shares across
//! backends: tokens and positions, the literal value tree, the command tree,
//! the placeholder inventory and materialization passes, and the [`Grammar`]
//! trait a backend implements to plug into that pipeline.
//!
//! # Main Components
//!
//! - **Scanner / TokenCursor**: building blocks for hand-written lexers and parsers
//! - **ValueTree**: parsed literal with placeholder markers
//! - **Inventory**: counts placeholders without touching arguments
//! - **Materialize**: binds ordered arguments into native JSON documents
//! - **Grammar**: `parse` / `inventory` / `materialize_and_emit` per backend

pub mod ast;
pub mod cursor;
pub mod error;
pub mod functions;
pub mod grammar;
pub mod hints;
pub mod inventory;
pub mod literal;
pub mod materialize;
pub mod scanner;
pub mod token;
pub mod value;

// Re-export main types for convenience
pub use ast::{CommandNode, Fragment, Hint, ParseResult};
pub use cursor::TokenCursor;
pub use error::{BindError, BridgeError, BridgeResult, Diagnostic, DiagnosticKind};
pub use functions::FunctionTable;
pub use grammar::Grammar;
pub use hints::parse_hints;
pub use inventory::{inventory, Inventory, PlaceholderCounts};
pub use literal::{parse_value, LiteralOptions};
pub use materialize::{materialize, ExtraArguments, MaterializedCommand, NativeFragment};
pub use scanner::Scanner;
pub use token::{Position, Token, TokenKind};
pub use value::{canonical_string, ObjectKey, PlaceholderKind, ValueTree};
