//! Vector-database backend.
//!
//! SQL-like statements, one per `;`:
//!
//! ```text
//! /*+ consistency_level=Strong */
//! SELECT id FROM items WHERE tag = ? AND score > ? LIMIT 10
//! ```
//!
//! Each statement becomes one [`MilvusQuery`] with the literals written back
//! into the text.

pub mod emitter;
pub mod lexer;
pub mod parser;

pub use emitter::MilvusQuery;

use cmdbridge_core::{BridgeResult, CommandNode, FunctionTable, Grammar, MaterializedCommand, Token};
use emitter::emit_query;
use lexer::MilvusLexer;
use parser::MilvusParser;

#[derive(Debug, Clone, Default)]
pub struct MilvusGrammar {
    functions: FunctionTable,
}

impl MilvusGrammar {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Grammar for MilvusGrammar {
    type Unit = MilvusQuery;

    fn name(&self) -> &'static str {
        "milvus"
    }

    fn tokenize(&self, text: &str) -> BridgeResult<Vec<Token>> {
        MilvusLexer::new(text).tokenize()
    }

    fn parse_tokens(&self, tokens: Vec<Token>) -> BridgeResult<Vec<CommandNode>> {
        MilvusParser::new(tokens).parse()
    }

    fn functions(&self) -> &FunctionTable {
        &self.functions
    }

    fn emit(&self, commands: Vec<MaterializedCommand>) -> BridgeResult<Vec<MilvusQuery>> {
        commands.into_iter().map(emit_query).collect()
    }
}
