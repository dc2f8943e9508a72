//! Key-value backend.
//!
//! One command per line or `;`-separated statement, e.g. `SET user:? ?`.
//! Every argument becomes a string.

pub mod emitter;
pub mod lexer;
pub mod parser;

pub use emitter::RedisCommand;

use cmdbridge_core::{BridgeResult, CommandNode, FunctionTable, Grammar, MaterializedCommand, Token};
use emitter::emit_command;
use lexer::RedisLexer;
use parser::RedisParser;

#[derive(Debug, Clone, Default)]
pub struct RedisGrammar {
    functions: FunctionTable,
}

impl RedisGrammar {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Grammar for RedisGrammar {
    type Unit = RedisCommand;

    fn name(&self) -> &'static str {
        "redis"
    }

    fn tokenize(&self, text: &str) -> BridgeResult<Vec<Token>> {
        RedisLexer::new(text).tokenize()
    }

    fn parse_tokens(&self, tokens: Vec<Token>) -> BridgeResult<Vec<CommandNode>> {
        RedisParser::new(tokens).parse()
    }

    fn functions(&self) -> &FunctionTable {
        &self.functions
    }

    fn emit(&self, commands: Vec<MaterializedCommand>) -> BridgeResult<Vec<RedisCommand>> {
        commands.into_iter().map(emit_command).collect()
    }
}
