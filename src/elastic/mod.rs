//! Search-engine backend.
//!
//! Statements are request lines in the style of the Elasticsearch console:
//!
//! ```text
//! /*+ overwrite_find_limit=10 */
//! POST /users/_search {"query": {"match": {"name": ?}}};
//! DELETE /users/_doc/?
//! ```
//!
//! Each statement becomes one [`ElasticRequest`].

pub mod emitter;
pub mod lexer;
pub mod parser;

pub use emitter::ElasticRequest;

use cmdbridge_core::{BridgeResult, CommandNode, FunctionTable, Grammar, MaterializedCommand, Token};
use emitter::emit_request;
use lexer::ElasticLexer;
use parser::ElasticParser;

#[derive(Debug, Clone, Default)]
pub struct ElasticGrammar {
    functions: FunctionTable,
    index_refresh: bool,
}

impl ElasticGrammar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `refresh=true` to document writes.
    pub fn with_index_refresh(mut self, index_refresh: bool) -> Self {
        self.index_refresh = index_refresh;
        self
    }
}

impl Grammar for ElasticGrammar {
    type Unit = ElasticRequest;

    fn name(&self) -> &'static str {
        "elastic"
    }

    fn tokenize(&self, text: &str) -> BridgeResult<Vec<Token>> {
        ElasticLexer::new(text).tokenize()
    }

    fn parse_tokens(&self, tokens: Vec<Token>) -> BridgeResult<Vec<CommandNode>> {
        ElasticParser::new(tokens).parse()
    }

    fn functions(&self) -> &FunctionTable {
        &self.functions
    }

    fn emit(&self, commands: Vec<MaterializedCommand>) -> BridgeResult<Vec<ElasticRequest>> {
        commands
            .into_iter()
            .map(|command| emit_request(command, self.index_refresh))
            .collect()
    }
}
