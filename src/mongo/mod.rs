//! Document-database backend.
//!
//! Statements follow the mongo shell:
//!
//! ```text
//! use shop
//! db.orders.find({status: ?, placed: {$gte: ISODate(?)}}).sort({placed: -1}).limit(?)
//! ```
//!
//! Each call becomes one [`MongoCommand`] holding a database command
//! document. Shell constructors such as `ObjectId` and `ISODate` are
//! evaluated during binding into Extended JSON.

pub mod emitter;
pub mod functions;
pub mod lexer;
pub mod parser;

pub use emitter::MongoCommand;

use cmdbridge_core::{BridgeResult, CommandNode, FunctionTable, Grammar, MaterializedCommand, Token};
use emitter::emit_commands;
use functions::mongo_functions;
use lexer::MongoLexer;
use parser::MongoParser;

#[derive(Debug, Clone)]
pub struct MongoGrammar {
    functions: FunctionTable,
    database: Option<String>,
}

impl Default for MongoGrammar {
    fn default() -> Self {
        Self {
            functions: mongo_functions(),
            database: None,
        }
    }
}

impl MongoGrammar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Database used until a `use` statement selects another.
    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }
}

impl Grammar for MongoGrammar {
    type Unit = MongoCommand;

    fn name(&self) -> &'static str {
        "mongo"
    }

    fn tokenize(&self, text: &str) -> BridgeResult<Vec<Token>> {
        MongoLexer::new(text).tokenize()
    }

    fn parse_tokens(&self, tokens: Vec<Token>) -> BridgeResult<Vec<CommandNode>> {
        MongoParser::new(tokens).parse()
    }

    fn functions(&self) -> &FunctionTable {
        &self.functions
    }

    fn emit(&self, commands: Vec<MaterializedCommand>) -> BridgeResult<Vec<MongoCommand>> {
        emit_commands(commands, self.database.clone())
    }
}
