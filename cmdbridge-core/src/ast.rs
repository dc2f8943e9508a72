//! Command tree types shared by every grammar.

use crate::error::Diagnostic;
use crate::token::Position;
use crate::value::ValueTree;

/// One piece of a command target.
///
/// Search-engine paths, key-value arguments and SQL text are all stored as a
/// sequence of fragments: raw text copied through verbatim and literal values
/// (possibly placeholders) that get materialized.
#[derive(Debug, Clone, PartialEq)]
pub enum Fragment {
    Text(String),
    Value(ValueTree),
}

/// A `/*+ name=value */` statement hint.
#[derive(Debug, Clone, PartialEq)]
pub struct Hint {
    pub name: String,
    pub value: ValueTree,
}

/// One parsed unit of work within a statement.
///
/// Binding order within a node is hints, then target, then body, which is the
/// order in which those parts appear in the source text.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandNode {
    pub verb: String,
    pub target: Vec<Fragment>,
    pub hints: Vec<Hint>,
    pub body: Option<ValueTree>,
    pub position: Position,
}

impl CommandNode {
    pub fn new(verb: impl Into<String>, position: Position) -> Self {
        Self {
            verb: verb.into(),
            target: Vec::new(),
            hints: Vec::new(),
            body: None,
            position,
        }
    }

    pub fn with_target(mut self, target: Vec<Fragment>) -> Self {
        self.target = target;
        self
    }

    pub fn with_hints(mut self, hints: Vec<Hint>) -> Self {
        self.hints = hints;
        self
    }

    pub fn with_body(mut self, body: ValueTree) -> Self {
        self.body = Some(body);
        self
    }

    /// Target text with values shown as `?` or their literal form.
    pub fn target_display(&self) -> String {
        let mut out = String::new();
        for fragment in &self.target {
            match fragment {
                Fragment::Text(t) => out.push_str(t),
                Fragment::Value(ValueTree::Placeholder(_)) => out.push('?'),
                Fragment::Value(ValueTree::Str(s)) => out.push_str(s),
                Fragment::Value(ValueTree::Int(i)) => out.push_str(&i.to_string()),
                Fragment::Value(ValueTree::Float(f)) => out.push_str(&f.to_string()),
                Fragment::Value(other) => out.push_str(&format!("{:?}", other)),
            }
        }
        out
    }
}

/// Output of lexing and parsing one raw statement.
///
/// A result with diagnostics is terminal: no inventory-driven execution and no
/// materialization may run on it.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseResult {
    pub commands: Vec<CommandNode>,
    pub placeholder_count: usize,
    pub diagnostics: Vec<Diagnostic>,
}

impl ParseResult {
    pub fn parsed(commands: Vec<CommandNode>) -> Self {
        let placeholder_count = crate::inventory::inventory(&commands).counts.total();
        Self {
            commands,
            placeholder_count,
            diagnostics: Vec::new(),
        }
    }

    pub fn failed(diagnostic: Diagnostic) -> Self {
        Self {
            commands: Vec::new(),
            placeholder_count: 0,
            diagnostics: vec![diagnostic],
        }
    }

    pub fn number_of_syntax_errors(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_ok(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DiagnosticKind;
    use crate::value::PlaceholderKind;

    #[test]
    fn test_parsed_counts_placeholders() {
        let cmd = CommandNode::new("SET", Position::default()).with_target(vec![
            Fragment::Value(ValueTree::Str("key".into())),
            Fragment::Value(ValueTree::Placeholder(PlaceholderKind::Command)),
        ]);
        let result = ParseResult::parsed(vec![cmd]);
        assert_eq!(result.placeholder_count, 1);
        assert!(result.is_ok());
        assert_eq!(result.number_of_syntax_errors(), 0);
    }

    #[test]
    fn test_failed_result() {
        let result = ParseResult::failed(Diagnostic {
            kind: DiagnosticKind::Syntax,
            position: Position::new(1, 7, 6),
            message: "expected value".into(),
        });
        assert!(!result.is_ok());
        assert_eq!(result.number_of_syntax_errors(), 1);
        assert!(result.commands.is_empty());
    }

    #[test]
    fn test_target_display() {
        let cmd = CommandNode::new("GET", Position::default()).with_target(vec![
            Fragment::Text("/users/_doc/".into()),
            Fragment::Value(ValueTree::Placeholder(PlaceholderKind::Command)),
        ]);
        assert_eq!(cmd.target_display(), "/users/_doc/?");
    }
}
