//! Placeholder inventory pass.
//!
//! Walks the command tree once without touching any argument values. The
//! result describes the statement's shape (how many arguments it needs and
//! which commands it holds) and is identical no matter how often it runs.

use crate::ast::{CommandNode, Fragment};
use crate::value::{ObjectKey, PlaceholderKind, ValueTree};
use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PlaceholderCounts {
    pub command: usize,
    pub nested: usize,
}

impl PlaceholderCounts {
    /// Number of arguments a full binding consumes.
    pub fn total(&self) -> usize {
        self.command + self.nested
    }

    fn record(&mut self, kind: PlaceholderKind) {
        match kind {
            PlaceholderKind::Command => self.command += 1,
            PlaceholderKind::Nested => self.nested += 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Inventory {
    pub counts: PlaceholderCounts,
    /// Placeholders per command, in command order.
    pub per_command: Vec<usize>,
    pub commands: Vec<CommandNode>,
}

impl Inventory {
    pub fn count(&self) -> usize {
        self.counts.total()
    }

    pub fn command_count(&self) -> usize {
        self.commands.len()
    }
}

pub fn inventory(commands: &[CommandNode]) -> Inventory {
    let mut counts = PlaceholderCounts::default();
    let mut per_command = Vec::with_capacity(commands.len());

    for command in commands {
        let mut local = PlaceholderCounts::default();
        count_command(command, &mut local);
        per_command.push(local.total());
        counts.command += local.command;
        counts.nested += local.nested;
    }

    Inventory {
        counts,
        per_command,
        commands: commands.to_vec(),
    }
}

fn count_command(command: &CommandNode, counts: &mut PlaceholderCounts) {
    for hint in &command.hints {
        count_tree(&hint.value, counts);
    }
    for fragment in &command.target {
        if let Fragment::Value(tree) = fragment {
            count_tree(tree, counts);
        }
    }
    if let Some(body) = &command.body {
        count_tree(body, counts);
    }
}

fn count_tree(tree: &ValueTree, counts: &mut PlaceholderCounts) {
    match tree {
        ValueTree::Placeholder(kind) => counts.record(*kind),
        ValueTree::Array(items) => {
            for item in items {
                count_tree(item, counts);
            }
        }
        ValueTree::Object(entries) => {
            for (key, value) in entries {
                if let ObjectKey::Placeholder(kind) = key {
                    counts.record(*kind);
                }
                count_tree(value, counts);
            }
        }
        ValueTree::Call { args, .. } => {
            for arg in args {
                count_tree(arg, counts);
            }
        }
        ValueTree::Null
        | ValueTree::Bool(_)
        | ValueTree::Int(_)
        | ValueTree::Float(_)
        | ValueTree::Str(_) => {}
    }
}
