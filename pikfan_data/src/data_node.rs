//! Generic key / value / children tree.
//!
//! Every piece of content handed to the engine (mob scripts in particular) arrives as a tree of
//! `DataNode`s. Each node remembers where it came from so that load-time diagnostics can point
//! back at the offending file and line.

use serde::{Deserialize, Serialize};

/// One node of a content tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataNode {
    pub name: String,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub children: Vec<DataNode>,
    /// Originating file name, empty if unknown.
    #[serde(default)]
    pub file: String,
    /// Originating line number, 0 if unknown.
    #[serde(default)]
    pub line: usize,
}

impl DataNode {
    /// Create a childless node (`name = value`).
    pub fn leaf(name: impl Into<String>, value: impl Into<String>) -> DataNode {
        DataNode {
            name: name.into(),
            value: value.into(),
            ..DataNode::default()
        }
    }

    /// Create a node that only groups children (`name { ... }`).
    pub fn branch(name: impl Into<String>, children: Vec<DataNode>) -> DataNode {
        DataNode {
            name: name.into(),
            children,
            ..DataNode::default()
        }
    }

    /// Attach a source location to this node.
    pub fn at(mut self, file: impl Into<String>, line: usize) -> DataNode {
        self.file = file.into();
        self.line = line;
        self
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    pub fn get_child(&self, idx: usize) -> Option<&DataNode> {
        self.children.get(idx)
    }

    /// First child with the given name, if any.
    pub fn get_child_by_name(&self, name: &str) -> Option<&DataNode> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn push(&mut self, child: DataNode) {
        self.children.push(child);
    }

    /// Whitespace-separated words of the value.
    pub fn words(&self) -> Vec<&str> {
        self.value.split_whitespace().collect()
    }

    /// Fill in `file` on this node and every descendant that doesn't already have one.
    pub fn stamp_file(&mut self, file: &str) {
        if self.file.is_empty() {
            self.file = file.to_string();
        }
        for child in &mut self.children {
            child.stamp_file(file);
        }
    }
}
