use std::fmt::Display;

use serde_derive::{ Deserialize, Serialize };

/// Index of a router in the topology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(Deserialize, Serialize)]
pub struct Node {
    pub(super) value: usize,
}

impl Display for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:2}", self.value)
    }
}

impl From<Node> for usize {
    fn from(val: Node) -> Self {
        val.value
    }
}

impl From<usize> for Node {
    fn from(value: usize) -> Self {
        Node::new(value)
    }
}

impl Node {
    pub fn new(value: usize) -> Self {
        Self { value }
    }

    pub fn index(&self) -> usize {
        self.value
    }
}
