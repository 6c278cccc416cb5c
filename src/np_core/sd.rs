use std::fmt::Display;

use super::Node;

/// A directed source/destination pair of a connection request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SD {
    /// The source node of the request.
    pub src: Node,
    /// The destination node of the request.
    pub dst: Node,
}

impl Display for SD {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({},{})", self.src, self.dst)
    }
}

impl SD {
    /// Creates a new source/destination pair from node indices.
    pub fn new(src: usize, dst: usize) -> Self {
        Self {
            src: Node::new(src),
            dst: Node::new(dst),
        }
    }
}

impl From<SD> for (usize, usize) {
    fn from(val: SD) -> Self {
        (val.src.into(), val.dst.into())
    }
}
impl From<&SD> for (usize, usize) {
    fn from(val: &SD) -> Self {
        (val.src.into(), val.dst.into())
    }
}
