use std::fmt::Display;

use super::Node;

/// Represents an undirected link between two nodes.
///
/// The endpoints are stored in ascending order, so `Edge::new(3, 1)` and
/// `Edge::new(1, 3)` are the same key. Per-link resources that are shared by
/// both directions (key pools) are indexed by this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Edge {
    /// The endpoint with the smaller index.
    pub src: Node,
    /// The endpoint with the larger index.
    pub dst: Node,
}

impl Display for Edge {
    /// Formats the edge for display.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({},{})", self.src, self.dst)
    }
}

impl Edge {
    /// Creates a new undirected edge between nodes with the given indices.
    ///
    /// # Arguments
    ///
    /// * `a` - The index of one endpoint.
    /// * `b` - The index of the other endpoint.
    ///
    /// # Returns
    ///
    /// A new `Edge` instance with its endpoints normalized.
    pub fn new(a: usize, b: usize) -> Self {
        let (src, dst) = if a <= b { (a, b) } else { (b, a) };
        Self {
            src: Node::new(src),
            dst: Node::new(dst),
        }
    }

    pub fn contains(&self, node: usize) -> bool {
        self.src.index() == node || self.dst.index() == node
    }

    /// Links of a node route, in traversal order.
    pub fn from_node_route(node_route: &[usize]) -> Vec<Edge> {
        node_route.windows(2).map(|w| Edge::new(w[0], w[1])).collect()
    }
}

#[test]
fn edge_is_undirected() {
    assert_eq!(Edge::new(4, 1), Edge::new(1, 4));
    assert_eq!(usize::from(Edge::new(4, 1).src), 1);
    assert!(Edge::new(2, 7).contains(7));
    assert_eq!(Edge::from_node_route(&[0, 2, 1]), vec![Edge::new(0, 2), Edge::new(1, 2)]);
}
