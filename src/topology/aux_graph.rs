use fxhash::FxHashMap;
use petgraph::graph::UnGraph;

use super::{ router::{ graph_from_adjacency, shortest_path }, Topology };

/// A synthetic edge standing for a short multi-hop physical path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AuxiliaryEdge {
    pub src: usize,
    pub dst: usize,
    pub distance: f64,
}

/// Virtual edges between node pairs without a direct link whose shortest
/// physical distance is within `threshold`, with the physical path each one
/// replaces.
#[derive(Debug, Clone)]
pub struct AuxiliaryGraph {
    threshold: f64,
    edges: Vec<AuxiliaryEdge>,
    /// (s, d) -> s から d への物理パス
    paths: FxHashMap<(usize, usize), Vec<usize>>,
}

impl AuxiliaryGraph {
    /// Scans every ordered pair `(s,d)`, `s != d`, of the physical topology.
    ///
    /// Both directions of a pair get their own entry; their stored paths are
    /// computed independently and may differ on ties.
    pub fn build(topology: &Topology, threshold: f64) -> AuxiliaryGraph {
        let physical = topology.physical_adjacency();
        let g = graph_from_adjacency(physical);
        let n = topology.node_count();

        let mut edges = vec![];
        let mut paths = FxHashMap::default();

        for s in 0..n {
            for d in 0..n {
                if s == d || topology.has_physical_edge(s, d) {
                    continue;
                }
                let route = match shortest_path(&g, s, d) {
                    Some(route) => route,
                    None => continue,
                };
                if route.weight <= threshold {
                    edges.push(AuxiliaryEdge { src: s, dst: d, distance: route.weight });
                    paths.insert((s, d), route.node_route);
                }
            }
        }

        AuxiliaryGraph { threshold, edges, paths }
    }

    /// Writes the virtual edges into the routing adjacency of `topology`.
    ///
    /// Returns how many cells were filled; physical weights are never
    /// replaced.
    pub fn inject(&self, topology: &mut Topology) -> usize {
        self.edges
            .iter()
            .filter(|e| topology.inject_virtual_edge(e.src, e.dst, e.distance))
            .count()
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn edges(&self) -> &[AuxiliaryEdge] {
        &self.edges
    }

    pub fn is_virtual(&self, u: usize, v: usize) -> bool {
        self.paths.contains_key(&(u, v))
    }

    /// Physical node sequence from `u` to `v` behind the virtual edge `(u,v)`.
    pub fn physical_path(&self, u: usize, v: usize) -> Option<&[usize]> {
        self.paths.get(&(u, v)).map(|p| p.as_slice())
    }

    /// Adjacency of `topology` with this graph's virtual edges added.
    pub fn augmented_adjacency(&self, topology: &Topology) -> Vec<Vec<f64>> {
        let mut adjacency = topology.physical_adjacency().to_vec();
        for e in &self.edges {
            if adjacency[e.src][e.dst] == 0.0 {
                adjacency[e.src][e.dst] = e.distance;
                adjacency[e.dst][e.src] = e.distance;
            }
        }
        adjacency
    }
}

/// Optional check against a second auxiliary layer.
pub trait CrossLayerProbe {
    /// Whether the other layer crosses `src -> dst` with at least one virtual hop.
    fn uses_virtual_hops(&self, src: usize, dst: usize) -> bool;

    /// Checks the endpoints of every physical sub-path that replaced a
    /// virtual hop. A route without virtual hops maps to nothing.
    fn maps_to_virtual(&self, mapped_virtual_route: &[Vec<usize>]) -> bool {
        mapped_virtual_route.iter().any(|phys| match (phys.first(), phys.last()) {
            (Some(&src), Some(&dst)) if phys.len() >= 2 => self.uses_virtual_hops(src, dst),
            _ => false,
        })
    }
}

/// Probe over a lower-grade auxiliary graph built with a smaller threshold.
pub struct AuxLayerProbe {
    lower: AuxiliaryGraph,
    graph: UnGraph<usize, f64>,
}

impl AuxLayerProbe {
    pub fn new(topology: &Topology, lower_threshold: f64) -> AuxLayerProbe {
        let lower = AuxiliaryGraph::build(topology, lower_threshold);
        let graph = graph_from_adjacency(&lower.augmented_adjacency(topology));
        AuxLayerProbe { lower, graph }
    }

    pub fn lower(&self) -> &AuxiliaryGraph {
        &self.lower
    }
}

impl CrossLayerProbe for AuxLayerProbe {
    fn uses_virtual_hops(&self, src: usize, dst: usize) -> bool {
        if src == dst {
            return false;
        }
        if self.lower.is_virtual(src, dst) {
            return true;
        }
        match shortest_path(&self.graph, src, dst) {
            Some(route) => route
                .node_route
                .windows(2)
                .any(|w| self.lower.is_virtual(w[0], w[1]) || self.lower.is_virtual(w[1], w[0])),
            None => false,
        }
    }
}
