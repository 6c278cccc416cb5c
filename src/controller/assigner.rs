use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::{
    np_core::{ LinkAssignment, StateMatrix },
    topology::Topology,
    Edge,
};

use super::{
    expander::ExpandedRoute,
    registry::LightpathRegistry,
    strategy::{ RwaStrategy, WavelengthPolicy },
};

/// Keys drawn during one assignment attempt.
///
/// Dropping the transaction without [`KeyTransaction::commit`] leaves keys
/// consumed, so every failure path calls [`KeyTransaction::rollback`].
#[derive(Debug)]
pub struct KeyTransaction {
    draw: usize,
    consumed: Vec<Edge>,
}

impl KeyTransaction {
    pub fn new(draw: usize) -> Self {
        Self { draw, consumed: vec![] }
    }

    pub fn try_consume(&mut self, topology: &mut Topology, edge: Edge) -> Option<LinkAssignment> {
        if topology.consume_keys(&edge, self.draw) {
            self.consumed.push(edge);
            Some(LinkAssignment::KeyPoolFallback(self.draw))
        } else {
            None
        }
    }

    /// Puts back every key drawn so far; the transaction can be reused.
    pub fn rollback(&mut self, topology: &mut Topology) {
        for edge in self.consumed.drain(..) {
            topology.restore_keys(&edge, self.draw);
        }
    }

    pub fn commit(self) -> usize {
        self.consumed.len()
    }
}

/// Runs the wavelength policy of `strategy` on an expanded route.
///
/// `None` means the call is blocked; key pools are then exactly as before.
pub fn assign(
    strategy: &RwaStrategy,
    topology: &mut Topology,
    registry: &LightpathRegistry,
    route: &ExpandedRoute,
    key_draw: usize,
    rng: &mut ChaCha8Rng,
) -> Option<Vec<LinkAssignment>> {
    if route.nodes.len() < 2 {
        return None;
    }

    match strategy.wavelength {
        WavelengthPolicy::FirstFit if strategy.per_link => first_fit_per_link(topology, &route.nodes, key_draw),
        WavelengthPolicy::FirstFit => first_fit(topology, &route.nodes, key_draw),
        WavelengthPolicy::RandomFit => random_fit(topology, &route.nodes, rng),
        WavelengthPolicy::VertexColoring => vertex_coloring(topology, registry, &route.nodes),
    }
}

/// One wavelength for the whole route, lowest index first.
///
/// A link where the candidate is busy may draw `key_draw` keys instead.
/// If a link has neither, the keys drawn for this candidate are returned
/// before the next wavelength is tried.
pub fn first_fit(topology: &mut Topology, route: &[usize], key_draw: usize) -> Option<Vec<LinkAssignment>> {
    let hops = route.len().checked_sub(1).filter(|&h| h > 0)?;
    let mut tx = KeyTransaction::new(key_draw);

    'candidate: for w in 0..topology.channels() {
        let mut assignments = Vec::with_capacity(hops);

        for link in route.windows(2) {
            let (i, j) = (link[0], link[1]);
            if topology.is_channel_free(i, j, w) {
                assignments.push(LinkAssignment::RealChannel(w));
                continue;
            }
            match tx.try_consume(topology, Edge::new(i, j)) {
                Some(fallback) => assignments.push(fallback),
                None => {
                    tx.rollback(topology);
                    continue 'candidate;
                }
            }
        }

        tx.commit();
        return Some(assignments);
    }

    None
}

/// Each link independently takes its lowest free wavelength, or keys.
///
/// The first link with neither aborts the whole attempt.
pub fn first_fit_per_link(topology: &mut Topology, route: &[usize], key_draw: usize) -> Option<Vec<LinkAssignment>> {
    if route.len() < 2 {
        return None;
    }
    let mut tx = KeyTransaction::new(key_draw);
    let mut assignments = Vec::with_capacity(route.len() - 1);

    for link in route.windows(2) {
        let (i, j) = (link[0], link[1]);
        if let Some(w) = topology.state_matrix(i, j).first_free() {
            assignments.push(LinkAssignment::RealChannel(w));
            continue;
        }
        match tx.try_consume(topology, Edge::new(i, j)) {
            Some(fallback) => assignments.push(fallback),
            None => {
                tx.rollback(topology);
                return None;
            }
        }
    }

    tx.commit();
    Some(assignments)
}

/// Occupancy union over every link of the route.
fn route_state_matrix(topology: &Topology, route: &[usize]) -> StateMatrix {
    let mut target_state_matrix = StateMatrix::new(topology.channels());
    for link in route.windows(2) {
        target_state_matrix |= topology.state_matrix(link[0], link[1]);
    }
    target_state_matrix
}

/// A uniformly random wavelength among those free on every link.
pub fn random_fit(topology: &Topology, route: &[usize], rng: &mut ChaCha8Rng) -> Option<Vec<LinkAssignment>> {
    if route.len() < 2 {
        return None;
    }
    let free = route_state_matrix(topology, route).free_channels();
    if free.is_empty() {
        return None;
    }
    let w = free[rng.gen_range(0..free.len())];

    Some(vec![LinkAssignment::RealChannel(w); route.len() - 1])
}

/// Greedy coloring of the conflict graph.
///
/// Every live lightpath sharing a link with the route is a neighbour; the
/// route takes the lowest color none of its neighbours uses anywhere.
pub fn vertex_coloring(
    topology: &Topology,
    registry: &LightpathRegistry,
    route: &[usize],
) -> Option<Vec<LinkAssignment>> {
    if route.len() < 2 {
        return None;
    }
    let edges = Edge::from_node_route(route);

    let mut used_colors = StateMatrix::new(topology.channels());
    for neighbour in registry.conflicting(&edges) {
        for w in neighbour.assignments.iter().filter_map(|a| a.channel()) {
            used_colors[w] = true;
        }
    }
    let w = used_colors.first_free()?;

    Some(vec![LinkAssignment::RealChannel(w); edges.len()])
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;
    use crate::{ controller::registry::Lightpath, topology::tests::line_topology };

    const ROUTE: [usize; 4] = [0, 1, 2, 3];

    #[test]
    fn first_fit_on_empty_network() {
        let mut topology = line_topology(4, 0);
        let result = first_fit(&mut topology, &ROUTE, 10).unwrap();
        assert_eq!(result, vec![LinkAssignment::RealChannel(0); 3]);
    }

    #[test]
    fn first_fit_skips_busy_wavelength_without_keys() {
        let mut topology = line_topology(2, 0);
        topology.lock_channel(1, 2, 0, 10);
        let result = first_fit(&mut topology, &ROUTE, 10).unwrap();
        assert_eq!(result, vec![LinkAssignment::RealChannel(1); 3]);
    }

    #[test]
    fn first_fit_prefers_fallback_on_lower_wavelength() {
        let mut topology = line_topology(2, 10);
        topology.lock_channel(1, 2, 0, 10);
        let result = first_fit(&mut topology, &ROUTE, 10).unwrap();
        assert_eq!(
            result,
            vec![
                LinkAssignment::RealChannel(0),
                LinkAssignment::KeyPoolFallback(10),
                LinkAssignment::RealChannel(0),
            ]
        );
        assert_eq!(topology.keys(&Edge::new(1, 2)), 0);
    }

    #[test]
    fn failed_candidate_returns_its_keys() {
        // λ0: (1,2) busy but has keys, (2,3) busy without keys -> rollback
        // λ1: free everywhere
        let mut topology = line_topology(2, 0);
        topology.restore_keys(&Edge::new(1, 2), 10);
        topology.lock_channel(1, 2, 0, 10);
        topology.lock_channel(2, 3, 0, 10);

        let result = first_fit(&mut topology, &ROUTE, 10).unwrap();
        assert_eq!(result, vec![LinkAssignment::RealChannel(1); 3]);
        assert_eq!(topology.keys(&Edge::new(1, 2)), 10);
    }

    #[test]
    fn exhausted_route_leaves_key_pools_untouched() {
        let mut topology = line_topology(1, 0);
        topology.restore_keys(&Edge::new(0, 1), 25);
        topology.lock_channel(0, 1, 0, 10);
        topology.lock_channel(2, 3, 0, 10);
        let before: Vec<usize> = topology.edges().iter().map(|(e, _)| topology.keys(e)).collect();

        assert!(first_fit(&mut topology, &ROUTE, 10).is_none());
        assert!(first_fit_per_link(&mut topology, &ROUTE, 10).is_none());

        let after: Vec<usize> = topology.edges().iter().map(|(e, _)| topology.keys(e)).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn per_link_mode_mixes_wavelengths() {
        let mut topology = line_topology(3, 10);
        topology.lock_channel(0, 1, 0, 10);
        topology.lock_channel(1, 2, 0, 10);
        topology.lock_channel(1, 2, 1, 10);
        topology.lock_channel(2, 3, 0, 10);
        topology.lock_channel(2, 3, 1, 10);
        topology.lock_channel(2, 3, 2, 10);

        let result = first_fit_per_link(&mut topology, &ROUTE, 10).unwrap();
        assert_eq!(
            result,
            vec![
                LinkAssignment::RealChannel(1),
                LinkAssignment::RealChannel(2),
                LinkAssignment::KeyPoolFallback(10),
            ]
        );
        assert_eq!(topology.keys(&Edge::new(2, 3)), 0);
        assert_eq!(topology.keys(&Edge::new(0, 1)), 10);
    }

    #[test]
    fn trivial_route_is_rejected() {
        let mut topology = line_topology(1, 10);
        assert!(first_fit(&mut topology, &[0], 10).is_none());
        assert!(first_fit_per_link(&mut topology, &[], 10).is_none());
    }

    #[test]
    fn random_fit_picks_a_common_free_channel() {
        let mut topology = line_topology(4, 0);
        topology.lock_channel(0, 1, 0, 10);
        topology.lock_channel(2, 3, 2, 10);
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        for _ in 0..50 {
            let result = random_fit(&topology, &ROUTE, &mut rng).unwrap();
            let w = result[0].channel().unwrap();
            assert!(w == 1 || w == 3);
            assert!(result.iter().all(|a| a.channel() == Some(w)));
        }
        topology.lock_channel(1, 2, 1, 10);
        topology.lock_channel(1, 2, 3, 10);
        assert!(random_fit(&topology, &ROUTE, &mut rng).is_none());
    }

    #[test]
    fn vertex_coloring_avoids_neighbour_colors() {
        let topology = line_topology(3, 0);
        let mut registry = LightpathRegistry::new();
        registry
            .add(Lightpath {
                id: 0,
                route: vec![2, 3],
                assignments: vec![LinkAssignment::RealChannel(0)],
                holding_time: 10,
                contains_virtual: false,
                mapped_virtual_route: vec![],
                lower_layer_virtual: None,
            })
            .unwrap();

        let result = vertex_coloring(&topology, &registry, &ROUTE).unwrap();
        assert_eq!(result, vec![LinkAssignment::RealChannel(1); 3]);
        // 共有リンクがなければ色は自由
        let result = vertex_coloring(&topology, &registry, &[0, 1]).unwrap();
        assert_eq!(result, vec![LinkAssignment::RealChannel(0)]);
    }
}
