use fxhash::{ FxHashMap, FxHashSet };

use crate::{
    error::{ Result, SimError },
    np_core::LinkAssignment,
    topology::Topology,
    Edge,
};

/// An admitted end-to-end connection.
#[derive(Debug, Clone)]
pub struct Lightpath {
    pub id: usize,
    /// 物理ノード列
    pub route: Vec<usize>,
    /// リンクごとの割当 (route の隣接ノード対と同じ順)
    pub assignments: Vec<LinkAssignment>,
    /// 残り保持時間 [tick]
    pub holding_time: usize,
    pub contains_virtual: bool,
    pub mapped_virtual_route: Vec<Vec<usize>>,
    /// 下位補助グラフでも仮想リンクを使うか (プローブ未設定なら None)
    pub lower_layer_virtual: Option<bool>,
}

impl Lightpath {
    /// `(link, assignment)` for every hop of the route.
    pub fn links(&self) -> impl Iterator<Item = (Edge, LinkAssignment)> + '_ {
        self.route
            .windows(2)
            .zip(self.assignments.iter())
            .map(|(w, a)| (Edge::new(w[0], w[1]), *a))
    }

    /// The wavelength of the first real-channel hop, if any.
    pub fn wavelength(&self) -> Option<usize> {
        self.assignments.iter().find_map(|a| a.channel())
    }
}

/// Live lightpaths by id.
///
/// Holding times here and in the topology's per-link matrix are decremented
/// by the same amounts on the same ticks; [`LightpathRegistry::verify_against`]
/// checks that the two views agree.
#[derive(Debug, Default)]
pub struct LightpathRegistry {
    lightpaths: FxHashMap<usize, Lightpath>,
    next_id: usize,
}

impl LightpathRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserves the next id; ids are never reused within a registry.
    pub fn next_id(&mut self) -> usize {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn add(&mut self, lightpath: Lightpath) -> Result<()> {
        if self.lightpaths.contains_key(&lightpath.id) {
            return Err(SimError::ConsistencyViolation(format!("duplicate lightpath id {}", lightpath.id)));
        }
        if lightpath.id >= self.next_id {
            self.next_id = lightpath.id + 1;
        }
        self.lightpaths.insert(lightpath.id, lightpath);
        Ok(())
    }

    pub fn remove_by_id(&mut self, id: usize) -> Option<Lightpath> {
        self.lightpaths.remove(&id)
    }

    /// Subtracts `delta` ticks from every live lightpath and removes those
    /// whose holding time is used up. Returns the removed lightpaths.
    pub fn age_all(&mut self, delta: usize) -> Vec<Lightpath> {
        let mut expired_ids = vec![];
        for (id, lightpath) in self.lightpaths.iter_mut() {
            if lightpath.holding_time > delta {
                lightpath.holding_time -= delta;
            } else {
                expired_ids.push(*id);
            }
        }

        expired_ids
            .into_iter()
            .filter_map(|id| self.lightpaths.remove(&id))
            .collect()
    }

    pub fn get(&self, id: usize) -> Option<&Lightpath> {
        self.lightpaths.get(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Lightpath> {
        self.lightpaths.values()
    }

    pub fn len(&self) -> usize {
        self.lightpaths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lightpaths.is_empty()
    }

    /// Lightpaths sharing at least one physical link with `edges`.
    pub fn conflicting<'a>(&'a self, edges: &'a [Edge]) -> impl Iterator<Item = &'a Lightpath> + 'a {
        self.lightpaths
            .values()
            .filter(move |lp| lp.links().any(|(edge, _)| edges.contains(&edge)))
    }

    /// Checks that a channel is locked in `topology` exactly when a live
    /// lightpath holds it, with the same remaining holding time.
    pub fn verify_against(&self, topology: &Topology) -> Result<()> {
        topology.check_symmetry()?;

        let mut held: FxHashSet<(Edge, usize)> = FxHashSet::default();
        for lightpath in self.lightpaths.values() {
            for (edge, assignment) in lightpath.links() {
                let w = match assignment {
                    LinkAssignment::RealChannel(w) => w,
                    LinkAssignment::KeyPoolFallback(_) => continue,
                };
                let (i, j) = (edge.src.index(), edge.dst.index());
                if topology.is_channel_free(i, j, w) {
                    return Err(SimError::ConsistencyViolation(format!(
                        "lightpath {} holds channel {w} on {edge} but it is free",
                        lightpath.id
                    )));
                }
                if topology.holding_time(i, j, w) != lightpath.holding_time {
                    return Err(SimError::ConsistencyViolation(format!(
                        "lightpath {} has {} ticks left, channel {w} on {edge} has {}",
                        lightpath.id,
                        lightpath.holding_time,
                        topology.holding_time(i, j, w)
                    )));
                }
                held.insert((edge, w));
            }
        }

        for (edge, _) in topology.edges() {
            let (i, j) = (edge.src.index(), edge.dst.index());
            for w in 0..topology.channels() {
                if !topology.is_channel_free(i, j, w) && !held.contains(&(*edge, w)) {
                    return Err(SimError::ConsistencyViolation(format!(
                        "channel {w} on {edge} is locked without a lightpath"
                    )));
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::tests::line_topology;

    fn lightpath(id: usize, route: Vec<usize>, w: usize, holding_time: usize) -> Lightpath {
        let hops = route.len() - 1;
        Lightpath {
            id,
            route,
            assignments: vec![LinkAssignment::RealChannel(w); hops],
            holding_time,
            contains_virtual: false,
            mapped_virtual_route: vec![],
            lower_layer_virtual: None,
        }
    }

    #[test]
    fn ids_are_monotonic_and_unique() {
        let mut registry = LightpathRegistry::new();
        let a = registry.next_id();
        let b = registry.next_id();
        assert!(b > a);
        registry.add(lightpath(a, vec![0, 1], 0, 10)).unwrap();
        assert!(registry.add(lightpath(a, vec![1, 2], 0, 10)).is_err());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn remove_missing_is_noop() {
        let mut registry = LightpathRegistry::new();
        assert!(registry.remove_by_id(42).is_none());
        registry.add(lightpath(0, vec![0, 1], 0, 10)).unwrap();
        assert!(registry.remove_by_id(0).is_some());
        assert!(registry.is_empty());
    }

    #[test]
    fn age_all_evicts_at_exhaustion() {
        let mut registry = LightpathRegistry::new();
        registry.add(lightpath(0, vec![0, 1], 0, 10)).unwrap();
        registry.add(lightpath(1, vec![1, 2], 0, 3)).unwrap();

        let expired = registry.age_all(3);
        assert_eq!(expired.iter().map(|lp| lp.id).collect::<Vec<_>>(), vec![1]);
        assert_eq!(registry.get(0).unwrap().holding_time, 7);

        assert!(registry.age_all(6).is_empty());
        assert_eq!(registry.age_all(1).len(), 1);
        assert!(registry.is_empty());
    }

    #[test]
    fn verify_detects_divergence() {
        let mut topology = line_topology(2, 0);
        let mut registry = LightpathRegistry::new();
        registry.add(lightpath(0, vec![0, 1, 2], 1, 10)).unwrap();
        assert!(registry.verify_against(&topology).is_err());

        topology.lock_channel(0, 1, 1, 10);
        topology.lock_channel(1, 2, 1, 10);
        registry.verify_against(&topology).unwrap();

        topology.age(2);
        assert!(registry.verify_against(&topology).is_err());
        registry.age_all(2);
        registry.verify_against(&topology).unwrap();

        topology.lock_channel(2, 3, 0, 5);
        assert!(registry.verify_against(&topology).is_err());
    }

    #[test]
    fn conflicting_lightpaths_share_a_link() {
        let mut registry = LightpathRegistry::new();
        registry.add(lightpath(0, vec![0, 1, 2], 0, 10)).unwrap();
        registry.add(lightpath(1, vec![2, 3], 1, 10)).unwrap();
        let edges = [Edge::new(1, 2)];
        let ids: Vec<usize> = registry.conflicting(&edges).map(|lp| lp.id).collect();
        assert_eq!(ids, vec![0]);
    }
}
