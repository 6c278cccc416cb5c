use fxhash::{ FxHashMap, FxHashSet };

use crate::{
    config::Config,
    error::{ Result, SimError },
    np_core::{ parameters::TOPOLOGY_DIR, StateMatrix },
    utils,
    Edge,
    SD,
};

pub mod aux_graph;
pub mod presets;
pub mod router;

pub use router::RouteCandidate;

/// Physical network plus the mutable per-link resource state.
///
/// The node/edge structure never changes after construction, apart from
/// virtual edges injected into the adjacency matrix once by
/// [`aux_graph::AuxiliaryGraph::inject`]. Channel occupancy, holding times
/// and key pools change on every call and every tick; every write to the
/// directed link `(i,j)` is mirrored to `(j,i)`.
#[derive(Debug, Clone)]
pub struct Topology {
    /// トポロジの名前
    pub name: String,
    node_count: usize,
    channels: usize,
    /// 物理リンクと重み
    edges: Vec<(Edge, f64)>,
    edge_set: FxHashSet<Edge>,
    /// 物理リンクのみの隣接行列
    physical: Vec<Vec<f64>>,
    /// 仮想リンクを含む隣接行列 (0 = リンクなし)
    adjacency: Vec<Vec<f64>>,
    /// `i * node_count + j` で引く，リンクごとの波長使用状況
    state_matrixes: Vec<StateMatrix>,
    /// `i * node_count + j` で引く，波長ごとの残り保持時間
    holding_times: Vec<Vec<usize>>,
    key_pools: FxHashMap<Edge, usize>,
    default_sd: SD,
}

impl Topology {
    /// Builds the topology named in `config.network.topology`.
    ///
    /// Presets are tried first, then `files/topology/<name>.txt`.
    pub fn new(config: &Config) -> Result<Topology> {
        let name = config.network.topology.as_str();
        let channels = config.network.channels;
        let initial_keys = config.network.initial_keys;

        if let Some(preset) = presets::find_preset(name) {
            return Topology::from_edges(
                preset.name,
                preset.node_count,
                preset.edges,
                channels,
                initial_keys,
                SD::new(preset.default_sd.0, preset.default_sd.1),
            );
        }

        let file_name = format!("{}/{}.txt", TOPOLOGY_DIR, name).to_lowercase();
        let content = match utils::read_file(&file_name) {
            Ok(content) => content,
            Err(_) => return Err(SimError::UnknownTopology(name.to_string())),
        };
        let edges = utils::string_to_weighted_edges(&content)
            .map_err(|line| SimError::InvalidTopologyFile { path: file_name.clone(), line })?;

        let node_count = edges.iter().map(|&(u, v, _)| u.max(v) + 1).max().unwrap_or(0);
        if node_count < 2 {
            return Err(SimError::InvalidTopologyFile { path: file_name, line: 0 });
        }

        Topology::from_edges(name, node_count, &edges, channels, initial_keys, SD::new(0, node_count - 1))
    }

    /// Builds a topology from an explicit edge list.
    ///
    /// Duplicate links (in either direction) keep the first weight seen.
    pub fn from_edges(
        name: &str,
        node_count: usize,
        edge_list: &[(usize, usize, f64)],
        channels: usize,
        initial_keys: usize,
        default_sd: SD,
    ) -> Result<Topology> {
        let mut physical = vec![vec![0.0; node_count]; node_count];
        let mut edges = vec![];
        let mut edge_set = FxHashSet::default();

        for &(u, v, weight) in edge_list {
            for node in [u, v] {
                if node >= node_count {
                    return Err(SimError::NodeOutOfRange { node, node_count });
                }
            }
            if u == v || weight <= 0.0 {
                return Err(SimError::invalid("edges", format!("invalid link ({u},{v},{weight})")));
            }

            let edge = Edge::new(u, v);
            if edge_set.insert(edge) {
                physical[u][v] = weight;
                physical[v][u] = weight;
                edges.push((edge, weight));
            }
        }

        let key_pools = edges.iter().map(|(edge, _)| (*edge, initial_keys)).collect();

        let topology = Topology {
            name: name.to_string(),
            node_count,
            channels,
            edges,
            edge_set,
            adjacency: physical.clone(),
            physical,
            state_matrixes: vec![StateMatrix::new(channels); node_count * node_count],
            holding_times: vec![vec![0; channels]; node_count * node_count],
            key_pools,
            default_sd,
        };
        topology.check_node(default_sd.src.into())?;
        topology.check_node(default_sd.dst.into())?;

        Ok(topology)
    }

    pub fn node_count(&self) -> usize {
        self.node_count
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    /// 物理リンクと重み
    pub fn edges(&self) -> &[(Edge, f64)] {
        &self.edges
    }

    pub fn default_sd(&self) -> SD {
        self.default_sd
    }

    pub fn check_node(&self, node: usize) -> Result<()> {
        if node < self.node_count {
            Ok(())
        } else {
            Err(SimError::NodeOutOfRange { node, node_count: self.node_count })
        }
    }

    pub fn has_physical_edge(&self, i: usize, j: usize) -> bool {
        self.edge_set.contains(&Edge::new(i, j))
    }

    pub fn physical_adjacency(&self) -> &[Vec<f64>] {
        &self.physical
    }

    pub fn adjacency(&self) -> &[Vec<f64>] {
        &self.adjacency
    }

    /// Adds a virtual edge to the routing adjacency.
    ///
    /// Only an empty cell is filled; returns `false` when `(u,v)` already has
    /// a weight, physical or virtual.
    pub fn inject_virtual_edge(&mut self, u: usize, v: usize, weight: f64) -> bool {
        if u == v || self.adjacency[u][v] != 0.0 || weight <= 0.0 {
            return false;
        }
        self.adjacency[u][v] = weight;
        self.adjacency[v][u] = weight;
        true
    }

    /// Sum of adjacency weights along a node route.
    pub fn route_weight(&self, node_route: &[usize]) -> f64 {
        router::route_weight(&self.adjacency, node_route)
    }

    fn index(&self, i: usize, j: usize) -> usize {
        i * self.node_count + j
    }

    pub fn state_matrix(&self, i: usize, j: usize) -> &StateMatrix {
        &self.state_matrixes[self.index(i, j)]
    }

    pub fn is_channel_free(&self, i: usize, j: usize, w: usize) -> bool {
        self.state_matrix(i, j).is_free(w)
    }

    pub fn holding_time(&self, i: usize, j: usize, w: usize) -> usize {
        self.holding_times[self.index(i, j)][w]
    }

    /// Locks wavelength `w` on `(i,j)` and `(j,i)` for `holding_time` ticks.
    pub fn lock_channel(&mut self, i: usize, j: usize, w: usize, holding_time: usize) {
        for (a, b) in [(i, j), (j, i)] {
            let idx = self.index(a, b);
            self.state_matrixes[idx][w] = true;
            self.holding_times[idx][w] = holding_time;
        }
    }

    pub fn release_channel(&mut self, i: usize, j: usize, w: usize) {
        for (a, b) in [(i, j), (j, i)] {
            let idx = self.index(a, b);
            self.state_matrixes[idx][w] = false;
            self.holding_times[idx][w] = 0;
        }
    }

    /// Advances every reserved channel by `delta` ticks.
    ///
    /// A countdown that reaches zero frees its channel on both directions.
    /// Returns the released `(link, wavelength)` pairs.
    pub fn age(&mut self, delta: usize) -> Vec<(Edge, usize)> {
        let mut released = vec![];

        for e_index in 0..self.edges.len() {
            let edge = self.edges[e_index].0;
            let (i, j) = (edge.src.index(), edge.dst.index());
            let forward = self.index(i, j);
            let backward = self.index(j, i);

            for w in 0..self.channels {
                let t = self.holding_times[forward][w];
                if t == 0 {
                    continue;
                }
                if t > delta {
                    self.holding_times[forward][w] = t - delta;
                    self.holding_times[backward][w] = t - delta;
                } else {
                    // 保持時間切れ: 波長を解放
                    self.release_channel(i, j, w);
                    released.push((edge, w));
                }
            }
        }

        released
    }

    pub fn keys(&self, edge: &Edge) -> usize {
        self.key_pools.get(edge).copied().unwrap_or(0)
    }

    /// Draws `quantity` keys from the pool of `edge`.
    ///
    /// Fails without touching the pool if fewer keys remain or the link is
    /// not physical.
    pub fn consume_keys(&mut self, edge: &Edge, quantity: usize) -> bool {
        match self.key_pools.get_mut(edge) {
            Some(keys) if *keys >= quantity => {
                *keys -= quantity;
                true
            }
            _ => false,
        }
    }

    /// Returns keys taken by a [`Topology::consume_keys`] call of the same attempt.
    pub fn restore_keys(&mut self, edge: &Edge, quantity: usize) {
        if let Some(keys) = self.key_pools.get_mut(edge) {
            *keys += quantity;
        }
    }

    pub fn total_keys(&self) -> usize {
        self.key_pools.values().sum()
    }

    /// Number of occupied channels over all physical links.
    pub fn used_channel_count(&self) -> usize {
        self.edges
            .iter()
            .map(|(edge, _)| self.state_matrix(edge.src.index(), edge.dst.index()).count_used())
            .sum()
    }

    /// Checks mirror symmetry of both matrices and that a channel is locked
    /// exactly while its countdown is running.
    pub fn check_symmetry(&self) -> Result<()> {
        for i in 0..self.node_count {
            for j in 0..self.node_count {
                let forward = self.index(i, j);
                let backward = self.index(j, i);

                if self.state_matrixes[forward] != self.state_matrixes[backward] {
                    return Err(SimError::ConsistencyViolation(format!("n[{i}][{j}] != n[{j}][{i}]")));
                }
                if self.holding_times[forward] != self.holding_times[backward] {
                    return Err(SimError::ConsistencyViolation(format!("t[{i}][{j}] != t[{j}][{i}]")));
                }
                for w in 0..self.channels {
                    let locked = !self.state_matrixes[forward].is_free(w);
                    let running = self.holding_times[forward][w] > 0;
                    if locked != running {
                        return Err(SimError::ConsistencyViolation(format!(
                            "link ({i},{j}) channel {w}: locked={locked} but t={}",
                            self.holding_times[forward][w]
                        )));
                    }
                }
            }
        }

        Ok(())
    }
}
