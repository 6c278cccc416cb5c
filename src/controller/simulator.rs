use std::time::Instant;

use indicatif::{ ProgressBar, ProgressStyle };
use itertools::Itertools;
use rand::{ Rng, SeedableRng };
use rand_chacha::ChaCha8Rng;

use crate::{
    config::Config,
    debugger,
    error::{ Result, SimError },
    np_core::{ dist, parameters::{ PB_CHARS, PB_TEMPLATES }, LinkAssignment },
    topology::{
        aux_graph::{ AuxLayerProbe, AuxiliaryGraph, CrossLayerProbe },
        router::{ trace_dijkstra, Router },
        Topology,
    },
    Edge,
    SD,
};

use super::{
    assigner,
    expander::{ expand_route, ExpandedRoute },
    registry::{ Lightpath, LightpathRegistry },
    strategy::RwaStrategy,
};

/// Counters of one load level.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadStats {
    /// 負荷 [Erlang]
    pub load: usize,
    pub calls: usize,
    pub blocks: usize,
    pub admitted: usize,
    /// 鍵で代替したリンク数
    pub fallback_links: usize,
    pub keys_consumed: usize,
    pub released: usize,
}

impl LoadStats {
    pub fn new(load: usize) -> Self {
        Self { load, ..Default::default() }
    }

    /// Percentage of blocked calls, `0.0` before the first call.
    pub fn blocking_probability(&self) -> f64 {
        if self.calls == 0 {
            0.0
        } else {
            100.0 * self.blocks as f64 / self.calls as f64
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallOutcome {
    /// 収容した光パスのid
    Admitted(usize),
    Blocked,
}

/// One row of output: every load level of one repetition.
#[derive(Debug, Clone)]
pub struct RepetitionResult {
    pub index: usize,
    pub stats: Vec<LoadStats>,
    /// 経過時間 [s]
    pub elapsed: f64,
}

impl RepetitionResult {
    pub fn blocking_probabilities(&self) -> Vec<f64> {
        self.stats.iter().map(|s| s.blocking_probability()).collect()
    }

    pub fn total_blocks(&self) -> usize {
        self.stats.iter().map(|s| s.blocks).sum()
    }
}

/// Network state of a single repetition.
///
/// Built fresh for every repetition: the topology (with virtual edges if
/// the auxiliary graph is enabled), the route cache over the final
/// adjacency, and an empty registry.
pub struct SimulationRun<'a> {
    config: &'a Config,
    strategy: RwaStrategy,
    pub topology: Topology,
    pub aux: Option<AuxiliaryGraph>,
    pub router: Router,
    pub registry: LightpathRegistry,
    probe: Option<Box<dyn CrossLayerProbe>>,
    sd: SD,
    dijkstra_traces_left: usize,
}

impl<'a> SimulationRun<'a> {
    pub fn new(config: &'a Config, strategy: RwaStrategy) -> Result<Self> {
        let topology = Topology::new(config)?;
        Self::from_topology(config, strategy, topology)
    }

    pub fn from_topology(config: &'a Config, strategy: RwaStrategy, mut topology: Topology) -> Result<Self> {
        let sd = resolve_sd(config, &topology)?;

        // 仮想リンクの注入は経路計算より前
        let aux = if config.network.aux_graph {
            let aux = AuxiliaryGraph::build(&topology, config.network.aux_threshold);
            aux.inject(&mut topology);
            debugger::log_aux_edges(config, &aux);
            Some(aux)
        } else {
            None
        };
        debugger::log_adjacency(config, &topology);

        let probe: Option<Box<dyn CrossLayerProbe>> = config
            .network
            .lower_aux_threshold
            .map(|threshold| Box::new(AuxLayerProbe::new(&topology, threshold)) as Box<dyn CrossLayerProbe>);

        let router = Router::new(
            topology.adjacency(),
            strategy.k_paths,
            config.simulation.threads,
            config.simulation.progress_bar,
        );

        Ok(Self {
            config,
            strategy,
            topology,
            aux,
            router,
            registry: LightpathRegistry::new(),
            probe,
            sd,
            dijkstra_traces_left: config.debug.dijkstra_trace_limit,
        })
    }

    /// The fixed source/destination pair of this run.
    pub fn sd(&self) -> SD {
        self.sd
    }

    /// ROUTE, EXPAND, ASSIGN, VERIFY and then ADMIT or BLOCK one call.
    ///
    /// Route candidates are tried in order; the first that can be assigned
    /// and verified is admitted. No state changes on a blocked call.
    pub fn offer_call(&mut self, sd: SD, rng: &mut ChaCha8Rng, stats: &mut LoadStats) -> Result<CallOutcome> {
        stats.calls += 1;
        self.trace_route(sd);

        let candidate_count = self.router.routes(&sd).len();
        for index in 0..candidate_count {
            let node_route = &self.router.routes(&sd)[index].node_route;
            let route = match &self.aux {
                Some(aux) => expand_route(node_route, aux),
                None => ExpandedRoute::physical(node_route),
            };
            // 展開後に同じノードを2度通る経路は使わない
            if !route.nodes.iter().all_unique() {
                continue;
            }

            let assignments = match assigner::assign(
                &self.strategy,
                &mut self.topology,
                &self.registry,
                &route,
                self.config.network.key_draw,
                rng,
            ) {
                Some(assignments) => assignments,
                None => continue,
            };

            if !self.verify(&route.nodes, &assignments) {
                self.return_keys(&route.nodes, &assignments);
                debugger::log_alert(&format!("assignment on {:?} failed re-validation", route.nodes));
                continue;
            }

            let id = self.admit(route, assignments, stats)?;
            return Ok(CallOutcome::Admitted(id));
        }

        stats.blocks += 1;
        debugger::log_block(self.config, &sd, candidate_count);
        Ok(CallOutcome::Blocked)
    }

    /// AGE: moves the clock forward by `delta` ticks.
    ///
    /// The registry and the per-link countdowns are decremented by the same
    /// amount, so both release a lightpath on the same tick.
    pub fn advance(&mut self, delta: usize, stats: &mut LoadStats) -> Result<()> {
        let expired = self.registry.age_all(delta);
        self.topology.age(delta);

        stats.released += expired.len();
        for lightpath in &expired {
            debugger::log_release(self.config, lightpath);
        }

        if self.config.debug.check_consistency {
            self.registry.verify_against(&self.topology)?;
        }

        Ok(())
    }

    /// Every real channel of the assignment is still free on its link.
    fn verify(&self, nodes: &[usize], assignments: &[LinkAssignment]) -> bool {
        if nodes.len() != assignments.len() + 1 {
            return false;
        }
        nodes.windows(2).zip(assignments).all(|(link, assignment)| match assignment {
            LinkAssignment::RealChannel(w) => *w < self.topology.channels() && self.topology.is_channel_free(link[0], link[1], *w),
            LinkAssignment::KeyPoolFallback(_) => true,
        })
    }

    fn return_keys(&mut self, nodes: &[usize], assignments: &[LinkAssignment]) {
        for (link, assignment) in nodes.windows(2).zip(assignments) {
            if let LinkAssignment::KeyPoolFallback(q) = assignment {
                self.topology.restore_keys(&Edge::new(link[0], link[1]), *q);
            }
        }
    }

    fn admit(
        &mut self,
        route: ExpandedRoute,
        assignments: Vec<LinkAssignment>,
        stats: &mut LoadStats,
    ) -> Result<usize> {
        let holding_time = self.config.simulation.holding_time;

        for (link, assignment) in route.nodes.windows(2).zip(&assignments) {
            match assignment {
                LinkAssignment::RealChannel(w) => self.topology.lock_channel(link[0], link[1], *w, holding_time),
                LinkAssignment::KeyPoolFallback(q) => {
                    stats.fallback_links += 1;
                    stats.keys_consumed += q;
                }
            }
        }

        let lower_layer_virtual = self.probe.as_ref().map(|probe| probe.maps_to_virtual(&route.mapped_virtual_route));

        let lightpath = Lightpath {
            id: self.registry.next_id(),
            route: route.nodes,
            assignments,
            holding_time,
            contains_virtual: route.contains_virtual,
            mapped_virtual_route: route.mapped_virtual_route,
            lower_layer_virtual,
        };
        let id = lightpath.id;
        debugger::log_lightpath_admit(self.config, &lightpath);
        self.registry.add(lightpath)?;
        stats.admitted += 1;

        Ok(id)
    }

    fn trace_route(&mut self, sd: SD) {
        if !self.config.debug.log_dijkstra || self.dijkstra_traces_left == 0 {
            return;
        }
        self.dijkstra_traces_left -= 1;
        let (src, dst): (usize, usize) = sd.into();
        let trace = trace_dijkstra(self.topology.adjacency(), src, dst);
        debugger::log_dijkstra_trace(self.config, &sd, &trace);
    }
}

/// Source/destination from `[traffic]`, falling back to the topology default.
fn resolve_sd(config: &Config, topology: &Topology) -> Result<SD> {
    let default_sd = topology.default_sd();
    let src = config.traffic.source.unwrap_or(default_sd.src.index());
    let dst = config.traffic.destination.unwrap_or(default_sd.dst.index());
    topology.check_node(src)?;
    topology.check_node(dst)?;
    if src == dst {
        return Err(SimError::invalid("destination", format!("same node as source ({src})")));
    }
    if config.traffic.uniform_pairs && topology.node_count() < 2 {
        return Err(SimError::invalid("uniform_pairs", "needs at least two nodes"));
    }

    Ok(SD::new(src, dst))
}

/// Drives repetitions, load levels and calls with one seeded generator.
pub struct AdmissionSimulator<'a> {
    config: &'a Config,
    strategy: RwaStrategy,
    rng: ChaCha8Rng,
}

impl<'a> AdmissionSimulator<'a> {
    pub fn new(config: &'a Config) -> Result<Self> {
        config.validate()?;
        let strategy = RwaStrategy::from_config(&config.policy)?;
        Ok(Self {
            config,
            strategy,
            rng: ChaCha8Rng::seed_from_u64(config.simulation.random_seed),
        })
    }

    pub fn strategy(&self) -> &RwaStrategy {
        &self.strategy
    }

    /// Runs every load level on a fresh network.
    pub fn run_repetition(&mut self, index: usize) -> Result<RepetitionResult> {
        let start = Instant::now();
        let mut run = SimulationRun::new(self.config, self.strategy)?;
        let loads = self.config.loads();

        let pb = if self.config.simulation.progress_bar {
            ProgressBar::new((loads.len() * self.config.simulation.calls) as u64)
        } else {
            ProgressBar::hidden()
        };
        if let Ok(style) = ProgressStyle::default_bar().template(PB_TEMPLATES) {
            pb.set_style(style.progress_chars(PB_CHARS));
        }

        let mut stats = Vec::with_capacity(loads.len());
        for load in loads {
            let load_stats = self.run_load(&mut run, load, &pb)?;
            debugger::log_analysis(self.config, &load_stats, &run.topology);
            stats.push(load_stats);
        }
        pb.finish_and_clear();

        Ok(RepetitionResult {
            index,
            stats,
            elapsed: start.elapsed().as_secs_f64(),
        })
    }

    /// `calls` arrivals at `load` Erlang on the state left by the previous level.
    pub fn run_load(&mut self, run: &mut SimulationRun, load: usize, pb: &ProgressBar) -> Result<LoadStats> {
        let mut stats = LoadStats::new(load);

        for _ in 0..self.config.simulation.calls {
            let until_next = dist::get_arrival_interval(&mut self.rng, load);
            let sd = self.next_sd(run);

            run.offer_call(sd, &mut self.rng, &mut stats)?;
            run.advance(until_next, &mut stats)?;

            pb.inc(1);
        }

        Ok(stats)
    }

    fn next_sd(&mut self, run: &SimulationRun) -> SD {
        if !self.config.traffic.uniform_pairs {
            return run.sd();
        }
        let n = run.topology.node_count();
        let src = self.rng.gen_range(0..n);
        // src 以外から一様に選ぶ
        let mut dst = self.rng.gen_range(0..n - 1);
        if dst >= src {
            dst += 1;
        }
        SD::new(src, dst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::tests::line_topology;

    fn test_config(channels: usize, keys: usize) -> Config {
        let mut config = Config::default();
        config.network.channels = channels;
        config.network.initial_keys = keys;
        config
    }

    #[test]
    fn no_path_is_a_blocked_call() {
        let config = test_config(2, 0);
        let topology = Topology::from_edges("split", 4, &[(0, 1, 1.0), (2, 3, 1.0)], 2, 0, SD::new(0, 1)).unwrap();
        let strategy = RwaStrategy::from_config(&config.policy).unwrap();
        let mut run = SimulationRun::from_topology(&config, strategy, topology).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let mut stats = LoadStats::new(1);

        let outcome = run.offer_call(SD::new(0, 3), &mut rng, &mut stats).unwrap();
        assert_eq!(outcome, CallOutcome::Blocked);
        assert_eq!(stats.blocks, 1);
        assert!(run.registry.is_empty());
    }

    #[test]
    fn admission_locks_every_link_of_the_route() {
        let config = test_config(2, 0);
        let strategy = RwaStrategy::from_config(&config.policy).unwrap();
        let mut run = SimulationRun::from_topology(&config, strategy, line_topology(2, 0)).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let mut stats = LoadStats::new(1);

        let outcome = run.offer_call(SD::new(0, 3), &mut rng, &mut stats).unwrap();
        assert_eq!(outcome, CallOutcome::Admitted(0));
        for (i, j) in [(0, 1), (1, 2), (2, 3)] {
            assert!(!run.topology.is_channel_free(i, j, 0));
            assert!(!run.topology.is_channel_free(j, i, 0));
            assert_eq!(run.topology.holding_time(j, i, 0), config.simulation.holding_time);
        }
        run.registry.verify_against(&run.topology).unwrap();
    }

    #[test]
    fn source_equal_to_destination_is_rejected() {
        let mut config = test_config(2, 0);
        config.traffic.source = Some(2);
        config.traffic.destination = Some(2);
        let strategy = RwaStrategy::from_config(&config.policy).unwrap();
        assert!(SimulationRun::from_topology(&config, strategy, line_topology(2, 0)).is_err());
    }

    #[test]
    fn out_of_range_source_is_rejected() {
        let mut config = test_config(2, 0);
        config.traffic.source = Some(9);
        let strategy = RwaStrategy::from_config(&config.policy).unwrap();
        let result = SimulationRun::from_topology(&config, strategy, line_topology(2, 0));
        assert!(matches!(result, Err(SimError::NodeOutOfRange { node: 9, .. })));
    }

    #[test]
    fn lower_layer_check_follows_virtual_hops() {
        let mut config = test_config(4, 0);
        config.network.lower_aux_threshold = Some(33.0);
        let strategy = RwaStrategy::from_config(&config.policy).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let mut stats = LoadStats::new(1);

        // 補助グラフなし: 0 -> 2 は物理経路のみ
        let mut run = SimulationRun::new(&config, strategy).unwrap();
        let id = match run.offer_call(SD::new(0, 2), &mut rng, &mut stats).unwrap() {
            CallOutcome::Admitted(id) => id,
            CallOutcome::Blocked => panic!("empty network blocked a call"),
        };
        let lightpath = run.registry.get(id).unwrap();
        assert!(!lightpath.contains_virtual);
        assert!(lightpath.mapped_virtual_route.is_empty());
        assert_eq!(lightpath.lower_layer_virtual, Some(false));

        // 同じ閾値なら下位層の結果は仮想ホップの有無と一致する
        let mut aux_config = config.clone();
        aux_config.network.aux_graph = true;
        let mut run = SimulationRun::new(&aux_config, strategy).unwrap();
        for sd in [SD::new(0, 2), SD::new(7, 5), SD::new(0, 3)] {
            if let CallOutcome::Admitted(id) = run.offer_call(sd, &mut rng, &mut stats).unwrap() {
                let lightpath = run.registry.get(id).unwrap();
                assert_eq!(lightpath.lower_layer_virtual, Some(lightpath.contains_virtual));
            }
        }
    }

    #[test]
    fn blocking_probability_is_a_percentage() {
        let stats = LoadStats { load: 3, calls: 8, blocks: 2, ..Default::default() };
        assert_eq!(stats.blocking_probability(), 25.0);
        assert_eq!(LoadStats::new(1).blocking_probability(), 0.0);
    }
}
