use indicatif::{ ProgressBar, ProgressStyle };
use itertools::iproduct;
use petgraph::{
    algo::{ all_simple_paths, astar },
    graph::{ NodeIndex, UnGraph },
    visit::EdgeRef,
};
use rayon::{ iter::{ IntoParallelIterator, ParallelIterator }, ThreadPoolBuilder };

use fxhash::FxHashMap;

use crate::{
    np_core::parameters::{ HOP_SLUG, PB_CHARS, PB_TEMPLATES },
    Edge,
    SD,
};

#[derive(Debug, Clone, PartialEq)]
pub struct RouteCandidate {
    pub node_route: Vec<usize>,
    pub edge_route: Vec<Edge>,
    pub weight: f64,
}

impl RouteCandidate {
    pub fn new(node_route: Vec<usize>, weight: f64) -> RouteCandidate {
        let edge_route = Edge::from_node_route(&node_route);
        RouteCandidate {
            node_route,
            edge_route,
            weight,
        }
    }
}

/// Undirected petgraph view of an adjacency matrix.
///
/// Non-positive (and NaN) cells are treated as "no edge".
pub fn graph_from_adjacency(adjacency: &[Vec<f64>]) -> UnGraph<usize, f64> {
    let mut g = UnGraph::<usize, f64>::with_capacity(adjacency.len(), 0);

    for node in 0..adjacency.len() {
        g.add_node(node);
    }

    for (r, row) in adjacency.iter().enumerate() {
        for (c, &weight) in row.iter().enumerate().skip(r + 1) {
            if weight > 0.0 {
                g.add_edge(NodeIndex::new(r), NodeIndex::new(c), weight);
            }
        }
    }

    g
}

pub fn route_weight(adjacency: &[Vec<f64>], node_route: &[usize]) -> f64 {
    node_route.windows(2).map(|w| adjacency[w[0]][w[1]]).sum()
}

/// Weighted shortest path, `None` when `dst` is unreachable.
pub fn shortest_path(g: &UnGraph<usize, f64>, src: usize, dst: usize) -> Option<RouteCandidate> {
    let goal = NodeIndex::new(dst);
    let (weight, path) = astar(g, NodeIndex::new(src), |finish| finish == goal, |e| *e.weight(), |_| 0.0)?;

    Some(RouteCandidate::new(path.into_iter().map(|n| n.index()).collect(), weight))
}

/// Up to `k` loop-free routes ordered by total weight.
///
/// The first entry is always the Dijkstra route. Further candidates are the
/// simple paths with at most `HOP_SLUG` more hops than the longest route
/// found so far, sorted by weight and then by hop count.
pub fn k_shortest_paths(g: &UnGraph<usize, f64>, src: usize, dst: usize, k: usize) -> Vec<RouteCandidate> {
    let shortest = match shortest_path(g, src, dst) {
        Some(shortest) => shortest,
        None => return vec![],
    };
    if k <= 1 {
        return vec![shortest];
    }

    let max_intermediate = shortest.edge_route.len() - 1 + HOP_SLUG;
    let mut others: Vec<RouteCandidate> = all_simple_paths::<Vec<_>, _>(
        g,
        NodeIndex::new(src),
        NodeIndex::new(dst),
        0,
        Some(max_intermediate),
    )
    .map(|path| {
        let node_route: Vec<usize> = path.into_iter().map(|n| n.index()).collect();
        let weight = node_route
            .windows(2)
            .map(|w| {
                g.find_edge(NodeIndex::new(w[0]), NodeIndex::new(w[1]))
                    .map(|e| g[e])
                    .unwrap_or(0.0)
            })
            .sum();
        RouteCandidate::new(node_route, weight)
    })
    .filter(|cand| cand.node_route != shortest.node_route)
    .collect();

    others.sort_by(|a, b| {
        a.weight
            .total_cmp(&b.weight)
            .then(a.node_route.len().cmp(&b.node_route.len()))
    });
    others.truncate(k - 1);

    let mut out = Vec::with_capacity(k);
    out.push(shortest);
    out.extend(others);
    out
}

/// Route candidates of every source/destination pair.
///
/// The adjacency (physical plus virtual) is frozen before traffic starts, so
/// routes are computed once per topology and looked up per call.
#[derive(Debug, Clone)]
pub struct Router {
    route_candidates: FxHashMap<SD, Vec<RouteCandidate>>,
}

impl Router {
    pub fn new(adjacency: &[Vec<f64>], k: usize, threads: usize, show_progress: bool) -> Router {
        let g = graph_from_adjacency(adjacency);
        let n = adjacency.len();
        let sd_pairs: Vec<(usize, usize)> = iproduct!(0..n, 0..n).filter(|(s, d)| s != d).collect();

        let pb = if show_progress {
            ProgressBar::new(sd_pairs.len() as u64)
        } else {
            ProgressBar::hidden()
        };
        if let Ok(style) = ProgressStyle::default_bar().template(PB_TEMPLATES) {
            pb.set_style(style.progress_chars(PB_CHARS));
        }

        let search = |(src, dst): (usize, usize)| {
            let cands = k_shortest_paths(&g, src, dst, k);
            pb.inc(1);
            (SD::new(src, dst), cands)
        };

        let route_candidates_vec: Vec<(SD, Vec<RouteCandidate>)> =
            match ThreadPoolBuilder::new().num_threads(threads.max(1)).build() {
                Ok(pool) => pool.install(|| sd_pairs.into_par_iter().map(search).collect()),
                // プールを作れなければ逐次実行
                Err(_) => sd_pairs.into_iter().map(search).collect(),
            };
        pb.finish_and_clear();

        Router {
            route_candidates: route_candidates_vec.into_iter().collect(),
        }
    }

    /// Candidates for `sd`, best first. Empty when no path exists.
    pub fn routes(&self, sd: &SD) -> &[RouteCandidate] {
        self.route_candidates.get(sd).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn shortest(&self, sd: &SD) -> Option<&RouteCandidate> {
        self.routes(sd).first()
    }
}

/// Result of the step-by-step Dijkstra tracer.
#[derive(Debug, Clone, Default)]
pub struct DijkstraTrace {
    pub path: Vec<usize>,
    pub distance: Option<f64>,
    pub steps: Vec<String>,
}

/// Array-based Dijkstra that records every selection and relaxation.
///
/// Written independently of [`Router`] and only used to cross-check it, so
/// it favors readable steps over speed.
pub fn trace_dijkstra(adjacency: &[Vec<f64>], src: usize, dst: usize) -> DijkstraTrace {
    let n = adjacency.len();
    let mut dist = vec![f64::INFINITY; n];
    let mut prev: Vec<Option<usize>> = vec![None; n];
    let mut visited = vec![false; n];
    let mut steps = vec![format!("from {src} to {dst}, n={n}")];
    dist[src] = 0.0;

    for _ in 0..n {
        // 未訪問で最小距離のノードを選ぶ
        let u = (0..n)
            .filter(|&i| !visited[i] && dist[i].is_finite())
            .min_by(|&a, &b| dist[a].total_cmp(&dist[b]));
        let u = match u {
            Some(u) => u,
            None => {
                steps.push("no more reachable nodes".to_string());
                break;
            }
        };
        visited[u] = true;
        steps.push(format!("select {u} dist={}", dist[u]));
        if u == dst {
            steps.push("reached destination".to_string());
            break;
        }

        for v in 0..n {
            let w = adjacency[u][v];
            if visited[v] || !(w > 0.0) {
                continue;
            }
            let alt = dist[u] + w;
            if alt < dist[v] {
                steps.push(format!("  relax {u}->{v} w={w} dist[{v}]: {} -> {alt}", dist[v]));
                dist[v] = alt;
                prev[v] = Some(u);
            }
        }
    }

    if !dist[dst].is_finite() {
        steps.push(format!("no path from {src} to {dst}"));
        return DijkstraTrace { path: vec![], distance: None, steps };
    }

    let mut path = vec![dst];
    let mut cur = dst;
    while let Some(p) = prev[cur] {
        path.push(p);
        cur = p;
    }
    path.reverse();
    steps.push(format!("finished: distance {} path {:?}", dist[dst], path));

    DijkstraTrace { path, distance: Some(dist[dst]), steps }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::presets::PRESETS;

    fn square() -> Vec<Vec<f64>> {
        // 0-1 (1), 1-3 (1), 0-2 (1), 2-3 (5), 0-3 (0 = none)
        let mut a = vec![vec![0.0; 4]; 4];
        for &(u, v, w) in &[(0, 1, 1.0), (1, 3, 1.0), (0, 2, 1.0), (2, 3, 5.0)] {
            a[u][v] = w;
            a[v][u] = w;
        }
        a
    }

    #[test]
    fn shortest_path_by_weight() {
        let g = graph_from_adjacency(&square());
        let route = shortest_path(&g, 0, 3).unwrap();
        assert_eq!(route.node_route, vec![0, 1, 3]);
        assert_eq!(route.weight, 2.0);
        assert_eq!(route.edge_route, vec![Edge::new(0, 1), Edge::new(1, 3)]);
    }

    #[test]
    fn non_positive_weights_are_not_edges() {
        let mut a = square();
        a[0][1] = -1.0;
        a[1][0] = -1.0;
        let g = graph_from_adjacency(&a);
        assert_eq!(shortest_path(&g, 0, 3).unwrap().node_route, vec![0, 2, 3]);
        assert_eq!(trace_dijkstra(&a, 0, 3).path, vec![0, 2, 3]);
    }

    #[test]
    fn unreachable_gives_empty_result() {
        let mut a = square();
        a.push(vec![0.0; 4]);
        for row in a.iter_mut() {
            row.resize(5, 0.0);
        }
        let router = Router::new(&a, 1, 1, false);
        assert!(router.routes(&SD::new(0, 4)).is_empty());
        assert!(trace_dijkstra(&a, 0, 4).path.is_empty());
        assert!(trace_dijkstra(&a, 0, 4).distance.is_none());
    }

    #[test]
    fn k_shortest_orders_by_weight() {
        let g = graph_from_adjacency(&square());
        let routes = k_shortest_paths(&g, 0, 3, 3);
        assert_eq!(routes.len(), 2);
        assert_eq!(routes[0].node_route, vec![0, 1, 3]);
        assert_eq!(routes[1].node_route, vec![0, 2, 3]);
        assert_eq!(routes[1].weight, 6.0);
    }

    #[test]
    fn tracer_matches_router_weight_on_presets() {
        for preset in PRESETS {
            let mut a = vec![vec![0.0; preset.node_count]; preset.node_count];
            for &(u, v, w) in preset.edges {
                a[u][v] = w;
                a[v][u] = w;
            }
            let router = Router::new(&a, 1, 2, false);
            for s in 0..preset.node_count {
                for d in 0..preset.node_count {
                    if s == d {
                        continue;
                    }
                    let trace = trace_dijkstra(&a, s, d);
                    let route = router.shortest(&SD::new(s, d)).unwrap();
                    assert_eq!(route_weight(&a, &trace.path), route.weight);
                    assert_eq!(trace.distance, Some(route.weight));
                    assert_eq!(trace.path.first(), Some(&s));
                    assert_eq!(trace.path.last(), Some(&d));
                }
            }
        }
    }
}
