use crate::topology::aux_graph::AuxiliaryGraph;

/// A route rewritten onto physical hops.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ExpandedRoute {
    /// 物理ノード列
    pub nodes: Vec<usize>,
    /// 仮想リンクを一つでも通ったか
    pub contains_virtual: bool,
    /// 仮想リンクごとに差し込んだ物理パス
    pub mapped_virtual_route: Vec<Vec<usize>>,
}

impl ExpandedRoute {
    /// A route that is already physical.
    pub fn physical(nodes: &[usize]) -> ExpandedRoute {
        ExpandedRoute {
            nodes: nodes.to_vec(),
            contains_virtual: false,
            mapped_virtual_route: vec![],
        }
    }

    pub fn hop_count(&self) -> usize {
        self.nodes.len().saturating_sub(1)
    }
}

/// Replaces each virtual hop of `route` by its stored physical sub-path.
///
/// Sub-paths are joined without repeating the boundary node. Routes shorter
/// than two nodes are returned unchanged.
pub fn expand_route(route: &[usize], aux: &AuxiliaryGraph) -> ExpandedRoute {
    if route.len() < 2 {
        return ExpandedRoute::physical(route);
    }

    let mut expanded: Vec<usize> = Vec::with_capacity(route.len());
    let mut contains_virtual = false;
    let mut mapped_virtual_route = vec![];

    for hop in route.windows(2) {
        let (u, v) = (hop[0], hop[1]);

        match aux.physical_path(u, v) {
            Some(phys) => {
                contains_virtual = true;
                mapped_virtual_route.push(phys.to_vec());
                // 接続点のノードを重複させない
                if expanded.last() == phys.first() {
                    expanded.extend_from_slice(&phys[1..]);
                } else {
                    expanded.extend_from_slice(phys);
                }
            }
            None => {
                if expanded.is_empty() {
                    expanded.push(u);
                }
                expanded.push(v);
            }
        }
    }

    ExpandedRoute {
        nodes: expanded,
        contains_virtual,
        mapped_virtual_route,
    }
}
