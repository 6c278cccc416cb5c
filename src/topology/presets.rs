//! Built-in physical topologies.

/// Static description of a physical topology.
pub struct TopologyPreset {
    pub name: &'static str,
    pub node_count: usize,
    /// `(u, v, weight)`, listed once per undirected link.
    pub edges: &'static [(usize, usize, f64)],
    /// Source/destination pair used when the traffic section names none.
    pub default_sd: (usize, usize),
}

/// U.S. National Science Foundation Network, 10-node variant.
const NSF: TopologyPreset = TopologyPreset {
    name: "nsf",
    node_count: 10,
    edges: &[
        (1, 8, 1.0), (8, 3, 1.0), (8, 9, 1.0), (3, 5, 1.0), (3, 9, 1.0),
        (5, 7, 1.0), (5, 9, 1.0), (7, 4, 1.0), (7, 9, 1.0), (4, 6, 1.0),
        (4, 0, 1.0), (6, 2, 1.0), (2, 0, 1.0), (0, 9, 1.0),
    ],
    default_sd: (1, 9),
};

const PDF: TopologyPreset = TopologyPreset {
    name: "pdf",
    node_count: 10,
    edges: &[
        (1, 8, 1.0), (8, 3, 1.0), (8, 9, 1.0), (3, 5, 1.0), (5, 7, 1.0),
        (5, 9, 1.0), (7, 4, 1.0), (4, 0, 1.0), (6, 4, 1.0), (6, 2, 1.0),
        (2, 0, 1.0), (0, 9, 1.0), (9, 7, 1.0), (9, 3, 1.0),
    ],
    default_sd: (1, 6),
};

/// Weighted 8-node ring with two chords; the auxiliary-graph reference network.
const AUXGRAPH_AUX_D1: TopologyPreset = TopologyPreset {
    name: "auxgraph_aux_d1",
    node_count: 8,
    edges: &[
        (0, 1, 20.0), (1, 2, 12.0), (2, 3, 25.0),
        (4, 5, 25.0), (5, 6, 12.0), (6, 7, 20.0),
        (3, 7, 20.0), (0, 4, 20.0), (4, 1, 28.0), (3, 6, 28.0),
    ],
    default_sd: (0, 1),
};

pub const PRESETS: [&TopologyPreset; 3] = [&NSF, &PDF, &AUXGRAPH_AUX_D1];

pub fn find_preset(name: &str) -> Option<&'static TopologyPreset> {
    PRESETS.iter().copied().find(|p| p.name.eq_ignore_ascii_case(name))
}

#[test]
fn presets_are_well_formed() {
    for preset in PRESETS {
        assert!(preset.default_sd.0 < preset.node_count);
        assert!(preset.default_sd.1 < preset.node_count);
        for &(u, v, w) in preset.edges {
            assert!(u < preset.node_count && v < preset.node_count && u != v);
            assert!(w > 0.0);
        }
    }
    assert!(find_preset("NSF").is_some());
    assert!(find_preset("arpa").is_none());
}
