use console::style;

use crate::{
    config::Config,
    controller::{ registry::Lightpath, simulator::LoadStats },
    topology::{ aux_graph::AuxiliaryGraph, router::DijkstraTrace, Topology },
    SD,
};

pub fn log_alert(msg: &str) {
    println!("{:>8}| {}", style("ALERT").red(), style(msg).bold());
}

pub fn log_adjacency(config: &Config, topology: &Topology) {
    if config.debug.log_adjacency {
        println!("{:>8}| {} ({} nodes, {} ch)", style("ADJ").cyan(), topology.name, topology.node_count(), topology.channels());
        for (i, row) in topology.adjacency().iter().enumerate() {
            print!("{:>8}| {:3}", "", i);
            for (j, &w) in row.iter().enumerate() {
                let cell = if w.fract() == 0.0 { format!("{:5}", w as i64) } else { format!("{:5.1}", w) };
                // 仮想リンクは薄く表示
                if w > 0.0 && !topology.has_physical_edge(i, j) {
                    print!(" {}", style(cell).dim());
                } else {
                    print!(" {}", cell);
                }
            }
            println!();
        }
    }
}

pub fn log_aux_edges(config: &Config, aux: &AuxiliaryGraph) {
    if config.debug.log_aux {
        println!("{:>8}| threshold {} | {} virtual edges", style("AUX").magenta(), aux.threshold(), aux.edges().len());
        for edge in aux.edges() {
            print!("{:>8}| ({},{}) {:.1} |", style("AUX").magenta(), edge.src, edge.dst, edge.distance);
            if let Some(path) = aux.physical_path(edge.src, edge.dst) {
                print!(" {}", path[0]);
                for node in path.iter().skip(1) {
                    print!(" => {}", node);
                }
            }
            println!();
        }
    }
}

pub fn log_dijkstra_trace(config: &Config, sd: &SD, trace: &DijkstraTrace) {
    if config.debug.log_dijkstra {
        println!("{:>8}| {}", style("DIJKSTRA").yellow(), sd);
        for step in &trace.steps {
            println!("{:>8}| {}", "", step);
        }
    }
}

pub fn log_lightpath_admit(config: &Config, lightpath: &Lightpath) {
    if config.debug.log_lightpath {
        print!("{:>8}|{:5} {:?} |", style("ADMIT").green(), lightpath.id, lightpath.route);
        for (_, assignment) in lightpath.links() {
            print!(" {}", assignment);
        }
        if lightpath.contains_virtual {
            print!(" | virtual {:?}", lightpath.mapped_virtual_route);
        }
        if let Some(lower) = lightpath.lower_layer_virtual {
            print!(" | lower {}", lower);
        }
        println!();
    }
}

pub fn log_block(config: &Config, sd: &SD, tried_routes: usize) {
    if config.debug.log_block {
        println!("{:>8}| {} ({} routes tried)", style("BLOCK").red(), sd, tried_routes);
    }
}

pub fn log_release(config: &Config, lightpath: &Lightpath) {
    if config.debug.log_release {
        match lightpath.wavelength() {
            Some(w) => println!("{:>8}|{:5} {:?} λ{}", style("RELEASE").blue(), lightpath.id, lightpath.route, w),
            None => println!("{:>8}|{:5} {:?} keys only", style("RELEASE").blue(), lightpath.id, lightpath.route),
        }
    }
}

pub fn log_analysis(config: &Config, stats: &LoadStats, topology: &Topology) {
    if config.debug.log_analysis {
        println!(
            "{:>8}| load {:4} | bp {:7.3}% | admit {:5} block {:5} | fallback {:4} keys {:6} | used ch {:4} keys left {:6}",
            style("ANALYSIS").blue(),
            stats.load,
            stats.blocking_probability(),
            stats.admitted,
            stats.blocks,
            stats.fallback_links,
            stats.keys_consumed,
            topology.used_channel_count(),
            topology.total_keys()
        );
    }
}

/// 1試行分の結果 (常に出力)
pub fn log_repetition(index: usize, blocking: &[f64], elapsed: f64) {
    print!("{:>8}| sim {:2} |", style("BP(%)").green(), index + 1);
    for bp in blocking {
        print!(" {:5.1}", bp);
    }
    println!(" [{:.2} secs]", elapsed);
}
