/// Ticks an admitted call occupies its channels.
pub const DEFAULT_HOLDING_TIME: usize = 10;
/// Keys drawn from a link's pool in place of one wavelength.
pub const DEFAULT_KEY_DRAW: usize = 10;
/// Maximum physical distance bridged by a virtual edge.
pub const DEFAULT_AUX_THRESHOLD: f64 = 33.0;
/// Arrivals are normalized so that this load fills every tick.
pub const LOAD_NORMALIZATION: f64 = 250.0;

pub const DEFAULT_K_PATHS: usize = 2;
/// Extra hops beyond the shortest hop count kept as route candidates.
pub const HOP_SLUG: usize = 2;

pub const DEFAULT_THREADS: usize = 4;

pub const PB_TEMPLATES: &str =
    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta_precise}) \t{msg}";
pub const PB_CHARS: &str = "#9876543210>-";

pub const TOPOLOGY_DIR: &str = "./files/topology";
