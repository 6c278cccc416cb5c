use serde_derive::{ Deserialize, Serialize };

use crate::{ error::{ Result, SimError }, utils };

mod debug_config;
mod network_config;
mod policy_config;
mod simulation_config;
mod traffic_config;

pub use debug_config::DebugConfig;
pub use network_config::NetworkConfig;
pub use policy_config::PolicyConfig;
pub use simulation_config::SimulationConfig;
pub use traffic_config::TrafficConfig;

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Config {
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub debug: DebugConfig,
    pub network: NetworkConfig,
    pub policy: PolicyConfig,
    #[serde(default)]
    pub traffic: TrafficConfig,
}

impl Config {
    /// Config構造体を作成する
    /// toml形式で書くこと．
    pub fn new(file_name: &str) -> Result<Config> {
        // configファイルを文字列として読込
        let contents = utils::read_file(file_name)?;
        Config::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Config> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Parameter ranges that do not depend on the topology.
    /// Node indices are checked once the topology is built.
    pub fn validate(&self) -> Result<()> {
        let sim = &self.simulation;
        if sim.calls == 0 {
            return Err(SimError::invalid("calls", "at least one call per load is required"));
        }
        if sim.load_step == 0 {
            return Err(SimError::invalid("load_step", "must be positive"));
        }
        if sim.load_min == 0 {
            return Err(SimError::invalid("load_min", "loads start at 1 Erlang"));
        }
        if sim.load_min > sim.load_max {
            return Err(SimError::invalid(
                "load_max",
                format!("{} is smaller than load_min {}", sim.load_max, sim.load_min),
            ));
        }
        if sim.holding_time == 0 {
            return Err(SimError::invalid("holding_time", "must be positive"));
        }
        if self.network.channels == 0 {
            return Err(SimError::invalid("channels", "at least one wavelength is required"));
        }
        if self.network.key_draw == 0 {
            return Err(SimError::invalid("key_draw", "must be positive"));
        }
        for threshold in std::iter::once(self.network.aux_threshold).chain(self.network.lower_aux_threshold) {
            if threshold.is_nan() || threshold <= 0.0 {
                return Err(SimError::invalid("aux_threshold", "must be positive"));
            }
        }
        if self.policy.k_paths == 0 {
            return Err(SimError::invalid("k_paths", "must be positive"));
        }
        // ルーティング/波長割当の組み合わせ
        crate::controller::strategy::RwaStrategy::from_config(&self.policy)?;

        Ok(())
    }

    /// Load levels of one repetition, `load_min..=load_max` by `load_step`.
    pub fn loads(&self) -> Vec<usize> {
        utils::load_levels(self.simulation.load_min, self.simulation.load_max, self.simulation.load_step)
    }
}

#[cfg(test)]
mod tests {
    use super::Config;
    use crate::error::SimError;

    const SAMPLE: &str = r#"
[simulation]
random_seed = 1
repetitions = 2
calls = 100
load_min = 30
load_max = 190
load_step = 20
result_dir = "./results"

[network]
topology = "auxgraph_aux_d1"
channels = 4
aux_graph = true
initial_keys = 40

[policy]
routing = "dijkstra"
wavelength = "first-fit"
"#;

    #[test]
    fn parse_sample_with_defaults() {
        let config = Config::from_toml_str(SAMPLE).unwrap();
        assert_eq!(config.simulation.holding_time, 10);
        assert_eq!(config.network.key_draw, 10);
        assert_eq!(config.network.aux_threshold, 33.0);
        assert!(!config.policy.per_link_assignment);
        assert!(config.traffic.source.is_none());
        assert!(!config.debug.log_dijkstra);
        assert_eq!(config.loads(), vec![30, 50, 70, 90, 110, 130, 150, 170, 190]);
    }

    #[test]
    fn reject_inverted_load_range() {
        let text = SAMPLE.replace("load_max = 190", "load_max = 10");
        assert!(matches!(
            Config::from_toml_str(&text),
            Err(SimError::InvalidParameter { name: "load_max", .. })
        ));
    }

    #[test]
    fn reject_unknown_wavelength_policy() {
        let text = SAMPLE.replace("first-fit", "best-fit");
        assert!(matches!(Config::from_toml_str(&text), Err(SimError::UnknownPolicy { .. })));
    }

    #[test]
    fn reject_malformed_toml() {
        assert!(matches!(Config::from_toml_str("[simulation"), Err(SimError::ConfigParse(_))));
    }
}
