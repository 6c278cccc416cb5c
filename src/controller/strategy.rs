use std::str::FromStr;

use strum_macros::{ Display, EnumIter, EnumString };

use crate::{ config::PolicyConfig, error::{ Result, SimError } };

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display, EnumIter)]
pub enum RoutingPolicy {
    #[strum(serialize = "dijkstra")]
    Dijkstra,
    #[strum(to_string = "yen", serialize = "k-shortest-paths")]
    KShortestPaths,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display, EnumIter)]
pub enum WavelengthPolicy {
    #[strum(serialize = "vertex-coloring")]
    VertexColoring,
    #[strum(serialize = "first-fit")]
    FirstFit,
    #[strum(serialize = "random-fit")]
    RandomFit,
}

/// RWA combination resolved once from the configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RwaStrategy {
    pub routing: RoutingPolicy,
    pub wavelength: WavelengthPolicy,
    /// Routes tried per call (1 for Dijkstra).
    pub k_paths: usize,
    /// Each link picks its own wavelength.
    pub per_link: bool,
}

impl RwaStrategy {
    pub fn from_config(policy: &PolicyConfig) -> Result<RwaStrategy> {
        match (&policy.routing, &policy.wavelength, &policy.rwa) {
            (Some(r_alg), Some(wa_alg), _) => {
                let routing = RoutingPolicy::from_str(r_alg)
                    .map_err(|_| SimError::UnknownPolicy { kind: "routing", name: r_alg.clone() })?;
                let wavelength = WavelengthPolicy::from_str(wa_alg).map_err(|_| SimError::UnknownPolicy {
                    kind: "wavelength assignment",
                    name: wa_alg.clone(),
                })?;
                let k_paths = match routing {
                    RoutingPolicy::Dijkstra => 1,
                    RoutingPolicy::KShortestPaths => policy.k_paths,
                };

                Ok(RwaStrategy {
                    routing,
                    wavelength,
                    k_paths,
                    per_link: policy.per_link_assignment,
                })
            }
            (_, _, Some(rwa_alg)) if rwa_alg == "genetic-algorithm" => {
                Err(SimError::UnsupportedPolicy(rwa_alg.clone()))
            }
            (_, _, Some(rwa_alg)) => Err(SimError::UnknownPolicy { kind: "RWA", name: rwa_alg.clone() }),
            _ => Err(SimError::MissingPolicy),
        }
    }

    /// Base name of the result files, e.g. `dijkstra_first-fit_4ch`.
    pub fn file_base(&self, channels: usize) -> String {
        format!("{}_{}_{}ch", self.routing, self.wavelength, channels)
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    fn policy(r: Option<&str>, w: Option<&str>, rwa: Option<&str>) -> PolicyConfig {
        PolicyConfig {
            routing: r.map(String::from),
            wavelength: w.map(String::from),
            rwa: rwa.map(String::from),
            ..PolicyConfig::default()
        }
    }

    #[test]
    fn every_combination_resolves() {
        for r in RoutingPolicy::iter() {
            for w in WavelengthPolicy::iter() {
                let s = RwaStrategy::from_config(&policy(Some(&r.to_string()), Some(&w.to_string()), None)).unwrap();
                assert_eq!((s.routing, s.wavelength), (r, w));
            }
        }
    }

    #[test]
    fn dijkstra_tries_one_route() {
        let mut p = policy(Some("dijkstra"), Some("first-fit"), None);
        p.k_paths = 5;
        assert_eq!(RwaStrategy::from_config(&p).unwrap().k_paths, 1);
        p.routing = Some("yen".to_string());
        assert_eq!(RwaStrategy::from_config(&p).unwrap().k_paths, 5);
    }

    #[test]
    fn invalid_combinations() {
        assert!(matches!(
            RwaStrategy::from_config(&policy(Some("bellman"), Some("first-fit"), None)),
            Err(SimError::UnknownPolicy { kind: "routing", .. })
        ));
        assert!(matches!(
            RwaStrategy::from_config(&policy(None, None, Some("genetic-algorithm"))),
            Err(SimError::UnsupportedPolicy(_))
        ));
        assert!(matches!(
            RwaStrategy::from_config(&policy(Some("dijkstra"), None, None)),
            Err(SimError::MissingPolicy)
        ));
    }

    #[test]
    fn file_base_name() {
        let s = RwaStrategy::from_config(&policy(Some("dijkstra"), Some("first-fit"), None)).unwrap();
        assert_eq!(s.file_base(4), "dijkstra_first-fit_4ch");
    }
}
