use serde_derive::{ Deserialize, Serialize };

use crate::np_core::parameters::DEFAULT_K_PATHS;

#[derive(Debug, Deserialize, Serialize, Clone)]
/// RWAポリシー関連の設定
pub struct PolicyConfig {
    /// ルーティング (dijkstra, yen)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub routing: Option<String>,
    /// 波長割当 (first-fit, random-fit, vertex-coloring)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wavelength: Option<String>,
    /// 一体型RWA (genetic-algorithm)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rwa: Option<String>,
    /// yenで試す経路数
    #[serde(default = "default_k_paths")]
    pub k_paths: usize,
    /// リンクごとに独立した波長を許すか (波長変換あり相当)
    #[serde(default)]
    pub per_link_assignment: bool,
}

fn default_k_paths() -> usize {
    DEFAULT_K_PATHS
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            routing: Some("dijkstra".to_string()),
            wavelength: Some("first-fit".to_string()),
            rwa: None,
            k_paths: DEFAULT_K_PATHS,
            per_link_assignment: false,
        }
    }
}
