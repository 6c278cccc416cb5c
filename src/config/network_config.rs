use serde_derive::{ Deserialize, Serialize };

use crate::np_core::parameters::{ DEFAULT_AUX_THRESHOLD, DEFAULT_KEY_DRAW };

#[derive(Debug, Deserialize, Serialize, Clone)]
/// ネットワーク関連の設定
pub struct NetworkConfig {
    /// 対象物理トポロジ (プリセット名 or files/topology/<name>.txt)
    pub topology: String,
    /// リンクあたりの波長数 W
    pub channels: usize,
    /// 補助グラフ (仮想リンク) を使うか
    #[serde(default)]
    pub aux_graph: bool,
    /// 仮想リンクを張る物理距離の上限
    #[serde(default = "default_aux_threshold")]
    pub aux_threshold: f64,
    /// 下位補助グラフの閾値 (クロスレイヤ確認用，未指定なら無効)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lower_aux_threshold: Option<f64>,
    /// リンクあたりの鍵プール初期値
    #[serde(default)]
    pub initial_keys: usize,
    /// 波長の代わりに消費する鍵の数
    #[serde(default = "default_key_draw")]
    pub key_draw: usize,
}

fn default_aux_threshold() -> f64 {
    DEFAULT_AUX_THRESHOLD
}

fn default_key_draw() -> usize {
    DEFAULT_KEY_DRAW
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            topology: "auxgraph_aux_d1".to_string(),
            channels: 4,
            aux_graph: false,
            aux_threshold: DEFAULT_AUX_THRESHOLD,
            lower_aux_threshold: None,
            initial_keys: 0,
            key_draw: DEFAULT_KEY_DRAW,
        }
    }
}
