use serde_derive::{ Deserialize, Serialize };

use crate::np_core::parameters::{ DEFAULT_HOLDING_TIME, DEFAULT_THREADS };

#[derive(Debug, Deserialize, Serialize, Clone)]
/// シミュレーション関連の設定
pub struct SimulationConfig {
    /// ランダムシード
    pub random_seed: u64,
    /// 試行回数 (1試行 = 全負荷レベル)
    pub repetitions: usize,
    /// 負荷レベルごとの呼数
    pub calls: usize,
    /// 最小負荷 [Erlang]
    pub load_min: usize,
    /// 最大負荷 [Erlang] (含む)
    pub load_max: usize,
    /// 負荷の刻み
    pub load_step: usize,
    /// 光パスの保持時間 [tick]
    #[serde(default = "default_holding_time")]
    pub holding_time: usize,
    /// 統計情報出力先フォルダ
    pub result_dir: String,
    /// 経路候補計算のスレッド数
    #[serde(default = "default_threads")]
    pub threads: usize,
    #[serde(default = "default_true")]
    pub progress_bar: bool,
}

fn default_holding_time() -> usize {
    DEFAULT_HOLDING_TIME
}

fn default_threads() -> usize {
    DEFAULT_THREADS
}

fn default_true() -> bool {
    true
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            random_seed: 0,
            repetitions: 1,
            calls: 1,
            load_min: 1,
            load_max: 1,
            load_step: 1,
            holding_time: DEFAULT_HOLDING_TIME,
            result_dir: "./results".to_string(),
            threads: DEFAULT_THREADS,
            progress_bar: false,
        }
    }
}
