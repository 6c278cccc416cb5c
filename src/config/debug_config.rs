use serde_derive::{ Deserialize, Serialize };

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
/// デバッガ関連の設定
pub struct DebugConfig {
    /// 隣接行列を出力するか
    pub log_adjacency: bool,
    /// 仮想リンクの生成を出力するか
    pub log_aux: bool,
    /// ダイクストラの途中経過を出力するか
    pub log_dijkstra: bool,
    /// 途中経過を出力する呼の数
    pub dijkstra_trace_limit: usize,
    /// 光パスの収容を出力するか
    pub log_lightpath: bool,
    /// 呼損を出力するか
    pub log_block: bool,
    /// 光パスの解放を出力するか
    pub log_release: bool,
    /// 負荷ごとの統計情報を出力するか
    pub log_analysis: bool,
    /// 毎tick整合性を検査するか
    pub check_consistency: bool,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_adjacency: false,
            log_aux: false,
            log_dijkstra: false,
            dijkstra_trace_limit: 5,
            log_lightpath: false,
            log_block: false,
            log_release: false,
            log_analysis: false,
            check_consistency: false,
        }
    }
}
